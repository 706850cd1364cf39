use std::fmt;
use std::sync::Arc;

use crate::repository::TemplateRepository;

/// Errors reported by a remote content client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The write was rejected because the path already exists or the
    /// supplied integrity token is stale.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Version marker of a remote file (the git blob sha on GitHub).
/// Updates must present the current token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegrityToken(String);

impl IntegrityToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntegrityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file the caller already knows about, optionally with its last seen token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileRef {
    pub path: String,
    pub token: Option<IntegrityToken>,
}

/// What kind of entry a directory listing returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other(String),
}

/// One entry from a repository listing. Content is read separately so that
/// only the files a caller cares about are downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileEntry {
    pub name: String,
    pub path: String,
    pub token: Option<IntegrityToken>,
    pub kind: EntryKind,
}

/// A file read back from the remote, content already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteContent {
    pub path: String,
    pub token: IntegrityToken,
    pub content: String,
}

/// Result of a successful create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: String,
    /// Browsable location of the file.
    pub html_url: String,
    pub token: Option<IntegrityToken>,
}

/// Optional parameters for a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub branch: Option<String>,
    pub file: Option<RemoteFileRef>,
}

impl WriteOptions {
    pub fn on_branch(branch: Option<String>) -> Self {
        Self { branch, file: None }
    }
}

/// Outcome of attempting to create a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(SavedFile),
    /// A file already exists at the path.
    Conflict,
    /// The destination cannot be written at all (missing repository, bad
    /// credentials). Retrying will not help.
    Fatal(RemoteError),
}

/// Client for a Git host's file content API.
#[async_trait::async_trait]
pub trait ContentClient: Send + Sync {
    /// List the files in the repository's configured directory.
    async fn list_files(
        &self,
        repo: &TemplateRepository,
    ) -> Result<Vec<RemoteFileEntry>, RemoteError>;

    /// Read a file and its current integrity token.
    async fn get_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        branch: Option<&str>,
    ) -> Result<RemoteContent, RemoteError>;

    /// Create a new file. An existing file is reported as
    /// [`CreateOutcome::Conflict`], never overwritten.
    async fn create_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        message: &str,
        content: &str,
        opts: &WriteOptions,
    ) -> Result<CreateOutcome, RemoteError>;

    /// Replace an existing file whose current version is `token`.
    async fn update_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        message: &str,
        token: &IntegrityToken,
        content: &str,
        opts: &WriteOptions,
    ) -> Result<SavedFile, RemoteError>;
}

#[async_trait::async_trait]
impl<T: ContentClient + ?Sized> ContentClient for Arc<T> {
    async fn list_files(
        &self,
        repo: &TemplateRepository,
    ) -> Result<Vec<RemoteFileEntry>, RemoteError> {
        (**self).list_files(repo).await
    }

    async fn get_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        branch: Option<&str>,
    ) -> Result<RemoteContent, RemoteError> {
        (**self).get_content(repo, path, branch).await
    }

    async fn create_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        message: &str,
        content: &str,
        opts: &WriteOptions,
    ) -> Result<CreateOutcome, RemoteError> {
        (**self)
            .create_content(repo, path, message, content, opts)
            .await
    }

    async fn update_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        message: &str,
        token: &IntegrityToken,
        content: &str,
        opts: &WriteOptions,
    ) -> Result<SavedFile, RemoteError> {
        (**self)
            .update_content(repo, path, message, token, content, opts)
            .await
    }
}
