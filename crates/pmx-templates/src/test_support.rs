use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::builder::{BuildError, TemplateBuilder, parse_template};
use crate::remote::{
    ContentClient, CreateOutcome, EntryKind, IntegrityToken, RemoteContent, RemoteError,
    RemoteFileEntry, SavedFile, WriteOptions,
};
use crate::repository::TemplateRepository;
use crate::template::Template;

/// A call observed by [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListFiles {
        repo: String,
    },
    GetContent {
        repo: String,
        path: String,
        branch: Option<String>,
    },
    CreateContent {
        repo: String,
        path: String,
        message: String,
        content: String,
        opts: WriteOptions,
    },
    UpdateContent {
        repo: String,
        path: String,
        message: String,
        token: IntegrityToken,
        content: String,
        opts: WriteOptions,
    },
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    token: IntegrityToken,
}

/// In-memory content client for testing. Keeps files per repository and
/// records every call in order.
#[derive(Default)]
pub struct RecordingClient {
    files: Mutex<HashMap<String, BTreeMap<String, StoredFile>>>,
    listing_failures: Mutex<HashMap<String, RemoteError>>,
    create_override: Mutex<Option<Result<CreateOutcome, RemoteError>>>,
    get_failure: Mutex<Option<RemoteError>>,
    update_failure: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<Call>>,
    revision: Mutex<u64>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(
        &self,
        repo: &TemplateRepository,
        path: &str,
        content: &str,
        token: &str,
    ) {
        self.files
            .lock()
            .unwrap()
            .entry(repo.full_name())
            .or_default()
            .insert(
                path.to_owned(),
                StoredFile {
                    content: content.to_owned(),
                    token: IntegrityToken::new(token),
                },
            );
    }

    /// Make `list_files` fail for one repository.
    pub fn fail_listing(&self, repo: &TemplateRepository, error: RemoteError) {
        self.listing_failures
            .lock()
            .unwrap()
            .insert(repo.full_name(), error);
    }

    /// Replace the next and all following create results.
    pub fn override_create(&self, result: Result<CreateOutcome, RemoteError>) {
        *self.create_override.lock().unwrap() = Some(result);
    }

    pub fn fail_get(&self, error: RemoteError) {
        *self.get_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_update(&self, error: RemoteError) {
        *self.update_failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn content_of(&self, repo: &TemplateRepository, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&repo.full_name())
            .and_then(|files| files.get(path))
            .map(|f| f.content.clone())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_token(&self) -> IntegrityToken {
        let mut revision = self.revision.lock().unwrap();
        *revision += 1;
        IntegrityToken::new(format!("rev-{revision}"))
    }

    fn html_url(repo: &TemplateRepository, path: &str, branch: Option<&str>) -> String {
        format!(
            "https://github.com/{}/blob/{}/{}",
            repo.full_name(),
            branch.unwrap_or("master"),
            path
        )
    }
}

#[async_trait::async_trait]
impl ContentClient for RecordingClient {
    async fn list_files(
        &self,
        repo: &TemplateRepository,
    ) -> Result<Vec<RemoteFileEntry>, RemoteError> {
        self.record(Call::ListFiles {
            repo: repo.full_name(),
        });

        if let Some(error) = self.listing_failures.lock().unwrap().get(&repo.full_name()) {
            return Err(error.clone());
        }

        let prefix = repo
            .directory
            .as_deref()
            .map(|d| format!("{}/", d.trim_end_matches('/')))
            .unwrap_or_default();

        let files = self.files.lock().unwrap();
        let entries: Vec<RemoteFileEntry> = files
            .get(&repo.full_name())
            .map(|files| {
                files
                    .iter()
                    .filter_map(|(path, file)| {
                        let name = path.strip_prefix(&prefix)?;
                        if name.contains('/') {
                            return None;
                        }
                        Some(RemoteFileEntry {
                            name: name.to_owned(),
                            path: path.clone(),
                            token: Some(file.token.clone()),
                            kind: EntryKind::File,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(entries)
    }

    async fn get_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        branch: Option<&str>,
    ) -> Result<RemoteContent, RemoteError> {
        self.record(Call::GetContent {
            repo: repo.full_name(),
            path: path.to_owned(),
            branch: branch.map(str::to_owned),
        });

        if let Some(error) = self.get_failure.lock().unwrap().clone() {
            return Err(error);
        }

        let files = self.files.lock().unwrap();
        let file = files
            .get(&repo.full_name())
            .and_then(|files| files.get(path))
            .ok_or_else(|| RemoteError::NotFound(path.to_owned()))?;

        Ok(RemoteContent {
            path: path.to_owned(),
            token: file.token.clone(),
            content: file.content.clone(),
        })
    }

    async fn create_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        message: &str,
        content: &str,
        opts: &WriteOptions,
    ) -> Result<CreateOutcome, RemoteError> {
        self.record(Call::CreateContent {
            repo: repo.full_name(),
            path: path.to_owned(),
            message: message.to_owned(),
            content: content.to_owned(),
            opts: opts.clone(),
        });

        if let Some(result) = self.create_override.lock().unwrap().clone() {
            return result;
        }

        let exists = self
            .files
            .lock()
            .unwrap()
            .get(&repo.full_name())
            .is_some_and(|files| files.contains_key(path));
        if exists {
            return Ok(CreateOutcome::Conflict);
        }

        let token = self.next_token();
        self.add_file(repo, path, content, token.as_str());

        Ok(CreateOutcome::Created(SavedFile {
            path: path.to_owned(),
            html_url: Self::html_url(repo, path, opts.branch.as_deref()),
            token: Some(token),
        }))
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
        self.record(Call::UpdateContent {
            repo: repo.full_name(),
            path: path.to_owned(),
            message: message.to_owned(),
            token: token.clone(),
            content: content.to_owned(),
            opts: opts.clone(),
        });

        if let Some(error) = self.update_failure.lock().unwrap().clone() {
            return Err(error);
        }

        let current = self
            .files
            .lock()
            .unwrap()
            .get(&repo.full_name())
            .and_then(|files| files.get(path))
            .map(|f| f.token.clone())
            .ok_or_else(|| RemoteError::NotFound(path.to_owned()))?;

        if &current != token {
            return Err(RemoteError::Conflict(format!(
                "{path} does not match {token}"
            )));
        }

        let new_token = self.next_token();
        self.add_file(repo, path, content, new_token.as_str());

        Ok(SavedFile {
            path: path.to_owned(),
            html_url: Self::html_url(repo, path, opts.branch.as_deref()),
            token: Some(new_token),
        })
    }
}

/// Builder that parses without persisting and remembers every input.
#[derive(Default)]
pub struct RecordingBuilder {
    inputs: Mutex<Vec<String>>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TemplateBuilder for RecordingBuilder {
    async fn build(&self, raw_content: &str) -> Result<Template, BuildError> {
        self.inputs.lock().unwrap().push(raw_content.to_owned());
        parse_template(raw_content)
    }
}
