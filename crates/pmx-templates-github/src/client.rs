use base64::Engine;
use pmx_templates::{
    ContentClient, CreateOutcome, EntryKind, IntegrityToken, RemoteContent, RemoteError,
    RemoteFileEntry, SavedFile, TemplateRepository, WriteOptions,
};
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::content::{ContentResponse, ErrorResponse, WriteRequest, WriteResponse};

/// Client for GitHub's repository Contents API.
///
/// Credentials are fixed at construction; the underlying HTTP client is
/// created once and reused for every call.
pub struct GitHubContents {
    client: reqwest::Client,
    token: Option<String>,
    api_base_url: Option<String>,
}

impl GitHubContents {
    pub fn new(token: Option<String>, api_base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            api_base_url,
        }
    }

    fn api_base(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or("https://api.github.com")
    }

    fn contents_url(
        &self,
        repo: &TemplateRepository,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Url, RemoteError> {
        let mut url = Url::parse(self.api_base())
            .map_err(|e| RemoteError::Network(format!("invalid API base URL: {e}")))?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                RemoteError::Network(format!("API base URL cannot be a base: {}", self.api_base()))
            })?;
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "contents"]);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }

        if let Some(branch) = branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }

        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req
            .header("User-Agent", "pmx-templates")
            .header("Accept", "application/vnd.github+json");

        match &self.token {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }

    async fn put(
        &self,
        repo: &TemplateRepository,
        path: &str,
        body: &WriteRequest<'_>,
    ) -> Result<reqwest::Response, RemoteError> {
        let url = self.contents_url(repo, path, None)?;
        self.authorize(self.client.put(url))
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))
    }

    fn encode_content(content: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(content)
    }

    fn decode_content(response: &ContentResponse) -> Result<String, RemoteError> {
        let encoded = response
            .content
            .as_deref()
            .ok_or_else(|| RemoteError::Decode(format!("{} has no content", response.path)))?;

        if let Some(encoding) = response.encoding.as_deref()
            && encoding != "base64"
        {
            return Err(RemoteError::Decode(format!(
                "unsupported encoding {encoding} for {}",
                response.path
            )));
        }

        // GitHub returns base64 with newlines embedded
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&cleaned)
            .map_err(|e| RemoteError::Decode(format!("base64 decode failed: {e}")))?;

        String::from_utf8(bytes).map_err(|e| RemoteError::Decode(format!("invalid UTF-8: {e}")))
    }

    async fn saved_file(response: reqwest::Response) -> Result<SavedFile, RemoteError> {
        let written: WriteResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(SavedFile {
            path: written.content.path,
            html_url: written.content.html_url,
            token: Some(IntegrityToken::new(written.content.sha)),
        })
    }
}

/// Map a non-success response onto the error taxonomy.
async fn error_for(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let rate_limit_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "0");

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned(),
    };

    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        StatusCode::UNAUTHORIZED => RemoteError::Unauthorized(message),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => RemoteError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited(message),
        StatusCode::FORBIDDEN if rate_limit_exhausted => RemoteError::RateLimited(message),
        _ => RemoteError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait::async_trait]
impl ContentClient for GitHubContents {
    async fn list_files(
        &self,
        repo: &TemplateRepository,
    ) -> Result<Vec<RemoteFileEntry>, RemoteError> {
        let url = self.contents_url(
            repo,
            repo.directory.as_deref().unwrap_or(""),
            repo.branch.as_deref(),
        )?;
        debug!(repository = %repo, %url, "listing repository contents");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let entries: Vec<ContentResponse> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("expected a directory listing: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|entry| RemoteFileEntry {
                kind: match entry.entry_type.as_str() {
                    "file" => EntryKind::File,
                    "dir" => EntryKind::Dir,
                    other => EntryKind::Other(other.to_owned()),
                },
                name: entry.name,
                path: entry.path,
                token: Some(IntegrityToken::new(entry.sha)),
            })
            .collect())
    }

    async fn get_content(
        &self,
        repo: &TemplateRepository,
        path: &str,
        branch: Option<&str>,
    ) -> Result<RemoteContent, RemoteError> {
        let url = self.contents_url(repo, path, branch)?;
        debug!(repository = %repo, path, "fetching file");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let file: ContentResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("expected a file: {e}")))?;

        let content = Self::decode_content(&file)?;

        Ok(RemoteContent {
            path: file.path,
            token: IntegrityToken::new(file.sha),
            content,
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
        let known_sha = opts
            .file
            .as_ref()
            .and_then(|f| f.token.as_ref())
            .map(IntegrityToken::as_str);

        let body = WriteRequest {
            message,
            content: Self::encode_content(content),
            branch: opts.branch.as_deref(),
            sha: known_sha,
        };

        debug!(repository = %repo, path, "creating file");
        let response = self.put(repo, path, &body).await?;

        if response.status().is_success() {
            return Ok(CreateOutcome::Created(Self::saved_file(response).await?));
        }

        match error_for(response).await {
            RemoteError::Conflict(_) => Ok(CreateOutcome::Conflict),
            fatal @ (RemoteError::NotFound(_) | RemoteError::Unauthorized(_)) => {
                Ok(CreateOutcome::Fatal(fatal))
            }
            other => Err(other),
        }
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
        let body = WriteRequest {
            message,
            content: Self::encode_content(content),
            branch: opts.branch.as_deref(),
            sha: Some(token.as_str()),
        };

        debug!(repository = %repo, path, sha = %token, "updating file");
        let response = self.put(repo, path, &body).await?;

        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        Self::saved_file(response).await
    }
}
