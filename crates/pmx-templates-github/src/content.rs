use serde::{Deserialize, Serialize};

/// A file or directory entry from GitHub's Contents API.
/// `GET /repos/{owner}/{repo}/contents/{path}`
///
/// Directory listings return an array of these without `content`; single
/// files carry base64 `content`.
#[derive(Debug, Deserialize)]
pub struct ContentResponse {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub html_url: Option<String>,
    pub content: Option<String>,
    pub encoding: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub struct WriteRequest<'a> {
    pub message: &'a str,
    /// Base64-encoded file content.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<&'a str>,
    /// Blob sha of the file being replaced. Required for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Response to a successful create or update.
#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub content: WrittenFile,
}

#[derive(Debug, Deserialize)]
pub struct WrittenFile {
    pub path: String,
    pub sha: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
