use std::fmt;
use std::str::FromStr;

/// A GitHub repository that holds `.pmx` template files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateRepository {
    pub owner: String,
    pub name: String,
    /// Branch to read from. `None` uses the repository's default branch.
    pub branch: Option<String>,
    /// Directory to list. `None` lists the repository root.
    pub directory: Option<String>,
}

impl TemplateRepository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: None,
            directory: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// The `owner/name` form used by the GitHub API and in log output.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for TemplateRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository {0:?}: expected owner/name")]
pub struct ParseRepositoryError(String);

impl FromStr for TemplateRepository {
    type Err = ParseRepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ParseRepositoryError(s.to_owned())),
        }
    }
}

/// The set of repositories templates are imported from.
pub trait RepositoryRegistry: Send + Sync {
    fn repositories(&self) -> Vec<TemplateRepository>;
}

impl RepositoryRegistry for Vec<TemplateRepository> {
    fn repositories(&self) -> Vec<TemplateRepository> {
        self.clone()
    }
}
