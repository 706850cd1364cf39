use crate::builder::PMX_EXTENSION;
use crate::remote::{RemoteFileRef, WriteOptions};
use crate::repository::TemplateRepository;
use crate::template::Template;

/// Where and how to save a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDestination {
    pub repository: TemplateRepository,
    /// File name without extension. Defaults to the template's name.
    pub file_name: Option<String>,
    /// Prepended verbatim to the file name, so directories need their
    /// trailing `/`. Defaults to the repository root.
    pub path_prefix: Option<String>,
    pub branch: Option<String>,
    pub file: Option<RemoteFileRef>,
    pub commit_message: Option<String>,
}

impl SaveDestination {
    pub fn new(repository: TemplateRepository) -> Self {
        Self {
            repository,
            file_name: None,
            path_prefix: None,
            branch: None,
            file: None,
            commit_message: None,
        }
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn known_file(mut self, file: RemoteFileRef) -> Self {
        self.file = Some(file);
        self
    }

    pub fn commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }

    /// Apply defaults against the template being saved.
    pub fn resolve(&self, template: &Template) -> ResolvedDestination {
        let file_name = self
            .file_name
            .clone()
            .unwrap_or_else(|| template.name.clone());
        let prefix = self.path_prefix.as_deref().unwrap_or("");
        let path = format!("{prefix}{file_name}{PMX_EXTENSION}");
        let message = self
            .commit_message
            .clone()
            .unwrap_or_else(|| default_commit_message(&file_name));

        ResolvedDestination {
            path,
            message,
            create_options: WriteOptions {
                branch: self.branch.clone(),
                file: self.file.clone(),
            },
            update_options: WriteOptions::on_branch(self.branch.clone()),
        }
    }
}

/// A destination with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    pub path: String,
    pub message: String,
    pub create_options: WriteOptions,
    /// The known file reference is only offered to create; updates always
    /// use a freshly fetched token.
    pub update_options: WriteOptions,
}

pub fn default_commit_message(file_name: &str) -> String {
    format!("Saved a Panamax template {file_name}{PMX_EXTENSION}")
}
