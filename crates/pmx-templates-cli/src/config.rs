use std::path::PathBuf;

use pmx_templates::TemplateRepository;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

/// A repository templates are imported from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryEntry {
    pub owner: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub branch: Option<String>,
    pub directory: Option<String>,
}

impl RepositoryEntry {
    pub fn to_repository(&self) -> TemplateRepository {
        TemplateRepository {
            owner: self.owner.clone(),
            name: self.name.clone(),
            branch: self.branch.clone(),
            directory: self.directory.clone(),
        }
    }
}

impl AppConfig {
    /// Enabled repositories, in file order.
    pub fn repositories(&self) -> Vec<TemplateRepository> {
        self.repositories
            .iter()
            .filter(|entry| entry.enabled)
            .map(RepositoryEntry::to_repository)
            .collect()
    }
}

fn default_true() -> bool {
    true
}

/// Built-in registry of template repositories.
pub fn default_repositories() -> Vec<RepositoryEntry> {
    vec![RepositoryEntry {
        owner: "centurylinklabs".into(),
        name: "panamax-public-templates".into(),
        enabled: true,
        branch: None,
        directory: None,
    }]
}

/// Config file path: `~/.config/pmx-templates/repositories.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pmx-templates").join("repositories.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config, using defaults"
            ),
        }
    }

    AppConfig {
        repositories: default_repositories(),
    }
}
