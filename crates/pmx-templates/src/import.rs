use std::sync::Arc;

use tracing::{debug, warn};

use crate::builder::{PMX_EXTENSION, TemplateBuilder};
use crate::feedback::Feedback;
use crate::remote::{ContentClient, EntryKind, RemoteError};
use crate::repository::{RepositoryRegistry, TemplateRepository};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to list templates in {repository}: {source}")]
    List {
        repository: String,
        #[source]
        source: RemoteError,
    },
}

/// Summary of an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Templates the builder accepted.
    pub imported: u64,
    /// `.pmx` files that could not be read or built.
    pub skipped: u64,
    /// Repositories that were walked successfully.
    pub repositories: u64,
    pub feedback: Vec<Feedback>,
}

impl ImportReport {
    fn merge(&mut self, other: ImportReport) {
        self.imported += other.imported;
        self.skipped += other.skipped;
        self.repositories += other.repositories;
        self.feedback.extend(other.feedback);
    }
}

/// Pulls `.pmx` files out of repositories and hands them to a builder.
///
/// One bad file never stops the run: read and build failures are recorded
/// in the report and the next file is processed.
pub struct TemplateImporter {
    client: Arc<dyn ContentClient>,
    builder: Arc<dyn TemplateBuilder>,
    registry: Arc<dyn RepositoryRegistry>,
}

impl TemplateImporter {
    pub fn new(
        client: Arc<dyn ContentClient>,
        builder: Arc<dyn TemplateBuilder>,
        registry: Arc<dyn RepositoryRegistry>,
    ) -> Self {
        Self {
            client,
            builder,
            registry,
        }
    }

    /// Import every `.pmx` file in one repository.
    ///
    /// Fails only when the repository cannot be listed.
    pub async fn import_from(
        &self,
        repository: &TemplateRepository,
    ) -> Result<ImportReport, ImportError> {
        let entries = self
            .client
            .list_files(repository)
            .await
            .map_err(|source| ImportError::List {
                repository: repository.full_name(),
                source,
            })?;

        let mut report = ImportReport {
            repositories: 1,
            ..ImportReport::default()
        };

        for entry in entries {
            if entry.kind != EntryKind::File || !entry.name.ends_with(PMX_EXTENSION) {
                continue;
            }

            let content = match self
                .client
                .get_content(repository, &entry.path, repository.branch.as_deref())
                .await
            {
                Ok(content) => content.content,
                Err(e) => {
                    warn!(repository = %repository, path = %entry.path, error = %e, "could not read template");
                    report.feedback.push(Feedback::warning(
                        repository,
                        format!("could not read {}: {e}", entry.path),
                    ));
                    report.skipped += 1;
                    continue;
                }
            };

            match self.builder.build(&content).await {
                Ok(template) => {
                    debug!(repository = %repository, path = %entry.path, template = %template.name, "imported template");
                    report.imported += 1;
                }
                Err(e) => {
                    warn!(repository = %repository, path = %entry.path, error = %e, "skipping template");
                    report.feedback.push(Feedback::warning(
                        repository,
                        format!("skipping {}: {e}", entry.path),
                    ));
                    report.skipped += 1;
                }
            }
        }

        report.feedback.push(Feedback::info(
            repository,
            format!(
                "imported {} templates ({} skipped)",
                report.imported, report.skipped
            ),
        ));

        Ok(report)
    }

    /// Import from every registered repository.
    ///
    /// A repository that cannot be listed is reported as an error and the
    /// run continues with the next one.
    pub async fn import_from_all_known_repositories(&self) -> ImportReport {
        let mut report = ImportReport::default();

        for repository in self.registry.repositories() {
            match self.import_from(&repository).await {
                Ok(single) => report.merge(single),
                Err(e) => {
                    warn!(repository = %repository, error = %e, "repository import failed");
                    report
                        .feedback
                        .push(Feedback::error(&repository, e.to_string()));
                }
            }
        }

        report
    }
}
