use std::sync::Arc;

use anyhow::Result;
use pmx_templates::{
    ImportReport, ParseOnlyBuilder, TemplateBuilder, TemplateImporter, TemplateRepository,
};
use pmx_templates_store::TemplateStore;

use super::format::print_feedback;

/// The store persists what it builds; a dry run only validates.
pub fn builder(store: Arc<TemplateStore>, dry_run: bool) -> Arc<dyn TemplateBuilder> {
    if dry_run {
        Arc::new(ParseOnlyBuilder)
    } else {
        store
    }
}

/// Import from one repository, or from every configured repository when
/// none is given.
pub async fn run(
    importer: &TemplateImporter,
    repository: Option<&TemplateRepository>,
    dry_run: bool,
) -> Result<()> {
    let report = match repository {
        Some(repo) => {
            println!("Importing templates from {repo}...");
            importer.import_from(repo).await?
        }
        None => {
            println!("Importing templates from all configured repositories...");
            importer.import_from_all_known_repositories().await
        }
    };

    print_feedback(&report.feedback);
    check(&report)?;

    let verb = if dry_run { "Validated" } else { "Imported" };
    println!(
        "{verb} {} templates ({} skipped).",
        report.imported, report.skipped
    );

    Ok(())
}

/// A batch where no repository could even be listed is a failure.
fn check(report: &ImportReport) -> Result<()> {
    let failed = report.feedback.iter().filter(|f| f.is_error()).count();
    if report.repositories == 0 && failed > 0 {
        anyhow::bail!("all {failed} repositories failed to import");
    }
    Ok(())
}
