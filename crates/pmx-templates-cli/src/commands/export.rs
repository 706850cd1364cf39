use anyhow::{Context, Result};
use pmx_templates::{SaveDestination, TemplateExporter, TemplateRepository};
use pmx_templates_store::TemplateStore;

/// Options collected from the `export` subcommand.
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub name: String,
    pub repository: TemplateRepository,
    pub file_name: Option<String>,
    pub path: Option<String>,
    pub branch: Option<String>,
    pub message: Option<String>,
}

impl ExportArgs {
    fn destination(&self) -> SaveDestination {
        let mut destination = SaveDestination::new(self.repository.clone());
        destination.file_name = self.file_name.clone();
        destination.path_prefix = self.path.clone();
        destination.branch = self.branch.clone();
        destination.commit_message = self.message.clone();
        destination
    }
}

pub async fn run(
    store: &TemplateStore,
    exporter: &TemplateExporter,
    args: &ExportArgs,
) -> Result<()> {
    let template = store
        .find_by_name(&args.name)
        .with_context(|| format!("could not load template {}", args.name))?;

    let saved = exporter.save(&template, &args.destination()).await?;

    println!("Saved {} to {}", template.name, saved.html_url);
    Ok(())
}
