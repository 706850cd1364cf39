mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pmx_templates::{ContentClient, TemplateExporter, TemplateImporter, TemplateRepository};
use pmx_templates_github::GitHubContents;
use pmx_templates_store::TemplateStore;
use tracing_subscriber::EnvFilter;

use crate::commands::export::ExportArgs;

#[derive(Parser)]
#[command(name = "pmx-templates")]
#[command(about = "Import and publish Panamax templates stored in GitHub repositories")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import .pmx templates into the local store
    Import {
        /// Import a single repository (owner/name) instead of every configured one
        #[arg(long)]
        repo: Option<TemplateRepository>,
        /// Branch to read when --repo is given
        #[arg(long, requires = "repo")]
        branch: Option<String>,
        /// Directory to list when --repo is given
        #[arg(long, requires = "repo")]
        directory: Option<String>,
        /// Validate templates without storing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Save a stored template to a repository as a .pmx file
    Export {
        /// Name of the stored template
        name: String,
        /// Destination repository (owner/name)
        #[arg(long)]
        repo: TemplateRepository,
        /// File name without extension (defaults to the template name)
        #[arg(long)]
        file_name: Option<String>,
        /// Prefix prepended to the file name, e.g. `templates/`
        #[arg(long)]
        path: Option<String>,
        /// Branch to commit to (defaults to the repository default)
        #[arg(long)]
        branch: Option<String>,
        /// Commit message
        #[arg(long)]
        message: Option<String>,
    },
    /// List templates in the local store
    List,
    /// Show a stored template
    Show {
        name: String,
        /// Print the .pmx file instead of a summary
        #[arg(long)]
        raw: bool,
    },
    /// Remove a template from the local store
    Remove { name: String },
    /// Show the configured template repositories
    Repos,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("PMX_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine data directory")?;
    let dir = base.join("pmx-templates");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory: {}", dir.display()))?;
    Ok(dir)
}

fn open_store() -> Result<TemplateStore> {
    let path = data_dir()?.join("templates.db");
    TemplateStore::open(&path)
        .with_context(|| format!("failed to open template store at {}", path.display()))
}

fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN").ok()
}

fn github_client() -> Arc<dyn ContentClient> {
    Arc::new(GitHubContents::new(github_token(), None))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Import {
            repo,
            branch,
            directory,
            dry_run,
        } => {
            let store = Arc::new(open_store()?);
            let registry = Arc::new(config::load_config().repositories());
            let importer = TemplateImporter::new(
                github_client(),
                commands::import::builder(store, dry_run),
                registry,
            );

            let repo = repo.map(|r| TemplateRepository {
                branch,
                directory,
                ..r
            });
            commands::import::run(&importer, repo.as_ref(), dry_run).await
        }
        Command::Export {
            name,
            repo,
            file_name,
            path,
            branch,
            message,
        } => {
            let store = open_store()?;
            let exporter = TemplateExporter::new(github_client());
            let args = ExportArgs {
                name,
                repository: repo,
                file_name,
                path,
                branch,
                message,
            };
            commands::export::run(&store, &exporter, &args).await
        }
        Command::List => {
            let store = open_store()?;
            commands::list::run(&store)
        }
        Command::Show { name, raw } => {
            let store = open_store()?;
            commands::show::run(&store, &name, raw)
        }
        Command::Remove { name } => {
            let store = open_store()?;
            commands::remove::run(&store, &name)
        }
        Command::Repos => {
            commands::repos::run(&config::load_config().repositories());
            Ok(())
        }
    }
}
