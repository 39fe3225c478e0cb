//! Entity detail CLI
//!
//! Usage:
//!   cargo run --features cli --bin entity_detail -- show <guid>
//!   cargo run --features cli --bin entity_detail -- attributes hive_table --once-per-type
//!   cargo run --features cli --bin entity_detail -- tag add <guid> PII
//!   cargo run --features cli --bin entity_detail -- tag add <guid> Catalog.Finance.Revenue
//!   cargo run --features cli --bin entity_detail -- tag remove <guid> Finance.Revenue
//!
//! Connection settings come from ATLAS_URL / ATLAS_USER / ATLAS_PASSWORD
//! (a `.env` file is loaded first). `--demo` runs against a seeded in-memory
//! catalog instead.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use entity_detail::catalog::{CatalogTypeService, EntityService, HttpCatalogClient, InMemoryCatalog};
use entity_detail::config::{CatalogConfig, ResolverOptions};
use entity_detail::detail::{Assignment, EntityDetailPage, Route};
use entity_detail::resolver::AttributeResolver;

#[derive(Parser, Debug)]
#[command(name = "entity_detail")]
#[command(about = "Inspect catalog entities and their inherited attributes")]
struct Args {
    /// YAML config file (overrides environment)
    #[arg(long, short = 'c', env = "ATLAS_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Use the built-in demo catalog instead of a live server
    #[arg(long)]
    demo: bool,

    /// Fetch each super-type once even when reachable on several paths
    #[arg(long)]
    once_per_type: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the detail page model for an entity
    Show { guid: String },
    /// Resolve the flattened attribute definitions of a type
    Attributes { type_name: String },
    /// Add or remove tags and terms (dotted names are terms)
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
}

#[derive(Subcommand, Debug)]
enum TagAction {
    Add { guid: String, name: String },
    Remove { guid: String, name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CatalogConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CatalogConfig::from_env().context("reading catalog config from environment")?,
    };
    let mut options = config.resolver;
    if args.once_per_type {
        options = options.once_per_type();
    }

    if args.demo {
        let catalog = Arc::new(InMemoryCatalog::demo().await);
        run(args.command, catalog, options).await
    } else {
        let client = Arc::new(HttpCatalogClient::new(&config).context("creating catalog client")?);
        run(args.command, client, options).await
    }
}

async fn run<C>(command: Command, client: Arc<C>, options: ResolverOptions) -> Result<()>
where
    C: CatalogTypeService + EntityService + 'static,
{
    match command {
        Command::Show { guid } => {
            let page = EntityDetailPage::with_options(client, guid, options);
            let model = page.load().await?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
        Command::Attributes { type_name } => {
            let resolver = AttributeResolver::with_options(client, options);
            match resolver.resolve(Some(type_name.as_str())).await {
                Some(resolved) => println!("{}", serde_json::to_string_pretty(&resolved)?),
                None => bail!("type name is empty"),
            }
        }
        Command::Tag { action } => match action {
            TagAction::Add { guid, name } => {
                let page = EntityDetailPage::with_options(client, guid, options);
                let model = page.load().await?;
                let model = if Assignment::classify(&name).is_term() {
                    page.add_term(&model, &name).await?
                } else {
                    page.add_tag(&model, &name).await?
                };
                print_assignments(&model);
            }
            TagAction::Remove { guid, name } => {
                let page = EntityDetailPage::with_options(client, guid, options);
                let model = page.load().await?;
                let assignment = model
                    .assignment(&name)
                    .cloned()
                    .with_context(|| format!("{} is not assigned to {}", name, model.guid))?;
                let model = page.remove_assignment(&model, &assignment).await?;
                print_assignments(&model);
            }
        },
    }
    Ok(())
}

fn print_assignments(model: &entity_detail::DetailPageModel) {
    println!("{}", model.title);
    for a in model.tags.iter().chain(model.terms.iter()) {
        let link = Route::for_assignment(a).to_url().unwrap_or_default();
        println!("  {:<5} {:<40} {}", a.kind, a.full_name, link);
    }
}
