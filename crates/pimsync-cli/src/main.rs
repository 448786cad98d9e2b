use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod export;
mod sync;

#[derive(Debug, Parser)]
#[command(name = "pimsync")]
#[command(about = "PIM to Shopify and legacy-invoice product sync")]
struct Cli {
    /// Debug-level logging, including per-field decisions (price selection,
    /// image lookup).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Push products from the PIM to Shopify.
    Sync {
        /// Part prefix to sync (exact match). All products when omitted.
        #[arg(long)]
        prefix: Option<String>,

        /// Maximum number of products to process.
        #[arg(long, default_value_t = 5)]
        max: u32,

        /// Fetch and transform, but skip every Shopify write.
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the legacy-invoice TSV export.
    Export {
        /// Part prefix to export (exact match). All products when omitted.
        #[arg(long)]
        prefix: Option<String>,

        /// Maximum number of products to export.
        #[arg(long, default_value_t = 5)]
        max: u32,

        /// Render the TSV but skip the file write.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print raw PIM records as JSON, for schema discovery.
    Introspect {
        /// Number of records to fetch.
        #[arg(long, default_value_t = 5)]
        count: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = pimsync_core::load_app_config()?;

    match cli.command {
        Commands::Sync {
            prefix,
            max,
            dry_run,
        } => {
            sync::run_sync(
                &config,
                &sync::SyncArgs {
                    prefix,
                    max,
                    dry_run,
                },
            )
            .await
        }
        Commands::Export {
            prefix,
            max,
            dry_run,
        } => {
            export::run_export(
                &config,
                &export::ExportArgs {
                    prefix,
                    max,
                    dry_run,
                },
            )
            .await
        }
        Commands::Introspect { count } => introspect(&config, count).await,
    }
}

/// Fetches the first `count` records unfiltered and prints each raw node as
/// pretty JSON, so new source fields can be inspected before they are added
/// to the alias table.
async fn introspect(config: &pimsync_core::AppConfig, count: u32) -> anyhow::Result<()> {
    let client = sync::build_pimcore_client(config)?;
    let records = client.introspect(count).await?;

    tracing::info!(count = records.len(), "fetched raw records");
    for record in &records {
        println!("{}", serde_json::to_string_pretty(record)?);
    }
    Ok(())
}
