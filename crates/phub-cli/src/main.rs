use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phub_consolidate::PropertyHub;
use phub_storage::{DatasetDirectory, HubConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "phub-cli")]
#[command(about = "Property Hub listing consolidation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve,
    /// Print known property ids
    List,
    /// Print the consolidated response for a property
    Show { id: String },
    /// Print the parsed source documents for a property
    Raw { id: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phub=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

async fn hub(config: &HubConfig) -> Result<PropertyHub> {
    let store = DatasetDirectory::from_config(config)
        .await
        .with_context(|| format!("opening dataset at {}", config.data_root.display()))?;
    Ok(PropertyHub::new(Arc::new(store)))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = HubConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => phub_web::serve(config).await?,
        Commands::List => {
            for id in hub(&config).await?.property_ids().await? {
                println!("{id}");
            }
        }
        Commands::Show { id } => {
            let response = hub(&config)
                .await?
                .consolidated(&id)
                .await
                .with_context(|| format!("consolidating property {id}"))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Raw { id } => {
            let raw = hub(&config)
                .await?
                .raw(&id)
                .await
                .with_context(|| format!("loading raw documents for property {id}"))?;
            println!("{}", serde_json::to_string_pretty(&raw)?);
        }
    }

    Ok(())
}
