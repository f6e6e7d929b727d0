//! Topiko CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use topiko_core::PublishTarget;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "topiko")]
#[command(about = "Topiko site publishing CLI", long_about = None)]
struct Cli {
    /// Gateway base URL
    #[arg(long, env = "TOPIKO_GATEWAY_URL", default_value = "http://localhost:8787")]
    gateway_url: String,

    /// Shared secret sent in the x-topiko-secret header
    #[arg(long, env = "TOPIKO_SECRET", hide_env_values = true)]
    secret: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit a site configuration to its preview branch
    Preview {
        /// Site identifier
        site_id: String,
        /// Path to the site configuration JSON
        config: PathBuf,
    },
    /// Commit a site configuration to the default branch
    Publish {
        /// Site identifier
        site_id: String,
        /// Path to the site configuration JSON
        config: PathBuf,
        /// Commit message
        #[arg(long)]
        message: Option<String>,
    },
    /// Show the sections a site configuration renders
    Sections {
        /// Path to the site configuration JSON
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview { site_id, config } => {
            commands::publish::run(
                &cli.gateway_url,
                cli.secret.as_deref(),
                PublishTarget::Preview,
                &site_id,
                &config,
                None,
            )
            .await?;
        }
        Commands::Publish {
            site_id,
            config,
            message,
        } => {
            commands::publish::run(
                &cli.gateway_url,
                cli.secret.as_deref(),
                PublishTarget::Production,
                &site_id,
                &config,
                message,
            )
            .await?;
        }
        Commands::Sections { config } => {
            commands::sections::show(&config)?;
        }
    }

    Ok(())
}
