//! Topiko publishing gateway server.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use topiko_api::{AppState, routes};
use topiko_config::GatewayConfig;
use topiko_core::PublishTarget;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "topiko-gateway")]
#[command(about = "Commits Topiko site configurations to GitHub", long_about = None)]
struct Args {
    /// Endpoint this instance serves: "preview" or "publish"
    #[arg(long, env = "TOPIKO_GATEWAY")]
    gateway: PublishTarget,

    /// Path to a KDL configuration file
    #[arg(long, env = "TOPIKO_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, env = "TOPIKO_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = GatewayConfig::load(args.config.as_deref())?;
    info!(
        gateway = args.gateway.as_str(),
        owner = %config.github.owner,
        repo = %config.github.repo,
        default_branch = %config.branches.default,
        "Loaded configuration"
    );

    let state = AppState::from_config(args.gateway, &config);

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    info!("Starting {} gateway on {}", args.gateway.as_str(), config.listen);

    let listener = TcpListener::bind(config.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
