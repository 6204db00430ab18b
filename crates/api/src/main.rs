use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;

use notekeeper_api::{app, server};
use notekeeper_infra::config::AppConfig;

/// Note-taking API server.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "./etc/config.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = AppConfig::load(&cli.config)
        .with_context(|| format!("load configuration from {}", cli.config.display()))?;

    notekeeper_observability::init(&cfg.logger.level);

    let services = Arc::new(app::build_services(&cfg).await?);
    let router = app::build_app(services, cfg.server.request_timeout());

    let address = cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("bind {address}"))?;

    tracing::info!(address = %listener.local_addr()?, "listening");

    server::serve(
        listener,
        router,
        cfg.server.shutdown_timeout(),
        server::shutdown_signal(),
    )
    .await
    .context("serve http")?;

    tracing::info!("server stopped");
    Ok(())
}
