use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use coinshop_api::app::{build_app, build_services};
use coinshop_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    coinshop_observability::init_with(config.log_format);

    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = Arc::new(build_services(&config).await?);
    let app = build_app(services);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
