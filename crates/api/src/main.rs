use std::sync::Arc;

use anyhow::Context;

use reportdesk_api::app::{build_router, services::AppServices};
use reportdesk_api::bootstrap;
use reportdesk_infra::config::AppConfig;
use reportdesk_observability::LogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reportdesk_observability::init(&LogConfig::from_env());

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(AppServices::from_config(&config).await?);

    if let Some(admin) = &config.bootstrap.admin {
        bootstrap::ensure_admin(&services, admin).await?;
    }

    let app = build_router(services);
    let listener = tokio::net::TcpListener::bind(config.http.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http.addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
