use anyhow::Context;
use local_deployment::{DeploymentConfig, LocalDeployment};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();
    utils::logging::init_tracing();

    let config = DeploymentConfig::from_env().context("loading configuration")?;
    let deployment = LocalDeployment::new(&config)
        .await
        .context("starting deployment")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Breeding compatibility server listening");

    axum::serve(listener, server::app(deployment))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
