use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use doc_summarizer::{build_state, config::Config, routes::create_router, utils::init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);
    info!(limits = ?config.limits, upload_dir = %config.storage.upload_dir.display(), "Upload limits");

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        warn!(
            missing = %missing.join(", "),
            "Required credentials are not set; summarize requests will fail until they are"
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let app = create_router(build_state(config));

    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
