//! Robots Service entry point.

use robots_service::config::RobotsConfig;
use robots_service::services::init_metrics;
use robots_service::startup::Application;
use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Missing configuration must stop the process before anything is bound
    let config = RobotsConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        otlp_endpoint = ?config.otlp_endpoint,
        "Starting robots-service"
    );

    init_metrics();

    // Log configuration (the URI may carry credentials, so it is left out)
    tracing::info!(
        service_name = %config.service_name,
        http_port = %config.common.port,
        database = %config.mongodb.database,
        collection = %config.mongodb.collection,
        query_timeout = ?config.mongodb.query_timeout,
        "Configuration loaded"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    app.run_with_shutdown(shutdown_signal()).await.map_err(|e| {
        tracing::error!(error = %e, "Application error");
        std::io::Error::from(e)
    })?;

    tracing::info!("Service shutdown complete");
    Ok(())
}
