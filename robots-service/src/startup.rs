//! Application startup and lifecycle management.

use crate::config::RobotsConfig;
use crate::handlers;
use crate::services::RobotsDb;
use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RobotsConfig,
    pub db: RobotsDb,
}

/// Routes every endpoint. Unmatched paths fall through to the greeting.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::hello))
        .route("/all-robots", any(handlers::all_robots))
        .route("/error", any(handlers::error_page))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .fallback(handlers::hello)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connects to MongoDB, then binds the listener. Nothing is bound if the
    /// connection check fails.
    pub async fn build(config: RobotsConfig) -> Result<Self, AppError> {
        let db = RobotsDb::connect(&config.mongodb).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;

        Self::build_with_db(config, db).await
    }

    /// Binds the listener around an already constructed database handle.
    pub async fn build_with_db(config: RobotsConfig, db: RobotsDb) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "Robots service listener bound");

        Ok(Self {
            port,
            listener,
            state: AppState { config, db },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &RobotsDb {
        &self.state.db
    }

    /// Serve until the process is killed.
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serve until `signal` resolves, drain in-flight requests, then close the
    /// database connection.
    pub async fn run_with_shutdown<F>(self, signal: F) -> Result<(), AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            port,
            listener,
            state,
        } = self;
        let shutdown_timeout = state.config.mongodb.shutdown_timeout;
        let db = state.db.clone();
        let router = build_router(state);

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            port,
            "Server is running"
        );

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            AppError::from(e)
        })?;

        tracing::info!("HTTP server stopped");

        db.disconnect(shutdown_timeout).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to disconnect from MongoDB");
            AppError::from(e)
        })
    }
}
