//! Tally API server
//!
//! HTTP REST API over the dashboard workbook using Axum.
//! All workbook access is serialized through a single lock.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub dashboard: DashboardConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dashboard: DashboardConfig::default(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub dashboard: Dashboard,
    pub workbook_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            dashboard,
            workbook_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the router with all endpoints and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route("/api/v1/options", get(handlers::options))
        .route("/api/v1/matrix", get(handlers::matrix))
        .route("/api/v1/counts", get(handlers::counts))
        .route("/api/v1/sheets", get(handlers::sheets))
        .route("/api/v1/entries", post(handlers::record))
        .route("/api/v1/entries/:country", get(handlers::entries))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(&config.dashboard);
    dashboard.ensure_workbook()?;
    let state = Arc::new(AppState::new(dashboard));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Tally API Server starting on http://{}", addr);
    info!("   Workbook: {}", config.dashboard.workbook_path.display());
    info!("   Endpoints: /api/v1/matrix, /api/v1/counts, /api/v1/sheets, /api/v1/entries");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Tally API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
