//! Main server implementation for the Coffee Shop API

use crate::{
    api::{self, auth::JwksVerifier, auth::TokenVerifier},
    config::Config,
    error::{ApiError, Result},
    storage::Database,
};
use axum::Router;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Main server structure
pub struct Server {
    config: Arc<Config>,
    app: Router,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Drink storage
    pub db: Database,

    /// Bearer token verification
    pub verifier: Arc<dyn TokenVerifier>,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing Coffee Shop API server");

        let config = Arc::new(config);

        let db = Database::connect(&config.database).await?;
        if config.database.reset_on_startup {
            db.drop_and_create_all().await?;
        }

        let verifier = JwksVerifier::new(&config.auth)?;
        info!(
            "Validating tokens for audience {} against {}",
            config.auth.audience,
            verifier.jwks_url()
        );

        let state = AppState {
            config: config.clone(),
            db,
            verifier: Arc::new(verifier),
        };

        let app = Self::build_router(state);

        Ok(Self { config, app })
    }

    /// Build the application router with all routes and middleware
    pub fn build_router(state: AppState) -> Router {
        let router = Router::new()
            .merge(api::routes())
            .merge(api::docs_routes())
            .fallback(route_not_found);

        api::middleware::apply_middleware(router, &state.config).with_state(state)
    }

    /// Run the server until shutdown signal
    pub async fn run(self) -> Result<()> {
        let addr = self.config.server.bind_address;

        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to bind to address {addr}: {e}"),
            })?;

        info!("Coffee Shop API listening on {}", addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Server error: {e}"),
            })?;

        info!("HTTP server stopped gracefully");
        Ok(())
    }
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("route")
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down");
        },
    }
}
