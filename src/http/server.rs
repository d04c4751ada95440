//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router from the static route table
//! - Wire up middleware (tracing, request ID)
//! - Serve the landing page and health endpoint
//! - Bind the server to a listener with graceful shutdown
//!
//! # Design Decisions
//! - One shared `reqwest::Client` per process; redirects disabled so the
//!   upstream's redirect answers pass through untouched
//! - No inbound request timeout layer: an early client disconnect must
//!   not cancel an in-flight outbound call

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{services::ServeFile, trace::TraceLayer};

use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::http::request::RequestIdLayer;
use crate::routes::{handlers, ROUTE_TABLE};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub client: reqwest::Client,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let state = AppState {
            config: Arc::new(config.clone()),
            client,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with every proxied route plus the plumbing
    /// endpoints and middleware layers.
    fn build_router(state: AppState) -> Router {
        let index_page = Path::new(&state.config.listener.static_dir).join("index.html");

        let mut router = Router::new();
        for entry in ROUTE_TABLE {
            router = router.route(entry.inbound, handlers::proxied(entry));
        }

        router
            .route("/api/health", get(handlers::health))
            .route_service("/", ServeFile::new(index_page))
            .fallback(handlers::catch_all)
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
