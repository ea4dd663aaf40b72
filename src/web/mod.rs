//! Web layer module
//!
//! The HTTP interface of the favicon proxy. Handlers stay thin and delegate
//! to the repository and resolver; everything they need is carried in one
//! shared [`AppState`].

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

use crate::{
    config::Config,
    database::{favicons::FaviconRepository, Database},
    resolver::FaviconResolver,
};

pub mod handlers;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub async fn new(
        config: Config,
        database: Database,
        repository: FaviconRepository,
        resolver: FaviconResolver,
    ) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        let app = Self::create_router(AppState {
            config,
            database,
            repository,
            resolver,
        });

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::favicon::serve_favicon))
            .route("/healthz", get(handlers::health::healthz))
            .route("/domains", get(handlers::domains::list_domains))
            .route("/favicon.ico", get(handlers::static_assets::serve_favicon_asset))
            .route("/robots.txt", get(handlers::static_assets::serve_robots_txt))
            .route("/static/*path", get(handlers::static_assets::serve_static_asset))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start the web server, shutting down cleanly on SIGINT/SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, shutting down gracefully");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, shutting down gracefully");
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub database: Database,
    pub repository: FaviconRepository,
    pub resolver: FaviconResolver,
}

impl AppState {
    /// The max-age advertised on icon responses. With no TTL configured the
    /// cache rows never expire, but clients still get a bounded lifetime.
    pub fn cache_max_age_secs(&self) -> u64 {
        self.config
            .cache
            .ttl
            .map(|ttl| ttl.as_secs())
            .unwrap_or(86400)
    }
}
