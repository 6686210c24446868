//! Web server implementation
//!
//! Provides the main server struct and configuration.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::pipeline::{ImageProcessor, PUBLIC_ROUTE};

use super::routes::{api_routes, AppState};
use super::shutdown::shutdown_signal;
use super::{DEFAULT_BIND, DEFAULT_PORT, DEFAULT_UPLOAD_LIMIT};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Address to bind to
    pub bind: String,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum upload size in bytes
    pub upload_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            workers: num_cpus::get(),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with the given port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create a new server config with the given bind address
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Create a new server config with the given upload limit
    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

/// Web server instance
pub struct WebServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server with default configuration
    pub fn new(processor: Arc<ImageProcessor>) -> Self {
        Self {
            config: ServerConfig::default(),
            state: Arc::new(AppState::new(processor)),
        }
    }

    /// Create a new web server with the given configuration
    pub fn with_config(config: ServerConfig, processor: Arc<ImageProcessor>) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(processor)),
        }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router.
    ///
    /// Public so integration tests and embedders can drive the API
    /// without binding a socket.
    pub fn build_router(&self) -> Router {
        let output_dir = self.state.processor.store().dir().to_path_buf();

        Router::new()
            .merge(api_routes())
            .nest_service(PUBLIC_ROUTE, ServeDir::new(output_dir))
            .layer(CorsLayer::permissive())
            // axum caps multipart bodies at 2 MB on its own; lift that to
            // the configured limit and let RequestBodyLimitLayer enforce it
            .layer(DefaultBodyLimit::max(self.config.upload_limit))
            .layer(RequestBodyLimitLayer::new(self.config.upload_limit))
            .with_state(self.state.clone())
    }

    /// Run the server until SIGINT/SIGTERM
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // The output directory must exist before ServeDir and the first save
        self.state.processor.store().ensure_dir()?;

        let addr = self.config.socket_addr()?;
        let router = self.build_router();

        println!("Starting server on http://{}", addr);
        println!("API endpoints:");
        println!("  POST /remove-background   - Upload an image, receive the cutout");
        println!("  GET  /health              - Health check");
        println!("  GET  /stats               - Server statistics");
        println!("  GET  {}/<name> - Processed images", PUBLIC_ROUTE);

        tracing::info!(%addr, backend = self.state.processor.backend().name(), "server listening");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}
