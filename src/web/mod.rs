//! Web server module for cutout
//!
//! Provides the HTTP API for background removal.
//!
//! # Features
//!
//! - Image upload and background removal via REST API
//! - Processed images served as static files
//! - Health and statistics endpoints
//!
//! # Usage
//!
//! Enable the `web` feature and use the `serve` subcommand:
//!
//! ```bash
//! cargo build --features web
//! cutout serve --port 8080
//! ```

mod metrics;
mod routes;
mod server;
mod shutdown;

pub use metrics::{
    MetricsCollector, OutputStatistics, RequestStatistics, ServerInfo, StatsResponse,
};
pub use routes::{api_routes, AppError, AppState, HealthResponse, ModelStatus, RemoveResponse};
pub use server::{ServerConfig, WebServer};
pub use shutdown::shutdown_signal;

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default upload limit in bytes (32 MB)
pub const DEFAULT_UPLOAD_LIMIT: usize = 32 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    // TC-WEB-001: Server config defaults
    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_PORT, 8080);
        assert_eq!(DEFAULT_BIND, "127.0.0.1");
        assert_eq!(DEFAULT_UPLOAD_LIMIT, 32 * 1024 * 1024);
    }
}
