//! Graceful shutdown for the web server
//!
//! Waits for SIGINT (Ctrl+C) or SIGTERM and resolves, at which point
//! axum stops accepting connections and drains in-flight uploads.

/// Resolves when the process receives a termination signal.
///
/// Handles Ctrl+C on all platforms and SIGTERM on Unix, so the server
/// stops cleanly under both interactive use and process managers
/// (systemd, `docker stop`).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to setup SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}
