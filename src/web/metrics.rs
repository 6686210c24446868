//! Metrics collection for server monitoring
//!
//! Request counters and processing statistics exposed by `GET /stats`.
//! Counters are atomics so handlers can record without locking.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Request statistics
#[derive(Debug, Clone, Serialize)]
pub struct RequestStatistics {
    /// Total requests received
    pub total_requests: u64,
    /// Requests currently being processed
    pub active_requests: u64,
    /// Successfully completed requests
    pub completed: u64,
    /// Requests rejected as client errors (bad upload, bad SVG)
    pub client_errors: u64,
    /// Requests failed server-side (model, decode, save)
    pub server_errors: u64,
    /// Average processing time in seconds
    pub avg_processing_time: f64,
}

/// Output directory statistics
#[derive(Debug, Clone, Serialize)]
pub struct OutputStatistics {
    /// Images written since startup
    pub images_written: u64,
    /// Bytes written since startup
    pub bytes_written: u64,
}

/// Server information
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Server start time (ISO 8601)
    pub started_at: String,
}

/// Complete statistics response
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub server: ServerInfo,
    pub requests: RequestStatistics,
    pub outputs: OutputStatistics,
}

/// Metrics collector with atomic counters for thread-safe updates
pub struct MetricsCollector {
    /// Server start time
    started_at: Instant,
    /// ISO 8601 start time string
    started_at_str: String,
    /// Total requests received
    total_requests: AtomicU64,
    /// Requests currently in flight
    active_requests: AtomicU64,
    /// Completed requests
    completed: AtomicU64,
    /// Client-side failures
    client_errors: AtomicU64,
    /// Server-side failures
    server_errors: AtomicU64,
    /// Total processing time in milliseconds
    total_processing_ms: AtomicU64,
    /// Output images written
    images_written: AtomicU64,
    /// Output bytes written
    bytes_written: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            started_at_str: chrono::Utc::now().to_rfc3339(),
            total_requests: AtomicU64::new(0),
            active_requests: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            client_errors: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
            total_processing_ms: AtomicU64::new(0),
            images_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    /// Record a request entering the pipeline
    pub fn record_request_started(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.active_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful completion
    pub fn record_request_completed(&self, duration_ms: u64, output_bytes: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.active_requests.fetch_sub(1, Ordering::Relaxed);
        self.total_processing_ms.fetch_add(duration_ms, Ordering::Relaxed);
        self.images_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(output_bytes, Ordering::Relaxed);
    }

    /// Record a rejection caused by the client (bad upload, bad SVG)
    pub fn record_client_error(&self) {
        self.client_errors.fetch_add(1, Ordering::Relaxed);
        self.active_requests.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a server-side failure (model, decode, save)
    pub fn record_server_error(&self) {
        self.server_errors.fetch_add(1, Ordering::Relaxed);
        self.active_requests.fetch_sub(1, Ordering::Relaxed);
    }

    /// Get server uptime in seconds
    pub fn get_uptime(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Get request statistics
    pub fn get_request_statistics(&self) -> RequestStatistics {
        let completed = self.completed.load(Ordering::Relaxed);
        let total_ms = self.total_processing_ms.load(Ordering::Relaxed);

        let avg_time = if completed > 0 {
            (total_ms as f64 / completed as f64) / 1000.0
        } else {
            0.0
        };

        RequestStatistics {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            active_requests: self.active_requests.load(Ordering::Relaxed),
            completed,
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            avg_processing_time: avg_time,
        }
    }

    /// Get output statistics
    pub fn get_output_statistics(&self) -> OutputStatistics {
        OutputStatistics {
            images_written: self.images_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }

    /// Get server info
    pub fn get_server_info(&self) -> ServerInfo {
        ServerInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.get_uptime(),
            started_at: self.started_at_str.clone(),
        }
    }

    /// Assemble the full `/stats` payload
    pub fn snapshot(&self) -> StatsResponse {
        StatsResponse {
            server: self.get_server_info(),
            requests: self.get_request_statistics(),
            outputs: self.get_output_statistics(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // TC-METRICS-001: Metrics collector creation
    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new();
        assert_eq!(collector.total_requests.load(Ordering::Relaxed), 0);
        assert_eq!(collector.completed.load(Ordering::Relaxed), 0);
    }

    // TC-METRICS-002: Completion recording
    #[test]
    fn test_record_request_completed() {
        let collector = MetricsCollector::new();

        collector.record_request_started();
        assert_eq!(collector.active_requests.load(Ordering::Relaxed), 1);

        collector.record_request_completed(5000, 2048);

        let stats = collector.get_request_statistics();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active_requests, 0);
        assert_eq!(collector.get_output_statistics().images_written, 1);
        assert_eq!(collector.get_output_statistics().bytes_written, 2048);
    }

    // TC-METRICS-003: Error recording
    #[test]
    fn test_record_errors() {
        let collector = MetricsCollector::new();

        collector.record_request_started();
        collector.record_client_error();
        collector.record_request_started();
        collector.record_server_error();

        let stats = collector.get_request_statistics();
        assert_eq!(stats.client_errors, 1);
        assert_eq!(stats.server_errors, 1);
        assert_eq!(stats.active_requests, 0);
        // Failed requests write nothing
        assert_eq!(collector.get_output_statistics().images_written, 0);
    }

    // TC-METRICS-004: Average processing time calculation
    #[test]
    fn test_avg_processing_time() {
        let collector = MetricsCollector::new();

        collector.record_request_started();
        collector.record_request_completed(3000, 100); // 3 seconds

        collector.record_request_started();
        collector.record_request_completed(6000, 100); // 6 seconds

        collector.record_request_started();
        collector.record_request_completed(9000, 100); // 9 seconds

        let stats = collector.get_request_statistics();
        // Average: (3 + 6 + 9) / 3 = 6 seconds
        assert!((stats.avg_processing_time - 6.0).abs() < 0.01);
    }

    // TC-METRICS-005: Uptime calculation
    #[test]
    fn test_uptime() {
        let collector = MetricsCollector::new();
        assert!(collector.get_uptime() < 1);

        std::thread::sleep(std::time::Duration::from_millis(10));
        // Still less than 1 second
        assert!(collector.get_uptime() < 1);
    }

    // TC-METRICS-006: Concurrent access safety
    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let collector = Arc::new(MetricsCollector::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let c = Arc::clone(&collector);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    c.record_request_started();
                    c.record_request_completed(100, 10);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = collector.get_request_statistics();
        assert_eq!(stats.total_requests, 1000);
        assert_eq!(stats.completed, 1000);
        assert_eq!(collector.get_output_statistics().bytes_written, 10_000);
    }

    // TC-METRICS-007: Server info
    #[test]
    fn test_server_info() {
        let collector = MetricsCollector::new();
        let info = collector.get_server_info();

        assert!(!info.version.is_empty());
        assert!(!info.started_at.is_empty());
    }

    // TC-METRICS-008: Stats response serialization
    #[test]
    fn test_stats_response_serialize() {
        let collector = MetricsCollector::new();
        collector.record_request_started();
        collector.record_request_completed(1000, 512);

        let json = serde_json::to_string(&collector.snapshot()).unwrap();
        assert!(json.contains("\"total_requests\":1"));
        assert!(json.contains("\"images_written\":1"));
        assert!(json.contains("\"uptime_seconds\""));
    }

    // TC-METRICS-009: Default implementation
    #[test]
    fn test_default() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.total_requests.load(Ordering::Relaxed), 0);
    }
}
