use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{error, info, warn};

#[derive(Default)]
struct Tallies {
    endpoints: BTreeMap<String, u64>,
    statuses: BTreeMap<u16, u64>,
}

/// Server events on top of the `log` facade, plus request metrics.
///
/// Events are dropped when logging is disabled; metrics are only collected
/// when monitoring is enabled.
pub struct ServerLogger {
    enable_logging: bool,
    enable_monitoring: bool,
    started_at: Instant,
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_millis: AtomicU64,
    tallies: Mutex<Tallies>,
}

impl ServerLogger {
    pub fn new(enable_logging: bool, enable_monitoring: bool) -> Self {
        ServerLogger {
            enable_logging,
            enable_monitoring,
            started_at: Instant::now(),
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_response_millis: AtomicU64::new(0),
            tallies: Mutex::new(Tallies::default()),
        }
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.enable_monitoring
    }

    pub fn log_server_start(&self, addr: SocketAddr) {
        if self.enable_logging {
            info!("HTTP server started on port {} ({})", addr.port(), addr);
        }
    }

    pub fn log_server_stop(&self) {
        if self.enable_logging {
            info!("HTTP server stopped");
        }
    }

    pub fn log_connection(&self, peer: SocketAddr) {
        if self.enable_logging {
            info!("New connection from {}:{}", peer.ip(), peer.port());
        }
    }

    /// Logs a completed request and, with monitoring on, counts it.
    pub fn log_request(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if self.enable_logging {
            info!("{} {} -> {} ({}ms)", method, path, status, millis);
        }
        if self.enable_monitoring {
            self.update_metrics(method, path, status, millis);
        }
    }

    pub fn log_error(&self, message: &str) {
        if self.enable_logging {
            error!("{}", message);
        }
    }

    pub fn log_warning(&self, message: &str) {
        if self.enable_logging {
            warn!("{}", message);
        }
    }

    pub fn log_info(&self, message: &str) {
        if self.enable_logging {
            info!("{}", message);
        }
    }

    fn tallies(&self) -> MutexGuard<'_, Tallies> {
        self.tallies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_metrics(&self, method: &str, path: &str, status: u16, millis: u64) {
        // tallies first so a reader that sees the new total also sees them
        {
            let mut tallies = self.tallies();
            *tallies.endpoints.entry(format!("{method} {path}")).or_insert(0) += 1;
            *tallies.statuses.entry(status).or_insert(0) += 1;
        }
        self.total_response_millis.fetch_add(millis, Ordering::Relaxed);
        if (200..400).contains(&status) {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
        self.total_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::SeqCst)
    }

    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed)
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }

    pub fn endpoint_count(&self, method: &str, path: &str) -> u64 {
        self.tallies()
            .endpoints
            .get(&format!("{method} {path}"))
            .copied()
            .unwrap_or(0)
    }

    pub fn status_count(&self, status: u16) -> u64 {
        self.tallies().statuses.get(&status).copied().unwrap_or(0)
    }

    /// Text served by `GET /metrics`.
    pub fn render_metrics(&self) -> String {
        if !self.enable_monitoring {
            return String::from("Monitoring is disabled");
        }

        let total = self.total_requests();
        let successful = self.successful_requests();
        let failed = self.failed_requests();
        let (success_rate, avg_millis) = if total > 0 {
            (
                successful as f64 * 100.0 / total as f64,
                self.total_response_millis.load(Ordering::Relaxed) / total,
            )
        } else {
            (0.0, 0)
        };

        let mut text = String::new();
        let _ = writeln!(text, "SERVER METRICS");
        let _ = writeln!(text, "================");
        let _ = writeln!(text, "Total Requests: {total}");
        let _ = writeln!(text, "Successful: {successful}");
        let _ = writeln!(text, "Failed: {failed}");
        let _ = writeln!(text, "Success Rate: {success_rate:.2}%");
        let _ = writeln!(text, "Average Response Time: {avg_millis}ms");
        let _ = writeln!(text, "Uptime: {}s", self.started_at.elapsed().as_secs());

        let tallies = self.tallies();
        if !tallies.endpoints.is_empty() {
            let _ = writeln!(text, "\nRequests by Endpoint:");
            for (endpoint, count) in &tallies.endpoints {
                let _ = writeln!(text, "  {endpoint}: {count}");
            }
        }
        if !tallies.statuses.is_empty() {
            let _ = writeln!(text, "\nRequests by Status:");
            for (status, count) in &tallies.statuses {
                let _ = writeln!(text, "  {status}: {count}");
            }
        }
        text
    }

    pub fn reset(&self) {
        {
            let mut tallies = self.tallies();
            tallies.endpoints.clear();
            tallies.statuses.clear();
        }
        self.total_requests.store(0, Ordering::SeqCst);
        self.successful_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        self.total_response_millis.store(0, Ordering::Relaxed);
        self.log_info("Metrics reset");
    }
}
