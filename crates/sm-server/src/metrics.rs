//! Request metrics
//!
//! Prometheus text and JSON views over a handful of atomic counters.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use tracing::{debug, info_span, Instrument};

/// Metrics collector
pub struct Metrics {
    pub http_requests_total: AtomicU64,
    pub http_requests_2xx: AtomicU64,
    pub http_requests_4xx: AtomicU64,
    pub http_requests_5xx: AtomicU64,
    pub http_request_duration_ms_total: AtomicU64,
    pub active_requests: AtomicU64,
    /// Successful `POST /api/v1/orders/progress` calls
    pub progress_calculations: AtomicU64,
    /// Successful `POST /api/v1/orders/escrow` calls
    pub escrow_calculations: AtomicU64,
    /// Requests rejected with 400 or 422
    pub rejected_requests: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_requests_2xx: AtomicU64::new(0),
            http_requests_4xx: AtomicU64::new(0),
            http_requests_5xx: AtomicU64::new(0),
            http_request_duration_ms_total: AtomicU64::new(0),
            active_requests: AtomicU64::new(0),
            progress_calculations: AtomicU64::new(0),
            escrow_calculations: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished HTTP request
    pub fn record_request(&self, path: &str, status: StatusCode, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_ms_total
            .fetch_add(duration_ms, Ordering::Relaxed);

        let counter = match status.as_u16() {
            200..=299 => &self.http_requests_2xx,
            400..=499 => &self.http_requests_4xx,
            500..=599 => &self.http_requests_5xx,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            self.rejected_requests.fetch_add(1, Ordering::Relaxed);
        }

        if status.is_success() {
            match path {
                "/api/v1/orders/progress" => {
                    self.progress_calculations.fetch_add(1, Ordering::Relaxed);
                }
                "/api/v1/orders/escrow" => {
                    self.escrow_calculations.fetch_add(1, Ordering::Relaxed);
                }
                _ => {}
            }
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut out = String::new();
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);

        write_metric(
            &mut out,
            "http_requests_total",
            "counter",
            "Total number of HTTP requests",
            &[("", load(&self.http_requests_total))],
        );
        write_metric(
            &mut out,
            "http_requests_by_status",
            "counter",
            "HTTP requests by status code range",
            &[
                ("status=\"2xx\"", load(&self.http_requests_2xx)),
                ("status=\"4xx\"", load(&self.http_requests_4xx)),
                ("status=\"5xx\"", load(&self.http_requests_5xx)),
            ],
        );
        write_metric(
            &mut out,
            "http_request_duration_ms_total",
            "counter",
            "Total HTTP request duration in milliseconds",
            &[("", load(&self.http_request_duration_ms_total))],
        );
        write_metric(
            &mut out,
            "http_requests_active",
            "gauge",
            "Requests currently being handled",
            &[("", load(&self.active_requests))],
        );
        write_metric(
            &mut out,
            "sew4mi_calculations_total",
            "counter",
            "Successful order calculations by kind",
            &[
                ("kind=\"progress\"", load(&self.progress_calculations)),
                ("kind=\"escrow\"", load(&self.escrow_calculations)),
            ],
        );
        write_metric(
            &mut out,
            "sew4mi_rejected_requests_total",
            "counter",
            "Requests rejected as malformed or invalid",
            &[("", load(&self.rejected_requests))],
        );
        write_metric(
            &mut out,
            "uptime_seconds",
            "gauge",
            "Server uptime in seconds",
            &[("", self.uptime_seconds())],
        );

        out
    }

    /// Export metrics as JSON
    pub fn export_json(&self) -> serde_json::Value {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        serde_json::json!({
            "http": {
                "requests_total": load(&self.http_requests_total),
                "requests_2xx": load(&self.http_requests_2xx),
                "requests_4xx": load(&self.http_requests_4xx),
                "requests_5xx": load(&self.http_requests_5xx),
                "request_duration_ms_total": load(&self.http_request_duration_ms_total),
                "active_requests": load(&self.active_requests),
            },
            "calculations": {
                "progress": load(&self.progress_calculations),
                "escrow": load(&self.escrow_calculations),
                "rejected": load(&self.rejected_requests),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
    }
}

fn write_metric(out: &mut String, name: &str, kind: &str, help: &str, samples: &[(&str, u64)]) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
    for (labels, value) in samples {
        if labels.is_empty() {
            let _ = writeln!(out, "{name} {value}");
        } else {
            let _ = writeln!(out, "{name}{{{labels}}} {value}");
        }
    }
}

/// Metrics middleware
pub async fn metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    metrics.active_requests.fetch_add(1, Ordering::Relaxed);

    let response = next
        .run(request)
        .instrument(info_span!("http_request", %method, %path))
        .await;

    let duration = start.elapsed();
    let status = response.status();

    debug!(
        method = %method,
        path = %path,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    metrics.record_request(&path, status, duration.as_millis() as u64);
    metrics.active_requests.fetch_sub(1, Ordering::Relaxed);

    response
}

/// GET /metrics
pub async fn prometheus_metrics(State(metrics): State<Arc<Metrics>>) -> String {
    metrics.export_prometheus()
}

/// GET /metrics.json
pub async fn json_metrics(State(metrics): State<Arc<Metrics>>) -> Json<serde_json::Value> {
    Json(metrics.export_json())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request() {
        let metrics = Metrics::new();

        metrics.record_request("/health", StatusCode::OK, 50);
        metrics.record_request("/nope", StatusCode::NOT_FOUND, 10);
        metrics.record_request("/api/v1/orders/progress", StatusCode::INTERNAL_SERVER_ERROR, 100);

        assert_eq!(metrics.http_requests_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.http_requests_2xx.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.http_requests_4xx.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.http_requests_5xx.load(Ordering::Relaxed), 1);
        assert_eq!(
            metrics.http_request_duration_ms_total.load(Ordering::Relaxed),
            160
        );
        assert_eq!(metrics.progress_calculations.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_calculation_counters() {
        let metrics = Metrics::new();

        metrics.record_request("/api/v1/orders/progress", StatusCode::OK, 1);
        metrics.record_request("/api/v1/orders/progress", StatusCode::UNPROCESSABLE_ENTITY, 1);
        metrics.record_request("/api/v1/orders/escrow", StatusCode::OK, 1);
        metrics.record_request("/api/v1/orders/escrow", StatusCode::BAD_REQUEST, 1);

        assert_eq!(metrics.progress_calculations.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.escrow_calculations.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.rejected_requests.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.record_request("/api/v1/orders/escrow", StatusCode::OK, 50);

        let output = metrics.export_prometheus();
        assert!(output.contains("http_requests_total 1\n"));
        assert!(output.contains("http_requests_by_status{status=\"2xx\"} 1\n"));
        assert!(output.contains("sew4mi_calculations_total{kind=\"escrow\"} 1\n"));
        assert!(output.contains("# TYPE uptime_seconds gauge"));
    }

    #[test]
    fn test_json_export() {
        let metrics = Metrics::new();
        metrics.record_request("/api/v1/orders/progress", StatusCode::OK, 50);

        let json = metrics.export_json();
        assert_eq!(json["http"]["requests_total"], 1);
        assert_eq!(json["calculations"]["progress"], 1);
    }
}
