//! Health Check System
//!
//! Reports whether the loaded configuration is usable and the progress
//! calculator answers its reference cases.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sm_core::config::AppConfig;
use sm_milestones::{calculate_order_progress, get_next_milestone, stage_table};
use sm_models::{MilestoneStage, OrderMilestone};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }

    fn worst(self, other: HealthStatus) -> HealthStatus {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        if self.status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

/// Health checker service
pub struct HealthChecker {
    config: Arc<AppConfig>,
    cache_duration: Duration,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
}

impl HealthChecker {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let cache_duration = Duration::from_secs(config.server.health_cache_seconds);
        Self {
            config,
            cache_duration,
            start_time: Instant::now(),
            cache: RwLock::new(None),
        }
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks();
        if !report.status.is_healthy() {
            warn!(status = ?report.status, "Health check failed");
        }

        let mut cache = self.cache.write().await;
        *cache = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });

        report
    }

    fn perform_checks(&self) -> HealthReport {
        let components = vec![self.check_configuration(), check_calculator()];
        let status = components
            .iter()
            .fold(HealthStatus::Healthy, |acc, c| acc.worst(c.status));

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: Utc::now(),
        }
    }

    fn check_configuration(&self) -> ComponentHealth {
        let start = Instant::now();
        let (status, message) = match self.config.validate() {
            Ok(()) => (HealthStatus::Healthy, "Configuration valid".to_string()),
            Err(e) => (HealthStatus::Unhealthy, e.to_string()),
        };

        ComponentHealth {
            name: "configuration".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({
                "app_title": self.config.instance.app_title,
                "timezone": self.config.instance.timezone,
                "buffer_multiplier": self.config.estimation.buffer_multiplier,
                "escrow_currency": self.config.escrow.currency.code(),
            })),
        }
    }
}

/// Runs the calculator against an empty and a fully approved order
fn check_calculator() -> ComponentHealth {
    let start = Instant::now();
    let now = Utc::now();
    let complete: Vec<OrderMilestone> = MilestoneStage::ALL
        .iter()
        .map(|&stage| OrderMilestone::approved(stage, now))
        .collect();

    let table = stage_table();
    let weights_ascending = table.windows(2).all(|w| w[0].weight < w[1].weight);

    let mut failures = Vec::new();
    if calculate_order_progress(&[]) != 0
        || get_next_milestone(&[]) != Some(MilestoneStage::FIRST)
    {
        failures.push("empty order");
    }
    if calculate_order_progress(&complete) != 100 || get_next_milestone(&complete).is_some() {
        failures.push("completed order");
    }
    if !weights_ascending || table.last().map(|s| s.weight) != Some(100) {
        failures.push("stage weights");
    }

    let (status, message) = if failures.is_empty() {
        (HealthStatus::Healthy, "Reference cases pass".to_string())
    } else {
        (
            HealthStatus::Unhealthy,
            format!("Reference cases failed: {}", failures.join(", ")),
        )
    };

    ComponentHealth {
        name: "calculator".to_string(),
        status,
        message: Some(message),
        response_time_ms: start.elapsed().as_millis() as u64,
        details: Some(serde_json::json!({ "stages": table.len() })),
    }
}

/// Liveness probe
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness probe
pub async fn readiness(State(health): State<Arc<HealthChecker>>) -> StatusCode {
    health.check().await.http_status()
}

/// Full health report
pub async fn health(
    State(health): State<Arc<HealthChecker>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = health.check().await;
    (report.http_status(), Json(report))
}
