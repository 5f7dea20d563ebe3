//! Sew4Mi Server
//!
//! HTTP server for order progress tracking and escrow calculations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sm_api::AppState;
use sm_core::config::AppConfig;

mod health;
mod metrics;

use health::HealthChecker;
use metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        title = %config.instance.app_title,
        "Starting Sew4Mi server"
    );

    let addr = config.server_addr();
    let metrics = Arc::new(Metrics::new());
    let app = build_router(Arc::new(config), metrics);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
///
/// `SEW4MI_LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,sm_server=debug,sm_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("SEW4MI_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// Build the application router
fn build_router(config: Arc<AppConfig>, metrics: Arc<Metrics>) -> Router {
    let health_checker = Arc::new(HealthChecker::new(config.clone()));
    let request_timeout = Duration::from_secs(config.server.request_timeout_seconds);

    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health/full", get(health::health))
        .with_state(health_checker);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/metrics.json", get(metrics::json_metrics))
        .with_state(metrics.clone());

    let api_routes = sm_api::router().with_state(AppState { config });

    Router::new()
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(middleware::from_fn_with_state(
            metrics,
            metrics::metrics_middleware,
        ))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        let app = build_router(Arc::new(AppConfig::default()), metrics.clone());
        (app, metrics)
    }

    async fn get_status(uri: &str) -> StatusCode {
        let (app, _) = test_app();
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        assert_eq!(get_status("/health").await, StatusCode::OK);
        assert_eq!(get_status("/health/live").await, StatusCode::OK);
        assert_eq!(get_status("/health/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_full_health_report() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health/full").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"][0]["name"], "configuration");
        assert_eq!(body["components"][1]["name"], "calculator");
    }

    #[tokio::test]
    async fn test_api_is_mounted() {
        assert_eq!(get_status("/api/v1").await, StatusCode::OK);
        assert_eq!(get_status("/api/v1/milestones/stages").await, StatusCode::OK);
        assert_eq!(get_status("/api/v3").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        assert_eq!(get_status("/metrics").await, StatusCode::OK);
        assert_eq!(get_status("/metrics.json").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_counts_calculations() {
        let (app, metrics) = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/orders/escrow")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"totalAmount": 5000}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = metrics.export_json();
        assert_eq!(json["http"]["requests_total"], 1);
        assert_eq!(json["calculations"]["escrow"], 1);
        assert_eq!(json["http"]["active_requests"], 0);
    }
}
