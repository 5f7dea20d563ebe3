//! API routes

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::extractors::{AppState, HalResponse, Link};
use crate::handlers::{escrow, progress, stages};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_router())
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/milestones/stages", get(stages::list_stages))
        .nest("/orders", orders_router())
}

fn orders_router() -> Router<AppState> {
    Router::new()
        .route("/progress", post(progress::calculate_progress))
        .route("/escrow", post(escrow::calculate_escrow))
}

async fn api_root() -> HalResponse<ApiRoot> {
    HalResponse(ApiRoot {
        type_name: "Root",
        instance_name: "Sew4Mi",
        core_version: env!("CARGO_PKG_VERSION"),
        links: ApiRootLinks {
            self_link: Link::new("/api/v1"),
            stages: Link::new("/api/v1/milestones/stages"),
            order_progress: Link::post("/api/v1/orders/progress"),
            order_escrow: Link::post("/api/v1/orders/escrow"),
        },
    })
}

#[derive(Serialize)]
struct ApiRoot {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "instanceName")]
    instance_name: &'static str,
    #[serde(rename = "coreVersion")]
    core_version: &'static str,
    #[serde(rename = "_links")]
    links: ApiRootLinks,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRootLinks {
    #[serde(rename = "self")]
    self_link: Link,
    stages: Link,
    order_progress: Link,
    order_escrow: Link,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        router().with_state(AppState::default())
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_api_root() {
        let request = Request::builder().uri("/api/v1").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["_type"], "Root");
        assert_eq!(body["_links"]["orderProgress"]["method"], "post");
    }

    #[tokio::test]
    async fn test_list_stages() {
        let request = Request::builder()
            .uri("/api/v1/milestones/stages")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 7);
        assert_eq!(body["elements"][0]["stage"], "FABRIC_SELECTED");
        assert_eq!(body["elements"][6]["weight"], 100);
    }

    #[tokio::test]
    async fn test_progress_after_fabric_selected() {
        let created = Utc::now() - Duration::hours(12);
        let request = post_json(
            "/api/v1/orders/progress",
            json!({
                "orderCreatedAt": created.to_rfc3339(),
                "milestones": [
                    {
                        "stage": "FABRIC_SELECTED",
                        "approvalStatus": "APPROVED",
                        "createdAt": created.to_rfc3339()
                    }
                ]
            }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["_type"], "OrderProgress");
        assert_eq!(body["progressPercentage"], 10);
        assert_eq!(body["nextMilestone"], "CUTTING_STARTED");
        assert_eq!(body["status"], "IN_PRODUCTION");
        assert_eq!(body["daysRemaining"], 14);
    }

    #[tokio::test]
    async fn test_progress_all_stages_complete() {
        let created = Utc::now() - Duration::days(14);
        let milestones: Vec<Value> = [
            "FABRIC_SELECTED",
            "CUTTING_STARTED",
            "INITIAL_ASSEMBLY",
            "FITTING_READY",
            "ADJUSTMENTS_COMPLETE",
            "FINAL_PRESSING",
            "READY_FOR_DELIVERY",
        ]
        .iter()
        .map(|stage| {
            json!({
                "stage": stage,
                "approvalStatus": "APPROVED",
                "createdAt": created.to_rfc3339()
            })
        })
        .collect();

        let request = post_json(
            "/api/v1/orders/progress",
            json!({ "orderCreatedAt": created.to_rfc3339(), "milestones": milestones }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["progressPercentage"], 100);
        assert_eq!(body["nextMilestone"], Value::Null);
        assert_eq!(body["estimatedCompletion"], Value::Null);
        assert_eq!(body["status"], "READY_FOR_DELIVERY");
        assert_eq!(body["escrowStage"], "FINAL");
    }

    #[tokio::test]
    async fn test_unknown_stage_is_rejected() {
        let request = post_json(
            "/api/v1/orders/progress",
            json!({
                "orderCreatedAt": Utc::now().to_rfc3339(),
                "milestones": [
                    { "stage": "EMBROIDERY", "createdAt": Utc::now().to_rfc3339() }
                ]
            }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorIdentifier"], "urn:sew4mi:api:v1:errors:InvalidRequestBody");
    }

    #[tokio::test]
    async fn test_future_order_is_unprocessable() {
        let request = post_json(
            "/api/v1/orders/progress",
            json!({ "orderCreatedAt": (Utc::now() + Duration::days(2)).to_rfc3339() }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["orderCreatedAt"].is_array());
    }

    #[tokio::test]
    async fn test_invalid_photo_url_uses_wire_name() {
        let request = post_json(
            "/api/v1/orders/progress",
            json!({
                "orderCreatedAt": Utc::now().to_rfc3339(),
                "milestones": [
                    {
                        "stage": "FABRIC_SELECTED",
                        "photoUrl": "not a url",
                        "createdAt": Utc::now().to_rfc3339()
                    }
                ]
            }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["milestones[0].photoUrl"].is_array());
    }

    #[tokio::test]
    async fn test_progress_delivered_requires_final_stage() {
        let request = post_json(
            "/api/v1/orders/progress",
            json!({ "orderCreatedAt": Utc::now().to_rfc3339(), "delivered": true }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["delivered"].is_array());
    }

    #[tokio::test]
    async fn test_escrow_breakdown() {
        let request = post_json(
            "/api/v1/orders/escrow",
            json!({
                "totalAmount": 120000,
                "milestones": [
                    {
                        "stage": "FITTING_READY",
                        "approvalStatus": "APPROVED",
                        "createdAt": Utc::now().to_rfc3339()
                    }
                ]
            }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["_type"], "EscrowStatus");
        assert_eq!(body["breakdown"]["deposit"]["amount"], 30000);
        assert_eq!(body["breakdown"]["fitting"]["amount"], 60000);
        assert_eq!(body["breakdown"]["final"]["amount"], 30000);
        assert_eq!(body["breakdown"]["total"]["currency"], "GHS");
        assert_eq!(body["stage"], "FITTING");
        assert_eq!(body["released"]["amount"], 90000);
        assert_eq!(body["held"]["amount"], 30000);
    }

    #[tokio::test]
    async fn test_escrow_rejects_zero_total() {
        let request = post_json("/api/v1/orders/escrow", json!({ "totalAmount": 0 }));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["totalAmount"].is_array());
    }
}
