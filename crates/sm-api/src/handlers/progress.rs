//! Order progress API handlers

use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sm_core::traits::Id;
use sm_models::OrderMilestone;
use sm_services::{OrderProgressParams, OrderProgressService, OrderProgressSummary};
use tracing::info;
use validator::Validate;

use crate::error::ApiResult;
use crate::extractors::{AppState, HalResponse, Link, ValidatedJson};

/// Body of `POST /api/v1/orders/progress`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderProgressRequest {
    pub order_id: Option<Id>,
    pub order_created_at: DateTime<Utc>,
    pub original_estimate: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered: bool,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub milestones: Vec<OrderMilestone>,
}

impl From<OrderProgressRequest> for OrderProgressParams {
    fn from(request: OrderProgressRequest) -> Self {
        Self {
            order_id: request.order_id,
            order_created_at: request.order_created_at,
            original_estimate: request.original_estimate,
            milestones: request.milestones,
            delivered: request.delivered,
        }
    }
}

#[derive(Serialize)]
struct OrderProgressLinks {
    #[serde(rename = "self")]
    self_link: Link,
    stages: Link,
    escrow: Link,
}

#[derive(Serialize)]
struct OrderProgressResource {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(flatten)]
    summary: OrderProgressSummary,
    #[serde(rename = "_links")]
    links: OrderProgressLinks,
}

/// POST /api/v1/orders/progress
pub async fn calculate_progress(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<OrderProgressRequest>,
) -> ApiResult<impl IntoResponse> {
    let params = OrderProgressParams::from(request);
    let summary = OrderProgressService::new(&state.config.estimation)
        .call(&params)
        .into_result()?;

    info!(
        order_id = ?summary.order_id,
        progress = summary.progress_percentage,
        status = summary.status.as_str(),
        "Order progress calculated"
    );

    Ok(HalResponse(OrderProgressResource {
        type_name: "OrderProgress",
        summary,
        links: OrderProgressLinks {
            self_link: Link::post("/api/v1/orders/progress"),
            stages: Link::new("/api/v1/milestones/stages"),
            escrow: Link::post("/api/v1/orders/escrow"),
        },
    }))
}
