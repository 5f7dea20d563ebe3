//! Escrow API handlers

use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use sm_core::types::{Currency, Money};
use sm_models::OrderMilestone;
use sm_services::escrow::EscrowStatusParams;
use sm_services::{EscrowService, EscrowStatus};
use tracing::info;
use validator::Validate;

use crate::error::ApiResult;
use crate::extractors::{AppState, HalResponse, Link, ValidatedJson};

/// Body of `POST /api/v1/orders/escrow`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EscrowRequest {
    /// Order total in minor units
    #[validate(range(min = 1))]
    pub total_amount: i64,
    /// Defaults to the configured settlement currency
    pub currency: Option<Currency>,
    #[serde(default)]
    pub delivered: bool,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub milestones: Vec<OrderMilestone>,
}

#[derive(Serialize)]
struct EscrowLinks {
    #[serde(rename = "self")]
    self_link: Link,
    progress: Link,
}

#[derive(Serialize)]
struct EscrowResource {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(flatten)]
    status: EscrowStatus,
    #[serde(rename = "_links")]
    links: EscrowLinks,
}

/// POST /api/v1/orders/escrow
pub async fn calculate_escrow(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EscrowRequest>,
) -> ApiResult<impl IntoResponse> {
    let escrow_config = &state.config.escrow;
    let currency = request.currency.unwrap_or(escrow_config.currency);
    let params = EscrowStatusParams {
        total: Money::new(request.total_amount, currency),
        milestones: request.milestones,
        delivered: request.delivered,
    };

    let status = EscrowService::from_config(escrow_config)
        .status(&params)
        .into_result()?;

    info!(
        total = %status.breakdown.total,
        stage = ?status.stage,
        released = %status.released,
        "Escrow status calculated"
    );

    Ok(HalResponse(EscrowResource {
        type_name: "EscrowStatus",
        status,
        links: EscrowLinks {
            self_link: Link::post("/api/v1/orders/escrow"),
            progress: Link::post("/api/v1/orders/progress"),
        },
    }))
}
