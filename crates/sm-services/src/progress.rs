//! Order progress summary service
//!
//! Validates an order's milestone snapshot and derives everything the order
//! tracking views show from it in one pass.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sm_core::config::EstimationConfig;
use sm_core::traits::{Contract, Id};
use sm_milestones::{
    calculate_days_remaining_at, calculate_estimated_completion_with_buffer,
    calculate_order_progress, get_highest_completed_milestone, get_next_milestone,
    get_order_status_from_milestones, overdue_milestones_at, DEFAULT_BUFFER_MULTIPLIER,
};
use sm_models::{MilestoneStage, Order, OrderMilestone, OrderStatus};
use tracing::debug;

use crate::contracts::OrderProgressContract;
use crate::escrow::{escrow_stage_for, EscrowStage};
use crate::ServiceResult;

/// Order snapshot to summarize
#[derive(Debug, Clone)]
pub struct OrderProgressParams {
    pub order_id: Option<Id>,
    pub order_created_at: DateTime<Utc>,
    /// Delivery date promised when the order was placed
    pub original_estimate: Option<DateTime<Utc>>,
    pub milestones: Vec<OrderMilestone>,
    pub delivered: bool,
}

impl OrderProgressParams {
    pub fn new(order_created_at: DateTime<Utc>) -> Self {
        Self {
            order_id: None,
            order_created_at,
            original_estimate: None,
            milestones: Vec::new(),
            delivered: false,
        }
    }

    pub fn with_order_id(mut self, order_id: Id) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_original_estimate(mut self, estimate: DateTime<Utc>) -> Self {
        self.original_estimate = Some(estimate);
        self
    }

    pub fn with_milestones(mut self, milestones: Vec<OrderMilestone>) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn delivered(mut self, delivered: bool) -> Self {
        self.delivered = delivered;
        self
    }
}

impl From<&Order> for OrderProgressParams {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            order_created_at: order.created_at,
            original_estimate: order.estimated_delivery,
            milestones: order.milestones.clone(),
            delivered: false,
        }
    }
}

/// Everything derived from an order's milestones
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProgressSummary {
    pub order_id: Option<Id>,
    pub progress_percentage: u8,
    pub highest_completed_milestone: Option<MilestoneStage>,
    pub next_milestone: Option<MilestoneStage>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub days_remaining: Option<i64>,
    pub status: OrderStatus,
    pub overdue_milestones: Vec<MilestoneStage>,
    pub escrow_stage: EscrowStage,
    pub calculated_at: DateTime<Utc>,
}

/// Service for summarizing order progress
///
/// # Example
/// ```ignore
/// let service = OrderProgressService::new(&config.estimation);
/// let params = OrderProgressParams::new(order.created_at).with_milestones(milestones);
/// let summary = service.call(&params);
/// ```
pub struct OrderProgressService {
    buffer_multiplier: f64,
    now: Option<DateTime<Utc>>,
}

impl OrderProgressService {
    pub fn new(config: &EstimationConfig) -> Self {
        Self {
            buffer_multiplier: config.buffer_multiplier,
            now: None,
        }
    }

    /// Pin the clock instead of reading it on every call
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn call(&self, params: &OrderProgressParams) -> ServiceResult<OrderProgressSummary> {
        let now = self.now.unwrap_or_else(Utc::now);

        if let Err(errors) = OrderProgressContract::new(now).validate(params) {
            return ServiceResult::failure(errors);
        }

        let milestones = &params.milestones;
        let highest = get_highest_completed_milestone(milestones);
        let estimated_completion = calculate_estimated_completion_with_buffer(
            milestones,
            params.original_estimate,
            now,
            self.buffer_multiplier,
        );

        let summary = OrderProgressSummary {
            order_id: params.order_id,
            progress_percentage: calculate_order_progress(milestones),
            highest_completed_milestone: highest,
            next_milestone: get_next_milestone(milestones),
            estimated_completion,
            days_remaining: calculate_days_remaining_at(estimated_completion, now),
            status: get_order_status_from_milestones(milestones),
            overdue_milestones: overdue_milestones_at(milestones, params.order_created_at, now),
            escrow_stage: escrow_stage_for(highest, params.delivered),
            calculated_at: now,
        };

        debug!(
            order_id = ?summary.order_id,
            progress = summary.progress_percentage,
            next = ?summary.next_milestone,
            status = summary.status.as_str(),
            overdue = summary.overdue_milestones.len(),
            "Calculated order progress"
        );

        ServiceResult::success(summary)
    }
}

impl Default for OrderProgressService {
    fn default() -> Self {
        Self {
            buffer_multiplier: DEFAULT_BUFFER_MULTIPLIER,
            now: None,
        }
    }
}
