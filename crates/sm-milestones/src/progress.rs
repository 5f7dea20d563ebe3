//! Progress, next stage, completion estimate, and overdue checks
//!
//! Only APPROVED milestones advance an order. Pending and rejected records are
//! ignored, and they never undo a stage that was approved in another record.

use chrono::{DateTime, Duration, Utc};
use sm_models::{MilestoneStage, OrderMilestone, OrderStatus};

use crate::schedule::StageSchedule;

/// Default safety margin applied to the remaining typical days
pub const DEFAULT_BUFFER_MULTIPLIER: f64 = 1.2;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Progress percentage (0..=100) of the highest approved stage
pub fn calculate_order_progress(milestones: &[OrderMilestone]) -> u8 {
    get_highest_completed_milestone(milestones)
        .map(|stage| stage.weight())
        .unwrap_or(0)
}

/// Highest stage that has an APPROVED milestone
pub fn get_highest_completed_milestone(milestones: &[OrderMilestone]) -> Option<MilestoneStage> {
    milestones
        .iter()
        .filter(|m| m.is_approved())
        .map(|m| m.stage)
        .max()
}

/// Stage after the highest completed one
///
/// The first stage when nothing is approved yet, `None` once the terminal stage is done.
pub fn get_next_milestone(milestones: &[OrderMilestone]) -> Option<MilestoneStage> {
    match get_highest_completed_milestone(milestones) {
        Some(stage) => stage.next(),
        None => Some(MilestoneStage::FIRST),
    }
}

/// Whether any APPROVED milestone exists for `stage`
pub fn is_stage_approved(stage: MilestoneStage, milestones: &[OrderMilestone]) -> bool {
    milestones
        .iter()
        .any(|m| m.stage == stage && m.is_approved())
}

/// Estimated completion date measured from the current time
pub fn calculate_estimated_completion(
    milestones: &[OrderMilestone],
    original_estimate: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    calculate_estimated_completion_at(milestones, original_estimate, Utc::now())
}

/// Estimated completion date measured from `now`, using the default buffer
pub fn calculate_estimated_completion_at(
    milestones: &[OrderMilestone],
    original_estimate: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    calculate_estimated_completion_with_buffer(
        milestones,
        original_estimate,
        now,
        DEFAULT_BUFFER_MULTIPLIER,
    )
}

/// Estimated completion date measured from `now`
///
/// Sums the typical days of every stage from the next one through the terminal
/// stage, scales by `buffer_multiplier`, and rounds up to whole days. An
/// `original_estimate` earlier than the computed date wins. Dates past the
/// representable range saturate at the latest representable instant.
pub fn calculate_estimated_completion_with_buffer(
    milestones: &[OrderMilestone],
    original_estimate: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    buffer_multiplier: f64,
) -> Option<DateTime<Utc>> {
    let next = get_next_milestone(milestones)?;

    let remaining_days: u32 = MilestoneStage::ALL[next.index()..]
        .iter()
        .map(|stage| stage.typical_days())
        .sum();
    let estimated = Duration::try_days(buffered_days(remaining_days, buffer_multiplier))
        .and_then(|buffer| now.checked_add_signed(buffer))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    match original_estimate {
        Some(original) if original < estimated => Some(original),
        _ => Some(estimated),
    }
}

fn buffered_days(days: u32, multiplier: f64) -> i64 {
    let scaled = days as f64 * multiplier;
    // Round away float noise first so an exact product like 10 * 1.2 stays 12.
    ((scaled * 1e6).round() / 1e6).ceil() as i64
}

/// Whole days until `estimated_date`, rounded up and never negative
pub fn calculate_days_remaining(estimated_date: Option<DateTime<Utc>>) -> Option<i64> {
    calculate_days_remaining_at(estimated_date, Utc::now())
}

pub fn calculate_days_remaining_at(
    estimated_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let millis = (estimated_date? - now).num_milliseconds();
    if millis <= 0 {
        return Some(0);
    }
    Some((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY)
}

/// Coarse order status implied by the highest approved stage
pub fn get_order_status_from_milestones(milestones: &[OrderMilestone]) -> OrderStatus {
    match get_highest_completed_milestone(milestones) {
        None => OrderStatus::Created,
        Some(MilestoneStage::FittingReady) => OrderStatus::FittingReady,
        Some(MilestoneStage::ReadyForDelivery) => OrderStatus::ReadyForDelivery,
        Some(
            MilestoneStage::FabricSelected
            | MilestoneStage::CuttingStarted
            | MilestoneStage::InitialAssembly
            | MilestoneStage::AdjustmentsComplete
            | MilestoneStage::FinalPressing,
        ) => OrderStatus::InProduction,
    }
}

/// Whether `stage` is still unapproved past its expected day offset
pub fn is_milestone_overdue(
    stage: MilestoneStage,
    milestones: &[OrderMilestone],
    order_created_at: DateTime<Utc>,
) -> bool {
    is_milestone_overdue_at(stage, milestones, order_created_at, Utc::now())
}

pub fn is_milestone_overdue_at(
    stage: MilestoneStage,
    milestones: &[OrderMilestone],
    order_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    if is_stage_approved(stage, milestones) {
        return false;
    }
    now - order_created_at > Duration::days(stage.expected_day_offset() as i64)
}

/// Every overdue stage, in canonical order
pub fn overdue_milestones_at(
    milestones: &[OrderMilestone],
    order_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<MilestoneStage> {
    MilestoneStage::ALL
        .into_iter()
        .filter(|&stage| is_milestone_overdue_at(stage, milestones, order_created_at, now))
        .collect()
}
