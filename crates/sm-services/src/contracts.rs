//! Input contracts for the order services

use chrono::{DateTime, Utc};
use sm_core::error::ValidationErrors;
use sm_core::traits::{Contract, ValidationResult};
use sm_models::{MilestoneStage, OrderMilestone};
use sm_milestones::is_stage_approved;
use validator::Validate;

use crate::escrow::{EscrowSplit, EscrowStatusParams};
use crate::progress::OrderProgressParams;

/// Upper bound on milestone records accepted per order snapshot
pub const MAX_MILESTONES_PER_ORDER: usize = 100;

/// Checks an order snapshot before progress is derived from it
pub struct OrderProgressContract {
    now: DateTime<Utc>,
}

impl OrderProgressContract {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Contract<OrderProgressParams> for OrderProgressContract {
    fn validate(&self, params: &OrderProgressParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if params.order_created_at > self.now {
            errors.add("orderCreatedAt", "can't be in the future");
        }

        if let Some(original) = params.original_estimate {
            if original < params.order_created_at {
                errors.add("originalEstimate", "can't be before the order was created");
            }
        }

        check_delivery(params.delivered, &params.milestones, &mut errors);

        if params.milestones.len() > MAX_MILESTONES_PER_ORDER {
            errors.add(
                "milestones",
                format!("can't contain more than {MAX_MILESTONES_PER_ORDER} entries"),
            );
        }

        for (index, milestone) in params.milestones.iter().enumerate() {
            if let (Some(expected), Some(actual)) = (params.order_id, milestone.order_id) {
                if expected != actual {
                    errors.add(
                        format!("milestones[{index}].orderId"),
                        "belongs to a different order",
                    );
                }
            }
            if let Err(field_errors) = milestone.validate() {
                let field_errors: ValidationErrors = field_errors.into();
                for (field, messages) in field_errors.errors {
                    for message in messages {
                        errors.add(format!("milestones[{index}].{field}"), message);
                    }
                }
            }
        }

        errors.into_result()
    }
}

/// The escrow percentages must cover exactly the order total
pub struct EscrowSplitContract;

impl Contract<EscrowSplit> for EscrowSplitContract {
    fn validate(&self, split: &EscrowSplit) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        let parts = [
            ("depositPercent", split.deposit_percent),
            ("fittingPercent", split.fitting_percent),
            ("finalPercent", split.final_percent),
        ];

        for (field, percent) in parts {
            if percent > 100 {
                errors.add(field, "must be between 0 and 100");
            }
        }

        let sum: u16 = parts.iter().map(|(_, percent)| *percent as u16).sum();
        if sum != 100 {
            errors.add_base(format!("escrow percentages must sum to 100, got {sum}"));
        }

        errors.into_result()
    }
}

/// A delivered order must have its final stage approved
pub struct EscrowStatusContract;

impl Contract<EscrowStatusParams> for EscrowStatusContract {
    fn validate(&self, params: &EscrowStatusParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        check_delivery(params.delivered, &params.milestones, &mut errors);
        errors.into_result()
    }
}

fn check_delivery(delivered: bool, milestones: &[OrderMilestone], errors: &mut ValidationErrors) {
    if delivered && !is_stage_approved(MilestoneStage::TERMINAL, milestones) {
        errors.add("delivered", "requires an approved READY_FOR_DELIVERY milestone");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sm_core::types::Money;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn params() -> OrderProgressParams {
        OrderProgressParams::new(now() - Duration::days(2))
    }

    #[test]
    fn test_valid_snapshot() {
        let mut params = params();
        params
            .milestones
            .push(OrderMilestone::approved(MilestoneStage::FabricSelected, now()));
        assert!(OrderProgressContract::new(now()).validate(&params).is_ok());
    }

    #[test]
    fn test_order_created_in_future() {
        let params = OrderProgressParams::new(now() + Duration::hours(1));
        let errors = OrderProgressContract::new(now()).validate(&params).unwrap_err();
        assert!(errors.has_error("orderCreatedAt"));
    }

    #[test]
    fn test_original_estimate_before_creation() {
        let mut params = params();
        params.original_estimate = Some(params.order_created_at - Duration::days(1));
        let errors = OrderProgressContract::new(now()).validate(&params).unwrap_err();
        assert!(errors.has_error("originalEstimate"));
    }

    #[test]
    fn test_milestone_from_other_order() {
        let mut params = params().with_order_id(Uuid::new_v4());
        params.milestones.push(
            OrderMilestone::approved(MilestoneStage::FabricSelected, now())
                .with_order_id(Uuid::new_v4()),
        );
        let errors = OrderProgressContract::new(now()).validate(&params).unwrap_err();
        assert!(errors.has_error("milestones[0].orderId"));
    }

    #[test]
    fn test_too_many_milestones() {
        let mut params = params();
        params.milestones = (0..=MAX_MILESTONES_PER_ORDER)
            .map(|_| OrderMilestone::pending(MilestoneStage::FabricSelected, now()))
            .collect();
        let errors = OrderProgressContract::new(now()).validate(&params).unwrap_err();
        assert!(errors.has_error("milestones"));
    }

    #[test]
    fn test_invalid_milestone_fields_are_prefixed() {
        let mut params = params();
        let mut milestone = OrderMilestone::pending(MilestoneStage::CuttingStarted, now());
        milestone.photo_url = Some("definitely not a url".into());
        params.milestones.push(milestone);

        let errors = OrderProgressContract::new(now()).validate(&params).unwrap_err();
        assert!(errors.has_error("milestones[0].photoUrl"));
    }

    #[test]
    fn test_delivered_order_needs_final_stage() {
        let params = params()
            .with_milestones(vec![OrderMilestone::approved(MilestoneStage::FinalPressing, now())])
            .delivered(true);
        let errors = OrderProgressContract::new(now()).validate(&params).unwrap_err();
        assert!(errors.has_error("delivered"));

        let params = self::params()
            .with_milestones(vec![OrderMilestone::approved(MilestoneStage::ReadyForDelivery, now())])
            .delivered(true);
        assert!(OrderProgressContract::new(now()).validate(&params).is_ok());
    }

    #[test]
    fn test_escrow_split_contract() {
        assert!(EscrowSplitContract.validate(&EscrowSplit::default()).is_ok());

        let errors = EscrowSplitContract
            .validate(&EscrowSplit {
                deposit_percent: 120,
                fitting_percent: 0,
                final_percent: 0,
            })
            .unwrap_err();
        assert!(errors.has_error("depositPercent"));
        assert_eq!(errors.base_errors.len(), 1);
    }

    #[test]
    fn test_escrow_status_contract() {
        let params = EscrowStatusParams {
            total: Money::ghs(1_000),
            milestones: vec![OrderMilestone::approved(MilestoneStage::ReadyForDelivery, now())],
            delivered: true,
        };
        assert!(EscrowStatusContract.validate(&params).is_ok());
    }
}
