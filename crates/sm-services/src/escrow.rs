//! Escrow payment split
//!
//! An order total is held in escrow and released to the tailor in three parts:
//! a deposit up front, a fitting payment once the garment is ready for fitting,
//! and a final payment on delivery.

use serde::{Deserialize, Serialize};
use sm_core::config::EscrowConfig;
use sm_core::traits::Contract;
use sm_core::types::Money;
use sm_milestones::get_highest_completed_milestone;
use sm_models::{MilestoneStage, OrderMilestone};
use tracing::debug;

use crate::contracts::{EscrowSplitContract, EscrowStatusContract};
use crate::ServiceResult;

/// Percentages of the order total released at each escrow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowSplit {
    pub deposit_percent: u8,
    pub fitting_percent: u8,
    pub final_percent: u8,
}

impl Default for EscrowSplit {
    fn default() -> Self {
        Self {
            deposit_percent: 25,
            fitting_percent: 50,
            final_percent: 25,
        }
    }
}

impl From<&EscrowConfig> for EscrowSplit {
    fn from(config: &EscrowConfig) -> Self {
        Self {
            deposit_percent: config.deposit_percent,
            fitting_percent: config.fitting_percent,
            final_percent: config.final_percent,
        }
    }
}

/// Where an order's escrow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStage {
    /// Deposit released, awaiting fitting
    Deposit,
    /// Fitting payment released, awaiting delivery
    Fitting,
    /// Garment ready, final payment due on delivery
    Final,
    /// Delivered, everything released
    Released,
}

/// Escrow stage implied by production progress
pub fn escrow_stage_for(highest_completed: Option<MilestoneStage>, delivered: bool) -> EscrowStage {
    match highest_completed {
        Some(MilestoneStage::ReadyForDelivery) if delivered => EscrowStage::Released,
        Some(MilestoneStage::ReadyForDelivery) => EscrowStage::Final,
        Some(stage) if stage >= MilestoneStage::FittingReady => EscrowStage::Fitting,
        _ => EscrowStage::Deposit,
    }
}

/// An order total split into its three escrow payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowBreakdown {
    pub total: Money,
    pub deposit: Money,
    pub fitting: Money,
    #[serde(rename = "final")]
    pub final_payment: Money,
}

impl EscrowBreakdown {
    /// Split `total`; the final payment absorbs rounding so the parts sum to the total
    ///
    /// Fitting is capped at what the deposit leaves over, so no part goes negative
    /// for a non-negative total.
    pub fn split(total: Money, split: &EscrowSplit) -> Self {
        let deposit = total.percent(split.deposit_percent);
        let remaining = total.amount - deposit.amount;
        let fitting = Money::new(
            total.percent(split.fitting_percent).amount.min(remaining),
            total.currency,
        );
        let final_payment = Money::new(remaining - fitting.amount, total.currency);
        Self {
            total,
            deposit,
            fitting,
            final_payment,
        }
    }

    /// Cumulative amount released to the tailor at `stage`
    pub fn released_amount(&self, stage: EscrowStage) -> Money {
        let currency = self.total.currency;
        match stage {
            EscrowStage::Deposit => self.deposit,
            EscrowStage::Fitting | EscrowStage::Final => {
                Money::new(self.deposit.amount + self.fitting.amount, currency)
            }
            EscrowStage::Released => self.total,
        }
    }

    /// Amount still held in escrow at `stage`
    pub fn held_amount(&self, stage: EscrowStage) -> Money {
        let released = self.released_amount(stage);
        Money::new(self.total.amount - released.amount, self.total.currency)
    }
}

/// Input for an escrow status calculation
#[derive(Debug, Clone)]
pub struct EscrowStatusParams {
    pub total: Money,
    pub milestones: Vec<OrderMilestone>,
    pub delivered: bool,
}

/// Breakdown plus the current stage and released/held amounts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowStatus {
    pub breakdown: EscrowBreakdown,
    pub stage: EscrowStage,
    pub released: Money,
    pub held: Money,
}

/// Computes escrow breakdowns with a configured split
pub struct EscrowService {
    split: EscrowSplit,
}

impl EscrowService {
    pub fn new(split: EscrowSplit) -> Self {
        Self { split }
    }

    pub fn from_config(config: &EscrowConfig) -> Self {
        Self::new(EscrowSplit::from(config))
    }

    pub fn split(&self) -> &EscrowSplit {
        &self.split
    }

    /// Split an order total into deposit, fitting, and final payments
    pub fn breakdown(&self, total: Money) -> ServiceResult<EscrowBreakdown> {
        if let Err(errors) = EscrowSplitContract.validate(&self.split) {
            return ServiceResult::failure(errors);
        }
        if !total.is_positive() {
            return ServiceResult::failure_with_error("totalAmount", "must be greater than 0");
        }

        let breakdown = EscrowBreakdown::split(total, &self.split);
        debug!(
            total = %breakdown.total,
            deposit = %breakdown.deposit,
            fitting = %breakdown.fitting,
            final_payment = %breakdown.final_payment,
            "Calculated escrow breakdown"
        );
        ServiceResult::success(breakdown)
    }

    /// Breakdown plus where the escrow stands given the order's milestones
    pub fn status(&self, params: &EscrowStatusParams) -> ServiceResult<EscrowStatus> {
        if let Err(errors) = EscrowStatusContract.validate(params) {
            return ServiceResult::failure(errors);
        }

        self.breakdown(params.total).map(|breakdown| {
            let highest = get_highest_completed_milestone(&params.milestones);
            let stage = escrow_stage_for(highest, params.delivered);
            EscrowStatus {
                breakdown,
                stage,
                released: breakdown.released_amount(stage),
                held: breakdown.held_amount(stage),
            }
        })
    }
}

impl Default for EscrowService {
    fn default() -> Self {
        Self::new(EscrowSplit::default())
    }
}
