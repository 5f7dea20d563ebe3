//! Order milestone model
//!
//! A milestone is a production checkpoint a tailor records against an order
//! (photo and notes), which the customer then approves or rejects.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sm_core::error::SmError;
use sm_core::traits::{Entity, Id, Identifiable, OrderScoped, Timestamped};
use validator::Validate;

/// Canonical production stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStage {
    FabricSelected,
    CuttingStarted,
    InitialAssembly,
    FittingReady,
    AdjustmentsComplete,
    FinalPressing,
    ReadyForDelivery,
}

impl MilestoneStage {
    /// All stages in canonical order
    pub const ALL: [MilestoneStage; 7] = [
        MilestoneStage::FabricSelected,
        MilestoneStage::CuttingStarted,
        MilestoneStage::InitialAssembly,
        MilestoneStage::FittingReady,
        MilestoneStage::AdjustmentsComplete,
        MilestoneStage::FinalPressing,
        MilestoneStage::ReadyForDelivery,
    ];

    pub const FIRST: MilestoneStage = MilestoneStage::FabricSelected;
    pub const TERMINAL: MilestoneStage = MilestoneStage::ReadyForDelivery;

    /// Position in the canonical order (0-based)
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage that follows this one, if any
    pub fn next(self) -> Option<MilestoneStage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }

    /// Wire name, e.g. `FITTING_READY`
    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneStage::FabricSelected => "FABRIC_SELECTED",
            MilestoneStage::CuttingStarted => "CUTTING_STARTED",
            MilestoneStage::InitialAssembly => "INITIAL_ASSEMBLY",
            MilestoneStage::FittingReady => "FITTING_READY",
            MilestoneStage::AdjustmentsComplete => "ADJUSTMENTS_COMPLETE",
            MilestoneStage::FinalPressing => "FINAL_PRESSING",
            MilestoneStage::ReadyForDelivery => "READY_FOR_DELIVERY",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            MilestoneStage::FabricSelected => "Fabric selected",
            MilestoneStage::CuttingStarted => "Cutting started",
            MilestoneStage::InitialAssembly => "Initial assembly",
            MilestoneStage::FittingReady => "Ready for fitting",
            MilestoneStage::AdjustmentsComplete => "Adjustments complete",
            MilestoneStage::FinalPressing => "Final pressing",
            MilestoneStage::ReadyForDelivery => "Ready for delivery",
        }
    }
}

impl fmt::Display for MilestoneStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneStage {
    type Err = SmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| SmError::invalid_input("stage", format!("unknown milestone stage {s:?}")))
    }
}

/// Customer decision on a milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl MilestoneApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneApprovalStatus::Pending => "PENDING",
            MilestoneApprovalStatus::Approved => "APPROVED",
            MilestoneApprovalStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for MilestoneApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneApprovalStatus {
    type Err = SmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(SmError::invalid_input(
                "approvalStatus",
                format!("unknown approval status {other:?}"),
            )),
        }
    }
}

/// A milestone recorded against an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderMilestone {
    pub id: Option<Id>,

    pub order_id: Option<Id>,

    pub stage: MilestoneStage,

    #[serde(default)]
    pub approval_status: MilestoneApprovalStatus,

    /// Progress photo uploaded by the tailor
    #[validate(url)]
    pub photo_url: Option<String>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,

    /// When the customer approved or rejected the milestone
    pub verified_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl OrderMilestone {
    pub fn new(
        stage: MilestoneStage,
        approval_status: MilestoneApprovalStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            order_id: None,
            stage,
            approval_status,
            photo_url: None,
            notes: None,
            verified_at: None,
            created_at,
        }
    }

    pub fn approved(stage: MilestoneStage, created_at: DateTime<Utc>) -> Self {
        Self {
            verified_at: Some(created_at),
            ..Self::new(stage, MilestoneApprovalStatus::Approved, created_at)
        }
    }

    pub fn pending(stage: MilestoneStage, created_at: DateTime<Utc>) -> Self {
        Self::new(stage, MilestoneApprovalStatus::Pending, created_at)
    }

    pub fn rejected(stage: MilestoneStage, created_at: DateTime<Utc>) -> Self {
        Self {
            verified_at: Some(created_at),
            ..Self::new(stage, MilestoneApprovalStatus::Rejected, created_at)
        }
    }

    pub fn with_order_id(mut self, order_id: Id) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn is_approved(&self) -> bool {
        self.approval_status == MilestoneApprovalStatus::Approved
    }
}

impl Identifiable for OrderMilestone {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for OrderMilestone {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl OrderScoped for OrderMilestone {
    fn order_id(&self) -> Option<Id> {
        self.order_id
    }
}

impl Entity for OrderMilestone {
    const TYPE_NAME: &'static str = "OrderMilestone";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(MilestoneStage::FabricSelected.index(), 0);
        assert_eq!(MilestoneStage::ReadyForDelivery.index(), 6);
        assert_eq!(
            MilestoneStage::FittingReady.next(),
            Some(MilestoneStage::AdjustmentsComplete)
        );
        assert_eq!(MilestoneStage::ReadyForDelivery.next(), None);
        assert!(MilestoneStage::TERMINAL.is_terminal());
        assert!(MilestoneStage::CuttingStarted < MilestoneStage::FinalPressing);
    }

    #[test]
    fn test_stage_from_str() {
        for stage in MilestoneStage::ALL {
            assert_eq!(stage.as_str().parse::<MilestoneStage>().ok(), Some(stage));
        }
        let err = "HEMMING".parse::<MilestoneStage>().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_approval_status_from_str() {
        assert_eq!(
            "APPROVED".parse::<MilestoneApprovalStatus>().ok(),
            Some(MilestoneApprovalStatus::Approved)
        );
        assert!("approved".parse::<MilestoneApprovalStatus>().is_err());
    }

    #[test]
    fn test_milestone_wire_format() {
        let json = serde_json::json!({
            "stage": "FITTING_READY",
            "approvalStatus": "APPROVED",
            "createdAt": "2024-03-01T09:00:00Z"
        });
        let milestone: OrderMilestone = serde_json::from_value(json).unwrap();
        assert_eq!(milestone.stage, MilestoneStage::FittingReady);
        assert!(milestone.is_approved());
        assert_eq!(milestone.created_at, at());
    }

    #[test]
    fn test_unknown_stage_is_rejected_on_deserialize() {
        let json = serde_json::json!({
            "stage": "EMBROIDERY",
            "createdAt": "2024-03-01T09:00:00Z"
        });
        assert!(serde_json::from_value::<OrderMilestone>(json).is_err());
    }

    #[test]
    fn test_approval_defaults_to_pending() {
        let json = serde_json::json!({
            "stage": "CUTTING_STARTED",
            "createdAt": "2024-03-01T09:00:00Z"
        });
        let milestone: OrderMilestone = serde_json::from_value(json).unwrap();
        assert_eq!(milestone.approval_status, MilestoneApprovalStatus::Pending);
        assert!(!milestone.is_persisted());
    }

    #[test]
    fn test_validate_photo_url() {
        let mut milestone = OrderMilestone::pending(MilestoneStage::CuttingStarted, at());
        milestone.photo_url = Some("not a url".into());
        assert!(milestone.validate().is_err());

        milestone.photo_url = Some("https://cdn.sew4mi.com/m/1.jpg".into());
        assert!(milestone.validate().is_ok());
    }
}
