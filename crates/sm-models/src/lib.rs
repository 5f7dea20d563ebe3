//! # sm-models
//!
//! Domain models for Sew4Mi.
//!
//! Orders and the production milestones tailors record against them. Each model
//! implements the core traits from `sm-core` (Entity, Identifiable, etc.)

pub use sm_core::traits::{Entity, Id, Identifiable, OrderScoped, Timestamped};

pub mod milestone;
pub mod order;

pub use milestone::{MilestoneApprovalStatus, MilestoneStage, OrderMilestone};
pub use order::{Order, OrderStatus};
