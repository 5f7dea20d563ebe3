//! # sm-services
//!
//! Service objects for Sew4Mi orders.
//!
//! Each service validates its input through a contract before computing anything,
//! and reports through `ServiceResult`.

pub mod contracts;
pub mod escrow;
pub mod progress;

pub use escrow::{EscrowBreakdown, EscrowService, EscrowSplit, EscrowStage, EscrowStatus};
pub use progress::{OrderProgressParams, OrderProgressService, OrderProgressSummary};
pub use sm_core::result::ServiceResult;
