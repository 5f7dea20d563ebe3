//! # sm-milestones
//!
//! Derives order progress from a snapshot of production milestones.
//!
//! Everything here is a pure function of the milestone list, a fixed stage table,
//! and (for date calculations) an explicit "now". Functions that read the clock have
//! an `_at` variant taking the instant as a parameter.

pub mod progress;
pub mod schedule;

pub use progress::*;
pub use schedule::{stage_table, StageInfo, StageSchedule};
