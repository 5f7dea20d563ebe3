//! Fixed stage table: progress weights and typical durations

use serde::Serialize;
use sm_models::MilestoneStage;

/// Cumulative progress percentage reached when each stage is approved
const STAGE_WEIGHTS: [u8; 7] = [10, 20, 30, 50, 70, 85, 100];

/// Typical working days a tailor spends on each stage
const STAGE_TYPICAL_DAYS: [u32; 7] = [1, 2, 3, 2, 2, 1, 1];

/// Schedule data attached to each production stage
pub trait StageSchedule: Copy {
    /// Progress percentage once this stage is approved
    fn weight(self) -> u8;

    /// Typical duration of this stage in days
    fn typical_days(self) -> u32;

    /// Days after order creation by which this stage is expected to be done
    fn expected_day_offset(self) -> u32;
}

impl StageSchedule for MilestoneStage {
    fn weight(self) -> u8 {
        STAGE_WEIGHTS[self.index()]
    }

    fn typical_days(self) -> u32 {
        STAGE_TYPICAL_DAYS[self.index()]
    }

    fn expected_day_offset(self) -> u32 {
        STAGE_TYPICAL_DAYS[..=self.index()].iter().sum()
    }
}

/// One row of the stage table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageInfo {
    pub stage: MilestoneStage,
    pub label: &'static str,
    pub weight: u8,
    pub typical_days: u32,
    pub expected_day_offset: u32,
}

/// The full stage table in canonical order
pub fn stage_table() -> Vec<StageInfo> {
    MilestoneStage::ALL
        .into_iter()
        .map(|stage| StageInfo {
            stage,
            label: stage.label(),
            weight: stage.weight(),
            typical_days: stage.typical_days(),
            expected_day_offset: stage.expected_day_offset(),
        })
        .collect()
}
