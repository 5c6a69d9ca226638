//! Warming schedule status and invariants.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a warming schedule.
///
/// Only `active` schedules are picked up by the dispatch cycle. `paused`
/// keeps the schedule and its counters but skips dispatch; `stopped` is the
/// terminal state before removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Active,
    Paused,
    Stopped,
}

impl ScheduleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

/// Validate that a schedule's warming day is sane (day numbering starts
/// at 1). Rejects corrupted rows before they reach the progression table.
pub fn validate_current_day(current_day: i32) -> Result<(), CoreError> {
    if current_day >= 1 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Warming day must be >= 1, got {current_day}"
        )))
    }
}
