use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// Settings that shape how the tracker reads the clock and renders status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Offset of the clinic's local day from UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// Joins the per-item day counts in a past-due status line.
    pub status_separator: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            status_separator: ", ".to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn utc_offset(&self) -> TrackerResult<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                TrackerError::Parse(format!(
                    "utc offset of {} minutes is out of range",
                    self.utc_offset_minutes
                ))
            })
    }
}
