//! Submission timestamps.
//!
//! Timestamps are stored as display strings, not instants. The format mirrors
//! the Indonesian locale rendering the sheet has always held
//! (`16/10/2026, 14.05.33`), in a fixed UTC offset.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::config::RecordConfig;

const FORMAT: &str = "%-d/%-m/%Y, %H.%M.%S";

/// Renders "now" as a row timestamp in a fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct Timestamper {
    offset: FixedOffset,
}

impl Timestamper {
    /// Build from an offset in minutes east of UTC.
    ///
    /// Out-of-range offsets fall back to UTC.
    pub fn new(offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            tracing::warn!(offset_minutes, "UTC offset out of range, using UTC");
            Utc.fix()
        });
        Self { offset }
    }

    pub fn from_config(config: &RecordConfig) -> Self {
        Self::new(config.utc_offset_minutes)
    }

    /// Current time as a row timestamp.
    pub fn now(&self) -> String {
        self.format(Utc::now())
    }

    pub fn format(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(FORMAT).to_string()
    }
}

impl Default for Timestamper {
    fn default() -> Self {
        Self::from_config(&RecordConfig::default())
    }
}
