//! Parser output.

use crate::calendar::WeekdayIndex;
use crate::model::reminder::Priority;
use crate::model::repeat::{CustomDays, RepeatPattern};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Structured reminder intent extracted from one utterance.
///
/// Immutable once produced; `trigger_at` is always after the `now` the parser
/// was called with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReminder {
    /// Residual text after temporal, repeat, priority and trigger phrases are stripped.
    pub message: String,
    pub trigger_at: NaiveDateTime,
    pub repeat: RepeatPattern,
    pub priority: Priority,
    /// "N minutes before" offset that was applied, if any.
    pub offset_minutes: Option<u32>,
}

impl ParsedReminder {
    pub fn custom_days(&self) -> Option<&CustomDays> {
        self.repeat.custom_days()
    }

    /// Custom weekday indices as plain values, empty unless `repeat` is custom.
    pub fn custom_day_values(&self) -> Vec<u8> {
        self.custom_days()
            .map(|days| days.iter().map(WeekdayIndex::value).collect())
            .unwrap_or_default()
    }
}
