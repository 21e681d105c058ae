//! Persian temporal expression parser.
//!
//! # Responsibility
//! - Turn one free-form Persian utterance plus a reference instant into a
//!   [`ParsedReminder`]: message, trigger time, repeat rule and priority.
//! - Report unusable input as a [`ParseFailure`] carrying help text for the UI.
//!
//! # Invariants
//! - Pure and deterministic in `(raw_text, now)`; no clock reads, no I/O.
//! - Every successful parse has `trigger_at > now`.
//! - The returned message is never empty.

mod lexicon;
mod temporal;

pub use temporal::{parse, parse_with};

use crate::model::repeat::WeekendConvention;
use chrono::NaiveTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Help text shown when an utterance cannot be turned into a reminder.
pub const GUIDANCE: &str = "برای تنظیم یادآوری، زمان و متن یادآوری را با هم بگویید. مثال:\n\
• فردا ساعت ۹ صبح یادم بنداز قبض پرداخت کنم\n\
• جمعه‌ها ۷ صبح بیدارم کن\n\
• هر روز ساعت ۲۲:۳۰ یادم بنداز مسواک بزنم\n\
• ۱۰ دقیقه دیگه یادم بنداز زیر گاز رو خاموش کنم\n\
• ۱۵ فروردین ساعت ۱۰ تولد مادر، مهم";

/// Tunables that do not change the phrase grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Time of day used when the utterance names none.
    pub default_time: NaiveTime,
    /// Weekend used when aligning `Weekdays`/`Weekends` to a first occurrence.
    pub weekend: WeekendConvention,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            weekend: WeekendConvention::default(),
        }
    }
}

/// Why an utterance was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailureReason {
    /// Nothing was left to remind about after temporal phrases were removed.
    EmptyMessage,
    /// An explicit date resolved to an instant that is not in the future.
    ElapsedDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    reason: ParseFailureReason,
}

impl ParseFailure {
    pub fn new(reason: ParseFailureReason) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> ParseFailureReason {
        self.reason
    }

    /// Persian help text listing example phrasings.
    pub fn guidance(&self) -> &'static str {
        GUIDANCE
    }
}

impl Display for ParseFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            ParseFailureReason::EmptyMessage => write!(f, "no reminder message found in input"),
            ParseFailureReason::ElapsedDate => write!(f, "requested date is already in the past"),
        }
    }
}

impl Error for ParseFailure {}
