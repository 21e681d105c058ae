//! Reminder domain model.
//!
//! # Responsibility
//! - Define the persisted `Reminder` record and its closed enums.
//! - Define the transient `ParsedReminder` produced by the parser.
//!
//! # Invariants
//! - Every reminder is identified by a stable `ReminderId` that is never reused.
//! - Custom repeat days exist only inside `RepeatPattern::Custom` and are never empty.

pub mod parsed;
pub mod reminder;
pub mod repeat;
