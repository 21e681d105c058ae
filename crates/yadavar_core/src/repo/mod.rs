//! Repository layer for reminder persistence.
//!
//! # Responsibility
//! - Define the data access contract the trigger engine depends on.
//! - Isolate SQLite query details from scheduling logic.
//!
//! # Invariants
//! - Repository writes enforce `Reminder::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod reminder_repo;
