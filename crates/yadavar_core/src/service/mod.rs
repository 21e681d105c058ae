//! Reminder scheduling services.
//!
//! # Responsibility
//! - Drive the reminder lifecycle on top of the repository layer.
//! - Keep host integrations (timers, notifications) behind traits.

pub mod alerts;
pub mod recurrence;
pub mod trigger_engine;
