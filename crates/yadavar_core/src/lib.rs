//! Core domain logic for Yadavar, a Persian reminder assistant.
//!
//! Natural-language intake (`parser`), Jalali calendar support (`calendar`),
//! reminder persistence (`db`, `repo`) and the recurring trigger engine
//! (`service`) live here; UI and FFI layers are thin callers.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod parser;
pub mod repo;
pub mod service;

pub use calendar::{
    from_epoch_ms, gregorian_to_jalali, jalali_to_gregorian, normalize_digits, to_epoch_ms,
    JalaliDate, WeekdayIndex,
};
pub use config::{ConfigError, EngineConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::parsed::ParsedReminder;
pub use model::reminder::{
    AlertType, Priority, Reminder, ReminderCategory, ReminderId, ReminderState,
    ReminderValidationError,
};
pub use model::repeat::{CustomDays, RepeatPattern, WeekendConvention};
pub use parser::{parse, parse_with, ParseFailure, ParseFailureReason, ParseOptions};
pub use repo::reminder_repo::{
    DueEntry, InvalidRow, RepoError, RepoResult, ReminderListQuery, ReminderRepository,
    SqliteReminderRepository,
};
pub use service::alerts::{AlertError, AlertSink, FiredEvent, Presentation, WakeScheduler};
pub use service::recurrence::next_occurrence;
pub use service::trigger_engine::{
    EngineError, EngineResult, NewReminder, ReminderStats, TriggerEngine, WakeFailure,
    WakeReport,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
