//! Engine configuration.
//!
//! # Responsibility
//! - Hold the user-tunable defaults of parsing and scheduling.
//! - Load them from JSON, filling absent keys with defaults.
//!
//! # Invariants
//! - A config returned by `from_json_str`/`load` has passed `validate()`.

use crate::model::repeat::WeekendConvention;
use crate::parser::ParseOptions;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minutes used by `snooze_default`.
    pub default_snooze_minutes: u32,
    /// Time of day used when an utterance names none.
    pub default_hour: u32,
    pub default_minute: u32,
    /// Titles longer than this are truncated; the full text moves to the description.
    pub title_max_chars: usize,
    pub weekend: WeekendConvention,
    /// Horizon of the "upcoming" bucket in `stats`.
    pub upcoming_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_snooze_minutes: 5,
            default_hour: 9,
            default_minute: 0,
            title_max_chars: 40,
            weekend: WeekendConvention::default(),
            upcoming_window_days: 7,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_snooze_minutes == 0 {
            return Err(ConfigError::Invalid(
                "default_snooze_minutes must be positive".to_string(),
            ));
        }
        if self.title_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "title_max_chars must be positive".to_string(),
            ));
        }
        if self.default_time().is_none() {
            return Err(ConfigError::Invalid(format!(
                "default time {}:{} is out of range",
                self.default_hour, self.default_minute
            )));
        }
        Ok(())
    }

    pub fn default_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.default_hour, self.default_minute, 0)
    }

    /// Parser options derived from this config.
    pub fn parse_options(&self) -> ParseOptions {
        let defaults = ParseOptions::default();
        ParseOptions {
            default_time: self.default_time().unwrap_or(defaults.default_time),
            weekend: self.weekend,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};
    use crate::model::repeat::WeekendConvention;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = EngineConfig::from_json_str(r#"{"default_snooze_minutes": 10}"#).unwrap();
        assert_eq!(config.default_snooze_minutes, 10);
        assert_eq!(config.title_max_chars, 40);
        assert_eq!(config.weekend, WeekendConvention::FridaySaturday);
    }

    #[test]
    fn weekend_convention_is_read_in_snake_case() {
        let config = EngineConfig::from_json_str(r#"{"weekend": "saturday_sunday"}"#).unwrap();
        assert_eq!(config.weekend, WeekendConvention::SaturdaySunday);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"default_snooze_minutes": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"default_hour": 24}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn parse_options_follow_config() {
        let config = EngineConfig {
            default_hour: 7,
            default_minute: 15,
            ..EngineConfig::default()
        };
        let options = config.parse_options();
        assert_eq!(options.default_time.to_string(), "07:15:00");
    }
}
