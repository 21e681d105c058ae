//! Persisted reminder entity.
//!
//! # Responsibility
//! - Define the canonical reminder record owned by the trigger engine.
//! - Provide validation shared by repository writes and reads.
//!
//! # Invariants
//! - `id` is stable and never reused for another reminder.
//! - `completed_at` is set if and only if `state == Completed`.
//! - Only `RepeatPattern::Once` reminders may reach `Completed`.
//! - Tags are trimmed, non-empty and unique within one reminder.

use crate::model::repeat::{CustomDays, RepeatPattern};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every reminder.
pub type ReminderId = Uuid;

/// Urgency of a reminder; drives how the alert is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// How the host should surface a fired reminder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Passive system notification.
    #[default]
    Notification,
    /// Takeover alarm screen with sound and vibration.
    FullScreen,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::FullScreen => "full_screen",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "notification" => Some(Self::Notification),
            "full_screen" => Some(Self::FullScreen),
            _ => None,
        }
    }
}

/// What a reminder is about. Typed constructors pick sensible defaults per
/// category; the engine itself treats every category the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderCategory {
    #[default]
    Simple,
    Recurring,
    Birthday,
    Anniversary,
    Bill,
    Medicine,
    Family,
    Shopping,
    Task,
}

impl ReminderCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Recurring => "recurring",
            Self::Birthday => "birthday",
            Self::Anniversary => "anniversary",
            Self::Bill => "bill",
            Self::Medicine => "medicine",
            Self::Family => "family",
            Self::Shopping => "shopping",
            Self::Task => "task",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "simple" => Some(Self::Simple),
            "recurring" => Some(Self::Recurring),
            "birthday" => Some(Self::Birthday),
            "anniversary" => Some(Self::Anniversary),
            "bill" => Some(Self::Bill),
            "medicine" => Some(Self::Medicine),
            "family" => Some(Self::Family),
            "shopping" => Some(Self::Shopping),
            "task" => Some(Self::Task),
            _ => None,
        }
    }

    pub fn persian_label(self) -> &'static str {
        match self {
            Self::Simple => "ساده",
            Self::Recurring => "تکراری",
            Self::Birthday => "تولد",
            Self::Anniversary => "سالگرد",
            Self::Bill => "پرداخت قبض",
            Self::Medicine => "دارو",
            Self::Family => "خانوادگی",
            Self::Shopping => "خرید",
            Self::Task => "کار روزانه",
        }
    }
}

/// Lifecycle state of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    /// Waiting for `trigger_at`.
    Scheduled,
    /// Fired and waiting for the user to complete or snooze.
    Triggered,
    /// Transient; the engine moves snoozed reminders straight back to `Scheduled`.
    Snoozed,
    /// Terminal for one-shot reminders.
    Completed,
}

impl ReminderState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Triggered => "triggered",
            Self::Snoozed => "snoozed",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "triggered" => Some(Self::Triggered),
            "snoozed" => Some(Self::Snoozed),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl Display for ReminderState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for reminder invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    BlankTitle,
    CompletedAtMismatch { state: ReminderState },
    RecurringCompleted,
    BlankTag,
    DuplicateTag(String),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "reminder title cannot be blank"),
            Self::CompletedAtMismatch { state } => {
                write!(f, "completed_at must be set only for completed reminders (state `{state}`)")
            }
            Self::RecurringCompleted => {
                write!(f, "recurring reminders cannot be completed")
            }
            Self::BlankTag => write!(f, "reminder tags cannot be blank"),
            Self::DuplicateTag(tag) => write!(f, "duplicate reminder tag `{tag}`"),
        }
    }
}

impl Error for ReminderValidationError {}

/// Canonical persisted reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub title: String,
    pub description: Option<String>,
    /// Next (or only) fire time, local wall-clock.
    pub trigger_at: NaiveDateTime,
    pub repeat: RepeatPattern,
    pub priority: Priority,
    pub alert_type: AlertType,
    pub category: ReminderCategory,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    /// Person the reminder is about, e.g. whose birthday it is.
    pub related_person: Option<String>,
    pub state: ReminderState,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub snooze_count: u32,
    pub last_snoozed_at: Option<NaiveDateTime>,
}

impl Reminder {
    /// Creates a scheduled one-shot reminder with a generated id.
    pub fn new(
        title: impl Into<String>,
        trigger_at: NaiveDateTime,
        created_at: NaiveDateTime,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, trigger_at, created_at)
    }

    /// Creates a scheduled one-shot reminder with a caller-provided id.
    pub fn with_id(
        id: ReminderId,
        title: impl Into<String>,
        trigger_at: NaiveDateTime,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            trigger_at,
            repeat: RepeatPattern::Once,
            priority: Priority::default(),
            alert_type: AlertType::default(),
            category: ReminderCategory::default(),
            tags: Vec::new(),
            notes: None,
            related_person: None,
            state: ReminderState::Scheduled,
            created_at,
            completed_at: None,
            snooze_count: 0,
            last_snoozed_at: None,
        }
    }

    pub fn custom_days(&self) -> Option<&CustomDays> {
        self.repeat.custom_days()
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat.is_recurring()
    }

    /// Validates cross-field invariants before persistence.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.title.trim().is_empty() {
            return Err(ReminderValidationError::BlankTitle);
        }
        let completed = self.state == ReminderState::Completed;
        if completed != self.completed_at.is_some() {
            return Err(ReminderValidationError::CompletedAtMismatch { state: self.state });
        }
        if completed && self.is_recurring() {
            return Err(ReminderValidationError::RecurringCompleted);
        }
        for (index, tag) in self.tags.iter().enumerate() {
            if tag.trim().is_empty() || tag.trim() != tag {
                return Err(ReminderValidationError::BlankTag);
            }
            if self.tags[..index].contains(tag) {
                return Err(ReminderValidationError::DuplicateTag(tag.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Reminder, ReminderCategory, ReminderState, ReminderValidationError};
    use crate::model::repeat::RepeatPattern;
    use chrono::NaiveDate;

    fn at(hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid datetime")
    }

    #[test]
    fn new_reminder_is_scheduled_once() {
        let reminder = Reminder::new("قبض", at(9), at(8));
        assert_eq!(reminder.state, ReminderState::Scheduled);
        assert_eq!(reminder.repeat, RepeatPattern::Once);
        assert!(reminder.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_title() {
        let reminder = Reminder::new("   ", at(9), at(8));
        assert_eq!(reminder.validate(), Err(ReminderValidationError::BlankTitle));
    }

    #[test]
    fn validate_ties_completed_at_to_state() {
        let mut reminder = Reminder::new("x", at(9), at(8));
        reminder.state = ReminderState::Completed;
        assert!(matches!(
            reminder.validate(),
            Err(ReminderValidationError::CompletedAtMismatch { .. })
        ));

        reminder.completed_at = Some(at(10));
        assert!(reminder.validate().is_ok());

        reminder.repeat = RepeatPattern::Daily;
        assert_eq!(
            reminder.validate(),
            Err(ReminderValidationError::RecurringCompleted)
        );
    }

    #[test]
    fn validate_rejects_blank_and_duplicate_tags() {
        let mut reminder = Reminder::new("خرید", at(9), at(8));
        reminder.tags = vec!["نان".to_string(), "شیر".to_string()];
        assert!(reminder.validate().is_ok());

        reminder.tags.push("نان".to_string());
        assert_eq!(
            reminder.validate(),
            Err(ReminderValidationError::DuplicateTag("نان".to_string()))
        );

        reminder.tags = vec![" ".to_string()];
        assert_eq!(reminder.validate(), Err(ReminderValidationError::BlankTag));
    }

    #[test]
    fn categories_map_to_stable_names() {
        for name in ["simple", "birthday", "bill", "medicine", "task"] {
            let category = ReminderCategory::parse(name).expect("known category");
            assert_eq!(category.as_str(), name);
        }
        assert_eq!(ReminderCategory::parse("location"), None);
        assert_eq!(ReminderCategory::Birthday.persian_label(), "تولد");
    }
}
