//! Host-facing seams of the trigger engine: wake timers and alert delivery.
//!
//! # Responsibility
//! - Define what the engine hands to the host when a reminder fires.
//! - Define the traits the host implements to receive wake-ups and alerts.

use crate::model::reminder::{AlertType, Priority, Reminder, ReminderId};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How a fired reminder is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Notification,
    /// Takeover screen with sound and vibration.
    FullScreen,
}

/// Payload delivered to the [`AlertSink`] when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredEvent {
    pub id: ReminderId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub alert_type: AlertType,
}

impl FiredEvent {
    pub fn from_reminder(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id,
            title: reminder.title.clone(),
            description: reminder.description.clone(),
            priority: reminder.priority,
            alert_type: reminder.alert_type,
        }
    }

    /// High and urgent reminders always take over the screen.
    pub fn presentation(&self) -> Presentation {
        if self.priority >= Priority::High || self.alert_type == AlertType::FullScreen {
            Presentation::FullScreen
        } else {
            Presentation::Notification
        }
    }
}

/// Host timer facility. At most one wake-up is armed at a time.
pub trait WakeScheduler {
    /// Replaces any armed wake-up with one at `at`.
    fn arm(&self, at: chrono::NaiveDateTime);
    fn disarm(&self);
}

/// Receives fired reminders. Called after the engine lock is released.
pub trait AlertSink {
    fn deliver(&self, event: &FiredEvent) -> Result<(), AlertError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertError {
    message: String,
}

impl AlertError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for AlertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "alert delivery failed: {}", self.message)
    }
}

impl Error for AlertError {}
