//! Recurring trigger engine.
//!
//! # Responsibility
//! - Own the reminder lifecycle: create, fire, snooze, complete, delete.
//! - Keep exactly one host wake-up armed for the earliest scheduled reminder.
//!
//! # Invariants
//! - One mutex guards the connection and armed-wake bookkeeping; every
//!   operation holds it for its whole read-modify-write.
//! - Scheduled reminders written here have `trigger_at > now`, except
//!   `resume` which only re-arms.
//! - Recurring reminders never reach `Completed`.
//! - Alerts are delivered after the lock is released, so sinks may call back
//!   into the engine.
//! - Once a write has committed the operation reports success. Re-arming the
//!   host wake-up afterwards is best effort: failures are logged (and listed
//!   in `WakeReport`), never turned into an error for the committed write.

use crate::config::EngineConfig;
use crate::db::DbError;
use crate::model::parsed::ParsedReminder;
use crate::calendar::persian_digits;
use crate::model::reminder::{
    AlertType, Priority, Reminder, ReminderCategory, ReminderId, ReminderState,
};
use crate::model::repeat::RepeatPattern;
use crate::parser::{parse_with, ParseFailure};
use crate::repo::reminder_repo::{
    RepoError, ReminderListQuery, ReminderRepository, SqliteReminderRepository,
};
use crate::service::alerts::{AlertSink, FiredEvent, WakeScheduler};
use crate::service::recurrence::{advance_past, next_occurrence};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug)]
pub enum EngineError {
    Parse(ParseFailure),
    NotFound(ReminderId),
    InvalidState {
        id: ReminderId,
        state: ReminderState,
        operation: &'static str,
    },
    InvalidSnooze,
    TriggerInPast {
        trigger_at: NaiveDateTime,
    },
    Storage(RepoError),
    LockPoisoned,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "reminder not found: {id}"),
            Self::InvalidState {
                id,
                state,
                operation,
            } => write!(f, "cannot {operation} reminder {id} in state {state}"),
            Self::InvalidSnooze => write!(f, "snooze duration must be positive"),
            Self::TriggerInPast { trigger_at } => {
                write!(f, "one-shot trigger {trigger_at} is not in the future")
            }
            Self::Storage(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "engine lock poisoned"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseFailure> for EngineError {
    fn from(value: ParseFailure) -> Self {
        Self::Parse(value)
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for EngineError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl EngineError {
    /// Stable machine-readable code for envelopes and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_failed",
            Self::NotFound(_) => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::InvalidSnooze => "invalid_snooze",
            Self::TriggerInPast { .. } => "trigger_in_past",
            Self::Storage(_) => "storage_failed",
            Self::LockPoisoned => "lock_poisoned",
        }
    }
}

/// Structured input for creating a reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub title: String,
    pub description: Option<String>,
    pub trigger_at: NaiveDateTime,
    pub repeat: RepeatPattern,
    pub priority: Priority,
    pub alert_type: AlertType,
    pub category: ReminderCategory,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub related_person: Option<String>,
}

impl NewReminder {
    pub fn new(title: impl Into<String>, trigger_at: NaiveDateTime) -> Self {
        Self {
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
        }
    }

    /// Yearly, high-priority birthday reminder for `person`.
    pub fn birthday(person: &str, trigger_at: NaiveDateTime) -> Self {
        let person = person.trim();
        Self {
            description: Some(format!("امروز تولد {person} است!")),
            repeat: RepeatPattern::Yearly,
            priority: Priority::High,
            category: ReminderCategory::Birthday,
            related_person: Some(person.to_string()),
            ..Self::new(format!("تولد {person}"), trigger_at)
        }
    }

    /// High-priority bill reminder, monthly when `monthly` is set.
    ///
    /// A non-zero `amount_toman` is shown in the description with Persian
    /// digits and thousands separators.
    pub fn bill(bill: &str, due_at: NaiveDateTime, amount_toman: u64, monthly: bool) -> Self {
        let description = (amount_toman > 0)
            .then(|| format!("مبلغ: {} تومان", persian_digits(&group_thousands(amount_toman))));
        Self {
            description,
            repeat: if monthly {
                RepeatPattern::Monthly
            } else {
                RepeatPattern::Once
            },
            priority: Priority::High,
            category: ReminderCategory::Bill,
            ..Self::new(format!("پرداخت {}", bill.trim()), due_at)
        }
    }

    /// One daily, urgent reminder per dose time.
    ///
    /// Each dose starts today, or tomorrow when its time has already passed.
    pub fn medicine(medicine: &str, doses: &[NaiveTime], now: NaiveDateTime) -> Vec<Self> {
        let medicine = medicine.trim();
        doses
            .iter()
            .map(|dose| {
                let mut first = now.date().and_time(*dose);
                if first <= now {
                    first += Duration::days(1);
                }
                Self {
                    description: Some(persian_digits(&format!("ساعت {}", dose.format("%H:%M")))),
                    repeat: RepeatPattern::Daily,
                    priority: Priority::Urgent,
                    category: ReminderCategory::Medicine,
                    ..Self::new(format!("مصرف دارو: {medicine}"), first)
                }
            })
            .collect()
    }

    /// Builds a request from parser output.
    ///
    /// The title is the first `title_max_chars` characters of the message; when
    /// that truncates, the full message becomes the description.
    pub fn from_parsed(parsed: &ParsedReminder, title_max_chars: usize) -> Self {
        let message = parsed.message.trim();
        let truncated = message.chars().count() > title_max_chars;
        let title = if truncated {
            message.chars().take(title_max_chars).collect::<String>()
        } else {
            message.to_string()
        };
        let mut request = Self::new(title.trim_end(), parsed.trigger_at);
        request.description = truncated.then(|| message.to_string());
        request.repeat = parsed.repeat.clone();
        request.priority = parsed.priority;
        request
    }

    fn into_reminder(self, trigger_at: NaiveDateTime, now: NaiveDateTime) -> Reminder {
        let mut reminder = Reminder::new(self.title, trigger_at, now);
        reminder.description = self.description;
        reminder.repeat = self.repeat;
        reminder.priority = self.priority;
        reminder.alert_type = self.alert_type;
        reminder.category = self.category;
        reminder.tags = self.tags;
        reminder.notes = self.notes;
        reminder.related_person = self.related_person;
        reminder
    }
}

/// `1234567` -> `1,234,567`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('٬');
        }
        grouped.push(digit);
    }
    grouped
}

/// Outcome of one wake-up pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WakeReport {
    /// Reminders moved to `Triggered` and handed to the sink.
    pub fired: Vec<FiredEvent>,
    /// Per-reminder failures; the pass continued past each of them.
    pub failures: Vec<WakeFailure>,
    /// Set when the next wake-up could not be armed after this pass.
    pub rearm_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeFailure {
    /// `None` when the stored id itself is unreadable.
    pub id: Option<ReminderId>,
    pub error: String,
}

/// Aggregate counters over all stored reminders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderStats {
    pub total: u32,
    /// Not completed.
    pub active: u32,
    pub completed: u32,
    /// Active reminders due on `now`'s date.
    pub today: u32,
    /// Active one-shot reminders whose time has passed.
    pub overdue: u32,
    /// Active reminders due after `now` within the upcoming window.
    pub upcoming: u32,
    /// `completed * 100 / total`, 0 when empty.
    pub completion_rate: u32,
}

struct EngineState {
    conn: Connection,
    armed_at: Option<NaiveDateTime>,
}

/// Reminder lifecycle owner. `Send + Sync` when `W` and `A` are.
pub struct TriggerEngine<W: WakeScheduler, A: AlertSink> {
    state: Mutex<EngineState>,
    scheduler: W,
    sink: A,
    config: EngineConfig,
}

impl<W: WakeScheduler, A: AlertSink> TriggerEngine<W, A> {
    /// Creates an engine with default config over a migrated connection.
    pub fn new(conn: Connection, scheduler: W, sink: A) -> Self {
        Self::with_config(conn, scheduler, sink, EngineConfig::default())
    }

    pub fn with_config(conn: Connection, scheduler: W, sink: A, config: EngineConfig) -> Self {
        Self {
            state: Mutex::new(EngineState {
                conn,
                armed_at: None,
            }),
            scheduler,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &W {
        &self.scheduler
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    /// Persists a new scheduled reminder.
    ///
    /// # Errors
    /// - `TriggerInPast` for a one-shot reminder not after `now`.
    /// - `Storage` when validation or the insert fails.
    pub fn create(&self, request: NewReminder, now: NaiveDateTime) -> EngineResult<Reminder> {
        let reminder = self.prepare(request, now)?;

        let mut state = self.lock()?;
        SqliteReminderRepository::new(&state.conn).create_reminder(&reminder)?;
        self.rearm_after_commit(&mut state, "create");

        log_created(&reminder);
        Ok(reminder)
    }

    /// Persists several reminders in one transaction: all of them or none.
    ///
    /// Used for multi-dose requests such as [`NewReminder::medicine`].
    pub fn create_all(
        &self,
        requests: Vec<NewReminder>,
        now: NaiveDateTime,
    ) -> EngineResult<Vec<Reminder>> {
        let reminders = requests
            .into_iter()
            .map(|request| self.prepare(request, now))
            .collect::<EngineResult<Vec<_>>>()?;

        let mut state = self.lock()?;
        let tx = state.conn.transaction().map_err(DbError::from)?;
        {
            let repo = SqliteReminderRepository::new(&tx);
            for reminder in &reminders {
                repo.create_reminder(reminder)?;
            }
        }
        tx.commit().map_err(DbError::from)?;
        self.rearm_after_commit(&mut state, "create");

        reminders.iter().for_each(log_created);
        Ok(reminders)
    }

    /// Parses an utterance and persists the resulting reminder.
    pub fn create_from_text(&self, text: &str, now: NaiveDateTime) -> EngineResult<Reminder> {
        let parsed = match parse_with(text, now, &self.config.parse_options()) {
            Ok(parsed) => parsed,
            Err(err) => {
                info!(
                    "event=reminder_parse module=engine status=rejected reason={:?} input_len={}",
                    err.reason(),
                    text.chars().count()
                );
                return Err(err.into());
            }
        };
        self.create(
            NewReminder::from_parsed(&parsed, self.config.title_max_chars),
            now,
        )
    }

    /// Fires every scheduled reminder due at `now`.
    ///
    /// Each due reminder is persisted as `Triggered` before its event is
    /// delivered. A failure on one reminder is recorded and the pass goes on;
    /// a row that cannot be decoded is parked as `triggered` so it stops
    /// coming due. Every persisted event is delivered even when re-arming
    /// fails afterwards.
    pub fn on_wake(&self, now: NaiveDateTime) -> EngineResult<WakeReport> {
        let mut report = WakeReport::default();
        let mut pending = Vec::new();
        {
            let mut state = self.lock()?;
            let repo = SqliteReminderRepository::new(&state.conn);
            for entry in repo.list_due(now)? {
                let mut reminder = match entry {
                    Ok(reminder) => reminder,
                    Err(invalid) => {
                        warn!(
                            "event=reminder_fire module=engine status=error reminder_id={} error_code=invalid_row error={}",
                            invalid.row_id, invalid.error
                        );
                        if let Err(err) = repo.park_invalid(&invalid.row_id) {
                            warn!(
                                "event=reminder_park module=engine status=error reminder_id={} error={}",
                                invalid.row_id, err
                            );
                        }
                        report.failures.push(WakeFailure {
                            id: invalid.id(),
                            error: invalid.error.to_string(),
                        });
                        continue;
                    }
                };
                reminder.state = ReminderState::Triggered;
                match repo.update_reminder(&reminder) {
                    Ok(()) => pending.push(FiredEvent::from_reminder(&reminder)),
                    Err(err) => {
                        warn!(
                            "event=reminder_fire module=engine status=error reminder_id={} error_code=persist_failed error={}",
                            reminder.id, err
                        );
                        report.failures.push(WakeFailure {
                            id: Some(reminder.id),
                            error: err.to_string(),
                        });
                    }
                }
            }
            report.rearm_error = self.rearm_after_commit(&mut state, "wake");
        }

        for event in pending {
            match self.sink.deliver(&event) {
                Ok(()) => {
                    info!(
                        "event=reminder_fire module=engine status=ok reminder_id={} presentation={:?}",
                        event.id,
                        event.presentation()
                    );
                    report.fired.push(event);
                }
                Err(err) => {
                    warn!(
                        "event=reminder_fire module=engine status=error reminder_id={} error_code=delivery_failed error={}",
                        event.id, err
                    );
                    report.failures.push(WakeFailure {
                        id: Some(event.id),
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Defers a reminder by `minutes` from `now` without touching its repeat rule.
    pub fn snooze(&self, id: ReminderId, minutes: u32, now: NaiveDateTime) -> EngineResult<Reminder> {
        if minutes == 0 {
            return Err(EngineError::InvalidSnooze);
        }

        let mut state = self.lock()?;
        let repo = SqliteReminderRepository::new(&state.conn);
        let mut reminder = load(&repo, id)?;
        ensure_active(&reminder, "snooze")?;

        reminder.trigger_at = now + Duration::minutes(i64::from(minutes));
        reminder.state = ReminderState::Scheduled;
        reminder.snooze_count = reminder.snooze_count.saturating_add(1);
        reminder.last_snoozed_at = Some(now);
        repo.update_reminder(&reminder)?;
        self.rearm_after_commit(&mut state, "snooze");

        info!(
            "event=reminder_snooze module=engine status=ok reminder_id={} minutes={} snooze_count={}",
            id, minutes, reminder.snooze_count
        );
        Ok(reminder)
    }

    /// Snoozes by the configured default duration.
    pub fn snooze_default(&self, id: ReminderId, now: NaiveDateTime) -> EngineResult<Reminder> {
        self.snooze(id, self.config.default_snooze_minutes, now)
    }

    /// Acknowledges a reminder.
    ///
    /// One-shot reminders become `Completed`; recurring ones are rescheduled
    /// to their next occurrence after `now`.
    pub fn complete(&self, id: ReminderId, now: NaiveDateTime) -> EngineResult<Reminder> {
        let mut state = self.lock()?;
        let repo = SqliteReminderRepository::new(&state.conn);
        let mut reminder = load(&repo, id)?;
        ensure_active(&reminder, "complete")?;

        if reminder.is_recurring() {
            let next = next_occurrence(reminder.trigger_at, &reminder.repeat, self.config.weekend);
            reminder.trigger_at = advance_past(next, &reminder.repeat, self.config.weekend, now);
            reminder.state = ReminderState::Scheduled;
        } else {
            reminder.state = ReminderState::Completed;
            reminder.completed_at = Some(now);
        }
        repo.update_reminder(&reminder)?;
        self.rearm_after_commit(&mut state, "complete");

        info!(
            "event=reminder_complete module=engine status=ok reminder_id={} state={}",
            id, reminder.state
        );
        Ok(reminder)
    }

    /// Removes a reminder in any state.
    pub fn delete(&self, id: ReminderId) -> EngineResult<()> {
        let mut state = self.lock()?;
        SqliteReminderRepository::new(&state.conn).delete_reminder(id)?;
        self.rearm_after_commit(&mut state, "delete");
        info!("event=reminder_delete module=engine status=ok reminder_id={id}");
        Ok(())
    }

    pub fn get(&self, id: ReminderId) -> EngineResult<Reminder> {
        let state = self.lock()?;
        load(&SqliteReminderRepository::new(&state.conn), id)
    }

    /// All reminders ordered by trigger time.
    pub fn list_all(&self) -> EngineResult<Vec<Reminder>> {
        self.list(&ReminderListQuery::default())
    }

    pub fn list(&self, query: &ReminderListQuery) -> EngineResult<Vec<Reminder>> {
        let state = self.lock()?;
        Ok(SqliteReminderRepository::new(&state.conn).list_reminders(query)?)
    }

    /// Re-arms the host wake-up after a restart. Returns the armed instant.
    ///
    /// Overdue reminders are left for the next `on_wake`, which the host
    /// receives immediately because the armed instant is already past.
    pub fn resume(&self, now: NaiveDateTime) -> EngineResult<Option<NaiveDateTime>> {
        let mut state = self.lock()?;
        let armed = self.rearm(&mut state, true)?;
        info!(
            "event=engine_resume module=engine status=ok armed={} overdue={}",
            armed.is_some(),
            armed.is_some_and(|at| at <= now)
        );
        Ok(armed)
    }

    /// Currently armed wake-up, if any.
    pub fn next_wake(&self) -> EngineResult<Option<NaiveDateTime>> {
        Ok(self.lock()?.armed_at)
    }

    /// Active reminders due on `now`'s calendar day, earliest first.
    pub fn today(&self, now: NaiveDateTime) -> EngineResult<Vec<Reminder>> {
        self.active_matching(|reminder| is_today(reminder, now))
    }

    /// Active one-shot reminders whose time has passed.
    pub fn overdue(&self, now: NaiveDateTime) -> EngineResult<Vec<Reminder>> {
        self.active_matching(|reminder| is_overdue(reminder, now))
    }

    /// Active reminders due after `now` and at most `days` days ahead.
    pub fn upcoming(&self, now: NaiveDateTime, days: u32) -> EngineResult<Vec<Reminder>> {
        let horizon = now + Duration::days(i64::from(days));
        self.active_matching(|reminder| is_upcoming(reminder, now, horizon))
    }

    pub fn stats(&self, now: NaiveDateTime) -> EngineResult<ReminderStats> {
        let reminders = self.list_all()?;
        let horizon = now + Duration::days(i64::from(self.config.upcoming_window_days));
        let mut stats = ReminderStats::default();

        for reminder in &reminders {
            stats.total += 1;
            if reminder.state == ReminderState::Completed {
                stats.completed += 1;
                continue;
            }
            stats.active += 1;
            stats.today += u32::from(is_today(reminder, now));
            stats.overdue += u32::from(is_overdue(reminder, now));
            stats.upcoming += u32::from(is_upcoming(reminder, now, horizon));
        }
        if stats.total > 0 {
            stats.completion_rate = stats.completed * 100 / stats.total;
        }

        Ok(stats)
    }

    fn active_matching(&self, keep: impl Fn(&Reminder) -> bool) -> EngineResult<Vec<Reminder>> {
        let mut reminders = self.list(&ReminderListQuery {
            active_only: true,
            ..ReminderListQuery::default()
        })?;
        reminders.retain(|reminder| keep(reminder));
        Ok(reminders)
    }

    /// Validates a request and resolves its first trigger.
    fn prepare(&self, request: NewReminder, now: NaiveDateTime) -> EngineResult<Reminder> {
        let trigger_at = if request.repeat.is_recurring() {
            advance_past(request.trigger_at, &request.repeat, self.config.weekend, now)
        } else if request.trigger_at <= now {
            return Err(EngineError::TriggerInPast {
                trigger_at: request.trigger_at,
            });
        } else {
            request.trigger_at
        };
        Ok(request.into_reminder(trigger_at, now))
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, EngineState>> {
        self.state.lock().map_err(|_| EngineError::LockPoisoned)
    }

    /// Points the host wake-up at the earliest scheduled reminder.
    fn rearm(
        &self,
        state: &mut EngineState,
        force: bool,
    ) -> EngineResult<Option<NaiveDateTime>> {
        let earliest = SqliteReminderRepository::new(&state.conn).earliest_scheduled()?;
        if force || earliest != state.armed_at {
            match earliest {
                Some(at) => self.scheduler.arm(at),
                None => self.scheduler.disarm(),
            }
            state.armed_at = earliest;
        }
        Ok(earliest)
    }

    /// Re-arms after a committed write. Failures are logged and returned
    /// for reporting; the write itself stands.
    fn rearm_after_commit(&self, state: &mut EngineState, operation: &str) -> Option<String> {
        match self.rearm(state, false) {
            Ok(_) => None,
            Err(err) => {
                warn!(
                    "event=wake_rearm module=engine status=error operation={operation} error_code={} error={err}",
                    err.code()
                );
                Some(err.to_string())
            }
        }
    }
}

fn log_created(reminder: &Reminder) {
    info!(
        "event=reminder_create module=engine status=ok reminder_id={} category={} recurring={} priority={} title_len={}",
        reminder.id,
        reminder.category.as_str(),
        reminder.is_recurring(),
        reminder.priority.as_str(),
        reminder.title.chars().count()
    );
}

fn is_today(reminder: &Reminder, now: NaiveDateTime) -> bool {
    reminder.trigger_at.date() == now.date()
}

fn is_overdue(reminder: &Reminder, now: NaiveDateTime) -> bool {
    !reminder.is_recurring() && reminder.trigger_at < now
}

fn is_upcoming(reminder: &Reminder, now: NaiveDateTime, horizon: NaiveDateTime) -> bool {
    reminder.trigger_at > now && reminder.trigger_at <= horizon
}

fn load(repo: &impl ReminderRepository, id: ReminderId) -> EngineResult<Reminder> {
    repo.get_reminder(id)?.ok_or(EngineError::NotFound(id))
}

fn ensure_active(reminder: &Reminder, operation: &'static str) -> EngineResult<()> {
    if reminder.state == ReminderState::Completed {
        return Err(EngineError::InvalidState {
            id: reminder.id,
            state: reminder.state,
            operation,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{group_thousands, NewReminder, TriggerEngine};
    use crate::db::open_db_in_memory;
    use crate::model::parsed::ParsedReminder;
    use crate::model::reminder::{Priority, ReminderCategory};
    use crate::model::repeat::RepeatPattern;
    use crate::service::alerts::{AlertError, AlertSink, FiredEvent, WakeScheduler};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use std::cell::RefCell;

    #[derive(Default)]
    struct Timer(RefCell<Vec<Option<NaiveDateTime>>>);

    impl WakeScheduler for Timer {
        fn arm(&self, at: NaiveDateTime) {
            self.0.borrow_mut().push(Some(at));
        }

        fn disarm(&self) {
            self.0.borrow_mut().push(None);
        }
    }

    #[derive(Default)]
    struct Sink(RefCell<Vec<FiredEvent>>);

    impl AlertSink for Sink {
        fn deliver(&self, event: &FiredEvent) -> Result<(), AlertError> {
            self.0.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn long_messages_are_truncated_into_the_title() {
        let parsed = ParsedReminder {
            message: "ابتدای یک پیام طولانی که باید کوتاه شود".to_string(),
            trigger_at: at(2, 9),
            repeat: RepeatPattern::Once,
            priority: Priority::High,
            offset_minutes: None,
        };
        let request = NewReminder::from_parsed(&parsed, 6);
        assert_eq!(request.title, "ابتدای");
        assert_eq!(request.description.as_deref(), Some(parsed.message.as_str()));
        assert_eq!(request.priority, Priority::High);

        let short = NewReminder::from_parsed(&parsed, 100);
        assert_eq!(short.title, parsed.message);
        assert_eq!(short.description, None);
    }

    #[test]
    fn arming_tracks_the_earliest_scheduled_reminder() {
        let engine = TriggerEngine::new(
            open_db_in_memory().unwrap(),
            Timer::default(),
            Sink::default(),
        );
        let late = engine.create(NewReminder::new("دیر", at(3, 9)), at(1, 8)).unwrap();
        let early = engine.create(NewReminder::new("زود", at(2, 9)), at(1, 8)).unwrap();
        assert_eq!(engine.next_wake().unwrap(), Some(at(2, 9)));

        engine.delete(early.id).unwrap();
        assert_eq!(engine.next_wake().unwrap(), Some(at(3, 9)));
        engine.delete(late.id).unwrap();
        assert_eq!(engine.next_wake().unwrap(), None);

        let armed = engine.scheduler().0.borrow().clone();
        assert_eq!(armed, vec![Some(at(3, 9)), Some(at(2, 9)), Some(at(3, 9)), None]);
    }

    #[test]
    fn typed_requests_carry_category_defaults() {
        let birthday = NewReminder::birthday(" سارا ", at(5, 9));
        assert_eq!(birthday.title, "تولد سارا");
        assert_eq!(birthday.repeat, RepeatPattern::Yearly);
        assert_eq!(birthday.priority, Priority::High);
        assert_eq!(birthday.category, ReminderCategory::Birthday);
        assert_eq!(birthday.related_person.as_deref(), Some("سارا"));

        let bill = NewReminder::bill("قبض برق", at(5, 9), 1_250_000, true);
        assert_eq!(bill.title, "پرداخت قبض برق");
        assert_eq!(bill.repeat, RepeatPattern::Monthly);
        assert_eq!(bill.description.as_deref(), Some("مبلغ: ۱٬۲۵۰٬۰۰۰ تومان"));
        assert_eq!(NewReminder::bill("آب", at(5, 9), 0, false).description, None);
        assert_eq!(NewReminder::bill("آب", at(5, 9), 0, false).repeat, RepeatPattern::Once);
    }

    #[test]
    fn medicine_doses_start_at_the_next_matching_time() {
        let doses = [
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        ];
        let requests = NewReminder::medicine("آموکسی‌سیلین", &doses, at(1, 12));

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].trigger_at, at(2, 8));
        assert_eq!(requests[1].trigger_at, at(1, 20));
        assert_eq!(requests[0].description.as_deref(), Some("ساعت ۰۸:۰۰"));
        assert!(requests
            .iter()
            .all(|request| request.priority == Priority::Urgent
                && request.repeat == RepeatPattern::Daily
                && request.category == ReminderCategory::Medicine));
    }

    #[test]
    fn thousands_are_grouped_from_the_right() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1٬000");
        assert_eq!(group_thousands(12_345_678), "12٬345٬678");
    }
}
