//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose reminder intake (free text or editor fields), lookup, list and
//!   lifecycle calls to Dart via FRB.
//! - Own the process-wide trigger engine and its host adapters.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary; failures come
//!   back inside response envelopes.
//! - Fired reminders are queued until the host drains them with
//!   `reminders_wake`.
//! - The host reads `next_wake_epoch_ms` after each call and mirrors it into
//!   the platform alarm.

use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;
use yadavar_core::db::open_db;
use yadavar_core::{
    core_version as core_version_inner, from_epoch_ms, init_logging as init_logging_inner,
    ping as ping_inner, to_epoch_ms, AlertError, AlertSink, AlertType, EngineConfig, EngineError,
    FiredEvent, JalaliDate, NewReminder, Presentation, Priority, Reminder, ReminderCategory,
    ReminderId, RepeatPattern, TriggerEngine, WakeScheduler,
};

const ENTRY_DB_FILE_NAME: &str = "yadavar_entry.sqlite3";
const DB_PATH_ENV: &str = "YADAVAR_DB_PATH";
const CONFIG_PATH_ENV: &str = "YADAVAR_CONFIG_PATH";

type FfiEngine = TriggerEngine<HostWakeTimer, QueuedAlerts>;

static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static ENGINE: OnceLock<FfiEngine> = OnceLock::new();

/// Remembers the single armed wake-up for the host to poll.
#[derive(Default)]
struct HostWakeTimer {
    armed: Mutex<Option<NaiveDateTime>>,
}

impl HostWakeTimer {
    fn armed(&self) -> Option<NaiveDateTime> {
        self.armed.lock().map(|armed| *armed).unwrap_or(None)
    }
}

impl WakeScheduler for HostWakeTimer {
    fn arm(&self, at: NaiveDateTime) {
        if let Ok(mut armed) = self.armed.lock() {
            *armed = Some(at);
        }
        info!(
            "event=wake_arm module=ffi status=ok at_ms={}",
            to_epoch_ms(at)
        );
    }

    fn disarm(&self) {
        if let Ok(mut armed) = self.armed.lock() {
            *armed = None;
        }
        info!("event=wake_disarm module=ffi status=ok");
    }
}

/// Holds fired events until Dart collects them.
#[derive(Default)]
struct QueuedAlerts {
    queue: Mutex<Vec<FiredEvent>>,
}

impl QueuedAlerts {
    fn drain(&self) -> Vec<FiredEvent> {
        self.queue
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

impl AlertSink for QueuedAlerts {
    fn deliver(&self, event: &FiredEvent) -> Result<(), AlertError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| AlertError::new("alert queue poisoned"))?;
        queue.push(event.clone());
        Ok(())
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Result envelope for reminder mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderActionResponse {
    pub ok: bool,
    /// Affected reminder ID.
    pub reminder_id: Option<String>,
    /// Next trigger of the affected reminder, epoch milliseconds.
    pub trigger_epoch_ms: Option<i64>,
    /// Diagnostic message, or Persian guidance when an utterance was not understood.
    pub message: String,
}

impl ReminderActionResponse {
    fn success(message: impl Into<String>, reminder: &Reminder) -> Self {
        Self {
            ok: true,
            reminder_id: Some(reminder.id.to_string()),
            trigger_epoch_ms: Some(to_epoch_ms(reminder.trigger_at)),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            reminder_id: None,
            trigger_epoch_ms: None,
            message: message.into(),
        }
    }
}

/// Structured reminder input from editor screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderDraft {
    pub title: String,
    pub description: Option<String>,
    /// First trigger, local wall-clock epoch milliseconds.
    pub trigger_epoch_ms: i64,
    /// `once|daily|weekly|monthly|yearly|weekdays|weekends|custom`.
    pub repeat: String,
    /// Weekday indices (Sunday=0 .. Saturday=6); only for `custom`.
    pub custom_days: Vec<u8>,
    /// `low|medium|high|urgent`; empty means `medium`.
    pub priority: String,
    /// `notification|full_screen`; empty means `notification`.
    pub alert_type: String,
    /// Category name; empty means `simple`.
    pub category: String,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub related_person: Option<String>,
}

/// Reminder projection for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub reminder_id: String,
    pub title: String,
    pub description: Option<String>,
    pub trigger_epoch_ms: i64,
    /// Trigger date on the Jalali calendar, `YYYY/MM/DD`.
    pub jalali_date: String,
    /// Repeat kind, same names as [`ReminderDraft::repeat`].
    pub repeat: String,
    pub custom_days: Vec<u8>,
    /// Persian label of the repeat rule.
    pub repeat_label: String,
    /// `low|medium|high|urgent`.
    pub priority: String,
    pub alert_type: String,
    pub category: String,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub related_person: Option<String>,
    /// `scheduled|triggered|snoozed|completed`.
    pub state: String,
    pub snooze_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderGetResponse {
    pub item: Option<ReminderItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderListResponse {
    pub items: Vec<ReminderItem>,
    pub message: String,
}

/// Fired reminder handed to the host for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredReminderItem {
    pub reminder_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Whether to show the takeover alarm screen instead of a notification.
    pub full_screen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeResponse {
    pub fired: Vec<FiredReminderItem>,
    pub failed_count: u32,
    pub message: String,
}

/// Creates a reminder from one Persian utterance.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - On unrecognized input returns `ok=false` with guidance text in `message`.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_remind(text: String) -> ReminderActionResponse {
    let now = local_now();
    match with_engine(|engine| engine.create_from_text(text.as_str(), now)) {
        Ok(reminder) => ReminderActionResponse::success("Reminder scheduled.", &reminder),
        Err(FfiError::Engine(EngineError::Parse(failure))) => {
            ReminderActionResponse::failure(failure.guidance())
        }
        Err(err) => ReminderActionResponse::failure(format!("entry_remind failed: {err}")),
    }
}

/// Creates a reminder from editor fields.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown enum names or an out-of-range time return `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_create(draft: ReminderDraft) -> ReminderActionResponse {
    let now = local_now();
    let result = draft_to_request(draft)
        .and_then(|request| with_engine(|engine| engine.create(request, now)));
    match result {
        Ok(reminder) => ReminderActionResponse::success("Reminder scheduled.", &reminder),
        Err(err) => ReminderActionResponse::failure(format!("reminder_create failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn reminder_get(reminder_id: String) -> ReminderGetResponse {
    let result =
        parse_reminder_id(&reminder_id).and_then(|id| with_engine(|engine| engine.get(id)));
    match result {
        Ok(reminder) => ReminderGetResponse {
            item: Some(to_reminder_item(&reminder)),
            message: "Reminder loaded.".to_string(),
        },
        Err(err) => ReminderGetResponse {
            item: None,
            message: format!("reminder_get failed: {err}"),
        },
    }
}

/// Snoozes a reminder; `minutes = None` uses the configured default.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_snooze(reminder_id: String, minutes: Option<u32>) -> ReminderActionResponse {
    let now = local_now();
    let result = parse_reminder_id(&reminder_id).and_then(|id| {
        with_engine(|engine| match minutes {
            Some(minutes) => engine.snooze(id, minutes, now),
            None => engine.snooze_default(id, now),
        })
    });
    match result {
        Ok(reminder) => ReminderActionResponse::success("Reminder snoozed.", &reminder),
        Err(err) => ReminderActionResponse::failure(format!("reminder_snooze failed: {err}")),
    }
}

/// Completes a one-shot reminder or advances a recurring one.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_complete(reminder_id: String) -> ReminderActionResponse {
    let now = local_now();
    let result = parse_reminder_id(&reminder_id)
        .and_then(|id| with_engine(|engine| engine.complete(id, now)));
    match result {
        Ok(reminder) => ReminderActionResponse::success("Reminder completed.", &reminder),
        Err(err) => ReminderActionResponse::failure(format!("reminder_complete failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn reminder_delete(reminder_id: String) -> ReminderActionResponse {
    let result = parse_reminder_id(&reminder_id)
        .and_then(|id| with_engine(|engine| engine.delete(id)).map(|()| id));
    match result {
        Ok(id) => ReminderActionResponse {
            ok: true,
            reminder_id: Some(id.to_string()),
            trigger_epoch_ms: None,
            message: "Reminder deleted.".to_string(),
        },
        Err(err) => ReminderActionResponse::failure(format!("reminder_delete failed: {err}")),
    }
}

/// Lists every stored reminder ordered by trigger time.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_list() -> ReminderListResponse {
    list_response("reminders_list", with_engine(|engine| engine.list_all()))
}

/// Active reminders due today.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_today() -> ReminderListResponse {
    let now = local_now();
    list_response("reminders_today", with_engine(|engine| engine.today(now)))
}

/// Active one-shot reminders whose time has passed.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_overdue() -> ReminderListResponse {
    let now = local_now();
    list_response("reminders_overdue", with_engine(|engine| engine.overdue(now)))
}

/// Active reminders within the next `days` days; `None` uses the configured window.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_upcoming(days: Option<u32>) -> ReminderListResponse {
    let now = local_now();
    list_response(
        "reminders_upcoming",
        with_engine(|engine| {
            engine.upcoming(now, days.unwrap_or(engine.config().upcoming_window_days))
        }),
    )
}

/// Fires due reminders and drains every queued fired event.
///
/// # FFI contract
/// - Call when the platform alarm set from `next_wake_epoch_ms` goes off.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_wake() -> WakeResponse {
    let now = local_now();
    let report = match with_engine(|engine| engine.on_wake(now)) {
        Ok(report) => report,
        Err(err) => {
            return WakeResponse {
                fired: Vec::new(),
                failed_count: 0,
                message: format!("reminders_wake failed: {err}"),
            };
        }
    };

    let fired = ENGINE
        .get()
        .map(|engine| engine.sink().drain())
        .unwrap_or_default()
        .iter()
        .map(to_fired_item)
        .collect::<Vec<_>>();
    let failed_count = u32::try_from(report.failures.len()).unwrap_or(u32::MAX);
    if let Some(err) = &report.rearm_error {
        warn!(
            "event=reminders_wake module=ffi status=degraded error_code=rearm_failed error={err}"
        );
    }
    WakeResponse {
        message: format!("Fired {} reminder(s), {failed_count} failure(s).", fired.len()),
        fired,
        failed_count,
    }
}

/// Epoch milliseconds of the armed wake-up, `None` when nothing is scheduled.
#[flutter_rust_bridge::frb(sync)]
pub fn next_wake_epoch_ms() -> Option<i64> {
    with_engine(|engine| Ok(engine.scheduler().armed()))
        .ok()
        .flatten()
        .map(to_epoch_ms)
}

#[derive(Debug)]
enum FfiError {
    Engine(EngineError),
    Setup(String),
}

impl std::fmt::Display for FfiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "{err}"),
            Self::Setup(message) => write!(f, "{message}"),
        }
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse_reminder_id(raw: &str) -> Result<ReminderId, FfiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| FfiError::Setup(format!("invalid reminder id `{}`", raw.trim())))
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn load_config() -> EngineConfig {
    let Ok(raw) = std::env::var(CONFIG_PATH_ENV) else {
        return EngineConfig::default();
    };
    match EngineConfig::load(raw.trim()) {
        Ok(config) => config,
        Err(err) => {
            warn!("event=config_load module=ffi status=error error_code=config_invalid error={err}");
            EngineConfig::default()
        }
    }
}

fn open_engine() -> Result<FfiEngine, FfiError> {
    let conn = open_db(resolve_entry_db_path())
        .map_err(|err| FfiError::Setup(format!("entry DB open failed: {err}")))?;
    let engine = TriggerEngine::with_config(
        conn,
        HostWakeTimer::default(),
        QueuedAlerts::default(),
        load_config(),
    );
    engine.resume(local_now()).map_err(FfiError::Engine)?;
    Ok(engine)
}

fn with_engine<T>(f: impl FnOnce(&FfiEngine) -> Result<T, EngineError>) -> Result<T, FfiError> {
    let engine = match ENGINE.get() {
        Some(engine) => engine,
        None => {
            let opened = open_engine()?;
            // A racing caller may have won; its engine is kept and ours dropped.
            let _ = ENGINE.set(opened);
            ENGINE
                .get()
                .ok_or_else(|| FfiError::Setup("engine initialization failed".to_string()))?
        }
    };
    f(engine).map_err(FfiError::Engine)
}

fn list_response(operation: &str, result: Result<Vec<Reminder>, FfiError>) -> ReminderListResponse {
    match result {
        Ok(reminders) => {
            let items = reminders.iter().map(to_reminder_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No reminders.".to_string()
            } else {
                format!("Found {} reminder(s).", items.len())
            };
            ReminderListResponse { items, message }
        }
        Err(err) => ReminderListResponse {
            items: Vec::new(),
            message: format!("{operation} failed: {err}"),
        },
    }
}

/// Empty enum fields fall back to the model defaults.
fn draft_to_request(draft: ReminderDraft) -> Result<NewReminder, FfiError> {
    fn named<T: Default>(
        raw: &str,
        field: &str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<T, FfiError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(T::default());
        }
        parse(raw).ok_or_else(|| FfiError::Setup(format!("unknown {field} `{raw}`")))
    }

    let trigger_at = from_epoch_ms(draft.trigger_epoch_ms).ok_or_else(|| {
        FfiError::Setup(format!("trigger time out of range: {}", draft.trigger_epoch_ms))
    })?;
    let repeat_kind = match draft.repeat.trim() {
        "" => "once",
        kind => kind,
    };
    let repeat = RepeatPattern::from_kind(repeat_kind, &draft.custom_days).ok_or_else(|| {
        FfiError::Setup(format!(
            "invalid repeat `{repeat_kind}` with custom days {:?}",
            draft.custom_days
        ))
    })?;

    let mut request = NewReminder::new(draft.title, trigger_at);
    request.description = draft.description.filter(|text| !text.trim().is_empty());
    request.repeat = repeat;
    request.priority = named(&draft.priority, "priority", Priority::parse)?;
    request.alert_type = named(&draft.alert_type, "alert type", AlertType::parse)?;
    request.category = named(&draft.category, "category", ReminderCategory::parse)?;
    request.tags = draft.tags.iter().map(|tag| tag.trim().to_string()).collect();
    request.notes = draft.notes.filter(|text| !text.trim().is_empty());
    request.related_person = draft.related_person.filter(|text| !text.trim().is_empty());
    Ok(request)
}

fn to_reminder_item(reminder: &Reminder) -> ReminderItem {
    ReminderItem {
        reminder_id: reminder.id.to_string(),
        title: reminder.title.clone(),
        description: reminder.description.clone(),
        trigger_epoch_ms: to_epoch_ms(reminder.trigger_at),
        jalali_date: JalaliDate::from_gregorian(reminder.trigger_at.date()).to_string(),
        repeat: reminder.repeat.kind().to_string(),
        custom_days: reminder
            .custom_days()
            .map(|days| days.iter().map(|day| day.value()).collect())
            .unwrap_or_default(),
        repeat_label: reminder.repeat.persian_label().to_string(),
        priority: reminder.priority.as_str().to_string(),
        alert_type: reminder.alert_type.as_str().to_string(),
        category: reminder.category.as_str().to_string(),
        tags: reminder.tags.clone(),
        notes: reminder.notes.clone(),
        related_person: reminder.related_person.clone(),
        state: reminder.state.as_str().to_string(),
        snooze_count: reminder.snooze_count,
    }
}

fn to_fired_item(event: &FiredEvent) -> FiredReminderItem {
    FiredReminderItem {
        reminder_id: event.id.to_string(),
        title: event.title.clone(),
        description: event.description.clone(),
        full_screen: event.presentation() == Presentation::FullScreen,
    }
}
