//! Reminder repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and due-time queries over the `reminders` table.
//! - Keep SQL and column encodings inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Reminder::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `list_due` only ever returns `Scheduled` rows, so deleted or completed
//!   reminders can never fire.
//! - `list_due` decodes rows one by one; a malformed row is handed back as
//!   an [`InvalidRow`] next to its healthy neighbours.

use crate::calendar::{from_epoch_ms, to_epoch_ms};
use crate::db::DbError;
use crate::model::reminder::{
    AlertType, Priority, Reminder, ReminderCategory, ReminderId, ReminderState,
    ReminderValidationError,
};
use crate::model::repeat::{CustomDays, RepeatPattern};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    trigger_at,
    repeat_kind,
    custom_days,
    priority,
    alert_type,
    category,
    tags,
    notes,
    related_person,
    state,
    created_at,
    completed_at,
    snooze_count,
    last_snoozed_at
FROM reminders";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for reminder persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReminderValidationError),
    Db(DbError),
    NotFound(ReminderId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "reminder not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted reminder data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ReminderValidationError> for RepoError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing reminders.
#[derive(Debug, Clone, Default)]
pub struct ReminderListQuery {
    pub state: Option<ReminderState>,
    /// Excludes `Completed` rows. Ignored when `state` is set.
    pub active_only: bool,
    pub category: Option<ReminderCategory>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// A due row that could not be decoded into a [`Reminder`].
#[derive(Debug)]
pub struct InvalidRow {
    /// Raw `reminders.id` text, which may itself be the broken column.
    pub row_id: String,
    pub error: RepoError,
}

impl InvalidRow {
    pub fn id(&self) -> Option<ReminderId> {
        Uuid::parse_str(&self.row_id).ok()
    }
}

/// One entry of a due scan.
pub type DueEntry = Result<Reminder, InvalidRow>;

/// Repository interface used by the trigger engine.
pub trait ReminderRepository {
    fn create_reminder(&self, reminder: &Reminder) -> RepoResult<ReminderId>;
    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>>;
    /// Replaces every mutable column of one reminder in a single statement.
    fn update_reminder(&self, reminder: &Reminder) -> RepoResult<()>;
    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()>;
    /// Lists reminders ordered by `trigger_at`, then id.
    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<Vec<Reminder>>;
    /// Scheduled reminders with `trigger_at <= at`, earliest first.
    ///
    /// Only a failing query is an `Err`; undecodable rows come back as
    /// `Err` entries inside the list.
    fn list_due(&self, at: NaiveDateTime) -> RepoResult<Vec<DueEntry>>;
    /// Moves an undecodable scheduled row to `triggered` so it stops being
    /// due. Returns whether a row changed.
    fn park_invalid(&self, row_id: &str) -> RepoResult<bool>;
    /// Earliest decodable `trigger_at` among scheduled reminders.
    ///
    /// Rows whose time cannot be decoded are skipped; once due they surface
    /// through `list_due` instead.
    fn earliest_scheduled(&self) -> RepoResult<Option<NaiveDateTime>>;
}

/// SQLite-backed reminder repository.
pub struct SqliteReminderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReminderRepository for SqliteReminderRepository<'_> {
    fn create_reminder(&self, reminder: &Reminder) -> RepoResult<ReminderId> {
        reminder.validate()?;

        self.conn.execute(
            "INSERT INTO reminders (
                id,
                title,
                description,
                trigger_at,
                repeat_kind,
                custom_days,
                priority,
                alert_type,
                category,
                tags,
                notes,
                related_person,
                state,
                created_at,
                completed_at,
                snooze_count,
                last_snoozed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
            params![
                reminder.id.to_string(),
                reminder.title.as_str(),
                reminder.description.as_deref(),
                to_epoch_ms(reminder.trigger_at),
                reminder.repeat.kind(),
                reminder.custom_days().map(custom_days_to_db),
                reminder.priority.as_str(),
                reminder.alert_type.as_str(),
                reminder.category.as_str(),
                tags_to_db(&reminder.tags)?,
                reminder.notes.as_deref(),
                reminder.related_person.as_deref(),
                reminder.state.as_str(),
                to_epoch_ms(reminder.created_at),
                reminder.completed_at.map(to_epoch_ms),
                reminder.snooze_count,
                reminder.last_snoozed_at.map(to_epoch_ms),
            ],
        )?;

        Ok(reminder.id)
    }

    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reminder_row(row)?));
        }

        Ok(None)
    }

    fn update_reminder(&self, reminder: &Reminder) -> RepoResult<()> {
        reminder.validate()?;

        let changed = self.conn.execute(
            "UPDATE reminders
             SET
                title = ?1,
                description = ?2,
                trigger_at = ?3,
                repeat_kind = ?4,
                custom_days = ?5,
                priority = ?6,
                alert_type = ?7,
                category = ?8,
                tags = ?9,
                notes = ?10,
                related_person = ?11,
                state = ?12,
                completed_at = ?13,
                snooze_count = ?14,
                last_snoozed_at = ?15,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?16;",
            params![
                reminder.title.as_str(),
                reminder.description.as_deref(),
                to_epoch_ms(reminder.trigger_at),
                reminder.repeat.kind(),
                reminder.custom_days().map(custom_days_to_db),
                reminder.priority.as_str(),
                reminder.alert_type.as_str(),
                reminder.category.as_str(),
                tags_to_db(&reminder.tags)?,
                reminder.notes.as_deref(),
                reminder.related_person.as_deref(),
                reminder.state.as_str(),
                reminder.completed_at.map(to_epoch_ms),
                reminder.snooze_count,
                reminder.last_snoozed_at.map(to_epoch_ms),
                reminder.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(reminder.id));
        }

        Ok(())
    }

    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM reminders WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<Vec<Reminder>> {
        let mut sql = format!("{REMINDER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(state) = query.state {
            sql.push_str(" AND state = ?");
            bind_values.push(Value::Text(state.as_str().to_string()));
        } else if query.active_only {
            sql.push_str(" AND state != 'completed'");
        }

        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }

        sql.push_str(" ORDER BY trigger_at ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reminders = Vec::new();

        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }

        Ok(reminders)
    }

    fn list_due(&self, at: NaiveDateTime) -> RepoResult<Vec<DueEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REMINDER_SELECT_SQL}
             WHERE state = 'scheduled'
               AND trigger_at <= ?1
             ORDER BY trigger_at ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([to_epoch_ms(at)])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let entry = parse_reminder_row(row).map_err(|error| InvalidRow {
                row_id: row.get::<_, String>("id").unwrap_or_default(),
                error,
            });
            entries.push(entry);
        }

        Ok(entries)
    }

    fn park_invalid(&self, row_id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE reminders
             SET state = 'triggered', updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1 AND state = 'scheduled';",
            [row_id],
        )?;
        Ok(changed > 0)
    }

    fn earliest_scheduled(&self) -> RepoResult<Option<NaiveDateTime>> {
        let mut stmt = self.conn.prepare(
            "SELECT trigger_at FROM reminders
             WHERE state = 'scheduled'
             ORDER BY trigger_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            if let Some(at) = row.get::<_, i64>(0).ok().and_then(from_epoch_ms) {
                return Ok(Some(at));
            }
        }
        Ok(None)
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<Reminder> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in reminders.id"))
    })?;

    let repeat_text: String = row.get("repeat_kind")?;
    let custom_days_text: Option<String> = row.get("custom_days")?;
    let repeat = parse_repeat(&repeat_text, custom_days_text.as_deref()).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid repeat `{repeat_text}` / custom days `{}` in reminders",
            custom_days_text.as_deref().unwrap_or("")
        ))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in reminders.priority"
        ))
    })?;

    let alert_text: String = row.get("alert_type")?;
    let alert_type = AlertType::parse(&alert_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid alert type `{alert_text}` in reminders.alert_type"
        ))
    })?;

    let state_text: String = row.get("state")?;
    let state = ReminderState::parse(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid state `{state_text}` in reminders.state"))
    })?;

    let category_text: String = row.get("category")?;
    let category = ReminderCategory::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in reminders.category"
        ))
    })?;

    let tags_text: String = row.get("tags")?;
    let tags = serde_json::from_str::<Vec<String>>(&tags_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid tags `{tags_text}` in reminders.tags: {err}"))
    })?;

    let snooze_count = row.get::<_, i64>("snooze_count")?;
    let snooze_count = u32::try_from(snooze_count).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid snooze_count `{snooze_count}` in reminders.snooze_count"
        ))
    })?;

    let reminder = Reminder {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        trigger_at: required_time(row, "trigger_at")?,
        repeat,
        priority,
        alert_type,
        category,
        tags,
        notes: row.get("notes")?,
        related_person: row.get("related_person")?,
        state,
        created_at: required_time(row, "created_at")?,
        completed_at: optional_time(row, "completed_at")?,
        snooze_count,
        last_snoozed_at: optional_time(row, "last_snoozed_at")?,
    };
    reminder.validate()?;
    Ok(reminder)
}

fn required_time(row: &Row<'_>, column: &str) -> RepoResult<NaiveDateTime> {
    let ms: i64 = row.get(column)?;
    from_epoch_ms(ms).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid time `{ms}` in reminders.{column}"))
    })
}

fn optional_time(row: &Row<'_>, column: &str) -> RepoResult<Option<NaiveDateTime>> {
    match row.get::<_, Option<i64>>(column)? {
        Some(_) => required_time(row, column).map(Some),
        None => Ok(None),
    }
}

/// Custom days as ascending comma-separated indices, e.g. `0,5`.
fn custom_days_to_db(days: &CustomDays) -> String {
    days.iter()
        .map(|day| day.value().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn tags_to_db(tags: &[String]) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|err| RepoError::InvalidData(format!("unencodable tags: {err}")))
}

fn parse_repeat(kind: &str, custom_days: Option<&str>) -> Option<RepeatPattern> {
    let days = match (kind, custom_days) {
        ("custom", Some(text)) => text
            .split(',')
            .map(|part| part.trim().parse::<u8>().ok())
            .collect::<Option<Vec<_>>>()?,
        ("custom", None) | (_, Some(_)) => return None,
        (_, None) => Vec::new(),
    };
    RepeatPattern::from_kind(kind, &days)
}
