use chrono::{NaiveDate, NaiveDateTime};
use yadavar_core::db::open_db_in_memory;
use yadavar_core::{
    AlertType, CustomDays, Priority, Reminder, ReminderCategory, ReminderListQuery,
    ReminderRepository, ReminderState, RepeatPattern, RepoError, SqliteReminderRepository,
    WeekdayIndex,
};
use rusqlite::Connection;
use uuid::Uuid;

fn at(d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

#[test]
fn create_and_get_preserves_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);

    let mut reminder = Reminder::new("ورزش صبحگاهی", at(5, 7), at(1, 8));
    reminder.description = Some("ورزش صبحگاهی در پارک".to_string());
    reminder.repeat = RepeatPattern::Custom(
        CustomDays::new([WeekdayIndex::FRIDAY, WeekdayIndex::SUNDAY]).unwrap(),
    );
    reminder.priority = Priority::Urgent;
    reminder.alert_type = AlertType::FullScreen;
    reminder.category = ReminderCategory::Task;
    reminder.tags = vec!["سلامت".to_string(), "صبح".to_string()];
    reminder.notes = Some("کفش ورزشی".to_string());
    reminder.related_person = Some("علی".to_string());
    reminder.snooze_count = 2;
    reminder.last_snoozed_at = Some(at(1, 7));

    let id = repo.create_reminder(&reminder).unwrap();
    let loaded = repo.get_reminder(id).unwrap().unwrap();
    assert_eq!(loaded, reminder);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    assert!(repo.get_reminder(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn blank_title_is_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let reminder = Reminder::new("  ", at(2, 9), at(1, 8));
    assert!(matches!(
        repo.create_reminder(&reminder),
        Err(RepoError::Validation(_))
    ));
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let reminder = Reminder::new("قبض", at(2, 9), at(1, 8));

    assert!(matches!(
        repo.update_reminder(&reminder),
        Err(RepoError::NotFound(id)) if id == reminder.id
    ));
    assert!(matches!(
        repo.delete_reminder(reminder.id),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn update_replaces_state_and_completion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let mut reminder = Reminder::new("قبض", at(2, 9), at(1, 8));
    repo.create_reminder(&reminder).unwrap();

    reminder.state = ReminderState::Completed;
    reminder.completed_at = Some(at(2, 9));
    repo.update_reminder(&reminder).unwrap();

    let loaded = repo.get_reminder(reminder.id).unwrap().unwrap();
    assert_eq!(loaded.state, ReminderState::Completed);
    assert_eq!(loaded.completed_at, Some(at(2, 9)));
}

#[test]
fn list_due_returns_only_scheduled_rows_in_time_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);

    let late = Reminder::new("دوم", at(2, 10), at(1, 8));
    let early = Reminder::new("اول", at(2, 9), at(1, 8));
    let future = Reminder::new("بعدی", at(3, 9), at(1, 8));
    let mut triggered = Reminder::new("قبلی", at(2, 8), at(1, 8));
    triggered.state = ReminderState::Triggered;
    for reminder in [&late, &early, &future, &triggered] {
        repo.create_reminder(reminder).unwrap();
    }

    let due: Vec<Uuid> = repo
        .list_due(at(2, 10))
        .unwrap()
        .into_iter()
        .map(|entry| entry.unwrap().id)
        .collect();
    assert_eq!(due, vec![early.id, late.id]);
    assert_eq!(repo.earliest_scheduled().unwrap(), Some(at(2, 9)));
}

#[test]
fn earliest_scheduled_is_none_when_nothing_is_scheduled() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    assert_eq!(repo.earliest_scheduled().unwrap(), None);
}

#[test]
fn list_supports_state_filter_and_paging() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    for hour in 9..14 {
        repo.create_reminder(&Reminder::new("کار", at(2, hour), at(1, 8)))
            .unwrap();
    }
    let mut done = Reminder::new("تمام", at(2, 15), at(1, 8));
    done.state = ReminderState::Completed;
    done.completed_at = Some(at(2, 15));
    repo.create_reminder(&done).unwrap();

    let scheduled = repo
        .list_reminders(&ReminderListQuery {
            state: Some(ReminderState::Scheduled),
            ..ReminderListQuery::default()
        })
        .unwrap();
    assert_eq!(scheduled.len(), 5);

    let page = repo
        .list_reminders(&ReminderListQuery {
            limit: Some(2),
            offset: 1,
            ..ReminderListQuery::default()
        })
        .unwrap();
    let hours: Vec<_> = page.iter().map(|reminder| reminder.trigger_at).collect();
    assert_eq!(hours, vec![at(2, 10), at(2, 11)]);

    let tail = repo
        .list_reminders(&ReminderListQuery {
            offset: 5,
            ..ReminderListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].id, done.id);

    let active = repo
        .list_reminders(&ReminderListQuery {
            active_only: true,
            ..ReminderListQuery::default()
        })
        .unwrap();
    assert_eq!(active.len(), 5);
}

#[test]
fn list_filters_by_category() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let mut bill = Reminder::new("قبض گاز", at(2, 9), at(1, 8));
    bill.category = ReminderCategory::Bill;
    repo.create_reminder(&bill).unwrap();
    repo.create_reminder(&Reminder::new("کار", at(2, 10), at(1, 8)))
        .unwrap();

    let bills = repo
        .list_reminders(&ReminderListQuery {
            category: Some(ReminderCategory::Bill),
            ..ReminderListQuery::default()
        })
        .unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].id, bill.id);
}

#[test]
fn corrupted_rows_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let reminder = Reminder::new("قبض", at(2, 9), at(1, 8));
    repo.create_reminder(&reminder).unwrap();
    corrupt_custom_days(&conn, reminder.id);

    assert!(matches!(
        repo.get_reminder(reminder.id),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn list_due_reports_corrupted_rows_alongside_healthy_ones() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let broken = Reminder::new("خراب", at(2, 8), at(1, 8));
    let healthy = Reminder::new("سالم", at(2, 9), at(1, 8));
    repo.create_reminder(&broken).unwrap();
    repo.create_reminder(&healthy).unwrap();
    corrupt_custom_days(&conn, broken.id);

    let entries = repo.list_due(at(2, 10)).unwrap();
    assert_eq!(entries.len(), 2);
    let invalid = entries[0].as_ref().unwrap_err();
    assert_eq!(invalid.id(), Some(broken.id));
    assert!(matches!(invalid.error, RepoError::InvalidData(_)));
    assert_eq!(entries[1].as_ref().unwrap().id, healthy.id);

    assert!(repo.park_invalid(&broken.id.to_string()).unwrap());
    assert!(!repo.park_invalid(&broken.id.to_string()).unwrap());
    assert_eq!(repo.list_due(at(2, 10)).unwrap().len(), 1);
}

#[test]
fn corrupted_tags_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let reminder = Reminder::new("خرید", at(2, 9), at(1, 8));
    repo.create_reminder(&reminder).unwrap();
    conn.execute(
        "UPDATE reminders SET tags = 'not json' WHERE id = ?1;",
        [reminder.id.to_string()],
    )
    .unwrap();

    assert!(matches!(
        repo.get_reminder(reminder.id),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn earliest_scheduled_skips_undecodable_times() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let reminder = Reminder::new("قبض", at(2, 9), at(1, 8));
    repo.create_reminder(&reminder).unwrap();
    conn.execute(
        "UPDATE reminders SET trigger_at = ?1 WHERE id = ?2;",
        rusqlite::params![i64::MAX, reminder.id.to_string()],
    )
    .unwrap();
    assert_eq!(repo.earliest_scheduled().unwrap(), None);

    let other = Reminder::new("کار", at(3, 9), at(1, 8));
    repo.create_reminder(&other).unwrap();
    assert_eq!(repo.earliest_scheduled().unwrap(), Some(at(3, 9)));
}

fn corrupt_custom_days(conn: &Connection, id: Uuid) {
    conn.execute(
        "UPDATE reminders SET repeat_kind = 'custom', custom_days = '9' WHERE id = ?1;",
        [id.to_string()],
    )
    .unwrap();
}
