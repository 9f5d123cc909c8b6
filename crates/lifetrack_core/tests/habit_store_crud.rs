use lifetrack_core::db::open_db_in_memory;
use lifetrack_core::{
    CreateHabitRequest, HabitStore, HabitValidationError, SqliteHabitStore, StoreError, TimePatch,
    UpdateHabitRequest,
};

fn create_request(title: &str, time: Option<&str>, user_id: i64) -> CreateHabitRequest {
    CreateHabitRequest {
        title: title.to_string(),
        notification_time: time.map(str::to_string),
        user_id,
    }
}

#[test]
fn create_returns_active_record_with_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);

    let habit = store
        .create(&create_request("  Meditar  ", Some("07:30"), 1))
        .unwrap();

    assert!(habit.id > 0);
    assert_eq!(habit.title, "Meditar");
    assert!(habit.is_active);
    assert_eq!(habit.notification_time.as_deref(), Some("07:30"));
    assert_eq!(habit.user_id, 1);
    assert!(habit.created_at.is_some());
    assert!(habit.updated_at.is_some());
}

#[test]
fn create_rejects_invalid_requests() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);

    let err = store.create(&create_request(" ", None, 1)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(HabitValidationError::EmptyTitle)
    ));

    let err = store
        .create(&create_request("Leer", Some("12:61"), 1))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(HabitValidationError::InvalidNotificationTime(_))
    ));
}

#[test]
fn fetch_all_scopes_by_user() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);
    let first = store.create(&create_request("Meditar", None, 1)).unwrap();
    store.create(&create_request("Leer", None, 2)).unwrap();
    let third = store.create(&create_request("Correr", None, 1)).unwrap();

    let ids = store
        .fetch_all(1)
        .unwrap()
        .into_iter()
        .map(|habit| habit.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![first.id, third.id]);
    assert!(store.fetch_all(3).unwrap().is_empty());
}

#[test]
fn update_applies_partial_patch() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);
    let habit = store
        .create(&create_request("Meditar", Some("07:30"), 1))
        .unwrap();

    let updated = store
        .update(
            habit.id,
            &UpdateHabitRequest {
                is_active: Some(false),
                ..UpdateHabitRequest::default()
            },
        )
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.title, "Meditar");
    assert_eq!(updated.notification_time.as_deref(), Some("07:30"));

    let cleared = store
        .update(
            habit.id,
            &UpdateHabitRequest {
                title: Some("Meditar 10 min".to_string()),
                notification_time: TimePatch::Clear,
                ..UpdateHabitRequest::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.title, "Meditar 10 min");
    assert_eq!(cleared.notification_time, None);
    assert!(!cleared.is_active);
}

#[test]
fn update_and_delete_unknown_habit_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);

    let err = store
        .update(99, &UpdateHabitRequest::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(99)));

    let err = store.delete(99).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(99)));
}

#[test]
fn delete_removes_habit() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);
    let habit = store.create(&create_request("Meditar", None, 1)).unwrap();

    store.delete(habit.id).unwrap();

    assert!(store.get(habit.id).unwrap().is_none());
    assert!(store.fetch_all(1).unwrap().is_empty());
}

#[test]
fn corrupted_rows_are_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO habits (user_id, title, notification_time) VALUES (1, 'Leer', '99:99');",
        [],
    )
    .unwrap();
    let store = SqliteHabitStore::new(&conn);

    let err = store.fetch_all(1).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}
