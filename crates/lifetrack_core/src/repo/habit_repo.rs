//! Habit store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide fetch/create/update/delete over habit records.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate requests before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `fetch_all` returns rows in id order; callers sort for display.

use crate::db::DbError;
use crate::model::habit::{
    CreateHabitRequest, HabitId, HabitRecord, HabitValidationError, UpdateHabitRequest,
};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    is_active,
    notification_time,
    created_at,
    updated_at
FROM habits";

pub type StoreResult<T> = Result<T, StoreError>;

/// Habit store error.
#[derive(Debug)]
pub enum StoreError {
    Validation(HabitValidationError),
    Db(DbError),
    NotFound(HabitId),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "habit not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted habit data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<HabitValidationError> for StoreError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Authoritative source of habit records.
pub trait HabitStore {
    fn fetch_all(&self, user_id: i64) -> StoreResult<Vec<HabitRecord>>;
    fn create(&self, request: &CreateHabitRequest) -> StoreResult<HabitRecord>;
    fn update(&self, id: HabitId, request: &UpdateHabitRequest) -> StoreResult<HabitRecord>;
    fn delete(&self, id: HabitId) -> StoreResult<()>;
}

/// SQLite-backed habit store.
pub struct SqliteHabitStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads one habit by id.
    pub fn get(&self, id: HabitId) -> StoreResult<Option<HabitRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt.query_row([id], parse_habit_row).optional()?;
        row.transpose()
    }

    fn require(&self, id: HabitId) -> StoreResult<HabitRecord> {
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }
}

impl HabitStore for SqliteHabitStore<'_> {
    fn fetch_all(&self, user_id: i64) -> StoreResult<Vec<HabitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HABIT_SELECT_SQL} WHERE user_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)??);
        }
        Ok(habits)
    }

    fn create(&self, request: &CreateHabitRequest) -> StoreResult<HabitRecord> {
        request.validate()?;

        self.conn.execute(
            "INSERT INTO habits (user_id, title, notification_time) VALUES (?1, ?2, ?3);",
            params![
                request.user_id,
                request.title.trim(),
                request.notification_time.as_deref(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("event=habit_store_create module=repo status=ok habit_id={id}");
        self.require(id)
    }

    fn update(&self, id: HabitId, request: &UpdateHabitRequest) -> StoreResult<HabitRecord> {
        request.validate()?;

        let mut habit = self.require(id)?;
        request.apply_to(&mut habit);
        habit.validate()?;

        self.conn.execute(
            "UPDATE habits
             SET
                title = ?1,
                is_active = ?2,
                notification_time = ?3,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE id = ?4;",
            params![
                habit.title.as_str(),
                habit.is_active,
                habit.notification_time.as_deref(),
                id,
            ],
        )?;
        info!("event=habit_store_update module=repo status=ok habit_id={id}");
        self.require(id)
    }

    fn delete(&self, id: HabitId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!("event=habit_store_delete module=repo status=ok habit_id={id}");
        Ok(())
    }
}

/// Maps one row; the outer result carries SQLite errors, the inner one
/// carries data validation errors.
fn parse_habit_row(row: &Row<'_>) -> rusqlite::Result<StoreResult<HabitRecord>> {
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Ok(Err(StoreError::InvalidData(format!(
                "invalid is_active value `{other}` in habits.is_active"
            ))));
        }
    };

    let habit = HabitRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        is_active,
        notification_time: row.get("notification_time")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };

    match habit.validate() {
        Ok(()) => Ok(Ok(habit)),
        Err(err) => Ok(Err(StoreError::InvalidData(format!(
            "habit {}: {err}",
            habit.id
        )))),
    }
}
