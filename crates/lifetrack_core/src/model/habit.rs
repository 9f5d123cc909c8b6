//! Habit domain model.
//!
//! # Responsibility
//! - Define the habit record shape supplied by the habit store.
//! - Define create/update request models used by store writes.
//! - Provide the newest-first ordering used before reminder restore.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `title` is non-empty after trimming.
//! - `notification_time`, when set, parses as `ReminderTime`.

use crate::model::reminder::{ReminderTime, TimeParseError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable habit identifier assigned by the habit store.
pub type HabitId = i64;

/// Validation errors for habit records and requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    EmptyTitle,
    InvalidNotificationTime(TimeParseError),
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "habit title must not be empty"),
            Self::InvalidNotificationTime(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HabitValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyTitle => None,
            Self::InvalidNotificationTime(err) => Some(err),
        }
    }
}

impl From<TimeParseError> for HabitValidationError {
    fn from(value: TimeParseError) -> Self {
        Self::InvalidNotificationTime(value)
    }
}

/// Habit record as returned by the habit store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    pub id: HabitId,
    pub title: String,
    /// Inactive habits never keep a live reminder.
    pub is_active: bool,
    /// `HH:MM` 24-hour string; `None` means no reminder configured.
    #[serde(default)]
    pub notification_time: Option<String>,
    pub user_id: i64,
    /// RFC 3339 timestamp assigned by the store.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl HabitRecord {
    /// Validates title and notification time.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        validate_title(&self.title)?;
        if let Some(time) = self.notification_time.as_deref() {
            time.parse::<ReminderTime>()?;
        }
        Ok(())
    }
}

/// Request model for creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub title: String,
    #[serde(default)]
    pub notification_time: Option<String>,
    pub user_id: i64,
}

impl CreateHabitRequest {
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        validate_title(&self.title)?;
        if let Some(time) = self.notification_time.as_deref() {
            time.parse::<ReminderTime>()?;
        }
        Ok(())
    }
}

/// Tri-state patch for the optional notification time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimePatch {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    Set(String),
    Clear,
}

/// Partial update for one habit. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateHabitRequest {
    pub title: Option<String>,
    pub is_active: Option<bool>,
    pub notification_time: TimePatch,
}

impl UpdateHabitRequest {
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if let Some(title) = self.title.as_deref() {
            validate_title(title)?;
        }
        if let TimePatch::Set(time) = &self.notification_time {
            time.parse::<ReminderTime>()?;
        }
        Ok(())
    }

    /// Applies this patch onto an existing record.
    pub fn apply_to(&self, habit: &mut HabitRecord) {
        if let Some(title) = &self.title {
            habit.title = title.trim().to_string();
        }
        if let Some(is_active) = self.is_active {
            habit.is_active = is_active;
        }
        match &self.notification_time {
            TimePatch::Keep => {}
            TimePatch::Set(time) => habit.notification_time = Some(time.clone()),
            TimePatch::Clear => habit.notification_time = None,
        }
    }
}

fn validate_title(title: &str) -> Result<(), HabitValidationError> {
    if title.trim().is_empty() {
        return Err(HabitValidationError::EmptyTitle);
    }
    Ok(())
}

/// Sorts habits newest first.
///
/// Records with `created_at` come before records without it. Ties and
/// records without timestamps fall back to `id` descending. RFC 3339 values
/// in the same offset compare correctly as strings.
pub fn sort_by_created_desc(habits: &mut [HabitRecord]) {
    habits.sort_by(|a, b| match (a.created_at.as_deref(), b.created_at.as_deref()) {
        (Some(left), Some(right)) => right.cmp(left).then_with(|| b.id.cmp(&a.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    });
}

#[cfg(test)]
mod tests {
    use super::{
        sort_by_created_desc, HabitRecord, HabitValidationError, TimePatch, UpdateHabitRequest,
    };

    fn habit(id: i64, created_at: Option<&str>) -> HabitRecord {
        HabitRecord {
            id,
            title: format!("habit {id}"),
            is_active: true,
            notification_time: None,
            user_id: 1,
            created_at: created_at.map(str::to_string),
            updated_at: None,
        }
    }

    #[test]
    fn sorts_newest_first_then_undated_by_id() {
        let mut habits = vec![
            habit(1, None),
            habit(2, Some("2025-01-01T08:00:00Z")),
            habit(3, None),
            habit(4, Some("2025-03-01T08:00:00Z")),
        ];
        sort_by_created_desc(&mut habits);
        let ids = habits.iter().map(|h| h.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn validate_rejects_blank_title_and_bad_time() {
        let mut record = habit(1, None);
        record.title = "   ".to_string();
        assert_eq!(record.validate(), Err(HabitValidationError::EmptyTitle));

        record.title = "Leer".to_string();
        record.notification_time = Some("25:00".to_string());
        assert!(matches!(
            record.validate(),
            Err(HabitValidationError::InvalidNotificationTime(_))
        ));
    }

    #[test]
    fn update_patch_sets_and_clears_time() {
        let mut record = habit(7, None);
        UpdateHabitRequest {
            notification_time: TimePatch::Set("06:45".to_string()),
            ..UpdateHabitRequest::default()
        }
        .apply_to(&mut record);
        assert_eq!(record.notification_time.as_deref(), Some("06:45"));

        UpdateHabitRequest {
            is_active: Some(false),
            notification_time: TimePatch::Clear,
            ..UpdateHabitRequest::default()
        }
        .apply_to(&mut record);
        assert_eq!(record.notification_time, None);
        assert!(!record.is_active);
    }

    #[test]
    fn serializes_with_camel_case_wire_fields() {
        let mut record = habit(3, Some("2025-01-01T08:00:00Z"));
        record.notification_time = Some("07:30".to_string());
        let json = serde_json::to_value(&record).expect("serialize habit");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["notificationTime"], "07:30");
        assert_eq!(json["userId"], 1);

        let decoded: HabitRecord = serde_json::from_value(json).expect("deserialize habit");
        assert_eq!(decoded, record);
    }
}
