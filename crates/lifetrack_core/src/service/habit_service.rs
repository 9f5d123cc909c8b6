//! Habit use-case service.
//!
//! # Responsibility
//! - Run the habit screen flows: load + restore, create, toggle, edit time,
//!   disable reminder, delete.
//! - Pair each store mutation with the matching targeted reminder operation.
//!
//! # Invariants
//! - Time input is validated before any store write or OS call.
//! - Deleting or disabling cancels the reminder before touching the store.
//! - Toggle/edit flows update the store first, then align the reminder with
//!   the record the store returned.

use crate::model::habit::{
    sort_by_created_desc, CreateHabitRequest, HabitId, HabitRecord, HabitValidationError,
    TimePatch, UpdateHabitRequest,
};
use crate::model::reminder::ReminderTime;
use crate::notify::plan::{plan_for_habit, HabitPlan, ReminderTarget};
use crate::notify::reconciler::{Reconciler, ReminderError, RestoreReport};
use crate::repo::habit_repo::{HabitStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for habit use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    Reminder(ReminderError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Reminder(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Reminder(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ReminderError> for ServiceError {
    fn from(value: ReminderError) -> Self {
        Self::Reminder(value)
    }
}

impl From<HabitValidationError> for ServiceError {
    fn from(value: HabitValidationError) -> Self {
        match value {
            HabitValidationError::InvalidNotificationTime(err) => {
                Self::Reminder(ReminderError::InvalidTime(err))
            }
            other => Self::Store(StoreError::Validation(other)),
        }
    }
}

/// Reminder side effect of one habit mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    /// A reminder was (re)created with this OS identifier.
    Scheduled(String),
    /// Any existing reminder was cancelled.
    Cancelled,
}

/// Result of one habit mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitChange {
    pub habit: HabitRecord,
    pub reminder: ReminderOutcome,
}

/// Habit list loaded for display together with the restore outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedHabits {
    /// Newest first.
    pub habits: Vec<HabitRecord>,
    pub restore: RestoreReport,
}

/// Orchestrates the habit store and the reminder reconciler.
pub struct HabitService<S: HabitStore> {
    store: S,
    reconciler: Reconciler,
}

impl<S: HabitStore> HabitService<S> {
    pub fn new(store: S, reconciler: Reconciler) -> Self {
        Self { store, reconciler }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Fetches a user's habits, sorts them newest first and rebuilds reminders.
    pub fn load_habits(&self, user_id: i64) -> ServiceResult<LoadedHabits> {
        let mut habits = self.store.fetch_all(user_id)?;
        sort_by_created_desc(&mut habits);
        let targets = habits.iter().map(ReminderTarget::from).collect::<Vec<_>>();
        let restore = self.reconciler.restore_all(&targets)?;
        Ok(LoadedHabits { habits, restore })
    }

    /// Creates a habit; schedules its reminder when it was created with a time.
    pub fn create_habit(&self, request: &CreateHabitRequest) -> ServiceResult<HabitChange> {
        request.validate()?;
        let habit = self.store.create(request)?;
        self.align_reminder(habit)
    }

    /// Activates or deactivates a habit.
    pub fn set_active(&self, id: HabitId, is_active: bool) -> ServiceResult<HabitChange> {
        let habit = self.store.update(
            id,
            &UpdateHabitRequest {
                is_active: Some(is_active),
                ..UpdateHabitRequest::default()
            },
        )?;
        self.align_reminder(habit)
    }

    /// Sets or clears the daily reminder time.
    ///
    /// `None` behaves like `disable_notification`.
    pub fn set_notification_time(
        &self,
        id: HabitId,
        time: Option<&str>,
    ) -> ServiceResult<HabitChange> {
        let Some(time) = time else {
            return self.disable_notification(id);
        };
        let time = time.parse::<ReminderTime>().map_err(ReminderError::from)?;

        let habit = self.store.update(
            id,
            &UpdateHabitRequest {
                notification_time: TimePatch::Set(time.to_string()),
                ..UpdateHabitRequest::default()
            },
        )?;
        self.align_reminder(habit)
    }

    /// Cancels the reminder, then clears the stored time.
    pub fn disable_notification(&self, id: HabitId) -> ServiceResult<HabitChange> {
        self.reconciler.cancel_for_habit(id);
        let habit = self.store.update(
            id,
            &UpdateHabitRequest {
                notification_time: TimePatch::Clear,
                ..UpdateHabitRequest::default()
            },
        )?;
        Ok(HabitChange {
            habit,
            reminder: ReminderOutcome::Cancelled,
        })
    }

    /// Cancels the reminder, then deletes the habit.
    pub fn delete_habit(&self, id: HabitId) -> ServiceResult<()> {
        self.reconciler.cancel_for_habit(id);
        self.store.delete(id)?;
        Ok(())
    }

    fn align_reminder(&self, habit: HabitRecord) -> ServiceResult<HabitChange> {
        let reminder = match plan_for_habit(&ReminderTarget::from(&habit)) {
            HabitPlan::Schedule(planned) => {
                let identifier = self.reconciler.schedule_for_habit(
                    planned.habit_id,
                    &planned.title,
                    &planned.time.to_string(),
                )?;
                ReminderOutcome::Scheduled(identifier)
            }
            HabitPlan::Cancel(_) => {
                self.reconciler.cancel_for_habit(habit.id);
                ReminderOutcome::Cancelled
            }
            HabitPlan::Rejected(err) => return Err(ReminderError::InvalidTime(err).into()),
        };
        Ok(HabitChange { habit, reminder })
    }
}
