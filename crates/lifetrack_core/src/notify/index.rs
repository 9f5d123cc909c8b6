//! Lookup and cancellation over the OS scheduled-notification index.
//!
//! # Responsibility
//! - Correlate scheduled notifications to habits via payload `habit_id`.
//! - Cancel one habit's reminder or clear the whole index.
//!
//! # Invariants
//! - Cancelling a habit with no reminder succeeds and touches nothing else.
//! - Every entry carrying the habit id is cancelled, so leftovers from a
//!   crashed session cannot survive next to a fresh reminder.
//!
//! Lookup is a linear scan of the OS list. Reminder count is bounded by the
//! user's habit count, so no side table is kept.

use crate::model::habit::HabitId;
use crate::notify::backend::{BackendError, NotificationBackend};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// List/cancel failure while resolving a habit's reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    List(BackendError),
    Cancel {
        identifier: String,
        source: BackendError,
    },
}

impl LookupError {
    pub fn backend_error(&self) -> &BackendError {
        match self {
            Self::List(err) => err,
            Self::Cancel { source, .. } => source,
        }
    }
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(err) => write!(f, "failed to list scheduled reminders: {err}"),
            Self::Cancel { identifier, source } => {
                write!(f, "failed to cancel reminder `{identifier}`: {source}")
            }
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.backend_error())
    }
}

/// View over the OS-owned reminder index.
pub struct NotificationIndex {
    backend: Arc<dyn NotificationBackend>,
}

impl NotificationIndex {
    pub fn new(backend: Arc<dyn NotificationBackend>) -> Self {
        Self { backend }
    }

    /// Returns the identifier of the reminder scheduled for `habit_id`.
    pub fn find_by_habit_id(&self, habit_id: HabitId) -> Result<Option<String>, LookupError> {
        Ok(self.identifiers_for(habit_id)?.into_iter().next())
    }

    /// Cancels the reminder for `habit_id` when present.
    ///
    /// Returns the number of cancelled entries (normally 0 or 1).
    pub fn cancel_for_habit(&self, habit_id: HabitId) -> Result<usize, LookupError> {
        let identifiers = self.identifiers_for(habit_id)?;
        for identifier in &identifiers {
            self.backend
                .cancel(identifier)
                .map_err(|source| LookupError::Cancel {
                    identifier: identifier.clone(),
                    source,
                })?;
        }

        if identifiers.is_empty() {
            debug!("event=reminder_cancel module=notify status=skip habit_id={habit_id}");
        } else {
            info!(
                "event=reminder_cancel module=notify status=ok habit_id={} cancelled={}",
                habit_id,
                identifiers.len()
            );
        }
        Ok(identifiers.len())
    }

    /// Clears every scheduled notification regardless of origin.
    pub fn cancel_all(&self) -> Result<(), BackendError> {
        match self.backend.cancel_all() {
            Ok(()) => {
                info!("event=reminder_cancel_all module=notify status=ok");
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=reminder_cancel_all module=notify status=error error_code={}",
                    err.code
                );
                Err(err)
            }
        }
    }

    fn identifiers_for(&self, habit_id: HabitId) -> Result<Vec<String>, LookupError> {
        let scheduled = self.backend.list_scheduled().map_err(LookupError::List)?;
        Ok(scheduled
            .into_iter()
            .filter(|reminder| reminder.payload.habit_id == Some(habit_id))
            .map(|reminder| reminder.identifier)
            .collect())
    }
}
