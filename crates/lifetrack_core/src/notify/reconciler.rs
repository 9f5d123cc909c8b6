//! Habit reminder reconciler.
//!
//! # Responsibility
//! - Schedule, cancel and restore daily habit reminders so the OS index
//!   matches the habit list fetched from the store.
//!
//! # Invariants
//! - At most one reminder exists per habit: scheduling always cancels first.
//! - Time validation happens before any backend call.
//! - `restore_all` never prompts for permission and clears the whole index
//!   before creating anything.
//! - One habit's failure during restore does not stop the others.
//!
//! Callers serialize mutations of the same habit; different habits may
//! interleave freely.

use crate::config::ReminderConfig;
use crate::model::habit::HabitId;
use crate::model::reminder::{
    DailyTrigger, ReminderPayload, ReminderRequest, ReminderTime, TimeParseError,
};
use crate::notify::backend::{BackendError, NotificationBackend};
use crate::notify::index::{LookupError, NotificationIndex};
use crate::notify::permission::PermissionGate;
use crate::notify::plan::{plan_restore, ReminderTarget, SkippedHabit};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type ReminderResult<T> = Result<T, ReminderError>;

/// Errors surfaced by reminder scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    /// The user declined or revoked notification permission.
    PermissionDenied,
    /// Malformed or out-of-range `HH:MM` input.
    InvalidTime(TimeParseError),
    /// The OS scheduler failed for an unrelated reason.
    SchedulingFailure(BackendError),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission not granted"),
            Self::InvalidTime(err) => write!(f, "{err}"),
            Self::SchedulingFailure(err) => write!(f, "failed to schedule reminder: {err}"),
        }
    }
}

impl Error for ReminderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PermissionDenied => None,
            Self::InvalidTime(err) => Some(err),
            Self::SchedulingFailure(err) => Some(err),
        }
    }
}

impl From<TimeParseError> for ReminderError {
    fn from(value: TimeParseError) -> Self {
        Self::InvalidTime(value)
    }
}

impl From<LookupError> for ReminderError {
    fn from(value: LookupError) -> Self {
        Self::SchedulingFailure(value.backend_error().clone())
    }
}

impl ReminderError {
    /// Stable code for logs and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::InvalidTime(_) => "invalid_time",
            Self::SchedulingFailure(_) => "scheduling_failure",
        }
    }
}

/// Reminder created by a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredReminder {
    pub habit_id: HabitId,
    pub identifier: String,
}

/// Habit whose reminder could not be created during a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedHabit {
    pub habit_id: HabitId,
    pub error: ReminderError,
}

/// Outcome of a full restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// `false` when the restore returned early without touching anything.
    pub permission_granted: bool,
    pub scheduled: Vec<RestoredReminder>,
    pub skipped: Vec<SkippedHabit>,
    pub failed: Vec<FailedHabit>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Keeps the OS reminder index in agreement with habit records.
pub struct Reconciler {
    backend: Arc<dyn NotificationBackend>,
    gate: PermissionGate,
    index: NotificationIndex,
    config: ReminderConfig,
}

impl Reconciler {
    pub fn new(backend: Arc<dyn NotificationBackend>, config: ReminderConfig) -> Self {
        Self {
            gate: PermissionGate::new(backend.clone(), &config),
            index: NotificationIndex::new(backend.clone()),
            backend,
            config,
        }
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    pub fn index(&self) -> &NotificationIndex {
        &self.index
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Schedules the daily reminder for one habit, replacing any existing one.
    ///
    /// Prompts for permission when it is not granted yet.
    ///
    /// # Errors
    /// - `InvalidTime` for malformed or out-of-range `time`, before any OS call.
    /// - `PermissionDenied` when permission is still missing after prompting.
    /// - `SchedulingFailure` when listing, cancelling or creating fails.
    pub fn schedule_for_habit(
        &self,
        habit_id: HabitId,
        title: &str,
        time: &str,
    ) -> ReminderResult<String> {
        let time = match time.parse::<ReminderTime>() {
            Ok(time) => time,
            Err(err) => {
                warn!(
                    "event=reminder_schedule module=notify status=error habit_id={} error_code=invalid_time",
                    habit_id
                );
                return Err(err.into());
            }
        };
        self.schedule_at(habit_id, title, time)
    }

    /// Cancels the reminder for one habit.
    ///
    /// Always succeeds: a missing reminder is a no-op and lookup failures are
    /// logged, not raised.
    pub fn cancel_for_habit(&self, habit_id: HabitId) {
        if let Err(err) = self.index.cancel_for_habit(habit_id) {
            warn!(
                "event=reminder_cancel module=notify status=error habit_id={} error_code={}",
                habit_id,
                err.backend_error().code
            );
        }
    }

    /// Rebuilds every reminder from a freshly fetched habit list.
    ///
    /// Returns immediately with `permission_granted = false` when permission
    /// is not granted; never prompts. Habits reached after a mid-restore
    /// revocation fail with `PermissionDenied`.
    ///
    /// # Errors
    /// - `SchedulingFailure` when the index cannot be cleared; nothing is
    ///   scheduled in that case. Per-habit failures are collected in the
    ///   report instead.
    pub fn restore_all(&self, targets: &[ReminderTarget]) -> ReminderResult<RestoreReport> {
        let started_at = Instant::now();
        if !self.gate.has_permissions() {
            info!(
                "event=reminder_restore module=notify status=skip reason=permission_missing habits={}",
                targets.len()
            );
            return Ok(RestoreReport::default());
        }

        self.index
            .cancel_all()
            .map_err(ReminderError::SchedulingFailure)?;

        let plan = plan_restore(targets);
        let mut report = RestoreReport {
            permission_granted: true,
            skipped: plan.skipped,
            ..RestoreReport::default()
        };

        for rejected in plan.rejected {
            warn!(
                "event=reminder_restore module=notify status=error habit_id={} error_code=invalid_time",
                rejected.habit_id
            );
            report.failed.push(FailedHabit {
                habit_id: rejected.habit_id,
                error: ReminderError::InvalidTime(rejected.error),
            });
        }

        for reminder in plan.schedule {
            // Permission may be revoked mid-batch; restore reports it instead of prompting.
            let result = if self.gate.has_permissions() {
                self.replace_reminder(reminder.habit_id, &reminder.title, reminder.time)
            } else {
                Err(ReminderError::PermissionDenied)
            };
            match result {
                Ok(identifier) => report.scheduled.push(RestoredReminder {
                    habit_id: reminder.habit_id,
                    identifier,
                }),
                Err(error) => report.failed.push(FailedHabit {
                    habit_id: reminder.habit_id,
                    error,
                }),
            }
        }

        let status = if report.is_complete() { "ok" } else { "partial" };
        info!(
            "event=reminder_restore module=notify status={} habits={} scheduled={} skipped={} failed={} duration_ms={}",
            status,
            targets.len(),
            report.scheduled.len(),
            report.skipped.len(),
            report.failed.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn schedule_at(
        &self,
        habit_id: HabitId,
        title: &str,
        time: ReminderTime,
    ) -> ReminderResult<String> {
        if !self.gate.has_permissions() && !self.gate.request_permissions() {
            warn!(
                "event=reminder_schedule module=notify status=error habit_id={} error_code=permission_denied",
                habit_id
            );
            return Err(ReminderError::PermissionDenied);
        }
        self.replace_reminder(habit_id, title, time)
    }

    /// Cancel-then-create without any permission handling.
    fn replace_reminder(
        &self,
        habit_id: HabitId,
        title: &str,
        time: ReminderTime,
    ) -> ReminderResult<String> {
        // Lookup failure is fatal here: scheduling blind could leave two reminders.
        self.index.cancel_for_habit(habit_id)?;

        let request = ReminderRequest {
            title: self.config.title.clone(),
            body: self.config.render_body(title),
            play_sound: self.config.play_sound,
            trigger: DailyTrigger::from(time),
            payload: ReminderPayload {
                habit_id: Some(habit_id),
            },
        };

        match self.backend.schedule(&request) {
            Ok(identifier) => {
                info!(
                    "event=reminder_schedule module=notify status=ok habit_id={} time={}",
                    habit_id, time
                );
                Ok(identifier)
            }
            Err(err) => {
                error!(
                    "event=reminder_schedule module=notify status=error habit_id={} error_code={}",
                    habit_id, err.code
                );
                Err(ReminderError::SchedulingFailure(err))
            }
        }
    }
}
