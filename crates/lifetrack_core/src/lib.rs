//! Core domain logic for LifeTrack habit reminders.
//! This crate keeps one device's scheduled daily reminders consistent with
//! the authoritative habit list.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use config::{
    ChannelImportance, ConfigError, PresentationOptions, ReminderChannel, ReminderConfig,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::habit::{
    sort_by_created_desc, CreateHabitRequest, HabitId, HabitRecord, HabitValidationError,
    TimePatch, UpdateHabitRequest,
};
pub use model::reminder::{
    DailyTrigger, ReminderPayload, ReminderRequest, ReminderTime, ScheduledReminder,
    TimeParseError,
};
pub use notify::backend::{
    BackendError, BackendResult, NotificationBackend, Platform, PermissionStatus,
};
pub use notify::index::{LookupError, NotificationIndex};
pub use notify::memory::InMemoryNotificationBackend;
pub use notify::permission::PermissionGate;
pub use notify::plan::{
    plan_for_habit, plan_restore, HabitPlan, PlannedReminder, RejectedHabit, ReminderTarget,
    RestorePlan, SkipReason, SkippedHabit,
};
pub use notify::reconciler::{
    FailedHabit, Reconciler, ReminderError, ReminderResult, RestoreReport, RestoredReminder,
};
pub use repo::habit_repo::{HabitStore, SqliteHabitStore, StoreError, StoreResult};
pub use service::habit_service::{
    HabitChange, HabitService, LoadedHabits, ReminderOutcome, ServiceError, ServiceResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
