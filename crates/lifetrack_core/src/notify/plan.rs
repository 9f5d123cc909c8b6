//! Pure reminder planning.
//!
//! # Responsibility
//! - Decide, per habit, whether a reminder should exist and at what time.
//! - Build the full-rebuild plan used by restore.
//!
//! # Invariants
//! - A habit is planned for scheduling iff it is active and has a time that
//!   parses as `HH:MM`.
//! - Planning performs no I/O; executing a plan is the reconciler's job (or
//!   the host UI's, when it drives the platform scheduler itself).

use crate::model::habit::{HabitId, HabitRecord};
use crate::model::reminder::{ReminderTime, TimeParseError};
use serde::{Deserialize, Serialize};

/// Reminder-relevant projection of a habit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderTarget {
    pub id: HabitId,
    pub title: String,
    #[serde(default)]
    pub notification_time: Option<String>,
    pub is_active: bool,
}

impl From<&HabitRecord> for ReminderTarget {
    fn from(habit: &HabitRecord) -> Self {
        Self {
            id: habit.id,
            title: habit.title.clone(),
            notification_time: habit.notification_time.clone(),
            is_active: habit.is_active,
        }
    }
}

/// Why a habit gets no reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Inactive,
    NoTime,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::NoTime => "no_time",
        }
    }
}

/// One reminder to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReminder {
    pub habit_id: HabitId,
    pub title: String,
    pub time: ReminderTime,
}

/// Targeted decision for a single habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitPlan {
    /// Cancel any existing reminder, then create this one.
    Schedule(PlannedReminder),
    /// Make sure no reminder exists.
    Cancel(SkipReason),
    /// Active with a stored time that does not parse.
    Rejected(TimeParseError),
}

/// Decides the reminder state one habit should be in.
pub fn plan_for_habit(target: &ReminderTarget) -> HabitPlan {
    if !target.is_active {
        return HabitPlan::Cancel(SkipReason::Inactive);
    }
    let Some(raw_time) = target.notification_time.as_deref() else {
        return HabitPlan::Cancel(SkipReason::NoTime);
    };
    match raw_time.parse::<ReminderTime>() {
        Ok(time) => HabitPlan::Schedule(PlannedReminder {
            habit_id: target.id,
            title: target.title.clone(),
            time,
        }),
        Err(err) => HabitPlan::Rejected(err),
    }
}

/// Habit left without a reminder by a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedHabit {
    pub habit_id: HabitId,
    pub reason: SkipReason,
}

/// Habit whose stored time could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedHabit {
    pub habit_id: HabitId,
    pub error: TimeParseError,
}

/// Full rebuild plan: clear everything, then create `schedule`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestorePlan {
    pub schedule: Vec<PlannedReminder>,
    pub skipped: Vec<SkippedHabit>,
    pub rejected: Vec<RejectedHabit>,
}

/// Builds the restore plan for a freshly fetched habit list.
///
/// Input order is preserved inside each bucket; reminders are independent so
/// the order carries no meaning for the OS.
pub fn plan_restore(targets: &[ReminderTarget]) -> RestorePlan {
    let mut plan = RestorePlan::default();
    for target in targets {
        match plan_for_habit(target) {
            HabitPlan::Schedule(reminder) => plan.schedule.push(reminder),
            HabitPlan::Cancel(reason) => plan.skipped.push(SkippedHabit {
                habit_id: target.id,
                reason,
            }),
            HabitPlan::Rejected(error) => plan.rejected.push(RejectedHabit {
                habit_id: target.id,
                error,
            }),
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::{plan_for_habit, plan_restore, HabitPlan, ReminderTarget, SkipReason};

    fn target(id: i64, time: Option<&str>, is_active: bool) -> ReminderTarget {
        ReminderTarget {
            id,
            title: format!("habit {id}"),
            notification_time: time.map(str::to_string),
            is_active,
        }
    }

    #[test]
    fn inactive_wins_over_configured_time() {
        assert_eq!(
            plan_for_habit(&target(1, Some("18:00"), false)),
            HabitPlan::Cancel(SkipReason::Inactive)
        );
    }

    #[test]
    fn restore_plan_splits_targets_into_buckets() {
        let plan = plan_restore(&[
            target(1, Some("07:30"), true),
            target(2, None, true),
            target(3, Some("18:00"), false),
            target(4, Some("25:00"), true),
        ]);

        assert_eq!(plan.schedule.len(), 1);
        assert_eq!(plan.schedule[0].habit_id, 1);
        assert_eq!(plan.schedule[0].time.to_string(), "07:30");
        let skipped = plan
            .skipped
            .iter()
            .map(|s| (s.habit_id, s.reason))
            .collect::<Vec<_>>();
        assert_eq!(
            skipped,
            vec![(2, SkipReason::NoTime), (3, SkipReason::Inactive)]
        );
        assert_eq!(plan.rejected.len(), 1);
        assert_eq!(plan.rejected[0].habit_id, 4);
    }
}
