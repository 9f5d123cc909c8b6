//! In-process notification backend.
//!
//! Simulates an OS scheduler: it assigns UUID identifiers, keeps entries
//! across reconciler instances, and can be told to deny permission or fail
//! individual calls. Used by tests and the CLI probe.

use crate::config::{PresentationOptions, ReminderChannel};
use crate::model::habit::HabitId;
use crate::model::reminder::{DailyTrigger, ReminderPayload, ReminderRequest, ScheduledReminder};
use crate::notify::backend::{
    BackendError, BackendResult, NotificationBackend, Platform, PermissionStatus,
};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct MemoryEntry {
    identifier: String,
    request: ReminderRequest,
}

#[derive(Debug)]
struct MemoryState {
    platform: Platform,
    permission: PermissionStatus,
    answer_on_request: PermissionStatus,
    permission_requests: usize,
    presentation: Option<PresentationOptions>,
    channels: Vec<ReminderChannel>,
    entries: Vec<MemoryEntry>,
    fail_schedule_for: BTreeSet<HabitId>,
    fail_list: bool,
    fail_cancel_all: bool,
}

/// Thread-safe simulated OS notification scheduler.
#[derive(Debug)]
pub struct InMemoryNotificationBackend {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryNotificationBackend {
    fn default() -> Self {
        Self::new(Platform::Android, PermissionStatus::Granted)
    }
}

impl InMemoryNotificationBackend {
    /// Creates a backend with the given platform and initial permission.
    ///
    /// A prompt grants permission unless `answer_requests_with` says otherwise.
    pub fn new(platform: Platform, permission: PermissionStatus) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                platform,
                permission,
                answer_on_request: PermissionStatus::Granted,
                permission_requests: 0,
                presentation: None,
                channels: Vec::new(),
                entries: Vec::new(),
                fail_schedule_for: BTreeSet::new(),
                fail_list: false,
                fail_cancel_all: false,
            }),
        }
    }

    /// Sets the answer a simulated user gives to the next prompts.
    pub fn answer_requests_with(&self, status: PermissionStatus) {
        self.state().answer_on_request = status;
    }

    /// Overrides the current permission, e.g. to simulate a revoke in settings.
    pub fn set_permission(&self, status: PermissionStatus) {
        self.state().permission = status;
    }

    /// Makes `schedule` fail for reminders carrying this habit id.
    pub fn fail_schedule_for(&self, habit_id: HabitId) {
        self.state().fail_schedule_for.insert(habit_id);
    }

    pub fn set_list_failure(&self, enabled: bool) {
        self.state().fail_list = enabled;
    }

    pub fn set_cancel_all_failure(&self, enabled: bool) {
        self.state().fail_cancel_all = enabled;
    }

    /// Inserts an entry as if left behind by an earlier install or session.
    pub fn insert_stale(&self, payload: ReminderPayload, trigger: DailyTrigger) -> String {
        let identifier = Uuid::new_v4().to_string();
        self.state().entries.push(MemoryEntry {
            identifier: identifier.clone(),
            request: ReminderRequest {
                title: "stale".to_string(),
                body: "stale".to_string(),
                play_sound: false,
                trigger,
                payload,
            },
        });
        identifier
    }

    /// Returns the requests currently scheduled for one habit.
    pub fn requests_for(&self, habit_id: HabitId) -> Vec<ReminderRequest> {
        self.state()
            .entries
            .iter()
            .filter(|entry| entry.request.payload.habit_id == Some(habit_id))
            .map(|entry| entry.request.clone())
            .collect()
    }

    pub fn scheduled_count(&self) -> usize {
        self.state().entries.len()
    }

    pub fn permission_requests(&self) -> usize {
        self.state().permission_requests
    }

    pub fn channels(&self) -> Vec<ReminderChannel> {
        self.state().channels.clone()
    }

    pub fn presentation(&self) -> Option<PresentationOptions> {
        self.state().presentation
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationBackend for InMemoryNotificationBackend {
    fn platform(&self) -> Platform {
        self.state().platform
    }

    fn permission_status(&self) -> BackendResult<PermissionStatus> {
        Ok(self.state().permission)
    }

    fn request_permission(&self) -> BackendResult<PermissionStatus> {
        let mut state = self.state();
        state.permission_requests += 1;
        // Denied is sticky on real platforms: the OS stops showing the prompt.
        if state.permission == PermissionStatus::Undetermined {
            state.permission = state.answer_on_request;
        }
        Ok(state.permission)
    }

    fn set_presentation(&self, options: &PresentationOptions) -> BackendResult<()> {
        self.state().presentation = Some(*options);
        Ok(())
    }

    fn ensure_channel(&self, channel: &ReminderChannel) -> BackendResult<()> {
        let mut state = self.state();
        match state.channels.iter().position(|known| known.id == channel.id) {
            Some(index) => state.channels[index] = channel.clone(),
            None => state.channels.push(channel.clone()),
        }
        Ok(())
    }

    fn list_scheduled(&self) -> BackendResult<Vec<ScheduledReminder>> {
        let state = self.state();
        if state.fail_list {
            return Err(BackendError::new("list_failed", "scheduled list unavailable"));
        }
        Ok(state
            .entries
            .iter()
            .map(|entry| ScheduledReminder {
                identifier: entry.identifier.clone(),
                payload: entry.request.payload,
                trigger: Some(entry.request.trigger),
            })
            .collect())
    }

    fn schedule(&self, request: &ReminderRequest) -> BackendResult<String> {
        let mut state = self.state();
        if let Some(habit_id) = request.payload.habit_id {
            if state.fail_schedule_for.contains(&habit_id) {
                return Err(BackendError::new(
                    "quota_exceeded",
                    format!("cannot schedule reminder for habit {habit_id}"),
                ));
            }
        }
        let identifier = Uuid::new_v4().to_string();
        state.entries.push(MemoryEntry {
            identifier: identifier.clone(),
            request: request.clone(),
        });
        Ok(identifier)
    }

    fn cancel(&self, identifier: &str) -> BackendResult<()> {
        self.state()
            .entries
            .retain(|entry| entry.identifier != identifier);
        Ok(())
    }

    fn cancel_all(&self) -> BackendResult<()> {
        let mut state = self.state();
        if state.fail_cancel_all {
            return Err(BackendError::new("cancel_all_failed", "cannot clear schedule"));
        }
        state.entries.clear();
        Ok(())
    }
}
