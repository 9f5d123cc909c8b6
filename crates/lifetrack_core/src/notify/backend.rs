//! OS notification subsystem contract.
//!
//! # Responsibility
//! - Define the abstract operation set the reminder core needs from the
//!   platform scheduler (permission, list, schedule, cancel).
//! - Keep platform plugins swappable behind one trait object.
//!
//! # Invariants
//! - `schedule` returns the identifier the OS assigned to the new entry.
//! - `cancel` of an unknown identifier is not an error.

use crate::config::{PresentationOptions, ReminderChannel};
use crate::model::reminder::{ReminderRequest, ScheduledReminder};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BackendResult<T> = Result<T, BackendError>;

/// Opaque failure reported by the OS notification subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// Stable machine-readable code, e.g. `quota_exceeded`.
    pub code: String,
    pub message: String,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification backend error [{}]: {}", self.code, self.message)
    }
}

impl Error for BackendError {}

/// Current OS notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Host platform family; decides whether delivery channels exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Other,
}

impl Platform {
    /// Whether reminders need a provisioned delivery channel.
    pub fn uses_channels(self) -> bool {
        matches!(self, Self::Android)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Other => "other",
        }
    }
}

/// Platform notification scheduler.
pub trait NotificationBackend: Send + Sync {
    fn platform(&self) -> Platform;

    /// Non-prompting permission check.
    fn permission_status(&self) -> BackendResult<PermissionStatus>;

    /// Prompts the user when the platform allows it and returns the outcome.
    fn request_permission(&self) -> BackendResult<PermissionStatus>;

    /// Configures how reminders are presented while the app is foregrounded.
    fn set_presentation(&self, options: &PresentationOptions) -> BackendResult<()>;

    /// Creates or updates a delivery channel.
    fn ensure_channel(&self, channel: &ReminderChannel) -> BackendResult<()>;

    /// Lists every scheduled notification, including ones this core did not create.
    fn list_scheduled(&self) -> BackendResult<Vec<ScheduledReminder>>;

    fn schedule(&self, request: &ReminderRequest) -> BackendResult<String>;

    fn cancel(&self, identifier: &str) -> BackendResult<()>;

    fn cancel_all(&self) -> BackendResult<()>;
}
