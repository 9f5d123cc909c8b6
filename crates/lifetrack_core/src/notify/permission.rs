//! Notification permission gate.
//!
//! # Responsibility
//! - Check and request OS notification permission.
//! - Own the one-time reminder presentation setup (`init`).
//! - Provision the reminder delivery channel after a grant.
//!
//! # Invariants
//! - A user decline is a `false` result, never an error.
//! - Backend failures while checking or requesting are reported as "not granted".
//! - The channel is provisioned at most once per gate, and only on platforms
//!   that use channels.

use crate::config::{PresentationOptions, ReminderChannel, ReminderConfig};
use crate::notify::backend::{BackendError, NotificationBackend, PermissionStatus};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Gate in front of every scheduling operation.
pub struct PermissionGate {
    backend: Arc<dyn NotificationBackend>,
    channel: ReminderChannel,
    presentation: PresentationOptions,
    initialized: AtomicBool,
    channel_ready: AtomicBool,
}

impl PermissionGate {
    pub fn new(backend: Arc<dyn NotificationBackend>, config: &ReminderConfig) -> Self {
        Self {
            backend,
            channel: config.channel.clone(),
            presentation: config.presentation,
            initialized: AtomicBool::new(false),
            channel_ready: AtomicBool::new(false),
        }
    }

    /// Installs foreground presentation options.
    ///
    /// Call once during app start-up; repeated calls are no-ops. There is no
    /// teardown: scheduled reminders are persisted by the OS.
    ///
    /// # Errors
    /// - Returns the backend error when the options cannot be installed; a
    ///   later call retries.
    pub fn init(&self) -> Result<(), BackendError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        if let Err(err) = self.backend.set_presentation(&self.presentation) {
            error!(
                "event=reminder_init module=notify status=error error_code={}",
                err.code
            );
            return Err(err);
        }
        self.initialized.store(true, Ordering::Release);
        info!(
            "event=reminder_init module=notify status=ok platform={}",
            self.backend.platform().as_str()
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Ensures permission, prompting the user when not yet granted.
    ///
    /// Returns whether permission is granted after the call.
    pub fn request_permissions(&self) -> bool {
        let mut status = match self.backend.permission_status() {
            Ok(status) => status,
            Err(err) => {
                warn!(
                    "event=permission_request module=notify status=error stage=check error_code={}",
                    err.code
                );
                return false;
            }
        };

        if !status.is_granted() {
            status = match self.backend.request_permission() {
                Ok(status) => status,
                Err(err) => {
                    warn!(
                        "event=permission_request module=notify status=error stage=prompt error_code={}",
                        err.code
                    );
                    return false;
                }
            };
        }

        if status != PermissionStatus::Granted {
            info!("event=permission_request module=notify status=denied");
            return false;
        }

        self.provision_channel_once();
        info!("event=permission_request module=notify status=ok");
        true
    }

    /// Non-prompting check of the current grant.
    pub fn has_permissions(&self) -> bool {
        match self.backend.permission_status() {
            Ok(status) => status.is_granted(),
            Err(err) => {
                warn!(
                    "event=permission_check module=notify status=error error_code={}",
                    err.code
                );
                false
            }
        }
    }

    fn provision_channel_once(&self) {
        if !self.backend.platform().uses_channels() {
            return;
        }
        if self.channel_ready.load(Ordering::Acquire) {
            return;
        }
        // A failed channel setup does not revoke the grant; the next grant retries.
        match self.backend.ensure_channel(&self.channel) {
            Ok(()) => {
                self.channel_ready.store(true, Ordering::Release);
                info!(
                    "event=channel_provision module=notify status=ok channel_id={}",
                    self.channel.id
                );
            }
            Err(err) => warn!(
                "event=channel_provision module=notify status=error channel_id={} error_code={}",
                self.channel.id, err.code
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PermissionGate;
    use crate::config::ReminderConfig;
    use crate::notify::backend::{Platform, PermissionStatus};
    use crate::notify::memory::InMemoryNotificationBackend;
    use std::sync::Arc;

    #[test]
    fn init_installs_presentation_once() {
        let backend = Arc::new(InMemoryNotificationBackend::default());
        let gate = PermissionGate::new(backend.clone(), &ReminderConfig::default());
        assert!(!gate.is_initialized());

        gate.init().expect("init should succeed");
        gate.init().expect("repeated init should be a no-op");
        assert!(gate.is_initialized());
        assert!(backend.presentation().expect("presentation set").show_banner);
    }

    #[test]
    fn granted_request_does_not_prompt() {
        let backend = Arc::new(InMemoryNotificationBackend::new(
            Platform::Ios,
            PermissionStatus::Granted,
        ));
        let gate = PermissionGate::new(backend.clone(), &ReminderConfig::default());
        assert!(gate.request_permissions());
        assert_eq!(backend.permission_requests(), 0);
        assert!(backend.channels().is_empty(), "ios has no channels");
    }
}
