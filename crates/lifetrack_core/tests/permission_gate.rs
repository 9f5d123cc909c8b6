use lifetrack_core::{
    ChannelImportance, InMemoryNotificationBackend, PermissionGate, PermissionStatus, Platform,
    ReminderConfig,
};
use std::sync::Arc;

fn gate_for(backend: &Arc<InMemoryNotificationBackend>) -> PermissionGate {
    PermissionGate::new(backend.clone(), &ReminderConfig::default())
}

#[test]
fn decline_is_false_not_error() {
    let backend = Arc::new(InMemoryNotificationBackend::new(
        Platform::Android,
        PermissionStatus::Undetermined,
    ));
    backend.answer_requests_with(PermissionStatus::Denied);
    let gate = gate_for(&backend);

    assert!(!gate.request_permissions());
    assert!(!gate.has_permissions());
    assert!(backend.channels().is_empty());
}

#[test]
fn grant_on_android_provisions_channel_once() {
    let backend = Arc::new(InMemoryNotificationBackend::new(
        Platform::Android,
        PermissionStatus::Undetermined,
    ));
    let gate = gate_for(&backend);

    assert!(gate.request_permissions());
    assert!(gate.request_permissions());
    assert!(gate.has_permissions());
    assert_eq!(backend.permission_requests(), 1);

    let channels = backend.channels();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].id, "habits");
    assert_eq!(channels[0].importance, ChannelImportance::High);
    assert_eq!(channels[0].vibration_pattern_ms, vec![0, 250, 250, 250]);
    assert_eq!(channels[0].light_color, "#FF231F7C");
}

#[test]
fn has_permissions_never_prompts() {
    let backend = Arc::new(InMemoryNotificationBackend::new(
        Platform::Ios,
        PermissionStatus::Undetermined,
    ));
    let gate = gate_for(&backend);

    assert!(!gate.has_permissions());
    assert_eq!(backend.permission_requests(), 0);
}

#[test]
fn revoked_permission_is_observed() {
    let backend = Arc::new(InMemoryNotificationBackend::default());
    let gate = gate_for(&backend);
    assert!(gate.has_permissions());

    backend.set_permission(PermissionStatus::Denied);

    assert!(!gate.has_permissions());
    assert!(!gate.request_permissions());
}

#[test]
fn init_uses_configured_presentation() {
    let backend = Arc::new(InMemoryNotificationBackend::default());
    let mut config = ReminderConfig::default();
    config.presentation.set_badge = false;
    let gate = PermissionGate::new(backend.clone(), &config);

    gate.init().unwrap();

    let presentation = backend.presentation().unwrap();
    assert!(!presentation.set_badge);
    assert!(presentation.show_alert);
}
