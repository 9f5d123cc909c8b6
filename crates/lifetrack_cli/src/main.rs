//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lifetrack_core` linkage.
//! - Bootstrap reminders the way an app start does, then run one restore
//!   pass against the in-memory notification backend.
//! - Keep output deterministic for quick local sanity checks.

use lifetrack_core::{
    InMemoryNotificationBackend, Reconciler, ReminderConfig, ReminderTarget, RestoreReport,
};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    println!("lifetrack_core ping={}", lifetrack_core::ping());
    println!("lifetrack_core version={}", lifetrack_core::core_version());

    let backend = Arc::new(InMemoryNotificationBackend::default());
    match run(&backend) {
        Ok(report) => {
            println!(
                "restore permission={} scheduled={} skipped={} failed={}",
                report.permission_granted,
                report.scheduled.len(),
                report.skipped.len(),
                report.failed.len()
            );
            for skip in &report.skipped {
                println!("skip habit_id={} reason={}", skip.habit_id, skip.reason.as_str());
            }
            println!("pending={}", backend.scheduled_count());
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(backend: &Arc<InMemoryNotificationBackend>) -> Result<RestoreReport, String> {
    let reconciler = Reconciler::new(backend.clone(), ReminderConfig::default());
    reconciler
        .gate()
        .init()
        .map_err(|err| format!("reminder init failed code={} message={err}", err.code))?;

    let habits = [
        sample(1, "Meditar", Some("07:30"), true),
        sample(2, "Leer", None, true),
        sample(3, "Correr", Some("18:00"), false),
    ];
    reconciler
        .restore_all(&habits)
        .map_err(|err| format!("restore failed code={} message={err}", err.code()))
}

fn sample(id: i64, title: &str, time: Option<&str>, is_active: bool) -> ReminderTarget {
    ReminderTarget {
        id,
        title: title.to_string(),
        notification_time: time.map(str::to_string),
        is_active,
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use lifetrack_core::InMemoryNotificationBackend;
    use std::sync::Arc;

    #[test]
    fn run_installs_presentation_before_restoring() {
        let backend = Arc::new(InMemoryNotificationBackend::default());

        let report = run(&backend).expect("demo run should succeed");

        assert!(backend.presentation().is_some());
        assert_eq!(report.scheduled.len(), 1);
        assert_eq!(backend.scheduled_count(), 1);
    }
}
