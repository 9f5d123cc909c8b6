//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose habit CRUD and reminder planning to Dart via FRB.
//! - Hand the host a concrete reminder action for every habit mutation, so
//!   the platform plugin can apply it without re-deriving eligibility.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Reminder times are validated here before any store write.
//! - Error codes are stable strings: `invalid_time`, `validation`,
//!   `not_found`, `invalid_data`, `db`.

use lifetrack_core::db::open_db;
use lifetrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, plan_for_habit,
    plan_restore, ping as ping_inner, sort_by_created_desc, CreateHabitRequest, HabitPlan,
    HabitRecord, HabitStore, HabitValidationError, PlannedReminder, ReminderConfig,
    ReminderTarget, ReminderTime, SqliteHabitStore, StoreError, TimePatch, UpdateHabitRequest,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::OnceLock;

const HABIT_DB_FILE_NAME: &str = "lifetrack_habits.sqlite3";
static HABIT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REMINDER_CONFIG: OnceLock<ReminderConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Installs reminder wording and channel overrides from a JSON document.
///
/// Must run before the first planning call; later calls with a different
/// document are rejected.
///
/// # FFI contract
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_reminder_config(json: String) -> String {
    let parsed = match ReminderConfig::from_json_str(&json) {
        Ok(config) => config,
        Err(err) => return format!("init_reminder_config failed: {err}"),
    };
    let active = REMINDER_CONFIG.get_or_init(|| parsed.clone());
    if *active != parsed {
        return "init_reminder_config failed: reminder config already initialized".to_string();
    }
    info!(
        "event=reminder_config_init module=ffi status=ok channel_id={}",
        active.channel.id
    );
    String::new()
}

/// Habit shape exchanged with Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiHabit {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub is_active: bool,
    /// `HH:MM`; `None` when no reminder is configured.
    pub notification_time: Option<String>,
    pub created_at: Option<String>,
}

/// One reminder the host must (re)create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlanItem {
    pub habit_id: i64,
    pub title: String,
    pub body: String,
    pub hour: u8,
    pub minute: u8,
    pub channel_id: String,
    pub play_sound: bool,
}

/// A habit that gets no reminder, with a stable reason code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSkipItem {
    pub habit_id: i64,
    /// `inactive|no_time|invalid_time`.
    pub reason: String,
}

/// Full restore plan: cancel everything, then create `schedule`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlanResponse {
    pub schedule: Vec<ReminderPlanItem>,
    pub skipped: Vec<ReminderSkipItem>,
    pub message: String,
}

/// Validation result for one `HH:MM` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTimeResponse {
    pub ok: bool,
    /// Zero-padded `HH:MM` when valid.
    pub normalized: Option<String>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Habit list envelope, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitListResponse {
    pub ok: bool,
    pub items: Vec<FfiHabit>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Generic habit mutation envelope.
///
/// `reminder_action` tells the host what to do with the OS reminder:
/// `schedule` (cancel existing, then create `reminder`), `cancel`, or `none`
/// on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitActionResponse {
    pub ok: bool,
    pub habit: Option<FfiHabit>,
    pub reminder_action: String,
    pub reminder: Option<ReminderPlanItem>,
    pub error_code: Option<String>,
    pub message: String,
}

impl HabitActionResponse {
    fn cancelled(message: impl Into<String>, habit: Option<FfiHabit>) -> Self {
        Self {
            ok: true,
            habit,
            reminder_action: "cancel".to_string(),
            reminder: None,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            habit: None,
            reminder_action: "none".to_string(),
            reminder: None,
            error_code: Some(code.to_string()),
            message: message.into(),
        }
    }
}

/// Validates and normalizes a reminder time.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_validate_time(time: String) -> ReminderTimeResponse {
    match time.parse::<ReminderTime>() {
        Ok(parsed) => ReminderTimeResponse {
            ok: true,
            normalized: Some(parsed.to_string()),
            error_code: None,
            message: "Valid time.".to_string(),
        },
        Err(err) => ReminderTimeResponse {
            ok: false,
            normalized: None,
            error_code: Some("invalid_time".to_string()),
            message: err.to_string(),
        },
    }
}

/// Computes the restore plan for the host's current habit list.
///
/// # FFI contract
/// - Pure; touches neither the DB nor the OS.
/// - Unparsable times land in `skipped` with reason `invalid_time`.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_restore_plan(habits: Vec<FfiHabit>) -> ReminderPlanResponse {
    let targets = habits.iter().map(to_target).collect::<Vec<_>>();
    let plan = plan_restore(&targets);
    let config = reminder_config();

    let schedule = plan
        .schedule
        .iter()
        .map(|planned| to_plan_item(planned, config))
        .collect::<Vec<_>>();
    let mut skipped = plan
        .skipped
        .iter()
        .map(|skip| ReminderSkipItem {
            habit_id: skip.habit_id,
            reason: skip.reason.as_str().to_string(),
        })
        .collect::<Vec<_>>();
    skipped.extend(plan.rejected.iter().map(|rejected| ReminderSkipItem {
        habit_id: rejected.habit_id,
        reason: "invalid_time".to_string(),
    }));

    if !plan.rejected.is_empty() {
        warn!(
            "event=reminder_restore_plan module=ffi status=partial rejected={}",
            plan.rejected.len()
        );
    }
    ReminderPlanResponse {
        message: format!("Planned {} reminder(s).", schedule.len()),
        schedule,
        skipped,
    }
}

/// Lists a user's habits newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_list(user_id: i64) -> HabitListResponse {
    match with_habit_store(|store| store.fetch_all(user_id)) {
        Ok(mut habits) => {
            sort_by_created_desc(&mut habits);
            HabitListResponse {
                ok: true,
                message: format!("Loaded {} habit(s).", habits.len()),
                items: habits.iter().map(to_ffi_habit).collect(),
                error_code: None,
            }
        }
        Err(err) => HabitListResponse {
            ok: false,
            items: Vec::new(),
            error_code: Some(store_error_code(&err).to_string()),
            message: format!("habit_list failed: {err}"),
        },
    }
}

/// Creates a habit; plans its reminder when created with a time.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_create(
    user_id: i64,
    title: String,
    notification_time: Option<String>,
) -> HabitActionResponse {
    let notification_time = match normalize_time(notification_time) {
        Ok(time) => time,
        Err(response) => return response,
    };
    let request = CreateHabitRequest {
        title: title.trim().to_string(),
        notification_time,
        user_id,
    };
    match with_habit_store(|store| store.create(&request)) {
        Ok(habit) => aligned_response("Habit created.", &habit),
        Err(err) => store_failure("habit_create", &err),
    }
}

/// Activates or deactivates a habit.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_set_active(id: i64, is_active: bool) -> HabitActionResponse {
    let request = UpdateHabitRequest {
        is_active: Some(is_active),
        ..UpdateHabitRequest::default()
    };
    match with_habit_store(|store| store.update(id, &request)) {
        Ok(habit) => aligned_response("Habit updated.", &habit),
        Err(err) => store_failure("habit_set_active", &err),
    }
}

/// Sets or clears a habit's reminder time.
///
/// Invalid input fails with `invalid_time` and leaves the stored habit as is.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_set_notification_time(id: i64, time: Option<String>) -> HabitActionResponse {
    let patch = match normalize_time(time) {
        Ok(Some(time)) => TimePatch::Set(time),
        Ok(None) => TimePatch::Clear,
        Err(response) => return response,
    };
    let request = UpdateHabitRequest {
        notification_time: patch,
        ..UpdateHabitRequest::default()
    };
    match with_habit_store(|store| store.update(id, &request)) {
        Ok(habit) => aligned_response("Reminder time updated.", &habit),
        Err(err) => store_failure("habit_set_notification_time", &err),
    }
}

/// Deletes a habit; the host must cancel its reminder.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_delete(id: i64) -> HabitActionResponse {
    match with_habit_store(|store| store.delete(id)) {
        Ok(()) => HabitActionResponse::cancelled("Habit deleted.", None),
        Err(err) => store_failure("habit_delete", &err),
    }
}

fn normalize_time(time: Option<String>) -> Result<Option<String>, HabitActionResponse> {
    let Some(raw) = time else {
        return Ok(None);
    };
    raw.parse::<ReminderTime>()
        .map(|parsed| Some(parsed.to_string()))
        .map_err(|err| HabitActionResponse::failure("invalid_time", err.to_string()))
}

fn aligned_response(message: &str, habit: &HabitRecord) -> HabitActionResponse {
    let ffi_habit = to_ffi_habit(habit);
    match plan_for_habit(&ReminderTarget::from(habit)) {
        HabitPlan::Schedule(planned) => HabitActionResponse {
            ok: true,
            habit: Some(ffi_habit),
            reminder_action: "schedule".to_string(),
            reminder: Some(to_plan_item(&planned, reminder_config())),
            error_code: None,
            message: message.to_string(),
        },
        HabitPlan::Cancel(_) => HabitActionResponse::cancelled(message, Some(ffi_habit)),
        // Store validation keeps persisted times parsable.
        HabitPlan::Rejected(err) => HabitActionResponse::failure("invalid_time", err.to_string()),
    }
}

fn store_failure(operation: &str, err: &StoreError) -> HabitActionResponse {
    let code = store_error_code(err);
    warn!("event={operation} module=ffi status=error error_code={code}");
    HabitActionResponse::failure(code, format!("{operation} failed: {err}"))
}

fn store_error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::Validation(HabitValidationError::InvalidNotificationTime(_)) => "invalid_time",
        StoreError::Validation(_) => "validation",
        StoreError::NotFound(_) => "not_found",
        StoreError::InvalidData(_) => "invalid_data",
        StoreError::Db(_) => "db",
    }
}

fn reminder_config() -> &'static ReminderConfig {
    REMINDER_CONFIG.get_or_init(ReminderConfig::default)
}

fn resolve_habit_db_path() -> PathBuf {
    HABIT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("LIFETRACK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(HABIT_DB_FILE_NAME)
        })
        .clone()
}

fn with_habit_store<T>(
    f: impl FnOnce(&SqliteHabitStore<'_>) -> lifetrack_core::StoreResult<T>,
) -> lifetrack_core::StoreResult<T> {
    let conn = open_db(resolve_habit_db_path())?;
    let store = SqliteHabitStore::new(&conn);
    f(&store)
}

fn to_target(habit: &FfiHabit) -> ReminderTarget {
    ReminderTarget {
        id: habit.id,
        title: habit.title.clone(),
        notification_time: habit.notification_time.clone(),
        is_active: habit.is_active,
    }
}

fn to_ffi_habit(habit: &HabitRecord) -> FfiHabit {
    FfiHabit {
        id: habit.id,
        user_id: habit.user_id,
        title: habit.title.clone(),
        is_active: habit.is_active,
        notification_time: habit.notification_time.clone(),
        created_at: habit.created_at.clone(),
    }
}

fn to_plan_item(planned: &PlannedReminder, config: &ReminderConfig) -> ReminderPlanItem {
    ReminderPlanItem {
        habit_id: planned.habit_id,
        title: config.title.clone(),
        body: config.render_body(&planned.title),
        hour: planned.time.hour(),
        minute: planned.time.minute(),
        channel_id: config.channel.id.clone(),
        play_sound: config.play_sound,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, habit_create, habit_delete, habit_list, habit_set_active,
        habit_set_notification_time, init_logging, init_reminder_config, ping,
        reminder_restore_plan, reminder_validate_time, FfiHabit,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn validate_time_normalizes_and_rejects() {
        let ok = reminder_validate_time("7:05".to_string());
        assert!(ok.ok);
        assert_eq!(ok.normalized.as_deref(), Some("07:05"));

        let bad = reminder_validate_time("24:00".to_string());
        assert!(!bad.ok);
        assert_eq!(bad.error_code.as_deref(), Some("invalid_time"));
    }

    #[test]
    fn restore_plan_filters_and_renders_body() {
        let habits = vec![
            habit(1, "Meditar", Some("07:30"), true),
            habit(2, "Leer", None, true),
            habit(3, "Correr", Some("18:00"), false),
            habit(4, "Beber agua", Some("99:99"), true),
        ];

        let plan = reminder_restore_plan(habits);

        assert_eq!(plan.schedule.len(), 1);
        assert_eq!(plan.schedule[0].habit_id, 1);
        assert_eq!(plan.schedule[0].body, "Es hora de: Meditar");
        assert_eq!((plan.schedule[0].hour, plan.schedule[0].minute), (7, 30));
        let reasons = plan
            .skipped
            .iter()
            .map(|skip| (skip.habit_id, skip.reason.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            reasons,
            vec![(2, "no_time"), (3, "inactive"), (4, "invalid_time")]
        );
    }

    #[test]
    fn habit_flow_returns_reminder_actions() {
        let user_id = unique_user_id();
        let created = habit_create(user_id, "Meditar".to_string(), Some("7:30".to_string()));
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.reminder_action, "schedule");
        let habit = created.habit.expect("created habit");
        assert_eq!(habit.notification_time.as_deref(), Some("07:30"));

        let off = habit_set_active(habit.id, false);
        assert!(off.ok, "{}", off.message);
        assert_eq!(off.reminder_action, "cancel");

        let on = habit_set_active(habit.id, true);
        assert_eq!(on.reminder_action, "schedule");
        assert_eq!(on.reminder.map(|item| item.hour), Some(7));

        let listed = habit_list(user_id);
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.len(), 1);

        let deleted = habit_delete(habit.id);
        assert!(deleted.ok, "{}", deleted.message);
        assert_eq!(deleted.reminder_action, "cancel");
        assert!(habit_list(user_id).items.is_empty());
    }

    #[test]
    fn invalid_time_does_not_touch_store() {
        let user_id = unique_user_id();
        let created = habit_create(user_id, "Leer".to_string(), None);
        let habit = created.habit.expect("created habit");
        assert_eq!(created.reminder_action, "cancel");

        let response = habit_set_notification_time(habit.id, Some("12:61".to_string()));
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("invalid_time"));
        assert_eq!(response.reminder_action, "none");

        let listed = habit_list(user_id);
        assert_eq!(listed.items[0].notification_time, None);
    }

    #[test]
    fn clearing_time_returns_cancel_action() {
        let user_id = unique_user_id();
        let created = habit_create(user_id, "Meditar".to_string(), Some("07:30".to_string()));
        let habit = created.habit.expect("created habit");
        assert_eq!(created.reminder_action, "schedule");

        let cleared = habit_set_notification_time(habit.id, None);
        assert!(cleared.ok, "{}", cleared.message);
        assert_eq!(cleared.reminder_action, "cancel");
        assert_eq!(cleared.reminder, None);
        let cleared_habit = cleared.habit.expect("updated habit");
        assert_eq!(cleared_habit.notification_time, None);
        assert!(cleared_habit.is_active);

        let listed = habit_list(user_id);
        assert_eq!(listed.items[0].notification_time, None);
    }

    #[test]
    fn reminder_config_accepts_defaults_and_rejects_later_overrides() {
        // Other tests install the default config lazily; `{}` matches it.
        assert_eq!(init_reminder_config("{}".to_string()), "");
        assert_eq!(init_reminder_config("{}".to_string()), "");

        let conflict = init_reminder_config(r#"{"title":"Otro título"}"#.to_string());
        assert!(conflict.contains("already initialized"), "{conflict}");

        let malformed = init_reminder_config("{not json".to_string());
        assert!(malformed.starts_with("init_reminder_config failed"));
    }

    #[test]
    fn missing_habit_reports_not_found() {
        let response = habit_delete(i64::MAX);
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("not_found"));
    }

    fn habit(id: i64, title: &str, time: Option<&str>, is_active: bool) -> FfiHabit {
        FfiHabit {
            id,
            user_id: 1,
            title: title.to_string(),
            is_active,
            notification_time: time.map(str::to_string),
            created_at: None,
        }
    }

    fn unique_user_id() -> i64 {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        (nanos % i64::MAX as u128) as i64
    }
}
