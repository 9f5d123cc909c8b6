//! Reminder configuration.
//!
//! # Responsibility
//! - Hold notification content, delivery channel and foreground
//!   presentation settings used by the permission gate and reconciler.
//! - Load overrides from JSON while defaulting every missing field.
//!
//! # Invariants
//! - `body_template` is rendered by replacing every `{title}` occurrence.
//! - Defaults match the shipped mobile app wording.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TITLE_PLACEHOLDER: &str = "{title}";

/// Configuration load errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyChannelId,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid reminder config: {err}"),
            Self::EmptyChannelId => write!(f, "reminder channel id must not be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::EmptyChannelId => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Delivery importance for platforms with notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelImportance {
    Default,
    High,
    Max,
}

/// Delivery channel provisioned for daily habit reminders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderChannel {
    pub id: String,
    pub name: String,
    pub importance: ChannelImportance,
    pub vibration_pattern_ms: Vec<u32>,
    pub light_color: String,
    pub sound: String,
}

impl Default for ReminderChannel {
    fn default() -> Self {
        Self {
            id: "habits".to_string(),
            name: "Recordatorios de Hábitos".to_string(),
            importance: ChannelImportance::High,
            vibration_pattern_ms: vec![0, 250, 250, 250],
            light_color: "#FF231F7C".to_string(),
            sound: "default".to_string(),
        }
    }
}

/// How a reminder is presented when it fires while the app is foregrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationOptions {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
    pub show_banner: bool,
    pub show_list: bool,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
            show_banner: true,
            show_list: true,
        }
    }
}

/// Reminder settings shared by the permission gate and the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub title: String,
    pub body_template: String,
    pub play_sound: bool,
    pub channel: ReminderChannel,
    pub presentation: PresentationOptions,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            title: "Recordatorio de Hábito".to_string(),
            body_template: format!("Es hora de: {TITLE_PLACEHOLDER}"),
            play_sound: true,
            channel: ReminderChannel::default(),
            presentation: PresentationOptions::default(),
        }
    }
}

impl ReminderConfig {
    /// Parses a JSON override document; missing fields keep their defaults.
    ///
    /// # Errors
    /// - Returns `Parse` for malformed JSON or mistyped fields.
    /// - Returns `EmptyChannelId` when the channel id is blank.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        if config.channel.id.trim().is_empty() {
            return Err(ConfigError::EmptyChannelId);
        }
        Ok(config)
    }

    /// Renders the notification body for one habit title.
    pub fn render_body(&self, habit_title: &str) -> String {
        self.body_template.replace(TITLE_PLACEHOLDER, habit_title)
    }
}
