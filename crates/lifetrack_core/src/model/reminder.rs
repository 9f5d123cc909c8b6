//! Reminder domain model.
//!
//! # Responsibility
//! - Parse and render the `HH:MM` wall-clock time a habit reminder fires at.
//! - Describe scheduled reminders as reported by the OS notification index.
//!
//! # Invariants
//! - A `ReminderTime` always satisfies `hour <= 23` and `minute <= 59`.
//! - Out-of-range input is rejected, never clamped.

use crate::model::habit::HabitId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("valid reminder time regex"));

const MAX_HOUR: u8 = 23;
const MAX_MINUTE: u8 = 59;

/// Validation errors for `HH:MM` reminder input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    /// Input does not have the `H:MM` / `HH:MM` shape.
    Malformed(String),
    /// Input has the right shape but hour or minute is out of range.
    OutOfRange { hour: u32, minute: u32 },
}

impl Display for TimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => {
                write!(f, "invalid reminder time `{value}`; expected HH:MM")
            }
            Self::OutOfRange { hour, minute } => write!(
                f,
                "reminder time {hour:02}:{minute:02} is out of range; expected 00:00..23:59"
            ),
        }
    }
}

impl Error for TimeParseError {}

/// Daily wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

impl ReminderTime {
    /// Builds a time from numeric parts, rejecting out-of-range values.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeParseError> {
        if hour > u32::from(MAX_HOUR) || minute > u32::from(MAX_MINUTE) {
            return Err(TimeParseError::OutOfRange { hour, minute });
        }
        // Both values fit in u8 after the range check above.
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl FromStr for ReminderTime {
    type Err = TimeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let captures = REMINDER_TIME_RE
            .captures(value)
            .ok_or_else(|| TimeParseError::Malformed(value.to_string()))?;
        let hour = captures[1]
            .parse::<u32>()
            .map_err(|_| TimeParseError::Malformed(value.to_string()))?;
        let minute = captures[2]
            .parse::<u32>()
            .map_err(|_| TimeParseError::Malformed(value.to_string()))?;
        Self::new(hour, minute)
    }
}

impl Display for ReminderTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Trigger that fires every day at a fixed hour/minute, indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyTrigger {
    pub hour: u8,
    pub minute: u8,
}

impl From<ReminderTime> for DailyTrigger {
    fn from(value: ReminderTime) -> Self {
        Self {
            hour: value.hour,
            minute: value.minute,
        }
    }
}

/// Data embedded in a scheduled notification to correlate it with a habit.
///
/// `habit_id` is optional because the OS index can hold notifications that
/// were not scheduled by this core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub habit_id: Option<HabitId>,
}

/// Request handed to the OS scheduler to create one daily reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub title: String,
    pub body: String,
    pub play_sound: bool,
    pub trigger: DailyTrigger,
    pub payload: ReminderPayload,
}

/// One entry of the OS-owned scheduled notification index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    /// Opaque identifier assigned by the OS scheduler.
    pub identifier: String,
    pub payload: ReminderPayload,
    /// `None` when the OS entry does not use a daily trigger.
    pub trigger: Option<DailyTrigger>,
}

#[cfg(test)]
mod tests {
    use super::{ReminderTime, TimeParseError};

    #[test]
    fn parses_padded_and_unpadded_hours() {
        let padded: ReminderTime = "07:30".parse().expect("07:30 should parse");
        assert_eq!((padded.hour(), padded.minute()), (7, 30));

        let unpadded: ReminderTime = "7:05".parse().expect("7:05 should parse");
        assert_eq!((unpadded.hour(), unpadded.minute()), (7, 5));
    }

    #[test]
    fn accepts_day_boundaries() {
        assert!("00:00".parse::<ReminderTime>().is_ok());
        assert!("23:59".parse::<ReminderTime>().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            "24:00".parse::<ReminderTime>(),
            Err(TimeParseError::OutOfRange {
                hour: 24,
                minute: 0
            })
        );
        assert_eq!(
            "12:61".parse::<ReminderTime>(),
            Err(TimeParseError::OutOfRange {
                hour: 12,
                minute: 61
            })
        );
    }

    #[test]
    fn rejects_malformed_values() {
        for value in ["", "8", "8:0", "08:00:00", " 08:00", "ab:cd", "-1:30", "123:00"] {
            let err = value
                .parse::<ReminderTime>()
                .expect_err("malformed time must fail");
            assert!(
                matches!(err, TimeParseError::Malformed(_)),
                "unexpected error for `{value}`: {err:?}"
            );
        }
    }

    #[test]
    fn displays_zero_padded() {
        let time = ReminderTime::new(9, 0).expect("valid time");
        assert_eq!(time.to_string(), "09:00");
    }
}
