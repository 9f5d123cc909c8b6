//! Domain model for habits and their daily reminders.
//!
//! # Responsibility
//! - Define the habit record shape consumed from the habit store.
//! - Define reminder time, trigger and payload shapes exchanged with the OS
//!   notification subsystem.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - A reminder correlates to a habit only through its payload `habit_id`.

pub mod habit;
pub mod reminder;
