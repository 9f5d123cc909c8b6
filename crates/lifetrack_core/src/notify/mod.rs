//! Local habit reminder scheduling.
//!
//! # Responsibility
//! - Gate scheduling behind OS notification permission.
//! - Look up and cancel reminders in the OS-owned index.
//! - Reconcile the index with the habit list (targeted ops and full restore).
//!
//! # Invariants
//! - A reminder exists for a habit iff it is active, has a valid `HH:MM`
//!   time, and permission is granted.
//! - This module persists nothing; the OS owns scheduled reminders.

pub mod backend;
pub mod index;
pub mod memory;
pub mod permission;
pub mod plan;
pub mod reconciler;
