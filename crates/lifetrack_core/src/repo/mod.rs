//! Habit store abstraction and persistence implementation.
//!
//! # Responsibility
//! - Define the capability-level habit store contract consumed by services.
//! - Isolate SQLite query details from reminder orchestration.
//!
//! # Invariants
//! - Store writes validate requests before persistence.
//! - Store APIs return semantic errors (`NotFound`) in addition to DB errors.

pub mod habit_repo;
