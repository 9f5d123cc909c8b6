//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate habit store calls and reminder reconciliation into
//!   screen-level APIs.
//! - Keep UI/FFI layers decoupled from storage and OS scheduler details.

pub mod habit_service;
