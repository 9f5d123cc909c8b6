//! Flutter-facing bindings for LifeTrack habits and reminders.

pub mod api;
