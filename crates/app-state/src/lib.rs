//! Application state collaborators for Waypoint
//!
//! This crate provides the settings contract the navigation core uses to
//! remember the last screen, plus an in-memory implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod settings;

pub use settings::{get_typed, set_typed, MemorySettings, SettingsError, SettingsStore};
