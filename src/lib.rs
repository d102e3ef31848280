//! Waypoint
//!
//! Screen navigation and modal dialog orchestration for desktop shells.
//!
//! - [`platform`] - interaction-thread dispatching and logging setup
//! - [`state`] - settings collaborator
//! - [`ui`] - navigation controller, dialog orchestrator and their contracts

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use app_platform as platform;
pub use app_state as state;
pub use app_ui as ui;

pub use app_platform::{InlineDispatcher, InteractionDispatcher, ThreadDispatcher};
pub use app_state::{MemorySettings, SettingsStore};
pub use app_ui::{DialogOrchestrator, Navigator, ScreenRegistry};
