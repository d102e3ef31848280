//! Screen navigation and modal dialogs for Waypoint
//!
//! This crate decides which screen is shown, mediates transitions between
//! screens and manages stacked modal dialogs. Rendering is left to the host:
//! the core only creates views on the interaction thread, binds them to their
//! controllers and hands them over.
//!
//! # Modules
//!
//! - [`lifecycle`] - Guard and lifecycle contracts for screen controllers
//! - [`view`] - View contract and data context
//! - [`screens`] - Screen factory and the identifier registry
//! - [`navigation`] - Navigation controller with back/forward history
//! - [`dialogs`] - Modal dialog orchestrator
//!
//! # Example
//!
//! ```rust
//! use app_platform::InlineDispatcher;
//! use app_ui::dialogs::{DialogHost, DialogOrchestrator};
//! use app_ui::navigation::{NavigationHost, Navigator};
//! use app_ui::screens::ScreenRegistry;
//! use app_ui::view::View;
//! use std::sync::Arc;
//!
//! struct Window;
//! impl NavigationHost for Window {
//!     fn present(&self, _view: Arc<dyn View>) {}
//! }
//! impl DialogHost for Window {
//!     fn push_layer(&self, _view: Arc<dyn View>) {}
//!     fn remove_layer(&self, _view: &Arc<dyn View>) {}
//! }
//!
//! let factory = Arc::new(ScreenRegistry::new());
//! let dispatcher = Arc::new(InlineDispatcher::new());
//! let window = Arc::new(Window);
//!
//! let navigator = Navigator::new(factory.clone(), dispatcher.clone());
//! navigator.register_host(window.clone()).unwrap();
//!
//! let dialogs = DialogOrchestrator::new(factory, dispatcher);
//! dialogs.register_host(window).unwrap();
//!
//! assert!(!navigator.can_go_back());
//! assert!(dialogs.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dialogs;
pub mod lifecycle;
pub mod navigation;
pub mod screens;
pub mod view;

// Re-export commonly used types
pub use dialogs::{
    CloseRequester, DialogController, DialogError, DialogHost, DialogId, DialogOrchestrator,
    DialogParameters, DialogResult, DialogState,
};

pub use lifecycle::{
    Activatable, AsyncInitializable, Destructible, NavigationAware, NavigationDirection,
    ScreenController, TransitionContext,
};

pub use navigation::{
    GuardStage, History, NavigationConfig, NavigationEntry, NavigationError, NavigationEvent,
    NavigationHost, NavigationRequest, Navigator, TransitionOutcome,
};

pub use screens::{ScreenError, ScreenFactory, ScreenRegistry};

pub use view::{DataContext, View};
