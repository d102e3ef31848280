//! Screen factory
//!
//! Controllers and views are paired through an explicit table populated at
//! startup instead of naming conventions. [`ScreenRegistry`] is that table and
//! the default [`ScreenFactory`]; hosts backed by a DI container can implement
//! the trait themselves.
//!
//! # Example
//!
//! ```rust
//! use app_ui::lifecycle::ScreenController;
//! use app_ui::screens::{ScreenFactory, ScreenRegistry};
//! use app_ui::view::{DataContext, View};
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! struct Home;
//! impl ScreenController for Home {
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! struct HomeView;
//! impl View for HomeView {
//!     fn view_id(&self) -> &str { "HomeView" }
//!     fn bind(&self, _context: DataContext) {}
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! let mut registry = ScreenRegistry::new();
//! registry.register_screen("Home", "HomeView", || Arc::new(Home), || Arc::new(HomeView));
//!
//! assert_eq!(registry.resolve_view_type("Home").as_deref(), Some("HomeView"));
//! assert_eq!(registry.screen_for_view("HomeView"), Some("Home"));
//! ```

use crate::dialogs::DialogController;
use crate::lifecycle::ScreenController;
use crate::view::View;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Screen resolution errors
#[derive(Debug, Error)]
pub enum ScreenError {
    /// No registration for the identifier
    #[error("Screen not registered: {0}")]
    NotRegistered(String),

    /// No view constructor for the view identifier
    #[error("View not registered: {0}")]
    ViewNotRegistered(String),

    /// Registered, but as a screen rather than a dialog
    #[error("Not a dialog controller: {0}")]
    NotDialogAware(String),

    /// Registered, but as a dialog rather than a screen
    #[error("Not a screen controller: {0}")]
    NotAScreen(String),
}

/// Result type for screen resolution
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Produces controllers and their paired views
pub trait ScreenFactory: Send + Sync {
    /// View identifier paired with a screen or dialog identifier
    fn resolve_view_type(&self, id: &str) -> Option<String>;

    /// Fresh controller for a screen
    fn create_controller(&self, screen_id: &str) -> Result<Arc<dyn ScreenController>>;

    /// Fresh controller for a dialog
    fn create_dialog(&self, dialog_id: &str) -> Result<Arc<dyn DialogController>>;

    /// Fresh view. Called on the interaction thread.
    fn create_view(&self, view_id: &str) -> Result<Arc<dyn View>>;
}

type ScreenConstructor = Arc<dyn Fn() -> Arc<dyn ScreenController> + Send + Sync>;
type DialogConstructor = Arc<dyn Fn() -> Arc<dyn DialogController> + Send + Sync>;
type ViewConstructor = Arc<dyn Fn() -> Arc<dyn View> + Send + Sync>;

#[derive(Clone)]
enum ControllerConstructor {
    Screen(ScreenConstructor),
    Dialog(DialogConstructor),
}

#[derive(Clone)]
struct Registration {
    view_id: String,
    controller: ControllerConstructor,
}

/// Bidirectional identifier table
///
/// Maps controller identifiers to `(view identifier, constructors)` and view
/// identifiers back to the controller identifier that owns them.
#[derive(Clone, Default)]
pub struct ScreenRegistry {
    registrations: HashMap<String, Registration>,
    views: HashMap<String, ViewConstructor>,
    view_owners: HashMap<String, String>,
}

impl ScreenRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a navigable screen
    ///
    /// Re-registering an identifier replaces the previous pairing.
    pub fn register_screen<C, FC, V, FV>(
        &mut self,
        screen_id: impl Into<String>,
        view_id: impl Into<String>,
        controller: FC,
        view: FV,
    ) -> &mut Self
    where
        C: ScreenController,
        FC: Fn() -> Arc<C> + Send + Sync + 'static,
        V: View,
        FV: Fn() -> Arc<V> + Send + Sync + 'static,
    {
        let constructor: ScreenConstructor =
            Arc::new(move || -> Arc<dyn ScreenController> { controller() });
        self.insert(
            screen_id.into(),
            view_id.into(),
            ControllerConstructor::Screen(constructor),
            Arc::new(move || -> Arc<dyn View> { view() }),
        );
        self
    }

    /// Register a modal dialog
    pub fn register_dialog<C, FC, V, FV>(
        &mut self,
        dialog_id: impl Into<String>,
        view_id: impl Into<String>,
        controller: FC,
        view: FV,
    ) -> &mut Self
    where
        C: DialogController,
        FC: Fn() -> Arc<C> + Send + Sync + 'static,
        V: View,
        FV: Fn() -> Arc<V> + Send + Sync + 'static,
    {
        let constructor: DialogConstructor =
            Arc::new(move || -> Arc<dyn DialogController> { controller() });
        self.insert(
            dialog_id.into(),
            view_id.into(),
            ControllerConstructor::Dialog(constructor),
            Arc::new(move || -> Arc<dyn View> { view() }),
        );
        self
    }

    fn insert(
        &mut self,
        id: String,
        view_id: String,
        controller: ControllerConstructor,
        view: ViewConstructor,
    ) {
        if let Some(previous) = self.registrations.remove(&id) {
            tracing::debug!(id = %id, "Replacing screen registration");
            self.views.remove(&previous.view_id);
            self.view_owners.remove(&previous.view_id);
        }

        self.views.insert(view_id.clone(), view);
        self.view_owners.insert(view_id.clone(), id.clone());
        self.registrations.insert(id, Registration { view_id, controller });
    }

    /// Controller identifier owning a view identifier
    pub fn screen_for_view(&self, view_id: &str) -> Option<&str> {
        self.view_owners.get(view_id).map(String::as_str)
    }

    /// Whether the identifier is registered (screen or dialog)
    pub fn contains(&self, id: &str) -> bool {
        self.registrations.contains_key(id)
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl ScreenFactory for ScreenRegistry {
    fn resolve_view_type(&self, id: &str) -> Option<String> {
        self.registrations.get(id).map(|r| r.view_id.clone())
    }

    fn create_controller(&self, screen_id: &str) -> Result<Arc<dyn ScreenController>> {
        let registration = self
            .registrations
            .get(screen_id)
            .ok_or_else(|| ScreenError::NotRegistered(screen_id.to_string()))?;

        match &registration.controller {
            ControllerConstructor::Screen(build) => Ok(build()),
            ControllerConstructor::Dialog(_) => Err(ScreenError::NotAScreen(screen_id.to_string())),
        }
    }

    fn create_dialog(&self, dialog_id: &str) -> Result<Arc<dyn DialogController>> {
        let registration = self
            .registrations
            .get(dialog_id)
            .ok_or_else(|| ScreenError::NotRegistered(dialog_id.to_string()))?;

        match &registration.controller {
            ControllerConstructor::Dialog(build) => Ok(build()),
            ControllerConstructor::Screen(_) => {
                Err(ScreenError::NotDialogAware(dialog_id.to_string()))
            }
        }
    }

    fn create_view(&self, view_id: &str) -> Result<Arc<dyn View>> {
        self.views
            .get(view_id)
            .map(|build| build())
            .ok_or_else(|| ScreenError::ViewNotRegistered(view_id.to_string()))
    }
}
