//! View contract
//!
//! A view is a thread-safe handle to a toolkit visual. The core never renders
//! anything; it only creates views on the interaction thread, binds them to
//! their controller and hands them to a host.

use crate::dialogs::DialogController;
use crate::lifecycle::ScreenController;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The controller a view is bound to
#[derive(Clone)]
pub enum DataContext {
    /// A navigable screen's controller
    Screen(Arc<dyn ScreenController>),
    /// A modal dialog's controller
    Dialog(Arc<dyn DialogController>),
}

impl DataContext {
    /// Downcast the bound controller to a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            DataContext::Screen(controller) => controller.as_any().downcast_ref::<T>(),
            DataContext::Dialog(controller) => controller.as_any().downcast_ref::<T>(),
        }
    }
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataContext::Screen(_) => f.write_str("DataContext::Screen"),
            DataContext::Dialog(_) => f.write_str("DataContext::Dialog"),
        }
    }
}

/// A visual paired with a controller
pub trait View: Send + Sync + 'static {
    /// Registry identifier of this view type
    fn view_id(&self) -> &str;

    /// Attach the controller. Called once, on the interaction thread.
    fn bind(&self, context: DataContext);

    /// Downcasting support for hosts and tests
    fn as_any(&self) -> &dyn Any;
}

impl dyn View {
    /// Downcast to a concrete view type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("view_id", &self.view_id()).finish()
    }
}
