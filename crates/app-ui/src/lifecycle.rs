//! Screen controller contracts
//!
//! A screen controller opts into the parts of the transition pipeline it cares
//! about by returning itself from the matching capability accessor on
//! [`ScreenController`]. Anything left at the default `None` is skipped.
//!
//! ```rust
//! use app_ui::lifecycle::{Activatable, ScreenController};
//! use async_trait::async_trait;
//! use std::any::Any;
//!
//! struct Feed;
//!
//! #[async_trait]
//! impl Activatable for Feed {
//!     async fn activate(&self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     async fn deactivate(&self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl ScreenController for Feed {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn activatable(&self) -> Option<&dyn Activatable> {
//!         Some(self)
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;

/// Which way a transition moves through history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NavigationDirection {
    /// A new navigation (`navigate_to`), not a history replay. Clears forward
    /// history.
    #[default]
    Forward,
    /// Replay of the most recent back-history entry (`go_back`)
    Back,
    /// Replay of the most recent forward-history entry (`go_forward`)
    HistoryForward,
}

/// Everything a guard or lifecycle hook knows about a transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionContext {
    /// Payload passed to the target screen
    pub parameter: Option<Value>,
    /// Direction of travel
    pub direction: NavigationDirection,
    /// Screen being left, if any
    pub source_screen: Option<String>,
    /// Screen being entered
    pub target_screen: String,
}

/// Guards and notifications around a transition
///
/// Every method has a permissive default so controllers only implement the
/// hooks they need. Errors from `can_leave`/`can_enter` count as a veto.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NavigationAware: Send + Sync {
    /// Whether the current screen may be left
    async fn can_leave(&self, _context: &TransitionContext) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Whether the target screen may be entered
    async fn can_enter(&self, _context: &TransitionContext) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// The screen has been left. Cannot cancel the transition.
    async fn on_left(&self, _context: &TransitionContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// The screen is now current and visible
    async fn on_arrived(&self, _context: &TransitionContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Controllers with an active/inactive phase
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Activatable: Send + Sync {
    /// Resume work after becoming current
    async fn activate(&self) -> anyhow::Result<()>;

    /// Pause work before being left
    async fn deactivate(&self) -> anyhow::Result<()>;
}

/// Controllers holding resources that must be released when left
pub trait Destructible: Send + Sync {
    /// Release resources. Called once, after the screen has been left.
    fn destroy(&self);
}

/// Controllers that load data after they become visible
#[async_trait]
pub trait AsyncInitializable: Send + Sync {
    /// Load initial state
    async fn initialize(&self) -> anyhow::Result<()>;
}

/// A screen's controller (its view-model)
pub trait ScreenController: Send + Sync + 'static {
    /// Downcasting support for hosts and tests
    fn as_any(&self) -> &dyn Any;

    /// Guard and notification hooks
    fn navigation_aware(&self) -> Option<&dyn NavigationAware> {
        None
    }

    /// Activation hooks
    fn activatable(&self) -> Option<&dyn Activatable> {
        None
    }

    /// Resource release hook
    fn destructible(&self) -> Option<&dyn Destructible> {
        None
    }

    /// Post-display initialization hook
    fn async_initializable(&self) -> Option<&dyn AsyncInitializable> {
        None
    }
}

impl dyn ScreenController {
    /// Downcast to a concrete controller type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether this controller is of type `T`
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl ScreenController for Plain {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Guarded;

    #[async_trait]
    impl NavigationAware for Guarded {
        async fn can_leave(&self, context: &TransitionContext) -> anyhow::Result<bool> {
            Ok(context.target_screen != "Blocked")
        }
    }

    impl ScreenController for Guarded {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn navigation_aware(&self) -> Option<&dyn NavigationAware> {
            Some(self)
        }
    }

    fn context(target: &str) -> TransitionContext {
        TransitionContext {
            parameter: None,
            direction: NavigationDirection::Forward,
            source_screen: Some("Home".to_string()),
            target_screen: target.to_string(),
        }
    }

    #[test]
    fn test_default_capabilities_are_absent() {
        let controller: Box<dyn ScreenController> = Box::new(Plain);
        assert!(controller.navigation_aware().is_none());
        assert!(controller.activatable().is_none());
        assert!(controller.destructible().is_none());
        assert!(controller.async_initializable().is_none());
    }

    #[test]
    fn test_downcast() {
        let controller: Box<dyn ScreenController> = Box::new(Plain);
        assert!(controller.is::<Plain>());
        assert!(controller.downcast_ref::<Guarded>().is_none());
    }

    #[tokio::test]
    async fn test_default_hooks_allow_everything() {
        let controller: Box<dyn ScreenController> = Box::new(Guarded);
        let guard = controller.navigation_aware().unwrap();

        assert!(guard.can_leave(&context("Settings")).await.unwrap());
        assert!(!guard.can_leave(&context("Blocked")).await.unwrap());
        // Not overridden, so the default applies.
        assert!(guard.can_enter(&context("Blocked")).await.unwrap());
        guard.on_left(&context("Settings")).await.unwrap();
    }

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&NavigationDirection::HistoryForward).unwrap();
        assert_eq!(json, "\"historyForward\"");
        let json = serde_json::to_string(&NavigationDirection::Forward).unwrap();
        assert_eq!(json, "\"forward\"");
    }
}
