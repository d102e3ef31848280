//! Navigation controller
//!
//! This module owns which screen is current and moves between screens through
//! a guarded, single-flight transition pipeline:
//!
//! 1. Resolve the target's paired view and build its controller
//! 2. Ask the current controller `can_leave`, then the target `can_enter`
//! 3. Deactivate, notify and destroy the current controller
//! 4. Create and bind the view on the interaction thread, present it
//! 5. Commit the new entry and history, notify subscribers
//! 6. Detached from the caller: initialize, notify and activate the new controller
//!
//! A veto in step 2 leaves every piece of state untouched. Failures in step 6
//! are logged and never reported to the caller; the screen is already visible.
//! Step 6 of one transition always finishes before step 3 of the next, unless
//! the next transition is started from those very hooks.
//!
//! # Example
//!
//! ```rust,no_run
//! use app_platform::ThreadDispatcher;
//! use app_ui::navigation::{NavigationHost, Navigator};
//! use app_ui::screens::ScreenRegistry;
//! use app_ui::view::View;
//! use std::sync::Arc;
//!
//! struct Shell;
//! impl NavigationHost for Shell {
//!     fn present(&self, _view: Arc<dyn View>) {}
//! }
//!
//! # async fn example(registry: ScreenRegistry) -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Arc::new(ThreadDispatcher::spawn("interaction")?);
//! let navigator = Navigator::new(Arc::new(registry), dispatcher);
//! navigator.register_host(Arc::new(Shell))?;
//!
//! navigator.navigate_to("Home", None).await?;
//! navigator.navigate_to("Settings", Some(serde_json::json!({ "tab": "general" }))).await?;
//! assert!(navigator.can_go_back());
//! navigator.go_back().await?;
//! # Ok(())
//! # }
//! ```

use crate::lifecycle::{NavigationDirection, ScreenController, TransitionContext};
use crate::screens::{ScreenError, ScreenFactory};
use crate::view::{DataContext, View};
use app_platform::dispatcher::{self, DispatchError, InteractionDispatcher};
use app_state::settings::{self, SettingsStore};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Capacity of the navigation event channel
const EVENT_CAPACITY: usize = 64;

// =============================================================================
// Errors
// =============================================================================

/// Navigation configuration errors
///
/// Vetoes, lock timeouts and cancellations are not errors; they surface as
/// `Ok(false)` (or the matching [`TransitionOutcome`]).
#[derive(Debug, Error)]
pub enum NavigationError {
    /// `register_host` has not been called
    #[error("No navigation host registered")]
    NoHost,

    /// `register_host` was called twice
    #[error("Navigation host already registered")]
    HostAlreadyRegistered,

    /// The target screen or its view could not be resolved
    #[error("Screen resolution failed: {0}")]
    Screen(#[from] ScreenError),

    /// The interaction thread rejected or dropped the work
    #[error("Interaction thread error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;

// =============================================================================
// Entries and History
// =============================================================================

/// A visited screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    /// Controller identifier
    pub screen_id: String,
    /// Paired view identifier
    pub view_id: String,
    /// Payload given at navigation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Value>,
}

/// One direction of navigation history (most recent last)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<NavigationEntry>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an entry on top
    pub fn push(&mut self, entry: NavigationEntry) {
        self.entries.push(entry);
    }

    /// Remove and return the top entry
    pub fn pop(&mut self) -> Option<NavigationEntry> {
        self.entries.pop()
    }

    /// The top entry
    pub fn current(&self) -> Option<&NavigationEntry> {
        self.entries.last()
    }

    /// Number of entries
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to replay
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Configuration, Requests, Outcomes and Events
// =============================================================================

/// Navigator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationConfig {
    /// How long a transition waits for the one in flight before giving up
    pub lock_timeout: Duration,
    /// Settings key under which the last committed entry is stored
    pub persist_key: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            persist_key: "navigation.last_screen".to_string(),
        }
    }
}

impl NavigationConfig {
    /// Set the transition lock timeout
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Set the settings key for the last committed entry
    pub fn persist_key(mut self, key: impl Into<String>) -> Self {
        self.persist_key = key.into();
        self
    }
}

/// A transition to perform
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationRequest {
    /// Forward navigation to a screen
    To {
        /// Target screen identifier
        screen_id: String,
        /// Payload for the target
        parameter: Option<Value>,
    },
    /// Replay the top of back history
    Back,
    /// Replay the top of forward history
    Forward,
}

impl NavigationRequest {
    fn direction(&self) -> NavigationDirection {
        match self {
            NavigationRequest::To { .. } => NavigationDirection::Forward,
            NavigationRequest::Back => NavigationDirection::Back,
            NavigationRequest::Forward => NavigationDirection::HistoryForward,
        }
    }
}

/// Which guard vetoed a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStage {
    /// The current controller refused to be left
    Leave,
    /// The target controller refused to be entered
    Enter,
}

/// How a transition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The target is now current
    Committed,
    /// A guard refused
    Vetoed(GuardStage),
    /// Another transition held the lock past the timeout
    TimedOut,
    /// The cancellation token fired before anything was mutated
    Cancelled,
    /// Back or forward requested with nothing to replay
    NoHistory,
}

impl TransitionOutcome {
    /// Whether the transition committed
    pub fn is_committed(&self) -> bool {
        matches!(self, TransitionOutcome::Committed)
    }
}

/// Navigation notifications
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    /// A new view is current
    ViewChanged {
        /// The committed entry
        entry: NavigationEntry,
        /// How it was reached
        direction: NavigationDirection,
    },
    /// Both histories were emptied
    HistoryCleared,
}

/// Receives the current view for display
pub trait NavigationHost: Send + Sync {
    /// Show `view` as the current screen. Called on the interaction thread.
    fn present(&self, view: Arc<dyn View>);
}

// =============================================================================
// Navigator
// =============================================================================

#[derive(Default)]
struct NavigationState {
    current_entry: Option<NavigationEntry>,
    current_controller: Option<Arc<dyn ScreenController>>,
    current_view: Option<Arc<dyn View>>,
    back_history: History,
    forward_history: History,
}

struct NavigatorInner {
    factory: Arc<dyn ScreenFactory>,
    dispatcher: Arc<dyn InteractionDispatcher>,
    config: NavigationConfig,
    host: OnceLock<Arc<dyn NavigationHost>>,
    settings: RwLock<Option<Arc<dyn SettingsStore>>>,
    transition_lock: Mutex<()>,
    is_transitioning: AtomicBool,
    state: RwLock<NavigationState>,
    events: broadcast::Sender<NavigationEvent>,
    /// Post-commit hooks of the current controller
    arrival: parking_lot::Mutex<Option<JoinHandle<()>>>,
    /// Set by `clear_history` while a transition is in flight
    clear_pending: AtomicBool,
}

/// Post-commit work for the new controller
struct Arrival {
    controller: Arc<dyn ScreenController>,
    context: TransitionContext,
}

/// Resets `is_transitioning` however the pipeline exits
struct TransitioningFlag<'a>(&'a AtomicBool);

impl<'a> TransitioningFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for TransitioningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Screen navigation controller
///
/// Cheap to clone; clones share state. At most one transition runs at a time.
/// Callers arriving while one is in flight wait up to
/// [`NavigationConfig::lock_timeout`] and then get `Ok(false)`.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

impl Navigator {
    /// Create a navigator with the default configuration
    pub fn new(factory: Arc<dyn ScreenFactory>, dispatcher: Arc<dyn InteractionDispatcher>) -> Self {
        Self::with_config(factory, dispatcher, NavigationConfig::default())
    }

    /// Create a navigator with a custom configuration
    pub fn with_config(
        factory: Arc<dyn ScreenFactory>,
        dispatcher: Arc<dyn InteractionDispatcher>,
        config: NavigationConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(NavigatorInner {
                factory,
                dispatcher,
                config,
                host: OnceLock::new(),
                settings: RwLock::new(None),
                transition_lock: Mutex::new(()),
                is_transitioning: AtomicBool::new(false),
                state: RwLock::new(NavigationState::default()),
                events,
                arrival: parking_lot::Mutex::new(None),
                clear_pending: AtomicBool::new(false),
            }),
        }
    }

    /// Supply the visual container. Must be called once before navigating.
    pub fn register_host(&self, host: Arc<dyn NavigationHost>) -> Result<()> {
        self.inner
            .host
            .set(host)
            .map_err(|_| NavigationError::HostAlreadyRegistered)
    }

    /// Remember every committed entry in `store`
    pub fn set_settings_store(&self, store: Arc<dyn SettingsStore>) {
        *self.inner.settings.write() = Some(store);
    }

    /// The configuration in use
    pub fn config(&self) -> &NavigationConfig {
        &self.inner.config
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Navigate forward to `screen_id`
    ///
    /// Returns `Ok(true)` once the screen is current, `Ok(false)` if a guard
    /// vetoed or the transition lock timed out.
    ///
    /// # Errors
    ///
    /// Fails if no host is registered or the screen cannot be resolved.
    pub async fn navigate_to(&self, screen_id: &str, parameter: Option<Value>) -> Result<bool> {
        let request = NavigationRequest::To {
            screen_id: screen_id.to_string(),
            parameter,
        };
        Ok(self.transition(request, None).await?.is_committed())
    }

    /// [`navigate_to`](Self::navigate_to) with a cancellation signal
    ///
    /// The token is checked on entry and again before the first mutating step.
    /// A cancelled transition returns `Ok(false)`.
    pub async fn navigate_to_with_cancel(
        &self,
        screen_id: &str,
        parameter: Option<Value>,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let request = NavigationRequest::To {
            screen_id: screen_id.to_string(),
            parameter,
        };
        Ok(self.transition(request, Some(cancel)).await?.is_committed())
    }

    /// Return to the previous screen
    ///
    /// `Ok(false)` without side effects when there is no back history.
    pub async fn go_back(&self) -> Result<bool> {
        Ok(self.transition(NavigationRequest::Back, None).await?.is_committed())
    }

    /// Re-enter the screen most recently left through [`go_back`](Self::go_back)
    pub async fn go_forward(&self) -> Result<bool> {
        Ok(self.transition(NavigationRequest::Forward, None).await?.is_committed())
    }

    /// Empty both histories without changing the current screen
    ///
    /// A transition already in flight applies its history move and then
    /// empties both histories again when it commits.
    pub fn clear_history(&self) {
        self.inner.clear_pending.store(true, Ordering::SeqCst);
        {
            let mut state = self.inner.state.write();
            state.back_history.clear();
            state.forward_history.clear();
        }
        if self.inner.transition_lock.try_lock().is_ok() {
            self.inner.clear_pending.store(false, Ordering::SeqCst);
        }
        tracing::debug!("Navigation history cleared");
        let _ = self.inner.events.send(NavigationEvent::HistoryCleared);
    }

    /// Navigate to the last screen recorded in the settings store
    ///
    /// Falls back to `default_screen` when nothing was recorded, the recorded
    /// screen is no longer registered, or no settings store is attached.
    pub async fn restore_last_screen(&self, default_screen: &str) -> Result<bool> {
        let store = self.inner.settings.read().clone();
        let remembered = match store {
            Some(store) => {
                match settings::get_typed::<NavigationEntry, _>(
                    store.as_ref(),
                    &self.inner.config.persist_key,
                )
                .await
                {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("Failed to read last screen: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        match remembered {
            Some(entry) if self.inner.factory.resolve_view_type(&entry.screen_id).is_some() => {
                tracing::debug!(screen = %entry.screen_id, "Restoring last screen");
                self.navigate_to(&entry.screen_id, entry.parameter).await
            }
            _ => self.navigate_to(default_screen, None).await,
        }
    }

    /// Run a transition and report exactly how it ended
    ///
    /// # Errors
    ///
    /// Fails if no host is registered or the target cannot be resolved; state
    /// is untouched in both cases. If creating or presenting the target view
    /// fails, the current controller has already been deactivated and
    /// destroyed. It stays [`current_controller`](Self::current_controller)
    /// but is inert until the next successful transition.
    pub async fn transition(
        &self,
        request: NavigationRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<TransitionOutcome> {
        let host = self.inner.host.get().cloned().ok_or(NavigationError::NoHost)?;

        if is_cancelled(cancel) {
            tracing::debug!(?request, "Transition cancelled before start");
            return Ok(TransitionOutcome::Cancelled);
        }

        match request {
            NavigationRequest::Back if !self.can_go_back() => return Ok(TransitionOutcome::NoHistory),
            NavigationRequest::Forward if !self.can_go_forward() => {
                return Ok(TransitionOutcome::NoHistory)
            }
            _ => {}
        }

        let _lock = match tokio::time::timeout(
            self.inner.config.lock_timeout,
            self.inner.transition_lock.lock(),
        )
        .await
        {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!(
                    ?request,
                    timeout_ms = self.inner.config.lock_timeout.as_millis() as u64,
                    "Timed out waiting for in-flight transition"
                );
                return Ok(TransitionOutcome::TimedOut);
            }
        };
        let _flag = TransitioningFlag::raise(&self.inner.is_transitioning);

        self.settle_arrival().await;
        let result = self.run_pipeline(request, cancel, host).await;
        self.inner.clear_pending.store(false, Ordering::SeqCst);

        let (outcome, arrival) = result?;
        if let Some(arrival) = arrival {
            self.spawn_arrival(arrival);
        }

        Ok(outcome)
    }

    /// Wait for the current controller's post-commit hooks to finish
    ///
    /// Skipped when called from those hooks, which would wait on themselves.
    async fn settle_arrival(&self) {
        let previous = self.inner.arrival.lock().take();
        let Some(handle) = previous else {
            return;
        };
        if tokio::task::try_id() == Some(handle.id()) {
            return;
        }
        if let Err(e) = handle.await {
            tracing::warn!("Post-commit hooks did not complete: {}", e);
        }
    }

    /// Run the post-commit hooks detached; the next transition waits for them
    fn spawn_arrival(&self, arrival: Arrival) {
        let mut slot = self.inner.arrival.lock();
        *slot = Some(tokio::spawn(arrive(arrival)));
    }

    async fn run_pipeline(
        &self,
        request: NavigationRequest,
        cancel: Option<&CancellationToken>,
        host: Arc<dyn NavigationHost>,
    ) -> Result<(TransitionOutcome, Option<Arrival>)> {
        let direction = request.direction();
        let (screen_id, parameter) = match request {
            NavigationRequest::To { screen_id, parameter } => (screen_id, parameter),
            NavigationRequest::Back | NavigationRequest::Forward => {
                let state = self.inner.state.read();
                let history = if direction == NavigationDirection::Back {
                    &state.back_history
                } else {
                    &state.forward_history
                };
                match history.current() {
                    Some(entry) => (entry.screen_id.clone(), entry.parameter.clone()),
                    None => return Ok((TransitionOutcome::NoHistory, None)),
                }
            }
        };

        let view_id = self
            .inner
            .factory
            .resolve_view_type(&screen_id)
            .ok_or_else(|| ScreenError::NotRegistered(screen_id.clone()))?;
        let target = self.inner.factory.create_controller(&screen_id)?;

        let (source, source_entry) = {
            let state = self.inner.state.read();
            (state.current_controller.clone(), state.current_entry.clone())
        };
        let context = TransitionContext {
            parameter,
            direction,
            source_screen: source_entry.map(|e| e.screen_id),
            target_screen: screen_id.clone(),
        };
        tracing::debug!(
            from = ?context.source_screen,
            to = %screen_id,
            ?direction,
            "Transition started"
        );

        // Guards: current first, then target. Nothing has been mutated yet.
        if let Some(guard) = source.as_ref().and_then(|c| c.navigation_aware()) {
            if !guard_verdict(guard.can_leave(&context).await, "can_leave", &context) {
                return Ok((TransitionOutcome::Vetoed(GuardStage::Leave), None));
            }
        }
        if let Some(guard) = target.navigation_aware() {
            if !guard_verdict(guard.can_enter(&context).await, "can_enter", &context) {
                return Ok((TransitionOutcome::Vetoed(GuardStage::Enter), None));
            }
        }

        if is_cancelled(cancel) {
            tracing::debug!(to = %screen_id, "Transition cancelled after guards");
            return Ok((TransitionOutcome::Cancelled, None));
        }

        if let Some(current) = source.as_ref() {
            leave(current.as_ref(), &context).await;
        }

        let factory = Arc::clone(&self.inner.factory);
        let bound = Arc::clone(&target);
        let view_type = view_id.clone();
        let presented = dispatcher::invoke(self.inner.dispatcher.as_ref(), move || {
            let view = factory.create_view(&view_type)?;
            view.bind(DataContext::Screen(bound));
            host.present(Arc::clone(&view));
            Ok::<_, ScreenError>(view)
        })
        .await;
        let view = match presented {
            Ok(Ok(view)) => view,
            Ok(Err(e)) => return Err(self.inert_after_leave(&context, source.is_some(), e.into())),
            Err(e) => return Err(self.inert_after_leave(&context, source.is_some(), e.into())),
        };

        let entry = NavigationEntry {
            screen_id,
            view_id,
            parameter: context.parameter.clone(),
        };
        let view_changed = self.commit(entry.clone(), Arc::clone(&target), view, direction);

        if view_changed {
            let _ = self.inner.events.send(NavigationEvent::ViewChanged {
                entry: entry.clone(),
                direction,
            });
        }
        tracing::info!(screen = %entry.screen_id, ?direction, "Navigation committed");

        self.persist(&entry).await;

        Ok((
            TransitionOutcome::Committed,
            Some(Arrival {
                controller: target,
                context,
            }),
        ))
    }

    /// Install the new screen and apply the history move for `direction`
    ///
    /// Returns whether the current view changed identity.
    fn commit(
        &self,
        entry: NavigationEntry,
        controller: Arc<dyn ScreenController>,
        view: Arc<dyn View>,
        direction: NavigationDirection,
    ) -> bool {
        let mut state = self.inner.state.write();
        let leaving = state.current_entry.take();

        match direction {
            NavigationDirection::Forward => {
                if let Some(previous) = leaving {
                    state.back_history.push(previous);
                }
                state.forward_history.clear();
            }
            NavigationDirection::Back => {
                state.back_history.pop();
                if let Some(previous) = leaving {
                    state.forward_history.push(previous);
                }
            }
            NavigationDirection::HistoryForward => {
                state.forward_history.pop();
                if let Some(previous) = leaving {
                    state.back_history.push(previous);
                }
            }
        }

        if self.inner.clear_pending.swap(false, Ordering::SeqCst) {
            state.back_history.clear();
            state.forward_history.clear();
        }

        let changed = state
            .current_view
            .as_ref()
            .map_or(true, |current| !Arc::ptr_eq(current, &view));

        state.current_entry = Some(entry);
        state.current_controller = Some(controller);
        state.current_view = Some(view);
        changed
    }

    fn inert_after_leave(
        &self,
        context: &TransitionContext,
        left: bool,
        error: NavigationError,
    ) -> NavigationError {
        if left {
            tracing::error!(
                from = ?context.source_screen,
                to = %context.target_screen,
                "View hop failed after the current screen was left; its controller is now inert: {}",
                error
            );
        }
        error
    }

    async fn persist(&self, entry: &NavigationEntry) {
        let store = self.inner.settings.read().clone();
        if let Some(store) = store {
            if let Err(e) =
                settings::set_typed(store.as_ref(), &self.inner.config.persist_key, entry).await
            {
                tracing::warn!(screen = %entry.screen_id, "Failed to remember last screen: {}", e);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Observables
    // -------------------------------------------------------------------------

    /// The view currently presented
    pub fn current_view(&self) -> Option<Arc<dyn View>> {
        self.inner.state.read().current_view.clone()
    }

    /// The controller of the current screen
    pub fn current_controller(&self) -> Option<Arc<dyn ScreenController>> {
        self.inner.state.read().current_controller.clone()
    }

    /// The current entry
    pub fn current_entry(&self) -> Option<NavigationEntry> {
        self.inner.state.read().current_entry.clone()
    }

    /// Whether a transition pipeline is running
    pub fn is_transitioning(&self) -> bool {
        self.inner.is_transitioning.load(Ordering::SeqCst)
    }

    /// Whether back history is non-empty
    pub fn can_go_back(&self) -> bool {
        !self.inner.state.read().back_history.is_empty()
    }

    /// Whether forward history is non-empty
    pub fn can_go_forward(&self) -> bool {
        !self.inner.state.read().forward_history.is_empty()
    }

    /// Number of entries in back history
    pub fn history_depth(&self) -> usize {
        self.inner.state.read().back_history.depth()
    }

    /// Snapshot of back history, oldest first
    pub fn back_history(&self) -> Vec<NavigationEntry> {
        self.inner.state.read().back_history.entries().to_vec()
    }

    /// Snapshot of forward history, oldest first
    pub fn forward_history(&self) -> Vec<NavigationEntry> {
        self.inner.state.read().forward_history.entries().to_vec()
    }

    /// Subscribe to navigation events. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.inner.events.subscribe()
    }
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}

fn guard_verdict(
    result: anyhow::Result<bool>,
    hook: &'static str,
    context: &TransitionContext,
) -> bool {
    match result {
        Ok(true) => true,
        Ok(false) => {
            tracing::info!(hook, to = %context.target_screen, "Transition vetoed");
            false
        }
        Err(e) => {
            tracing::warn!(hook, to = %context.target_screen, "Guard failed, treating as veto: {:#}", e);
            false
        }
    }
}

/// Deactivate, notify and destroy the controller being left
async fn leave(current: &dyn ScreenController, context: &TransitionContext) {
    if let Some(activatable) = current.activatable() {
        if let Err(e) = activatable.deactivate().await {
            tracing::warn!(from = ?context.source_screen, "deactivate failed: {:#}", e);
        }
    }
    if let Some(aware) = current.navigation_aware() {
        if let Err(e) = aware.on_left(context).await {
            tracing::warn!(from = ?context.source_screen, "on_left failed: {:#}", e);
        }
    }
    if let Some(destructible) = current.destructible() {
        destructible.destroy();
    }
}

async fn arrive(arrival: Arrival) {
    let Arrival { controller, context } = arrival;
    let screen = context.target_screen.as_str();

    if let Some(init) = controller.async_initializable() {
        if let Err(e) = init.initialize().await {
            tracing::warn!(screen, "initialize failed after commit: {:#}", e);
        }
    }
    if let Some(aware) = controller.navigation_aware() {
        if let Err(e) = aware.on_arrived(&context).await {
            tracing::warn!(screen, "on_arrived failed after commit: {:#}", e);
        }
    }
    if let Some(activatable) = controller.activatable() {
        if let Err(e) = activatable.activate().await {
            tracing::warn!(screen, "activate failed after commit: {:#}", e);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
