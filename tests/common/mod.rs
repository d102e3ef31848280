//! Shared fixtures for the integration tests
//!
//! Screens record every hook call so tests can assert on call counts and order.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use waypoint::ui::dialogs::{CloseRequester, DialogController, DialogHost, DialogParameters};
use waypoint::ui::lifecycle::{
    Activatable, AsyncInitializable, Destructible, NavigationAware, ScreenController,
    TransitionContext,
};
use waypoint::ui::navigation::NavigationHost;
use waypoint::ui::view::{DataContext, View};

/// Ordered log of hook calls, shared by every fixture in a test
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == call).count()
    }
}

/// Screen controller implementing every lifecycle contract
pub struct ScreenSpy {
    pub name: &'static str,
    log: Arc<CallLog>,
    pub allow_leave: AtomicBool,
    pub allow_enter: AtomicBool,
    pub fail_initialize: AtomicBool,
    /// When set, `can_enter` parks until notified
    pub enter_gate: Option<Arc<Notify>>,
    in_guard: Arc<AtomicUsize>,
    max_in_guard: Arc<AtomicUsize>,
}

impl ScreenSpy {
    pub fn new(name: &'static str, log: Arc<CallLog>) -> Self {
        Self {
            name,
            log,
            allow_leave: AtomicBool::new(true),
            allow_enter: AtomicBool::new(true),
            fail_initialize: AtomicBool::new(false),
            enter_gate: None,
            in_guard: Arc::new(AtomicUsize::new(0)),
            max_in_guard: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.enter_gate = Some(gate);
        self
    }

    /// Share concurrency counters across instances
    pub fn with_counters(mut self, in_guard: Arc<AtomicUsize>, max: Arc<AtomicUsize>) -> Self {
        self.in_guard = in_guard;
        self.max_in_guard = max;
        self
    }

    fn record(&self, hook: &str) {
        self.log.record(format!("{}.{}", self.name, hook));
    }
}

#[async_trait]
impl NavigationAware for ScreenSpy {
    async fn can_leave(&self, _context: &TransitionContext) -> anyhow::Result<bool> {
        self.record("can_leave");
        Ok(self.allow_leave.load(Ordering::SeqCst))
    }

    async fn can_enter(&self, _context: &TransitionContext) -> anyhow::Result<bool> {
        self.record("can_enter");
        let now = self.in_guard.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_guard.fetch_max(now, Ordering::SeqCst);
        if let Some(gate) = &self.enter_gate {
            gate.notified().await;
        }
        self.in_guard.fetch_sub(1, Ordering::SeqCst);
        Ok(self.allow_enter.load(Ordering::SeqCst))
    }

    async fn on_left(&self, _context: &TransitionContext) -> anyhow::Result<()> {
        self.record("on_left");
        Ok(())
    }

    async fn on_arrived(&self, _context: &TransitionContext) -> anyhow::Result<()> {
        self.record("on_arrived");
        Ok(())
    }
}

#[async_trait]
impl Activatable for ScreenSpy {
    async fn activate(&self) -> anyhow::Result<()> {
        self.record("activate");
        Ok(())
    }

    async fn deactivate(&self) -> anyhow::Result<()> {
        self.record("deactivate");
        Ok(())
    }
}

impl Destructible for ScreenSpy {
    fn destroy(&self) {
        self.record("destroy");
    }
}

#[async_trait]
impl AsyncInitializable for ScreenSpy {
    async fn initialize(&self) -> anyhow::Result<()> {
        self.record("initialize");
        if self.fail_initialize.load(Ordering::SeqCst) {
            anyhow::bail!("{} failed to load", self.name);
        }
        Ok(())
    }
}

impl ScreenController for ScreenSpy {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn navigation_aware(&self) -> Option<&dyn NavigationAware> {
        Some(self)
    }

    fn activatable(&self) -> Option<&dyn Activatable> {
        Some(self)
    }

    fn destructible(&self) -> Option<&dyn Destructible> {
        Some(self)
    }

    fn async_initializable(&self) -> Option<&dyn AsyncInitializable> {
        Some(self)
    }
}

/// View that remembers what it was bound to
pub struct TestView {
    id: String,
    bound: Mutex<Option<DataContext>>,
}

impl TestView {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bound: Mutex::new(None),
        }
    }

    pub fn bound(&self) -> Option<DataContext> {
        self.bound.lock().clone()
    }
}

impl View for TestView {
    fn view_id(&self) -> &str {
        &self.id
    }

    fn bind(&self, context: DataContext) {
        *self.bound.lock() = Some(context);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Host recording presented screens and the dialog layer stack
#[derive(Default)]
pub struct RecordingHost {
    pub presented: Mutex<Vec<String>>,
    pub layers: Mutex<Vec<String>>,
    pub threads: Mutex<Vec<Option<String>>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn note_thread(&self) {
        self.threads
            .lock()
            .push(std::thread::current().name().map(str::to_string));
    }
}

impl NavigationHost for RecordingHost {
    fn present(&self, view: Arc<dyn View>) {
        self.note_thread();
        self.presented.lock().push(view.view_id().to_string());
    }
}

impl DialogHost for RecordingHost {
    fn push_layer(&self, view: Arc<dyn View>) {
        self.note_thread();
        self.layers.lock().push(view.view_id().to_string());
    }

    fn remove_layer(&self, view: &Arc<dyn View>) {
        self.note_thread();
        let mut layers = self.layers.lock();
        if let Some(index) = layers.iter().rposition(|id| id == view.view_id()) {
            layers.remove(index);
        }
    }
}

/// Dialog controller that closes when told to and may refuse to close
pub struct DialogSpy {
    pub name: &'static str,
    log: Arc<CallLog>,
    pub allow_close: AtomicBool,
    closer: Mutex<Option<CloseRequester>>,
    parameters: Mutex<Option<DialogParameters>>,
}

impl DialogSpy {
    pub fn new(name: &'static str, log: Arc<CallLog>) -> Self {
        Self {
            name,
            log,
            allow_close: AtomicBool::new(true),
            closer: Mutex::new(None),
            parameters: Mutex::new(None),
        }
    }

    /// Simulates a button handler asking to close
    pub fn close_with(&self, result: Value) -> bool {
        self.closer
            .lock()
            .as_ref()
            .is_some_and(|closer| closer.request_close(result))
    }

    pub fn parameters(&self) -> Option<DialogParameters> {
        self.parameters.lock().clone()
    }
}

#[async_trait]
impl DialogController for DialogSpy {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_opened(&self, parameters: Option<DialogParameters>, closer: CloseRequester) {
        self.log.record(format!("{}.on_opened", self.name));
        *self.parameters.lock() = parameters;
        *self.closer.lock() = Some(closer);
    }

    async fn can_close(&self) -> anyhow::Result<bool> {
        self.log.record(format!("{}.can_close", self.name));
        Ok(self.allow_close.load(Ordering::SeqCst))
    }

    async fn on_closing(&self) -> anyhow::Result<()> {
        self.log.record(format!("{}.on_closing", self.name));
        Ok(())
    }

    fn on_closed(&self) {
        self.log.record(format!("{}.on_closed", self.name));
    }
}

/// Poll `condition` until it holds, yielding to other tasks in between
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(std::time::Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
