//! Modal dialog orchestration
//!
//! Dialogs form a LIFO stack. [`DialogOrchestrator::show`] pushes a context and
//! suspends the caller until that specific dialog closes, yielding the result
//! it was closed with. A dialog may open further dialogs from its own handlers;
//! they stack above it and close first.
//!
//! Closing is always requested, never forced: the controller sends a result
//! through its [`CloseRequester`] (or the host calls
//! [`DialogOrchestrator::request_close`]), the topmost controller is asked
//! [`can_close`](DialogController::can_close), and only then is the context
//! popped.
//!
//! Each context moves through [`DialogState`]:
//! `Opening -> Open -> Closing -> Closed`.

use crate::screens::{ScreenError, ScreenFactory};
use crate::view::{DataContext, View};
use app_platform::dispatcher::{self, DispatchError, InteractionDispatcher};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Payload handed to a dialog when it opens
pub type DialogParameters = Value;

/// Payload a dialog closes with
pub type DialogResult = Value;

/// Dialog errors
#[derive(Debug, Error)]
pub enum DialogError {
    /// `register_host` has not been called
    #[error("No dialog host registered")]
    NoHost,

    /// `register_host` was called twice
    #[error("Dialog host already registered")]
    HostAlreadyRegistered,

    /// The dialog or its view could not be resolved
    #[error("Dialog resolution failed: {0}")]
    Screen(#[from] ScreenError),

    /// The interaction thread rejected or dropped the work
    #[error("Interaction thread error: {0}")]
    Dispatch(#[from] DispatchError),

    /// The context was discarded without a result
    #[error("Dialog closed without a result")]
    Abandoned,

    /// The result did not match the requested type
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for dialog operations
pub type Result<T> = std::result::Result<T, DialogError>;

/// Lifecycle of one open dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogState {
    /// Pushed, `on_opened` not yet returned
    Opening,
    /// Visible and interactive
    Open,
    /// Close permitted, teardown in progress
    Closing,
    /// Result delivered. Terminal.
    Closed,
}

impl DialogState {
    /// Whether `next` is the single legal successor of this state
    pub fn can_transition_to(self, next: DialogState) -> bool {
        matches!(
            (self, next),
            (DialogState::Opening, DialogState::Open)
                | (DialogState::Open, DialogState::Closing)
                | (DialogState::Closing, DialogState::Closed)
        )
    }
}

/// Identifies one open dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogId(u64);

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog-{}", self.0)
    }
}

/// A dialog controller's channel for asking to be closed
///
/// Handed to the controller in [`DialogController::on_opened`]. The `show`
/// call that opened the dialog is the only receiver, so a requester outliving
/// its dialog simply reports `false`.
#[derive(Debug, Clone)]
pub struct CloseRequester {
    tx: mpsc::UnboundedSender<DialogResult>,
}

impl CloseRequester {
    /// Ask for the topmost dialog to close with `result`
    ///
    /// Returns `false` if the dialog has already closed.
    pub fn request_close(&self, result: DialogResult) -> bool {
        self.tx.send(result).is_ok()
    }

    /// Whether the dialog is still waiting for close requests
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// A modal dialog's controller
#[async_trait]
pub trait DialogController: Send + Sync + 'static {
    /// Downcasting support for hosts and tests
    fn as_any(&self) -> &dyn Any;

    /// The dialog was pushed. Keep `closer` to request closing later.
    fn on_opened(&self, parameters: Option<DialogParameters>, closer: CloseRequester);

    /// Whether the dialog may close now. Errors count as a refusal.
    async fn can_close(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Close permitted; last chance to finish work
    async fn on_closing(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// The dialog has been removed from the host. Also called when its `show`
    /// call ends without a result (dropped, or the layer could not be pushed).
    fn on_closed(&self) {}
}

impl dyn DialogController {
    /// Downcast to a concrete controller type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Receives dialog views as a visual stack
pub trait DialogHost: Send + Sync {
    /// Show `view` above every other layer. Called on the interaction thread.
    fn push_layer(&self, view: Arc<dyn View>);

    /// Remove `view` from the stack. Called on the interaction thread.
    fn remove_layer(&self, view: &Arc<dyn View>);
}

struct DialogContext {
    id: DialogId,
    dialog_id: String,
    view: Arc<dyn View>,
    controller: Arc<dyn DialogController>,
    state: DialogState,
    close_pending: bool,
    result_tx: Option<oneshot::Sender<DialogResult>>,
}

impl DialogContext {
    fn advance(&mut self, next: DialogState) {
        if self.state.can_transition_to(next) {
            tracing::trace!(id = %self.id, from = ?self.state, to = ?next, "Dialog state");
            self.state = next;
        } else {
            tracing::error!(id = %self.id, from = ?self.state, to = ?next, "Illegal dialog state change");
        }
    }
}

struct DialogInner {
    factory: Arc<dyn ScreenFactory>,
    dispatcher: Arc<dyn InteractionDispatcher>,
    host: OnceLock<Arc<dyn DialogHost>>,
    stack: Mutex<Vec<DialogContext>>,
    next_id: AtomicU64,
}

impl DialogInner {
    fn host(&self) -> Result<Arc<dyn DialogHost>> {
        self.host.get().cloned().ok_or(DialogError::NoHost)
    }

    fn advance(&self, id: DialogId, next: DialogState) {
        if let Some(context) = self.stack.lock().iter_mut().find(|c| c.id == id) {
            context.advance(next);
        }
    }

    fn remove(&self, id: DialogId) -> Option<DialogContext> {
        let mut stack = self.stack.lock();
        let index = stack.iter().position(|c| c.id == id)?;
        if index + 1 != stack.len() {
            tracing::warn!(%id, "Removing dialog that is not topmost");
        }
        Some(stack.remove(index))
    }
}

/// Removes a context whose `show` call ended before it resolved and tells its
/// controller it closed
struct PendingDialog {
    inner: Arc<DialogInner>,
    id: DialogId,
}

impl Drop for PendingDialog {
    fn drop(&mut self) {
        let Some(context) = self.inner.remove(self.id) else {
            return;
        };

        tracing::warn!(id = %self.id, dialog = %context.dialog_id, "Dialog abandoned before closing");
        if let Some(host) = self.inner.host.get().cloned() {
            let view = Arc::clone(&context.view);
            if let Err(e) = self
                .inner
                .dispatcher
                .post(Box::new(move || host.remove_layer(&view)))
            {
                tracing::warn!("Failed to remove abandoned dialog view: {}", e);
            }
        }
        context.controller.on_closed();
    }
}

/// Modal dialog orchestrator
///
/// Cheap to clone; clones share the same stack. There is no global lock:
/// `show` may be called from inside an open dialog's handler and the child
/// simply stacks on top.
#[derive(Clone)]
pub struct DialogOrchestrator {
    inner: Arc<DialogInner>,
}

impl DialogOrchestrator {
    /// Create an orchestrator
    pub fn new(factory: Arc<dyn ScreenFactory>, dispatcher: Arc<dyn InteractionDispatcher>) -> Self {
        Self {
            inner: Arc::new(DialogInner {
                factory,
                dispatcher,
                host: OnceLock::new(),
                stack: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Supply the visual stack. Must be called once before showing dialogs.
    pub fn register_host(&self, host: Arc<dyn DialogHost>) -> Result<()> {
        self.inner
            .host
            .set(host)
            .map_err(|_| DialogError::HostAlreadyRegistered)
    }

    /// Open a dialog and wait for its result
    ///
    /// # Errors
    ///
    /// Fails if no host is registered, the identifier is unknown, or it is
    /// registered as a screen rather than a dialog.
    pub async fn show(
        &self,
        dialog_id: &str,
        parameters: Option<DialogParameters>,
    ) -> Result<DialogResult> {
        let host = self.inner.host()?;
        let controller = self.inner.factory.create_dialog(dialog_id)?;
        let view_id = self
            .inner
            .factory
            .resolve_view_type(dialog_id)
            .ok_or_else(|| ScreenError::NotRegistered(dialog_id.to_string()))?;

        let factory = Arc::clone(&self.inner.factory);
        let bound = Arc::clone(&controller);
        let view = dispatcher::invoke(self.inner.dispatcher.as_ref(), move || {
            let view = factory.create_view(&view_id)?;
            view.bind(DataContext::Dialog(bound));
            Ok::<_, ScreenError>(view)
        })
        .await??;

        let (close_tx, mut close_rx) = mpsc::unbounded_channel();
        let (result_tx, mut result_rx) = oneshot::channel();
        let id = DialogId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));

        self.inner.stack.lock().push(DialogContext {
            id,
            dialog_id: dialog_id.to_string(),
            view: Arc::clone(&view),
            controller: Arc::clone(&controller),
            state: DialogState::Opening,
            close_pending: false,
            result_tx: Some(result_tx),
        });
        let _pending = PendingDialog {
            inner: Arc::clone(&self.inner),
            id,
        };

        controller.on_opened(parameters, CloseRequester { tx: close_tx });
        self.inner.advance(id, DialogState::Open);

        dispatcher::invoke(self.inner.dispatcher.as_ref(), move || host.push_layer(view)).await?;
        tracing::debug!(%id, dialog = %dialog_id, depth = self.depth(), "Dialog opened");

        loop {
            tokio::select! {
                biased;
                result = &mut result_rx => {
                    return result.map_err(|_| DialogError::Abandoned);
                }
                Some(result) = close_rx.recv() => {
                    self.request_close(result).await;
                }
            }
        }
    }

    /// [`show`](Self::show), deserializing the result into `T`
    pub async fn show_as<T: DeserializeOwned>(
        &self,
        dialog_id: &str,
        parameters: Option<DialogParameters>,
    ) -> Result<T> {
        let result = self.show(dialog_id, parameters).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Ask the topmost dialog to close with `result`
    ///
    /// Returns `true` once the dialog is closed and its `show` caller resumed.
    /// Returns `false` when the stack is empty, the controller refused, or a
    /// close for the same dialog is already being evaluated.
    pub async fn request_close(&self, result: DialogResult) -> bool {
        let (id, controller) = {
            let mut stack = self.inner.stack.lock();
            let Some(top) = stack.last_mut() else {
                tracing::debug!("Close requested with no open dialog");
                return false;
            };
            if top.state != DialogState::Open || top.close_pending {
                return false;
            }
            top.close_pending = true;
            (top.id, Arc::clone(&top.controller))
        };

        let permitted = match controller.can_close().await {
            Ok(permitted) => permitted,
            Err(e) => {
                tracing::warn!(%id, "can_close failed, keeping dialog open: {:#}", e);
                false
            }
        };

        let still_top = self.inner.stack.lock().last().map(|c| c.id) == Some(id);
        if !permitted || !still_top {
            if let Some(context) = self.inner.stack.lock().iter_mut().find(|c| c.id == id) {
                context.close_pending = false;
            }
            tracing::debug!(%id, permitted, still_top, "Dialog close refused");
            return false;
        }

        self.inner.advance(id, DialogState::Closing);
        if let Err(e) = controller.on_closing().await {
            tracing::warn!(%id, "on_closing failed: {:#}", e);
        }

        let Some(mut context) = self.inner.remove(id) else {
            return false;
        };

        if let Some(host) = self.inner.host.get().cloned() {
            let view = Arc::clone(&context.view);
            if let Err(e) =
                dispatcher::invoke(self.inner.dispatcher.as_ref(), move || host.remove_layer(&view))
                    .await
            {
                tracing::warn!(%id, "Failed to remove dialog view: {}", e);
            }
        }

        context.controller.on_closed();
        context.advance(DialogState::Closed);
        tracing::debug!(%id, dialog = %context.dialog_id, "Dialog closed");

        if let Some(tx) = context.result_tx.take() {
            let _ = tx.send(result);
        }
        true
    }

    // -------------------------------------------------------------------------
    // Observables
    // -------------------------------------------------------------------------

    /// Number of open dialogs
    pub fn depth(&self) -> usize {
        self.inner.stack.lock().len()
    }

    /// Whether no dialog is open
    pub fn is_empty(&self) -> bool {
        self.inner.stack.lock().is_empty()
    }

    /// Id and identifier of the topmost dialog
    pub fn top_dialog(&self) -> Option<(DialogId, String)> {
        self.inner
            .stack
            .lock()
            .last()
            .map(|c| (c.id, c.dialog_id.clone()))
    }

    /// Controller of the topmost dialog
    pub fn top_controller(&self) -> Option<Arc<dyn DialogController>> {
        self.inner
            .stack
            .lock()
            .last()
            .map(|c| Arc::clone(&c.controller))
    }

    /// State of an open dialog; `None` once it has closed
    pub fn state_of(&self, id: DialogId) -> Option<DialogState> {
        self.inner
            .stack
            .lock()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.state)
    }

    /// Identifiers of the open dialogs, bottom first
    pub fn open_dialogs(&self) -> Vec<String> {
        self.inner
            .stack
            .lock()
            .iter()
            .map(|c| c.dialog_id.clone())
            .collect()
    }
}
