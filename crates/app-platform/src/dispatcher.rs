//! Interaction-thread dispatching
//!
//! Every mutation of visible state (presenting a screen, stacking a dialog
//! layer) is applied on one logical "interaction thread". Components receive
//! an [`InteractionDispatcher`] at construction and never touch the host from
//! any other thread.
//!
//! Two implementations are provided:
//!
//! - [`ThreadDispatcher`] owns a dedicated OS thread fed by a job queue
//! - [`InlineDispatcher`] runs jobs immediately on the caller, for headless
//!   hosts and tests
//!
//! # Example
//!
//! ```rust
//! use app_platform::dispatcher::{invoke, ThreadDispatcher};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = ThreadDispatcher::spawn("interaction")?;
//! let answer = invoke(&dispatcher, || 6 * 7).await?;
//! assert_eq!(answer, 42);
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Errors raised while handing work to the interaction thread
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatcher has been shut down
    #[error("Interaction thread has stopped")]
    Stopped,

    /// The job was dropped (or panicked) before reporting a result
    #[error("Interaction job dropped before completion")]
    Dropped,
}

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// A unit of work to run on the interaction thread
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run work on the interaction thread
pub trait InteractionDispatcher: Send + Sync {
    /// Queue a job without waiting for it
    fn post(&self, job: Job) -> Result<()>;

    /// Whether the calling thread is the interaction thread
    fn is_interaction_thread(&self) -> bool;
}

/// Run `f` on the interaction thread and await its return value
///
/// When already on the interaction thread the closure runs inline, so a job
/// that dispatches further work cannot deadlock against itself.
pub async fn invoke<D, F, R>(dispatcher: &D, f: F) -> Result<R>
where
    D: InteractionDispatcher + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if dispatcher.is_interaction_thread() {
        return Ok(f());
    }

    let (tx, rx) = oneshot::channel();
    dispatcher.post(Box::new(move || {
        let _ = tx.send(f());
    }))?;

    rx.await.map_err(|_| DispatchError::Dropped)
}

/// Dispatcher backed by a dedicated, named OS thread
///
/// Jobs run in the order they were posted. A panicking job is logged and the
/// thread keeps serving the queue. Dropping the dispatcher closes the queue
/// and joins the thread once the remaining jobs have drained.
pub struct ThreadDispatcher {
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    thread_id: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl ThreadDispatcher {
    /// Spawn the interaction thread
    ///
    /// # Arguments
    ///
    /// * `name` - Thread name, visible in debuggers and panic messages
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let name = name.into();
        let thread_name = name.clone();

        let handle = thread::Builder::new().name(name).spawn(move || {
            tracing::debug!(thread = %thread_name, "Interaction thread started");
            while let Some(job) = rx.blocking_recv() {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::error!(thread = %thread_name, "Interaction job panicked");
                }
            }
            tracing::debug!(thread = %thread_name, "Interaction thread stopped");
        })?;

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            thread_id: handle.thread().id(),
            handle: Some(handle),
        })
    }

    /// Stop accepting new jobs
    ///
    /// Jobs already queued still run. Subsequent [`post`](InteractionDispatcher::post)
    /// calls fail with [`DispatchError::Stopped`].
    pub fn shutdown(&self) {
        self.sender.lock().take();
    }
}

impl InteractionDispatcher for ThreadDispatcher {
    fn post(&self, job: Job) -> Result<()> {
        match self.sender.lock().as_ref() {
            Some(tx) => tx.send(job).map_err(|_| DispatchError::Stopped),
            None => Err(DispatchError::Stopped),
        }
    }

    fn is_interaction_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        self.sender.lock().take();
        if let Some(handle) = self.handle.take() {
            // Joining from the interaction thread itself would never return.
            if thread::current().id() != self.thread_id && handle.join().is_err() {
                tracing::error!("Interaction thread terminated abnormally");
            }
        }
    }
}

/// Dispatcher that runs every job synchronously on the calling thread
///
/// Suitable for headless shells and tests where there is no toolkit event
/// loop; every caller is treated as the interaction thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl InlineDispatcher {
    /// Create an inline dispatcher
    pub fn new() -> Self {
        Self
    }
}

impl InteractionDispatcher for InlineDispatcher {
    fn post(&self, job: Job) -> Result<()> {
        job();
        Ok(())
    }

    fn is_interaction_thread(&self) -> bool {
        true
    }
}
