//! Platform plumbing for Waypoint
//!
//! This crate provides the pieces every host shell needs regardless of the UI
//! toolkit it drives:
//!
//! - [`dispatcher`] - marshalling work onto the single interaction thread
//! - [`logging`] - tracing subscriber setup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatcher;
pub mod logging;

pub use dispatcher::{
    invoke, DispatchError, InlineDispatcher, InteractionDispatcher, Job, ThreadDispatcher,
};
