//! State context for the userbase admin crates.
//!
//! A [`StateCtx`] owns exactly one [`State`] value. Synchronous changes go
//! through [`StateCtx::update`]; asynchronous work is spawned with
//! [`StateCtx::spawn`] and reports back by sending events through an
//! [`Updater`]. Events are applied only when the owner calls
//! [`StateCtx::sync`], one event per step, so completions never interleave
//! mid-update.
//!
//! After [`StateCtx::dispose`] in-flight tasks keep running to completion,
//! but whatever they report is discarded.

mod ctx;
mod error;
mod state;
mod task;
mod updater;

pub use ctx::StateCtx;
pub use error::Error;
pub use state::State;
pub use task::{TaskHandle, TaskId};
pub use updater::Updater;
