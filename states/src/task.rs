//! Task identity for work spawned by a [`crate::StateCtx`].
//!
//! - `TaskId`: the key the task works on (a user id, an app name) plus a
//!   per-context sequence number
//! - `TaskHandle`: the id together with the context's teardown token
//!
//! ```ignore
//! let handle = ctx.spawn("user-42", |updater| async move {
//!     updater.set(Event::Done).ok();
//! })?;
//!
//! assert_eq!(handle.id().key(), "user-42");
//! ```

use tokio_util::sync::CancellationToken;
use ustr::Ustr;

/// Identifier of a spawned task.
///
/// Two tasks on the same key are told apart by `seq`, which grows
/// monotonically for the lifetime of the owning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    key: Ustr,
    seq: u64,
}

impl TaskId {
    pub fn new(key: Ustr, seq: u64) -> Self {
        Self { key, seq }
    }

    pub fn key(&self) -> Ustr {
        self.key
    }

    /// Higher values were spawned later.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.key, self.seq)
    }
}

/// Handle to a spawned task.
///
/// The token is the owning context's teardown signal, not a per-task abort:
/// work already sent to a server is never interrupted. A task (or anyone
/// holding the handle) can check `is_disposed()` before doing something
/// that only makes sense while the context is alive.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    teardown: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, teardown: CancellationToken) -> Self {
        Self { id, teardown }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns `true` once the owning context has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.teardown.is_cancelled()
    }
}
