use flume::Sender;
use tokio_util::sync::CancellationToken;

use crate::Error;

/// Sending half handed to spawned tasks.
///
/// `set` refuses events once the owning context has been disposed, which is
/// how a late completion learns that there is nothing left to update.
pub struct Updater<E> {
    send: Sender<E>,
    cancel: CancellationToken,
}

impl<E> Updater<E> {
    pub(crate) fn new(send: Sender<E>, cancel: CancellationToken) -> Self {
        Self { send, cancel }
    }

    /// Queue an event for the next `sync`.
    pub fn set(&self, event: E) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Disposed);
        }
        self.send.send(event).map_err(|_disconnected| Error::Disposed)
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<E> Clone for Updater<E> {
    fn clone(&self) -> Self {
        Self {
            send: self.send.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<E> std::fmt::Debug for Updater<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("disposed", &self.cancel.is_cancelled())
            .field("queued", &self.send.len())
            .finish()
    }
}
