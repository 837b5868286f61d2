use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The owning context was torn down; the work it would have done is dropped.
    #[error("state context has been disposed")]
    Disposed,
}
