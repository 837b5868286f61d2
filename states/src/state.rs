/// A value owned by a [`crate::StateCtx`] and changed by applying events.
///
/// `apply` runs on the owning task only, so implementations can treat each
/// call as a critical section.
pub trait State: 'static {
    /// Completion message produced by tasks spawned for this state.
    type Event: Send + 'static;

    fn apply(&mut self, event: Self::Event);
}
