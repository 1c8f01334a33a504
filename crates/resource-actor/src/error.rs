//! Errors raised by the actor runtime itself, as opposed to entity-level failures.

/// Failure reported by a [`ResourceClient`](crate::ResourceClient) call.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    /// The actor's mailbox is closed; it has shut down.
    #[error("Actor closed")]
    ActorClosed,
    /// The actor accepted the request but never answered.
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A lifecycle hook or action handler of the entity returned an error.
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Returns `true` when the actor itself is unreachable, which callers
    /// generally treat as a transient condition.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ActorClosed | Self::ActorDropped)
    }
}
