//! Error types for deque operations.
//!
//! Not-found and end-of-stream are not errors: operations report them as
//! `Ok(None)`. The variants below are the conditions a caller may need to
//! act upon.

use std::fmt;

/// Errors produced by deque operations.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum DequeError {
    /// A node could not be allocated; the payload was not inserted.
    #[error("node allocation failed")]
    AllocationFailed,
    /// A thread panicked while holding the deque lock.
    #[error("deque lock poisoned")]
    Poisoned,
    /// Non-blocking push found the deque at capacity.
    #[error("deque is full")]
    Full,
    /// Non-blocking pop found the deque empty while producers are still active.
    #[error("deque is empty")]
    Empty,
}

/// A failed push, handing the payload back to the caller.
///
#[derive(thiserror::Error)]
#[error("push failed: {kind}")]
pub struct PushError<T> {
    #[source]
    kind: DequeError,
    payload: T,
}

impl<T> PushError<T> {
    pub(crate) fn new(kind: DequeError, payload: T) -> Self {
        PushError { kind, payload }
    }

    pub fn kind(&self) -> DequeError {
        self.kind
    }

    /// Recovers the payload that could not be inserted.
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
