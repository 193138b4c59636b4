//! Errors raised while growing an assembly buffer.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::frame::SessionId;

/// Growing an assembly buffer failed; the in-progress message is lost.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BufferGrowthError {
    /// The message would exceed the configured maximum size.
    #[error("session {session_id} message would grow to {attempted} bytes, over the {limit}-byte limit")]
    LimitExceeded {
        /// Session whose assembly hit the limit.
        session_id: SessionId,
        /// Size the append would have produced.
        attempted: usize,
        /// Configured size cap.
        limit: NonZeroUsize,
    },
    /// The allocator refused to provide more capacity.
    #[error("failed to reserve {requested} bytes for session {session_id}")]
    AllocationFailed {
        /// Session whose assembly could not grow.
        session_id: SessionId,
        /// Capacity that was requested.
        requested: usize,
    },
}

impl BufferGrowthError {
    /// Session whose assembly failed to grow.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        match self {
            Self::LimitExceeded { session_id, .. } | Self::AllocationFailed { session_id, .. } => {
                *session_id
            }
        }
    }
}
