//! Identifier newtypes carried in every data frame header.

use derive_more::{Display, From, Into};

/// Identifies one publisher instance on a stream.
///
/// Frames sharing a session id arrive in the order they were written, which
/// is what lets the assembler stitch fragments without sequence numbers.
///
/// # Examples
///
/// ```
/// use frameweave::frame::SessionId;
/// let id = SessionId::new(42);
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct SessionId(i32);

impl SessionId {
    /// Create a new session identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self { Self(value) }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 { self.0 }
}

/// Identifies a logical stream within a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct StreamId(i32);

impl StreamId {
    /// Create a new stream identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self { Self(value) }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 { self.0 }
}
