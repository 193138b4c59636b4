//! Application-facing view of a complete logical message.

use crate::{
    assembly::AssemblyBuffer,
    frame::{FrameHeader, SessionId, StreamId},
};

/// A complete message handed to a [`MessageHandler`].
///
/// Single-frame messages borrow the transport's buffer without copying.
/// Fragmented messages borrow the assembly buffer the fragments were stitched
/// into. Both borrows end when the handler returns; use
/// [`to_vec`](Self::to_vec) to keep the bytes.
#[derive(Clone, Copy, Debug)]
pub enum Message<'a> {
    /// A message that arrived in one frame, exactly as delivered.
    Unfragmented {
        /// Transport buffer containing the frame.
        buffer: &'a [u8],
        /// Offset of the payload within `buffer`.
        offset: usize,
        /// Payload length.
        length: usize,
        /// Header of the frame.
        header: &'a FrameHeader,
    },
    /// A message reassembled from BEGIN..END fragments.
    Reassembled {
        /// Buffer holding the concatenated fragment payloads.
        buffer: &'a AssemblyBuffer,
        /// BEGIN header identity with flags marking the message whole.
        header: FrameHeader,
    },
}

impl<'a> Message<'a> {
    /// Buffer the payload lives in.
    #[must_use]
    pub fn buffer(&self) -> &'a [u8] {
        match *self {
            Self::Unfragmented { buffer, .. } => buffer,
            Self::Reassembled { buffer, .. } => buffer.as_slice(),
        }
    }

    /// Offset of the payload within [`buffer`](Self::buffer).
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Unfragmented { offset, .. } => *offset,
            Self::Reassembled { .. } => 0,
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Unfragmented { length, .. } => *length,
            Self::Reassembled { buffer, .. } => buffer.len(),
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Payload bytes.
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        match *self {
            Self::Unfragmented {
                buffer,
                offset,
                length,
                ..
            } => &buffer[offset..offset + length],
            Self::Reassembled { buffer, .. } => buffer.as_slice(),
        }
    }

    /// Header describing the message.
    #[must_use]
    pub fn header(&self) -> &FrameHeader {
        match self {
            Self::Unfragmented { header, .. } => header,
            Self::Reassembled { header, .. } => header,
        }
    }

    /// Session that published the message.
    #[must_use]
    pub fn session_id(&self) -> SessionId { self.header().session_id() }

    /// Stream the message was published on.
    #[must_use]
    pub fn stream_id(&self) -> StreamId { self.header().stream_id() }

    /// Whether the message was stitched together from several frames.
    #[must_use]
    pub const fn is_reassembled(&self) -> bool { matches!(self, Self::Reassembled { .. }) }

    /// Copy the payload into an owned vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> { self.payload().to_vec() }
}

/// Receives complete messages from a
/// [`FragmentAssembler`](super::FragmentAssembler).
///
/// The handler is invoked exactly once per logical message. Panics are not
/// caught and propagate to the caller of `on_frame`.
pub trait MessageHandler {
    /// Handle one complete message.
    fn on_message(&mut self, message: Message<'_>);
}

impl<F> MessageHandler for F
where
    F: FnMut(Message<'_>),
{
    fn on_message(&mut self, message: Message<'_>) { self(message); }
}
