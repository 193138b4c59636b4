//! Errors raised while decoding frame headers from a term buffer.

use thiserror::Error;

/// Malformed or truncated frame header.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Fewer bytes are available than a full header requires.
    #[error("incomplete frame header: have {have}, need {need}")]
    Incomplete {
        /// Bytes available at the frame offset.
        have: usize,
        /// Bytes required for a complete header.
        need: usize,
    },
    /// The frame type field carries an unsupported value.
    #[error("unknown frame type {0:#06x}")]
    UnknownFrameType(u16),
    /// The declared frame length cannot hold its own header.
    #[error("frame length {frame_length} is shorter than the {header_length}-byte header")]
    FrameTooShort {
        /// Declared frame length.
        frame_length: i32,
        /// Fixed header length.
        header_length: usize,
    },
    /// The declared frame runs past the end of the buffer.
    #[error("frame at offset {offset} declares {frame_length} bytes but only {available} remain")]
    Truncated {
        /// Offset of the frame within the buffer.
        offset: usize,
        /// Declared frame length.
        frame_length: usize,
        /// Bytes left in the buffer from `offset`.
        available: usize,
    },
}
