//! Data frame metadata as delivered by the transport.
//!
//! Frames live in term buffers at aligned offsets, each prefixed by a fixed
//! 32-byte little-endian header. This module owns the read-only header view,
//! the BEGIN/END flag classification and the callback contract transports use
//! to hand frames to consumers such as the
//! [`FragmentAssembler`](crate::assembler::FragmentAssembler).

pub mod error;
pub mod flags;
pub mod handler;
pub mod header;
pub mod ids;

pub use error::HeaderError;
pub use flags::{FragmentKind, FrameFlags};
pub use handler::FrameHandler;
pub use header::{
    CURRENT_VERSION,
    FRAME_ALIGNMENT,
    FrameHeader,
    FrameType,
    HEADER_LENGTH,
    align_frame_length,
};
pub use ids::{SessionId, StreamId};
