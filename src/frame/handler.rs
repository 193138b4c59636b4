//! Callback contract between the transport and frame consumers.

use super::{FrameHeader, SessionId};

/// Receives frames from a transport poll loop.
///
/// `buffer[offset..offset + length]` holds the frame payload. The borrow ends
/// when the call returns, so implementations that need the bytes later must
/// copy them.
///
/// Closures with the matching signature implement this trait, which keeps
/// raw frame inspection in tests and tools free of boilerplate:
///
/// ```
/// use frameweave::frame::{FrameFlags, FrameHandler, FrameHeader, SessionId, StreamId};
///
/// let header =
///     FrameHeader::data(SessionId::new(1), StreamId::new(1), FrameFlags::UNFRAGMENTED, 3);
/// let mut seen = 0_usize;
/// let mut handler = |_: &[u8], _: usize, length: usize, _: &FrameHeader| seen += length;
/// handler.on_frame(&[1, 2, 3], 0, 3, &header);
/// assert_eq!(seen, 3);
/// ```
pub trait FrameHandler {
    /// Handle one frame.
    fn on_frame(&mut self, buffer: &[u8], offset: usize, length: usize, header: &FrameHeader);

    /// The transport tore down `session_id`; release any state held for it.
    fn on_session_inactive(&mut self, session_id: SessionId) { let _ = session_id; }
}

impl<F> FrameHandler for F
where
    F: FnMut(&[u8], usize, usize, &FrameHeader),
{
    fn on_frame(&mut self, buffer: &[u8], offset: usize, length: usize, header: &FrameHeader) {
        self(buffer, offset, length, header);
    }
}
