//! Poll loop over a term buffer of aligned frames.
//!
//! A term is an append-only region the publisher writes frames into at
//! [`FRAME_ALIGNMENT`](crate::frame::FRAME_ALIGNMENT) boundaries. Space that
//! has not been written yet reads as zero, so a zero frame length marks the
//! current end of the stream. [`TermReader`] walks the term from its last
//! position and hands each data frame to a [`FrameHandler`].

use tracing::{trace, warn};

use crate::frame::{
    FrameHandler,
    FrameHeader,
    FrameType,
    HEADER_LENGTH,
    HeaderError,
    align_frame_length,
};

/// Scans a term buffer and dispatches data frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TermReader {
    offset: usize,
}

impl TermReader {
    /// Create a reader positioned at the start of the term.
    #[must_use]
    pub const fn new() -> Self { Self { offset: 0 } }

    /// Create a reader positioned at `offset`.
    #[must_use]
    pub const fn with_offset(offset: usize) -> Self { Self { offset } }

    /// Offset of the next frame to read.
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }

    /// Rewind to the start of the term, for example after a term rotation.
    pub fn reset(&mut self) { self.offset = 0; }

    /// Read up to `fragment_limit` data frames from `term`.
    ///
    /// Padding frames are skipped and do not count towards the limit. Each
    /// data frame is passed to `handler` with `term` as its buffer. Reading
    /// stops at the first unwritten frame or at the end of the term.
    ///
    /// # Errors
    ///
    /// Returns a [`HeaderError`] when the frame at the current offset is
    /// malformed or runs past the end of `term`. The offset stays on that
    /// frame; frames before it have already been dispatched.
    pub fn poll<H>(
        &mut self,
        term: &[u8],
        handler: &mut H,
        fragment_limit: usize,
    ) -> Result<usize, HeaderError>
    where
        H: FrameHandler + ?Sized,
    {
        let mut fragments = 0;
        while fragments < fragment_limit {
            let Some(remaining) = term.get(self.offset..) else {
                break;
            };
            if frame_length_at(remaining) == 0 {
                break;
            }

            let (header, frame_length) = self.read_frame(remaining).inspect_err(|err| {
                warn!(offset = self.offset, error = %err, "malformed frame in term");
            })?;

            if header.frame_type() == FrameType::Padding {
                trace!(offset = self.offset, frame_length, "skipping padding frame");
            } else {
                trace!(
                    offset = self.offset,
                    frame_length,
                    session_id = %header.session_id(),
                    flags = ?header.flags(),
                    "dispatching data frame"
                );
                handler.on_frame(
                    term,
                    self.offset + HEADER_LENGTH,
                    frame_length - HEADER_LENGTH,
                    &header,
                );
                fragments += 1;
            }

            self.offset += align_frame_length(frame_length);
        }
        Ok(fragments)
    }

    fn read_frame(&self, remaining: &[u8]) -> Result<(FrameHeader, usize), HeaderError> {
        let header = FrameHeader::decode(remaining)?;
        let frame_length = usize::try_from(header.frame_length())
            .ok()
            .filter(|&length| length >= HEADER_LENGTH)
            .ok_or(HeaderError::FrameTooShort {
                frame_length: header.frame_length(),
                header_length: HEADER_LENGTH,
            })?;
        if frame_length > remaining.len() {
            return Err(HeaderError::Truncated {
                offset: self.offset,
                frame_length,
                available: remaining.len(),
            });
        }
        Ok((header, frame_length))
    }
}

/// Frame length field at the start of `src`, or zero when too few bytes
/// remain to hold one.
fn frame_length_at(src: &[u8]) -> i32 {
    src.first_chunk::<4>().map_or(0, |bytes| i32::from_le_bytes(*bytes))
}

#[cfg(test)]
mod tests;
