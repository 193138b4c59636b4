//! Sender-side splitting of messages into MTU-bounded data frames.
//!
//! [`Fragmenter`] chops a payload into frames whose header and payload fit
//! within the configured MTU, marking the first with BEGIN and the last with
//! END. A payload that fits in one frame gets both flags. Frames are placed
//! back to back at [`FRAME_ALIGNMENT`] boundaries, so the fragmenter tracks
//! the term offset each frame will occupy.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::frame::{
    FRAME_ALIGNMENT,
    FrameFlags,
    FrameHeader,
    HEADER_LENGTH,
    SessionId,
    StreamId,
    align_frame_length,
};

/// Largest MTU a fragmenter accepts, header included.
pub const MAX_MTU_LENGTH: usize = 65_504;

/// Errors produced while configuring a fragmenter or splitting a payload.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmentationError {
    /// The MTU is not a multiple of the frame alignment.
    #[error("mtu {mtu} is not a multiple of 32")]
    MisalignedMtu {
        /// Rejected MTU.
        mtu: usize,
    },
    /// The MTU leaves no room for payload after the header.
    #[error("mtu {mtu} must exceed the 32-byte frame header")]
    MtuTooSmall {
        /// Rejected MTU.
        mtu: usize,
    },
    /// The MTU is larger than [`MAX_MTU_LENGTH`].
    #[error("mtu {mtu} exceeds the maximum of 65504")]
    MtuTooLarge {
        /// Rejected MTU.
        mtu: usize,
    },
    /// Placing the next frame would move the term offset past `i32::MAX`.
    #[error("term offset overflow: offset {offset} cannot advance by {frame_length} bytes")]
    TermOffsetOverflow {
        /// Offset of the frame that did not fit.
        offset: i32,
        /// Aligned length of that frame.
        frame_length: usize,
    },
}

/// Splits payloads into data frames for one publisher session.
#[derive(Clone, Debug)]
pub struct Fragmenter {
    mtu: usize,
    session_id: SessionId,
    stream_id: StreamId,
    term_id: i32,
    term_offset: i32,
}

impl Fragmenter {
    /// Create a fragmenter for frames of at most `mtu` bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`FragmentationError`] when `mtu` is not aligned, does not
    /// exceed [`HEADER_LENGTH`], or exceeds [`MAX_MTU_LENGTH`].
    pub fn new(
        mtu: usize,
        session_id: SessionId,
        stream_id: StreamId,
        term_id: i32,
    ) -> Result<Self, FragmentationError> {
        if mtu % FRAME_ALIGNMENT != 0 {
            return Err(FragmentationError::MisalignedMtu { mtu });
        }
        if mtu <= HEADER_LENGTH {
            return Err(FragmentationError::MtuTooSmall { mtu });
        }
        if mtu > MAX_MTU_LENGTH {
            return Err(FragmentationError::MtuTooLarge { mtu });
        }
        Ok(Self {
            mtu,
            session_id,
            stream_id,
            term_id,
            term_offset: 0,
        })
    }

    /// Start placing frames at `term_offset` instead of zero.
    #[must_use]
    pub const fn with_term_offset(mut self, term_offset: i32) -> Self {
        self.term_offset = term_offset;
        self
    }

    /// Configured MTU, header included.
    #[must_use]
    pub const fn mtu(&self) -> usize { self.mtu }

    /// Largest payload carried by one frame.
    #[must_use]
    pub const fn max_payload_length(&self) -> usize { self.mtu - HEADER_LENGTH }

    /// Session stamped on every frame.
    #[must_use]
    pub const fn session_id(&self) -> SessionId { self.session_id }

    /// Stream stamped on every frame.
    #[must_use]
    pub const fn stream_id(&self) -> StreamId { self.stream_id }

    /// Term offset the next frame will occupy.
    #[must_use]
    pub const fn term_offset(&self) -> i32 { self.term_offset }

    /// Split `payload` into frames and advance the term offset past them.
    ///
    /// Payload slices share the input allocation.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::TermOffsetOverflow`] if the frames do
    /// not fit below `i32::MAX`. The term offset is left unchanged.
    pub fn fragment(
        &mut self,
        payload: impl Into<Bytes>,
    ) -> Result<FragmentBatch, FragmentationError> {
        let payload = payload.into();
        let max = self.max_payload_length();
        let total = payload.len();
        let mut frames = Vec::with_capacity(total.div_ceil(max).max(1));
        let mut term_offset = self.term_offset;
        let mut start = 0;

        loop {
            let end = (start + max).min(total);
            let mut flags = FrameFlags::NONE;
            if start == 0 {
                flags = flags.union(FrameFlags::BEGIN);
            }
            if end == total {
                flags = flags.union(FrameFlags::END);
            }

            let header = FrameHeader::data(self.session_id, self.stream_id, flags, end - start)
                .with_term_offset(term_offset)
                .with_term_id(self.term_id);
            let frame = DataFrame::new(header, payload.slice(start..end));
            term_offset = advance(term_offset, frame.aligned_length())?;
            frames.push(frame);

            if end == total {
                break;
            }
            start = end;
        }

        self.term_offset = term_offset;
        Ok(FragmentBatch::new(frames))
    }
}

fn advance(offset: i32, frame_length: usize) -> Result<i32, FragmentationError> {
    i32::try_from(frame_length)
        .ok()
        .and_then(|length| offset.checked_add(length))
        .ok_or(FragmentationError::TermOffsetOverflow {
            offset,
            frame_length,
        })
}

/// One outbound data frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFrame {
    header: FrameHeader,
    payload: Bytes,
}

impl DataFrame {
    /// Pair a header with its payload.
    #[must_use]
    pub fn new(header: FrameHeader, payload: Bytes) -> Self { Self { header, payload } }

    /// Frame header.
    #[must_use]
    pub const fn header(&self) -> &FrameHeader { &self.header }

    /// Payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Header plus payload, rounded up to the frame alignment.
    #[must_use]
    pub fn aligned_length(&self) -> usize { align_frame_length(HEADER_LENGTH + self.payload.len()) }

    /// Encode the header, payload and alignment padding into `dst`.
    pub fn write_to(&self, dst: &mut impl BufMut) {
        self.header.encode(dst);
        dst.put_slice(&self.payload);
        dst.put_bytes(0, self.aligned_length() - HEADER_LENGTH - self.payload.len());
    }

    /// Consume the frame, returning its components.
    #[must_use]
    pub fn into_parts(self) -> (FrameHeader, Bytes) { (self.header, self.payload) }
}

/// Frames produced for a single message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    frames: Vec<DataFrame>,
}

impl FragmentBatch {
    fn new(frames: Vec<DataFrame>) -> Self {
        debug_assert!(!frames.is_empty(), "fragment batches must not be empty");
        Self { frames }
    }

    /// Frames in send order.
    #[must_use]
    pub fn frames(&self) -> &[DataFrame] { self.frames.as_slice() }

    /// Number of frames in the batch.
    #[expect(
        clippy::len_without_is_empty,
        reason = "batches are guaranteed non-empty"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether the message needed more than one frame.
    #[must_use]
    pub fn is_fragmented(&self) -> bool { self.len() > 1 }

    /// Bytes the batch occupies in a term.
    #[must_use]
    pub fn encoded_length(&self) -> usize {
        self.frames.iter().map(DataFrame::aligned_length).sum()
    }

    /// Lay every frame out in `dst` at aligned offsets.
    pub fn write_to(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_length());
        for frame in &self.frames {
            frame.write_to(dst);
        }
    }

    /// Consume the batch, returning its frames.
    #[must_use]
    pub fn into_frames(self) -> Vec<DataFrame> { self.frames }
}

impl IntoIterator for FragmentBatch {
    type Item = DataFrame;
    type IntoIter = std::vec::IntoIter<DataFrame>;

    fn into_iter(self) -> Self::IntoIter { self.frames.into_iter() }
}
