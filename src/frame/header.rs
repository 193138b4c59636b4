//! Data frame header and its fixed little-endian wire layout.

use bytes::{Buf, BufMut};

use super::{FragmentKind, FrameFlags, HeaderError, SessionId, StreamId};

/// Length in bytes of an encoded data frame header.
pub const HEADER_LENGTH: usize = 32;

/// Frames start at offsets that are multiples of this value within a term.
pub const FRAME_ALIGNMENT: usize = 32;

/// Protocol version written by [`FrameHeader::encode`].
pub const CURRENT_VERSION: u8 = 0;

/// Round `length` up to the next frame alignment boundary.
#[must_use]
pub const fn align_frame_length(length: usize) -> usize {
    (length + (FRAME_ALIGNMENT - 1)) & !(FRAME_ALIGNMENT - 1)
}

/// Kind of frame stored in a term buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Filler written to skip to the end of a term; carries no message data.
    Padding,
    /// Application data, possibly one fragment of a larger message.
    Data,
}

impl FrameType {
    const PADDING: u16 = 0x00;
    const DATA: u16 = 0x01;

    /// Return the wire value of the frame type.
    #[must_use]
    pub const fn to_wire(self) -> u16 {
        match self {
            Self::Padding => Self::PADDING,
            Self::Data => Self::DATA,
        }
    }

    /// Parse a wire value.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::UnknownFrameType`] for any value other than
    /// padding or data.
    pub const fn from_wire(value: u16) -> Result<Self, HeaderError> {
        match value {
            Self::PADDING => Ok(Self::Padding),
            Self::DATA => Ok(Self::Data),
            other => Err(HeaderError::UnknownFrameType(other)),
        }
    }
}

/// Read-only view of a received frame's metadata.
///
/// The header never owns payload bytes; it is small enough to copy by value
/// so the assembler can keep the BEGIN header of an in-flight message.
///
/// ```text
/// 0        4   5   6       8            12           16           20           24                32
/// +--------+---+---+-------+------------+------------+------------+------------+-----------------+
/// | length |ver|flg| type  | termOffset | sessionId  |  streamId  |   termId   |  reservedValue  |
/// +--------+---+---+-------+------------+------------+------------+------------+-----------------+
/// ```
///
/// # Examples
///
/// ```
/// use frameweave::frame::{FrameFlags, FrameHeader, HEADER_LENGTH, SessionId, StreamId};
///
/// let header = FrameHeader::data(SessionId::new(7), StreamId::new(1), FrameFlags::BEGIN, 64);
/// assert_eq!(header.payload_length(), 64);
/// assert_eq!(header.frame_length() as usize, HEADER_LENGTH + 64);
/// assert!(header.is_begin());
/// assert!(!header.is_end());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    frame_length: i32,
    version: u8,
    flags: FrameFlags,
    frame_type: FrameType,
    term_offset: i32,
    session_id: SessionId,
    stream_id: StreamId,
    term_id: i32,
    reserved_value: i64,
}

impl FrameHeader {
    /// Build a data frame header for a payload of `payload_length` bytes.
    ///
    /// Lengths that do not fit the `i32` length field saturate; the
    /// fragmenter never produces such frames.
    #[must_use]
    pub fn data(
        session_id: SessionId,
        stream_id: StreamId,
        flags: FrameFlags,
        payload_length: usize,
    ) -> Self {
        Self {
            frame_length: frame_length_for(payload_length),
            version: CURRENT_VERSION,
            flags,
            frame_type: FrameType::Data,
            term_offset: 0,
            session_id,
            stream_id,
            term_id: 0,
            reserved_value: 0,
        }
    }

    /// Build a padding frame header spanning `frame_length` bytes.
    #[must_use]
    pub fn padding(
        session_id: SessionId,
        stream_id: StreamId,
        term_offset: i32,
        frame_length: i32,
    ) -> Self {
        Self {
            frame_length,
            version: CURRENT_VERSION,
            flags: FrameFlags::UNFRAGMENTED,
            frame_type: FrameType::Padding,
            term_offset,
            session_id,
            stream_id,
            term_id: 0,
            reserved_value: 0,
        }
    }

    /// Return a copy positioned at `term_offset`.
    #[must_use]
    pub const fn with_term_offset(mut self, term_offset: i32) -> Self {
        self.term_offset = term_offset;
        self
    }

    /// Return a copy tagged with `term_id`.
    #[must_use]
    pub const fn with_term_id(mut self, term_id: i32) -> Self {
        self.term_id = term_id;
        self
    }

    /// Return a copy carrying `reserved_value`.
    #[must_use]
    pub const fn with_reserved_value(mut self, reserved_value: i64) -> Self {
        self.reserved_value = reserved_value;
        self
    }

    /// Return a copy with `flags` replaced.
    #[must_use]
    pub const fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Return a copy whose length covers `payload_length` payload bytes.
    #[must_use]
    pub fn with_payload_length(mut self, payload_length: usize) -> Self {
        self.frame_length = frame_length_for(payload_length);
        self
    }

    /// Decode a header from the start of `src`.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::Incomplete`] when `src` is shorter than
    /// [`HEADER_LENGTH`], [`HeaderError::UnknownFrameType`] for an
    /// unsupported type field, and [`HeaderError::FrameTooShort`] when a data
    /// frame declares a length that cannot hold the header.
    pub fn decode(src: &[u8]) -> Result<Self, HeaderError> {
        if src.len() < HEADER_LENGTH {
            return Err(HeaderError::Incomplete {
                have: src.len(),
                need: HEADER_LENGTH,
            });
        }

        let mut buf = &src[..HEADER_LENGTH];
        let frame_length = buf.get_i32_le();
        let version = buf.get_u8();
        let flags = FrameFlags::from_bits(buf.get_u8());
        let frame_type = FrameType::from_wire(buf.get_u16_le())?;
        let term_offset = buf.get_i32_le();
        let session_id = SessionId::new(buf.get_i32_le());
        let stream_id = StreamId::new(buf.get_i32_le());
        let term_id = buf.get_i32_le();
        let reserved_value = buf.get_i64_le();

        let undersized = !usize::try_from(frame_length).is_ok_and(|len| len >= HEADER_LENGTH);
        if frame_type == FrameType::Data && undersized {
            return Err(HeaderError::FrameTooShort {
                frame_length,
                header_length: HEADER_LENGTH,
            });
        }

        Ok(Self {
            frame_length,
            version,
            flags,
            frame_type,
            term_offset,
            session_id,
            stream_id,
            term_id,
            reserved_value,
        })
    }

    /// Encode the header into `dst` using the wire layout.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_i32_le(self.frame_length);
        dst.put_u8(self.version);
        dst.put_u8(self.flags.bits());
        dst.put_u16_le(self.frame_type.to_wire());
        dst.put_i32_le(self.term_offset);
        dst.put_i32_le(self.session_id.get());
        dst.put_i32_le(self.stream_id.get());
        dst.put_i32_le(self.term_id);
        dst.put_i64_le(self.reserved_value);
    }

    /// Total frame length, header included.
    #[must_use]
    pub const fn frame_length(&self) -> i32 { self.frame_length }

    /// Payload bytes following the header.
    #[must_use]
    pub fn payload_length(&self) -> usize {
        usize::try_from(self.frame_length)
            .unwrap_or(0)
            .saturating_sub(HEADER_LENGTH)
    }

    /// Protocol version byte.
    #[must_use]
    pub const fn version(&self) -> u8 { self.version }

    /// Raw flags, including bits other than BEGIN and END.
    #[must_use]
    pub const fn flags(&self) -> FrameFlags { self.flags }

    /// Frame type.
    #[must_use]
    pub const fn frame_type(&self) -> FrameType { self.frame_type }

    /// Offset of the frame within its term. Diagnostic only.
    #[must_use]
    pub const fn term_offset(&self) -> i32 { self.term_offset }

    /// Publisher session that wrote the frame.
    #[must_use]
    pub const fn session_id(&self) -> SessionId { self.session_id }

    /// Stream the frame belongs to.
    #[must_use]
    pub const fn stream_id(&self) -> StreamId { self.stream_id }

    /// Term the frame was written into.
    #[must_use]
    pub const fn term_id(&self) -> i32 { self.term_id }

    /// Application-defined reserved value.
    #[must_use]
    pub const fn reserved_value(&self) -> i64 { self.reserved_value }

    /// Role of this frame in its message.
    #[must_use]
    pub const fn fragment_kind(&self) -> FragmentKind { self.flags.kind() }

    /// Both BEGIN and END are set.
    #[must_use]
    pub const fn is_unfragmented(&self) -> bool { self.flags.contains(FrameFlags::UNFRAGMENTED) }

    /// BEGIN is set.
    #[must_use]
    pub const fn is_begin(&self) -> bool { self.flags.contains(FrameFlags::BEGIN) }

    /// END is set.
    #[must_use]
    pub const fn is_end(&self) -> bool { self.flags.contains(FrameFlags::END) }
}

fn frame_length_for(payload_length: usize) -> i32 {
    i32::try_from(payload_length.saturating_add(HEADER_LENGTH)).unwrap_or(i32::MAX)
}
