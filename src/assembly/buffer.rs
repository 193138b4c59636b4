//! Growable per-session byte store used to stitch fragments together.

use std::num::NonZeroUsize;

use super::BufferGrowthError;
use crate::frame::{FrameFlags, FrameHeader, SessionId};

/// Bytes accumulated for one in-flight fragmented message.
///
/// The buffer records the header of the BEGIN fragment so the completed
/// message can report the originating session and stream. Storage is only
/// ever appended to during an assembly; [`reset`](Self::reset) empties it
/// while keeping the allocation for the next message.
#[derive(Debug)]
pub struct AssemblyBuffer {
    begin_header: FrameHeader,
    bytes: Vec<u8>,
    initial_capacity: usize,
    max_length: NonZeroUsize,
}

impl AssemblyBuffer {
    /// Start an assembly for `begin_header`, reusing `storage`.
    pub(crate) fn from_storage(
        begin_header: FrameHeader,
        mut storage: Vec<u8>,
        initial_capacity: usize,
        max_length: NonZeroUsize,
    ) -> Self {
        storage.clear();
        Self {
            begin_header,
            bytes: storage,
            initial_capacity,
            max_length,
        }
    }

    /// Session that owns this assembly.
    #[must_use]
    pub const fn session_id(&self) -> SessionId { self.begin_header.session_id() }

    /// Header of the BEGIN fragment that opened the assembly.
    #[must_use]
    pub const fn begin_header(&self) -> &FrameHeader { &self.begin_header }

    /// Bytes accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Whether nothing has been accumulated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Currently reserved capacity.
    #[must_use]
    pub fn capacity(&self) -> usize { self.bytes.capacity() }

    /// Largest message this buffer accepts.
    #[must_use]
    pub const fn max_length(&self) -> NonZeroUsize { self.max_length }

    /// Borrow the accumulated bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { self.bytes.as_slice() }

    /// Make room for `additional` more bytes.
    ///
    /// Capacity grows geometrically (at least doubling, starting from the
    /// configured initial capacity) and is capped at the maximum message
    /// size. Capacity never shrinks while an assembly is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`BufferGrowthError::LimitExceeded`] when the message would
    /// exceed the cap and [`BufferGrowthError::AllocationFailed`] when the
    /// allocator cannot satisfy the reservation.
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<(), BufferGrowthError> {
        let limit = self.max_length;
        let Some(required) = self.bytes.len().checked_add(additional) else {
            return Err(BufferGrowthError::LimitExceeded {
                session_id: self.session_id(),
                attempted: usize::MAX,
                limit,
            });
        };
        if required > limit.get() {
            return Err(BufferGrowthError::LimitExceeded {
                session_id: self.session_id(),
                attempted: required,
                limit,
            });
        }

        let capacity = self.bytes.capacity();
        if required <= capacity {
            return Ok(());
        }

        let target = required
            .max(capacity.saturating_mul(2))
            .max(self.initial_capacity)
            .min(limit.get());
        self.bytes
            .try_reserve_exact(target - self.bytes.len())
            .map_err(|_| BufferGrowthError::AllocationFailed {
                session_id: self.session_id(),
                requested: target,
            })
    }

    /// Copy `data` onto the end of the accumulated bytes.
    ///
    /// # Errors
    ///
    /// Propagates any [`BufferGrowthError`] from
    /// [`ensure_capacity`](Self::ensure_capacity); the buffer is left
    /// unchanged in that case.
    pub fn append(&mut self, data: &[u8]) -> Result<(), BufferGrowthError> {
        self.ensure_capacity(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Drop the accumulated bytes, keeping the allocation.
    pub fn reset(&mut self) { self.bytes.clear(); }

    /// Discard the current contents and begin again from a new BEGIN header.
    pub(crate) fn restart(&mut self, begin_header: FrameHeader) {
        debug_assert_eq!(begin_header.session_id(), self.session_id());
        self.reset();
        self.begin_header = begin_header;
    }

    /// Header reported with the completed message.
    ///
    /// Identity comes from the BEGIN header. The flags are exactly
    /// [`FrameFlags::UNFRAGMENTED`] and the length covers every accumulated byte.
    #[must_use]
    pub fn completed_header(&self) -> FrameHeader {
        self.begin_header
            .with_flags(FrameFlags::UNFRAGMENTED)
            .with_payload_length(self.len())
    }

    pub(crate) fn into_storage(self) -> Vec<u8> { self.bytes }
}
