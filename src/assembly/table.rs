//! Session-keyed table of in-flight assemblies with a storage pool.
//!
//! The table holds at most one [`AssemblyBuffer`] per [`SessionId`]. When an
//! assembly completes or is abandoned its storage goes back to a bounded free
//! list so the next BEGIN fragment, on any session, reuses the allocation.

use std::collections::{HashMap, hash_map::Entry};

use super::AssemblyBuffer;
use crate::{
    config::AssemblerConfig,
    frame::{FrameHeader, SessionId},
};

/// Where the buffer handed out by [`SessionAssemblyTable::acquire`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferSource {
    /// Fresh storage had to be created.
    Allocated,
    /// Storage was taken from the free list.
    Pooled,
    /// The session already had an assembly; its contents were discarded.
    Restarted,
}

/// Buffer returned by [`SessionAssemblyTable::acquire`].
#[derive(Debug)]
pub struct Acquired<'a> {
    /// Buffer now registered for the BEGIN header's session.
    pub buffer: &'a mut AssemblyBuffer,
    /// How the buffer was obtained.
    pub source: BufferSource,
}

/// Maps each session with an assembly in progress to its buffer.
///
/// # Examples
///
/// ```
/// use frameweave::{
///     AssemblerConfig,
///     assembly::{BufferSource, SessionAssemblyTable},
///     frame::{FrameFlags, FrameHeader, SessionId, StreamId},
/// };
///
/// let mut table = SessionAssemblyTable::new(AssemblerConfig::default());
/// let begin = FrameHeader::data(SessionId::new(3), StreamId::new(1), FrameFlags::BEGIN, 2);
///
/// let acquired = table.acquire(&begin);
/// assert_eq!(acquired.source, BufferSource::Allocated);
/// acquired.buffer.append(b"hi").expect("within limit");
///
/// assert_eq!(table.get(SessionId::new(3)).map(|b| b.len()), Some(2));
/// assert!(table.release(SessionId::new(3)));
/// assert!(table.is_empty());
/// assert_eq!(table.pooled(), 1);
/// ```
#[derive(Debug)]
pub struct SessionAssemblyTable {
    config: AssemblerConfig,
    assemblies: HashMap<SessionId, AssemblyBuffer>,
    pool: Vec<Vec<u8>>,
}

impl SessionAssemblyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            assemblies: HashMap::new(),
            pool: Vec::with_capacity(config.max_pooled_buffers),
        }
    }

    /// Configuration the table was built with.
    #[must_use]
    pub const fn config(&self) -> &AssemblerConfig { &self.config }

    /// Buffer for `session_id`, if an assembly is in progress.
    #[must_use]
    pub fn get(&self, session_id: SessionId) -> Option<&AssemblyBuffer> {
        self.assemblies.get(&session_id)
    }

    /// Mutable buffer for `session_id`, if an assembly is in progress.
    pub fn get_mut(&mut self, session_id: SessionId) -> Option<&mut AssemblyBuffer> {
        self.assemblies.get_mut(&session_id)
    }

    /// Whether `session_id` has an assembly in progress.
    #[must_use]
    pub fn contains(&self, session_id: SessionId) -> bool {
        self.assemblies.contains_key(&session_id)
    }

    /// Obtain the buffer for the session named by `begin_header`.
    ///
    /// An existing buffer is restarted: its bytes are discarded and its BEGIN
    /// header replaced. Otherwise storage is taken from the pool, or
    /// allocated when the pool is empty, and registered under the session.
    pub fn acquire(&mut self, begin_header: &FrameHeader) -> Acquired<'_> {
        match self.assemblies.entry(begin_header.session_id()) {
            Entry::Occupied(occupied) => {
                let buffer = occupied.into_mut();
                buffer.restart(*begin_header);
                Acquired {
                    buffer,
                    source: BufferSource::Restarted,
                }
            }
            Entry::Vacant(vacant) => {
                let (storage, source) = match self.pool.pop() {
                    Some(storage) => (storage, BufferSource::Pooled),
                    None => (Vec::new(), BufferSource::Allocated),
                };
                let buffer = vacant.insert(AssemblyBuffer::from_storage(
                    *begin_header,
                    storage,
                    self.config.effective_initial_capacity(),
                    self.config.effective_max_message_size(),
                ));
                Acquired { buffer, source }
            }
        }
    }

    /// Remove the session's buffer and return its storage to the pool.
    ///
    /// Returns `false` when the session had no assembly in progress.
    pub fn release(&mut self, session_id: SessionId) -> bool {
        match self.take(session_id) {
            Some(buffer) => {
                self.recycle(buffer);
                true
            }
            None => false,
        }
    }

    /// Release every in-progress assembly, returning how many were dropped.
    pub fn release_all(&mut self) -> usize {
        let limit = self.config.max_pooled_buffers;
        let released = self.assemblies.len();
        for (_, buffer) in self.assemblies.drain() {
            return_to_pool(&mut self.pool, limit, buffer);
        }
        released
    }

    /// Detach the session's buffer without pooling it yet.
    pub(crate) fn take(&mut self, session_id: SessionId) -> Option<AssemblyBuffer> {
        self.assemblies.remove(&session_id)
    }

    /// Return a detached buffer's storage to the pool.
    pub(crate) fn recycle(&mut self, buffer: AssemblyBuffer) {
        return_to_pool(&mut self.pool, self.config.max_pooled_buffers, buffer);
    }

    /// Number of sessions with an assembly in progress.
    #[must_use]
    pub fn len(&self) -> usize { self.assemblies.len() }

    /// Whether no assembly is in progress.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.assemblies.is_empty() }

    /// Number of storages waiting in the pool.
    #[must_use]
    pub fn pooled(&self) -> usize { self.pool.len() }

    /// Bytes currently accumulated across all in-progress assemblies.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.assemblies.values().map(AssemblyBuffer::len).sum()
    }
}

fn return_to_pool(pool: &mut Vec<Vec<u8>>, limit: usize, buffer: AssemblyBuffer) {
    if pool.len() >= limit {
        return;
    }
    let mut storage = buffer.into_storage();
    storage.clear();
    pool.push(storage);
}
