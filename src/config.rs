//! Configuration for the receive-side fragment assembler.

use std::num::NonZeroUsize;

use crate::frame::HEADER_LENGTH;

/// Default maximum size of one reassembled message (16 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: NonZeroUsize =
    NonZeroUsize::MIN.saturating_add(16 * 1024 * 1024 - 1);

/// Largest message whose header `frame_length` still fits in an `i32`.
pub const MAX_MESSAGE_SIZE_LIMIT: NonZeroUsize =
    NonZeroUsize::MIN.saturating_add(0x7FFF_FFFF - HEADER_LENGTH - 1);

/// Default capacity reserved for a freshly allocated assembly buffer.
pub const DEFAULT_INITIAL_BUFFER_CAPACITY: usize = 4096;

/// Default number of released buffers kept for reuse.
pub const DEFAULT_MAX_POOLED_BUFFERS: usize = 16;

/// Settings that bound reassembly memory.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use frameweave::AssemblerConfig;
///
/// let config = AssemblerConfig::new(NonZeroUsize::new(1 << 20).expect("non-zero"))
///     .with_initial_buffer_capacity(8 * 1024)
///     .with_max_pooled_buffers(4);
/// assert_eq!(config.max_message_size.get(), 1 << 20);
/// assert_eq!(config.initial_buffer_capacity, 8 * 1024);
/// assert_eq!(config.max_pooled_buffers, 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Capacity reserved when a buffer has to be allocated rather than taken
    /// from the pool. Clamped to `max_message_size`.
    pub initial_buffer_capacity: usize,
    /// Hard cap on one reassembled message. Growth past this cap abandons the
    /// assembly and counts a dropped message. Values above
    /// [`MAX_MESSAGE_SIZE_LIMIT`] are clamped to it.
    pub max_message_size: NonZeroUsize,
    /// Released buffers retained for reuse; extra buffers are freed.
    pub max_pooled_buffers: usize,
}

impl AssemblerConfig {
    /// Create a configuration with the given message cap and default pooling.
    ///
    /// The cap is clamped to [`MAX_MESSAGE_SIZE_LIMIT`].
    #[must_use]
    pub const fn new(max_message_size: NonZeroUsize) -> Self {
        Self {
            initial_buffer_capacity: DEFAULT_INITIAL_BUFFER_CAPACITY,
            max_message_size: clamp_message_size(max_message_size),
            max_pooled_buffers: DEFAULT_MAX_POOLED_BUFFERS,
        }
    }

    /// Override the initial buffer capacity.
    #[must_use]
    pub const fn with_initial_buffer_capacity(mut self, capacity: usize) -> Self {
        self.initial_buffer_capacity = capacity;
        self
    }

    /// Override the pool size.
    #[must_use]
    pub const fn with_max_pooled_buffers(mut self, count: usize) -> Self {
        self.max_pooled_buffers = count;
        self
    }

    /// Message cap after clamping to [`MAX_MESSAGE_SIZE_LIMIT`].
    #[must_use]
    pub const fn effective_max_message_size(&self) -> NonZeroUsize {
        clamp_message_size(self.max_message_size)
    }

    /// Initial capacity after clamping to the message cap.
    #[must_use]
    pub fn effective_initial_capacity(&self) -> usize {
        self.initial_buffer_capacity.min(self.effective_max_message_size().get())
    }
}

const fn clamp_message_size(size: NonZeroUsize) -> NonZeroUsize {
    if size.get() > MAX_MESSAGE_SIZE_LIMIT.get() {
        MAX_MESSAGE_SIZE_LIMIT
    } else {
        size
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self { Self::new(DEFAULT_MAX_MESSAGE_SIZE) }
}
