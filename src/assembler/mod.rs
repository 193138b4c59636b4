//! Receive-side reassembly of fragmented messages.
//!
//! [`FragmentAssembler`] sits between the transport's per-frame callback and
//! the application's [`MessageHandler`]. Unfragmented frames pass straight
//! through without copying. Fragments are stitched per session in a
//! [`SessionAssemblyTable`] and the handler sees the whole message once the
//! END fragment arrives.
//!
//! ## Anomalies
//!
//! - A middle or END fragment for a session with no assembly in progress is
//!   an orphan (for example a subscriber that joined mid-message). It is
//!   dropped and the table is left untouched.
//! - A BEGIN fragment for a session that already has an assembly discards
//!   the incomplete message and starts again.
//! - A buffer that cannot grow loses its message. The remaining fragments of
//!   that message then arrive as orphans.
//!
//! None of these reach the handler; they are visible through
//! [`FragmentAssembler::counters`], the crate metrics and log output.

pub mod message;
pub mod outcome;

use log::{debug, warn};
pub use message::{Message, MessageHandler};
pub use outcome::{AssemblyCounters, FrameOutcome};

use crate::{
    assembly::{Acquired, BufferGrowthError, BufferSource, SessionAssemblyTable},
    config::AssemblerConfig,
    frame::{FragmentKind, FrameHandler, FrameHeader, SessionId},
    metrics::{self, Delivery},
};

/// Reassembles fragmented messages and delivers every complete message to
/// `H` exactly once.
///
/// Every method that touches reassembly state takes `&mut self`, so one
/// instance serves one poller at a time. Independent instances share nothing
/// and may run on separate threads.
///
/// # Examples
///
/// ```
/// use frameweave::{
///     FragmentAssembler,
///     Message,
///     frame::{FrameFlags, FrameHeader, SessionId, StreamId},
/// };
///
/// let mut received = Vec::new();
/// let mut assembler = FragmentAssembler::new(|message: Message<'_>| {
///     received.push(message.to_vec());
/// });
///
/// let session = SessionId::new(1);
/// let stream = StreamId::new(10);
/// let frames: [(&[u8], FrameFlags); 3] = [
///     (b"hel", FrameFlags::BEGIN),
///     (b"lo ", FrameFlags::NONE),
///     (b"world", FrameFlags::END),
/// ];
/// for (payload, flags) in frames {
///     let header = FrameHeader::data(session, stream, flags, payload.len());
///     assembler.on_frame(payload, 0, payload.len(), &header);
/// }
/// drop(assembler);
///
/// assert_eq!(received, vec![b"hello world".to_vec()]);
/// ```
#[derive(Debug)]
pub struct FragmentAssembler<H> {
    handler: H,
    table: SessionAssemblyTable,
    counters: AssemblyCounters,
}

impl<H: MessageHandler> FragmentAssembler<H> {
    /// Create an assembler with the default configuration.
    #[must_use]
    pub fn new(handler: H) -> Self { Self::with_config(handler, AssemblerConfig::default()) }

    /// Create an assembler with an explicit configuration.
    #[must_use]
    pub fn with_config(handler: H, config: AssemblerConfig) -> Self {
        Self {
            handler,
            table: SessionAssemblyTable::new(config),
            counters: AssemblyCounters::default(),
        }
    }

    /// Process one frame whose payload is `buffer[offset..offset + length]`.
    ///
    /// Frames of a session must arrive in the order they were sent. Frames
    /// from different sessions may interleave arbitrarily.
    ///
    /// # Panics
    ///
    /// Panics if `offset + length` lies outside `buffer`, or if the handler
    /// panics.
    pub fn on_frame(
        &mut self,
        buffer: &[u8],
        offset: usize,
        length: usize,
        header: &FrameHeader,
    ) -> FrameOutcome {
        match header.fragment_kind() {
            FragmentKind::Unfragmented => {
                self.counters.unfragmented_messages += 1;
                metrics::inc_messages(Delivery::Unfragmented);
                self.handler.on_message(Message::Unfragmented {
                    buffer,
                    offset,
                    length,
                    header,
                });
                FrameOutcome::Delivered
            }
            FragmentKind::Begin => self.begin_assembly(&buffer[offset..offset + length], header),
            FragmentKind::Middle => self.extend_assembly(&buffer[offset..offset + length], header),
            FragmentKind::End => self.complete_assembly(&buffer[offset..offset + length], header),
        }
    }

    /// Release the assembly held for a session the transport has torn down.
    ///
    /// Returns `true` when an incomplete message was discarded.
    pub fn on_session_inactive(&mut self, session_id: SessionId) -> bool {
        let released = self.table.release(session_id);
        if released {
            debug!("released incomplete assembly for inactive session: session_id={session_id}");
            self.counters.abandoned_assemblies += 1;
            metrics::add_abandoned_assemblies(1);
        }
        released
    }

    /// Release every incomplete assembly, returning how many were discarded.
    pub fn release_all(&mut self) -> usize {
        let released = self.table.release_all();
        if released > 0 {
            debug!("released incomplete assemblies: count={released}");
            let released = released as u64;
            self.counters.abandoned_assemblies += released;
            metrics::add_abandoned_assemblies(released);
        }
        released
    }

    fn begin_assembly(&mut self, payload: &[u8], header: &FrameHeader) -> FrameOutcome {
        let Acquired { buffer, source } = self.table.acquire(header);
        if source == BufferSource::Restarted {
            debug!(
                "BEGIN fragment replaced incomplete assembly: session_id={}, stream_id={}, \
                 term_offset={}",
                header.session_id(),
                header.stream_id(),
                header.term_offset()
            );
            self.counters.restarted_assemblies += 1;
            metrics::inc_restarted_assemblies();
        }

        match buffer.append(payload) {
            Ok(()) => FrameOutcome::Buffered,
            Err(err) => {
                self.table.release(header.session_id());
                self.drop_message(&err, header)
            }
        }
    }

    fn extend_assembly(&mut self, payload: &[u8], header: &FrameHeader) -> FrameOutcome {
        let session_id = header.session_id();
        let Some(buffer) = self.table.get_mut(session_id) else {
            return self.drop_orphan(header);
        };

        match buffer.append(payload) {
            Ok(()) => FrameOutcome::Buffered,
            Err(err) => {
                self.table.release(session_id);
                self.drop_message(&err, header)
            }
        }
    }

    fn complete_assembly(&mut self, payload: &[u8], header: &FrameHeader) -> FrameOutcome {
        // Detach before delivery so a panicking handler cannot leave a
        // completed assembly registered under the session.
        let Some(mut buffer) = self.table.take(header.session_id()) else {
            return self.drop_orphan(header);
        };

        if let Err(err) = buffer.append(payload) {
            self.table.recycle(buffer);
            return self.drop_message(&err, header);
        }

        self.counters.reassembled_messages += 1;
        metrics::inc_messages(Delivery::Reassembled);
        let completed = buffer.completed_header();
        self.handler.on_message(Message::Reassembled {
            buffer: &buffer,
            header: completed,
        });
        self.table.recycle(buffer);
        FrameOutcome::Completed
    }

    fn drop_orphan(&mut self, header: &FrameHeader) -> FrameOutcome {
        debug!(
            "dropping fragment without BEGIN: session_id={}, stream_id={}, term_offset={}",
            header.session_id(),
            header.stream_id(),
            header.term_offset()
        );
        self.counters.orphaned_fragments += 1;
        metrics::inc_orphaned_fragments();
        FrameOutcome::DroppedOrphan
    }

    fn drop_message(&mut self, err: &BufferGrowthError, header: &FrameHeader) -> FrameOutcome {
        warn!(
            "dropping fragmented message: session_id={}, stream_id={}, error={err}",
            header.session_id(),
            header.stream_id()
        );
        self.counters.dropped_messages += 1;
        metrics::inc_dropped_messages();
        FrameOutcome::Abandoned
    }
}

impl<H> FragmentAssembler<H> {
    /// Running totals for this instance.
    #[must_use]
    pub const fn counters(&self) -> &AssemblyCounters { &self.counters }

    /// Read-only view of the in-flight assemblies.
    #[must_use]
    pub const fn table(&self) -> &SessionAssemblyTable { &self.table }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &AssemblerConfig { self.table.config() }

    /// Borrow the application handler.
    #[must_use]
    pub const fn handler(&self) -> &H { &self.handler }

    /// Mutably borrow the application handler.
    pub fn handler_mut(&mut self) -> &mut H { &mut self.handler }

    /// Consume the assembler, returning the handler.
    #[must_use]
    pub fn into_handler(self) -> H { self.handler }
}

impl<H: MessageHandler> FrameHandler for FragmentAssembler<H> {
    fn on_frame(&mut self, buffer: &[u8], offset: usize, length: usize, header: &FrameHeader) {
        let _ = FragmentAssembler::on_frame(self, buffer, offset, length, header);
    }

    fn on_session_inactive(&mut self, session_id: SessionId) {
        let _ = FragmentAssembler::on_session_inactive(self, session_id);
    }
}
