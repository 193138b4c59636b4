//! Per-frame results and diagnostic counters.

/// What [`FragmentAssembler::on_frame`](super::FragmentAssembler::on_frame)
/// did with a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// An unfragmented frame was passed straight to the handler.
    Delivered,
    /// A fragment was appended; the message is still incomplete.
    Buffered,
    /// An END fragment completed a message, which was delivered.
    Completed,
    /// A middle or END fragment arrived with no assembly in progress.
    DroppedOrphan,
    /// The assembly could not grow and was discarded with its message.
    Abandoned,
}

impl FrameOutcome {
    /// Whether the handler ran for this frame.
    #[must_use]
    pub const fn delivered_message(self) -> bool {
        matches!(self, Self::Delivered | Self::Completed)
    }
}

/// Running totals kept by one assembler instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblyCounters {
    /// Messages delivered straight from a single frame.
    pub unfragmented_messages: u64,
    /// Messages delivered after reassembly.
    pub reassembled_messages: u64,
    /// Middle or END fragments dropped for lack of a BEGIN.
    pub orphaned_fragments: u64,
    /// BEGIN fragments that discarded an incomplete assembly.
    pub restarted_assemblies: u64,
    /// Messages lost because their buffer could not grow.
    pub dropped_messages: u64,
    /// Incomplete assemblies released by session teardown.
    pub abandoned_assemblies: u64,
}

impl AssemblyCounters {
    /// Total messages handed to the application.
    #[must_use]
    pub const fn delivered_messages(&self) -> u64 {
        self.unfragmented_messages + self.reassembled_messages
    }
}
