//! Fragment builders and a recording message handler.

use bytes::BytesMut;
use frameweave::{
    FragmentBatch,
    FrameFlags,
    FrameHandler,
    FrameHeader,
    Message,
    MessageHandler,
    SessionId,
    StreamId,
};

/// A frame held in memory, independent of any term buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestFrame {
    /// Frame header.
    pub header: FrameHeader,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

impl TestFrame {
    /// Build a frame carrying `payload` with the given flags.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        stream_id: StreamId,
        flags: FrameFlags,
        payload: &[u8],
    ) -> Self {
        Self {
            header: FrameHeader::data(session_id, stream_id, flags, payload.len()),
            payload: payload.to_vec(),
        }
    }

    /// Split `payload` into frames of at most `chunk` bytes with BEGIN/END
    /// flags applied. An empty payload yields one unfragmented frame.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is zero.
    #[must_use]
    pub fn split(
        session_id: SessionId,
        stream_id: StreamId,
        payload: &[u8],
        chunk: usize,
    ) -> Vec<Self> {
        assert!(chunk > 0, "chunk size must be positive");
        if payload.is_empty() {
            return vec![Self::new(session_id, stream_id, FrameFlags::UNFRAGMENTED, &[])];
        }
        let count = payload.len().div_ceil(chunk);
        payload
            .chunks(chunk)
            .enumerate()
            .map(|(index, piece)| {
                let mut flags = FrameFlags::NONE;
                if index == 0 {
                    flags = flags.union(FrameFlags::BEGIN);
                }
                if index + 1 == count {
                    flags = flags.union(FrameFlags::END);
                }
                Self::new(session_id, stream_id, flags, piece)
            })
            .collect()
    }

    /// Hand this frame to `handler` as a transport would.
    pub fn deliver<H: FrameHandler + ?Sized>(&self, handler: &mut H) {
        handler.on_frame(&self.payload, 0, self.payload.len(), &self.header);
    }
}

/// Merge per-session frame sequences into one arrival order.
///
/// Each entry of `picks` selects the sequence (modulo the sequence count)
/// that supplies the next frame; exhausted sequences are skipped. Frames
/// left over once `picks` runs out are appended in sequence order. The
/// relative order within each sequence is always preserved.
#[must_use]
pub fn interleave(sequences: Vec<Vec<TestFrame>>, picks: &[usize]) -> Vec<TestFrame> {
    let mut queues: Vec<std::vec::IntoIter<TestFrame>> =
        sequences.into_iter().map(Vec::into_iter).collect();
    let mut merged = Vec::new();
    if queues.is_empty() {
        return merged;
    }

    let count = queues.len();
    for &pick in picks {
        let next = (0..count)
            .map(|step| (pick % count + step) % count)
            .find_map(|index| queues[index].next());
        match next {
            Some(frame) => merged.push(frame),
            None => break,
        }
    }
    for queue in queues {
        merged.extend(queue);
    }
    merged
}

/// Lay fragment batches out back to back in a fresh term buffer.
#[must_use]
pub fn write_term<'a>(batches: impl IntoIterator<Item = &'a FragmentBatch>) -> BytesMut {
    let mut term = BytesMut::new();
    for batch in batches {
        batch.write_to(&mut term);
    }
    term
}

/// Owned copy of a delivered [`Message`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Header reported with the message.
    pub header: FrameHeader,
    /// Payload bytes.
    pub payload: Vec<u8>,
    /// Offset of the payload in the buffer it was delivered in.
    pub offset: usize,
    /// Whether the message was stitched from several frames.
    pub reassembled: bool,
}

/// [`MessageHandler`] that keeps an owned copy of every message.
#[derive(Clone, Debug, Default)]
pub struct RecordingHandler {
    messages: Vec<ReceivedMessage>,
}

impl RecordingHandler {
    /// Messages in delivery order.
    #[must_use]
    pub fn messages(&self) -> &[ReceivedMessage] { &self.messages }

    /// Payloads in delivery order.
    #[must_use]
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.messages.iter().map(|m| m.payload.clone()).collect()
    }

    /// Payloads delivered for `session_id`, in delivery order.
    #[must_use]
    pub fn payloads_for(&self, session_id: SessionId) -> Vec<Vec<u8>> {
        self.messages
            .iter()
            .filter(|m| m.header.session_id() == session_id)
            .map(|m| m.payload.clone())
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) { self.messages.clear(); }
}

impl MessageHandler for RecordingHandler {
    fn on_message(&mut self, message: Message<'_>) {
        self.messages.push(ReceivedMessage {
            header: *message.header(),
            payload: message.to_vec(),
            offset: message.offset(),
            reassembled: message.is_reassembled(),
        });
    }
}
