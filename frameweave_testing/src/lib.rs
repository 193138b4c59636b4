//! Utilities for exercising [`frameweave`] assemblers in tests.
//!
//! The helpers build fragment sequences without a transport, lay them out in
//! term buffers, and capture delivered messages as owned values so tests can
//! assert on them after the borrow handed to the handler has ended.
//!
//! ```rust
//! use frameweave::{FragmentAssembler, SessionId, StreamId};
//! use frameweave_testing::{RecordingHandler, TestFrame};
//!
//! let frames = TestFrame::split(SessionId::new(1), StreamId::new(1), b"hello world", 4);
//! let mut assembler = FragmentAssembler::new(RecordingHandler::default());
//! for frame in &frames {
//!     frame.deliver(&mut assembler);
//! }
//! assert_eq!(assembler.handler().payloads(), vec![b"hello world".to_vec()]);
//! ```

pub mod frames;
pub mod logging;

pub use frames::{ReceivedMessage, RecordingHandler, TestFrame, interleave, write_term};
pub use logging::{LoggerHandle, logger};
