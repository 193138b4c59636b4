#![doc(html_root_url = "https://docs.rs/frameweave/latest")]
//! Public API for the `frameweave` library.
//!
//! This crate reassembles messages that a publisher split across several
//! data frames because they exceeded the transport MTU. Frames arrive from a
//! term buffer through [`term::TermReader`] (or any transport that implements
//! the [`frame::FrameHandler`] contract), pass through a
//! [`FragmentAssembler`], and reach the application as whole [`Message`]s.
//! Single-frame messages are delivered without copying. The sender side is
//! covered by [`fragmenter::Fragmenter`].

pub mod assembler;
pub mod assembly;
pub mod config;
pub mod fragmenter;
pub mod frame;
pub mod metrics;
pub mod term;

pub use assembler::{AssemblyCounters, FragmentAssembler, FrameOutcome, Message, MessageHandler};
pub use assembly::{AssemblyBuffer, BufferGrowthError, SessionAssemblyTable};
pub use config::{AssemblerConfig, MAX_MESSAGE_SIZE_LIMIT};
pub use fragmenter::{DataFrame, FragmentBatch, FragmentationError, Fragmenter, MAX_MTU_LENGTH};
pub use frame::{
    FragmentKind,
    FrameFlags,
    FrameHandler,
    FrameHeader,
    HeaderError,
    SessionId,
    StreamId,
};
pub use term::TermReader;
