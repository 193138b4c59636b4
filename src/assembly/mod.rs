//! Per-session reassembly storage.
//!
//! [`AssemblyBuffer`] accumulates the payloads of one fragmented message and
//! [`SessionAssemblyTable`] keeps at most one such buffer per session,
//! recycling storage between messages.

pub mod buffer;
pub mod error;
pub mod table;

pub use buffer::AssemblyBuffer;
pub use error::BufferGrowthError;
pub use table::{Acquired, BufferSource, SessionAssemblyTable};
