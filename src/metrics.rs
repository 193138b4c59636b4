//! Metric helpers for `frameweave`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking messages passed through from one frame.
pub const UNFRAGMENTED_MESSAGES: &str = "frameweave_unfragmented_messages_total";
/// Name of the counter tracking messages stitched from several fragments.
pub const REASSEMBLED_MESSAGES: &str = "frameweave_reassembled_messages_total";
/// Name of the counter tracking fragments dropped for lack of a BEGIN.
pub const ORPHANED_FRAGMENTS: &str = "frameweave_orphaned_fragments_total";
/// Name of the counter tracking BEGIN fragments that replaced an assembly.
pub const RESTARTED_ASSEMBLIES: &str = "frameweave_restarted_assemblies_total";
/// Name of the counter tracking messages lost to buffer growth failures.
pub const DROPPED_MESSAGES: &str = "frameweave_dropped_messages_total";
/// Name of the counter tracking assemblies released by session teardown.
pub const ABANDONED_ASSEMBLIES: &str = "frameweave_abandoned_assemblies_total";

/// How a delivered message reached the handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Passed through from a single frame.
    Unfragmented,
    /// Stitched together from several fragments.
    Reassembled,
}

impl Delivery {
    /// Counter name for this kind of delivery.
    #[must_use]
    pub const fn metric_name(self) -> &'static str {
        match self {
            Delivery::Unfragmented => UNFRAGMENTED_MESSAGES,
            Delivery::Reassembled => REASSEMBLED_MESSAGES,
        }
    }
}

/// Record a delivered message.
#[cfg(feature = "metrics")]
pub fn inc_messages(delivery: Delivery) { counter!(delivery.metric_name()).increment(1); }

/// Record an orphaned fragment.
#[cfg(feature = "metrics")]
pub fn inc_orphaned_fragments() { counter!(ORPHANED_FRAGMENTS).increment(1); }

/// Record a restarted assembly.
#[cfg(feature = "metrics")]
pub fn inc_restarted_assemblies() { counter!(RESTARTED_ASSEMBLIES).increment(1); }

/// Record a message dropped because its buffer could not grow.
#[cfg(feature = "metrics")]
pub fn inc_dropped_messages() { counter!(DROPPED_MESSAGES).increment(1); }

/// Record assemblies released by session teardown.
#[cfg(feature = "metrics")]
pub fn add_abandoned_assemblies(count: u64) { counter!(ABANDONED_ASSEMBLIES).increment(count); }

#[cfg(not(feature = "metrics"))]
pub fn inc_messages(_delivery: Delivery) {}

#[cfg(not(feature = "metrics"))]
pub fn inc_orphaned_fragments() {}

#[cfg(not(feature = "metrics"))]
pub fn inc_restarted_assemblies() {}

#[cfg(not(feature = "metrics"))]
pub fn inc_dropped_messages() {}

#[cfg(not(feature = "metrics"))]
pub fn add_abandoned_assemblies(_count: u64) {}
