//! Fragmentation flags and their classification.
//!
//! Only the BEGIN and END bits decide how a frame is treated. Any other bits
//! are carried through untouched so future protocol flags survive reassembly.

use std::fmt;

/// Bitset stored in the `flags` byte of a data frame header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameFlags(u8);

impl FrameFlags {
    /// First fragment of a message.
    pub const BEGIN: Self = Self(0x80);
    /// Last fragment of a message.
    pub const END: Self = Self(0x40);
    /// A message that fits into a single frame.
    pub const UNFRAGMENTED: Self = Self(0x80 | 0x40);
    /// No fragmentation bits: a middle fragment.
    pub const NONE: Self = Self(0);

    /// Wrap a raw flags byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self { Self(bits) }

    /// Return the raw flags byte.
    #[must_use]
    pub const fn bits(self) -> u8 { self.0 }

    /// Report whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    /// Combine two flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }

    /// Classify the frame by its BEGIN and END bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use frameweave::frame::{FragmentKind, FrameFlags};
    /// assert_eq!(FrameFlags::UNFRAGMENTED.kind(), FragmentKind::Unfragmented);
    /// assert_eq!(FrameFlags::BEGIN.kind(), FragmentKind::Begin);
    /// assert_eq!(FrameFlags::NONE.kind(), FragmentKind::Middle);
    /// assert_eq!(FrameFlags::END.kind(), FragmentKind::End);
    /// ```
    #[must_use]
    pub const fn kind(self) -> FragmentKind {
        match (self.contains(Self::BEGIN), self.contains(Self::END)) {
            (true, true) => FragmentKind::Unfragmented,
            (true, false) => FragmentKind::Begin,
            (false, false) => FragmentKind::Middle,
            (false, true) => FragmentKind::End,
        }
    }
}

impl fmt::Debug for FrameFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameFlags({:#04x})", self.0)
    }
}

impl From<u8> for FrameFlags {
    fn from(bits: u8) -> Self { Self(bits) }
}

impl From<FrameFlags> for u8 {
    fn from(flags: FrameFlags) -> Self { flags.0 }
}

/// Role a frame plays in its logical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// The whole message fits into this frame.
    Unfragmented,
    /// First fragment of a multi-frame message.
    Begin,
    /// Neither first nor last fragment.
    Middle,
    /// Last fragment of a multi-frame message.
    End,
}
