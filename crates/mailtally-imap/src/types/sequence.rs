//! Message sequence numbers and ranges.

use std::num::NonZeroU32;

/// Message sequence number.
///
/// Sequence numbers are assigned to messages in a mailbox starting from 1.
/// They are ephemeral and change when messages are expunged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeqNum(pub NonZeroU32);

impl SeqNum {
    /// Creates a new sequence number.
    ///
    /// Returns `None` if the value is 0.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SeqNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence set for a FETCH request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSet {
    /// Single sequence number.
    Single(SeqNum),
    /// Range of sequence numbers (inclusive).
    Range(SeqNum, SeqNum),
}

impl SequenceSet {
    /// Creates a sequence set from a single number.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        SeqNum::new(n).map(Self::Single)
    }

    /// Creates a range sequence set.
    #[must_use]
    pub fn range(start: u32, end: u32) -> Option<Self> {
        Some(Self::Range(SeqNum::new(start)?, SeqNum::new(end)?))
    }

    /// Returns the contiguous range `[min, max]` covering every identifier.
    ///
    /// Zeros are ignored; returns `None` when nothing remains.
    #[must_use]
    pub fn covering(ids: &[u32]) -> Option<Self> {
        let mut sorted: Vec<u32> = ids.iter().copied().filter(|&n| n != 0).collect();
        sorted.sort_unstable();
        let (&first, &last) = (sorted.first()?, sorted.last()?);
        if first == last {
            Self::single(first)
        } else {
            Self::range(first, last)
        }
    }

    /// Returns the number of messages addressed by the set.
    #[must_use]
    pub const fn len(&self) -> u32 {
        match self {
            Self::Single(_) => 1,
            Self::Range(start, end) => end.get().abs_diff(start.get()) + 1,
        }
    }

    /// Always false: a sequence set addresses at least one message.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
        }
    }
}
