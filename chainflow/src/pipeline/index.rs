//! Pipeline identity.

use crate::errors::ChainflowError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// One-based position of a pipeline within a fan-out.
///
/// `Copy`, so every spawned task owns its own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PipelineIndex(NonZeroU32);

impl PipelineIndex {
    /// The first pipeline.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Creates an index, rejecting zero.
    pub fn new(value: u32) -> Result<Self, ChainflowError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(ChainflowError::InvalidIndex(value))
    }

    /// Returns the index as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns the zero-based slot this index occupies in a result table.
    #[must_use]
    pub const fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Iterates over indices `1..=count`.
    ///
    /// Counts above `u32::MAX` are truncated.
    pub fn first_n(count: usize) -> impl Iterator<Item = Self> {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        (1..=count).filter_map(NonZeroU32::new).map(Self)
    }
}

impl TryFrom<u32> for PipelineIndex {
    type Error = ChainflowError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PipelineIndex> for u32 {
    fn from(index: PipelineIndex) -> Self {
        index.get()
    }
}

impl std::fmt::Display for PipelineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero() {
        assert!(matches!(PipelineIndex::new(0), Err(ChainflowError::InvalidIndex(0))));
    }

    #[test]
    fn test_slot_is_zero_based() {
        assert_eq!(PipelineIndex::FIRST.slot(), 0);
        assert_eq!(PipelineIndex::new(5).unwrap().slot(), 4);
    }

    #[test]
    fn test_first_n() {
        let indices: Vec<u32> = PipelineIndex::first_n(5).map(PipelineIndex::get).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert_eq!(PipelineIndex::first_n(0).count(), 0);
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert!(serde_json::from_str::<PipelineIndex>("0").is_err());
        let index: PipelineIndex = serde_json::from_str("3").unwrap();
        assert_eq!(serde_json::to_string(&index).unwrap(), "3");
    }
}
