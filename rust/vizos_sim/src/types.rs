//! Newtype wrappers and type aliases for domain concepts.
//!
//! Indices into the deadlock matrices are newtypes so a process row can
//! never be confused with a resource column. Plain quantities (times,
//! tracks, pages, sizes) are aliases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Simulated time in abstract ticks.
pub type Time = u64;

/// Disk track number.
pub type Track = u32;

/// Virtual page number in a reference string.
pub type PageNo = u32;

/// Units of a resource type held, requested or available.
pub type Units = u32;

/// Size of a memory block or process image.
pub type Size = u64;

/// Row index into the deadlock matrices. Displays 1-based, e.g. `P1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcIdx(pub usize);

/// Column index into the deadlock matrices. Displays 1-based, e.g. `R1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResIdx(pub usize);

impl fmt::Display for ProcIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

impl fmt::Display for ResIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_one_based() {
        assert_eq!(ProcIdx(0).to_string(), "P1");
        assert_eq!(ResIdx(2).to_string(), "R3");
    }
}
