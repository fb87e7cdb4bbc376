//! Memory engine: contiguous allocation and page replacement.

pub mod allocation;
pub mod paging;

pub use allocation::{
    allocate, AllocationOutcome, AllocationStep, BlockState, FitStrategy, Placement,
};
pub use paging::{replace_pages, PageStep, PagingOutcome, ReplacementPolicy};
