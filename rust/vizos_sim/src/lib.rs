//! vizos_sim - Step-by-step simulator for classical OS resource-management
//! algorithms.
//!
//! Four independent engines, each a pure function from a problem instance to
//! a result carrying an ordered trace plus derived metrics:
//!
//! - **CPU**: FCFS, SJF, Priority (optionally preemptive) and Round Robin,
//!   producing a Gantt timeline and per-process waiting/turnaround/response.
//! - **Disk**: FCFS, SSTF, SCAN and LOOK, producing the service order, the
//!   head path and the total seek distance.
//! - **Deadlock**: Banker's safe-sequence search, deadlock detection and the
//!   resource-allocation / wait-for graphs derived from the same matrices.
//! - **Memory**: first/best/worst fit allocation and FIFO/LRU page
//!   replacement.
//!
//! Malformed instances are rejected with a [`ValidationError`] before any
//! simulation state exists. Unsafe states, deadlocks, unplaceable processes
//! and empty request lists are ordinary results.
//!
//! # Usage
//!
//! ```rust
//! use vizos_sim::cpu::{self, Process};
//!
//! let procs = vec![
//!     Process::new("A", 0, 5),
//!     Process::new("B", 1, 3),
//!     Process::new("C", 2, 1),
//! ];
//! let schedule = cpu::round_robin(&procs, 2).unwrap();
//! assert_eq!(schedule.total_time(), 9);
//! println!("{schedule}");
//! ```

pub mod cpu;
pub mod deadlock;
pub mod disk;
pub mod error;
pub mod memory;
pub mod trace;
pub mod types;
pub mod workloads;

// Re-export the main public types for convenience.
pub use cpu::{Metrics, Policy, Process, Schedule};
pub use deadlock::{
    bankers, detect, BankersInstance, BankersOutcome, Demand, DetectionInstance,
    DetectionOutcome,
};
pub use disk::{DiskPolicy, DiskRequest, Direction, SeekResult};
pub use error::{Result, ValidationError};
pub use memory::{
    allocate, replace_pages, AllocationOutcome, FitStrategy, PagingOutcome, ReplacementPolicy,
};
pub use trace::{Trace, TraceStep};
pub use types::{PageNo, ProcIdx, ResIdx, Size, Time, Track, Units};
