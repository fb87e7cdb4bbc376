//! CPU scheduling engine.
//!
//! Every policy runs over the same [`executor::Executor`], which owns the
//! clock, the remaining-time bookkeeping, the Gantt timeline and the trace.
//! The policies only decide *which* ready process runs next and for how
//! long:
//!
//! - **FCFS / SJF / Priority**: non-preemptive, pick the minimum of a
//!   policy key among arrived processes (ties by arrival, then input order).
//! - **Round Robin**: FIFO ready queue, fixed quantum.
//! - **Preemptive Priority**: the Round Robin requeue discipline with
//!   priority selection instead of FIFO order.

mod executor;
mod metrics;
mod nonpreemptive;
mod preemptive;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::trace::Trace;
use crate::types::Time;

pub use metrics::{Average, Metrics};

/// A process as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Process {
    /// Identifier, unique within one request.
    pub id: String,
    pub arrival: Time,
    /// CPU time required; must be positive.
    pub burst: Time,
    /// Lower value = higher priority. Defaults to 0.
    #[serde(default)]
    pub priority: i32,
}

impl Process {
    pub fn new(id: impl Into<String>, arrival: Time, burst: Time) -> Self {
        Self {
            id: id.into(),
            arrival,
            burst,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Scheduling policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Policy {
    Fcfs,
    Sjf,
    Priority {
        #[serde(default)]
        preemptive: bool,
    },
    RoundRobin {
        quantum: Time,
    },
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fcfs => f.write_str("FCFS"),
            Policy::Sjf => f.write_str("SJF"),
            Policy::Priority { preemptive: false } => f.write_str("Priority"),
            Policy::Priority { preemptive: true } => f.write_str("Priority (preemptive)"),
            Policy::RoundRobin { quantum } => write!(f, "Round Robin (q={quantum})"),
        }
    }
}

/// One contiguous run of a process on the CPU (a Gantt chart bar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub pid: String,
    pub start: Time,
    pub end: Time,
}

impl Segment {
    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

/// Per-process outcome, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub id: String,
    pub arrival: Time,
    pub burst: Time,
    pub priority: i32,
    /// Time of the first dispatch.
    pub first_run: Time,
    pub completion: Time,
    pub turnaround: Time,
    pub waiting: Time,
    pub response: Time,
}

/// Why a process was put on the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchReason {
    FirstCome,
    ShortestJob,
    HighestPriority,
    TimeSlice,
}

/// CPU scheduling trace step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CpuEvent {
    /// The process entered the ready set.
    Arrive { pid: String, time: Time },
    /// Nothing was ready; the clock jumped to the next arrival.
    Idle { from: Time, to: Time },
    /// The process ran over `[start, end)`.
    Dispatch {
        pid: String,
        start: Time,
        end: Time,
        reason: DispatchReason,
    },
    /// The process left the CPU with work remaining and was re-queued.
    Preempt {
        pid: String,
        time: Time,
        remaining: Time,
    },
    /// The process finished.
    Complete { pid: String, time: Time },
}

impl fmt::Display for CpuEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuEvent::Arrive { pid, time } => write!(f, "{time:>5}: {pid} arrives"),
            CpuEvent::Idle { from, to } => write!(f, "{from:>5}: idle until {to}"),
            CpuEvent::Dispatch {
                pid,
                start,
                end,
                reason,
            } => write!(f, "{start:>5}: {pid} runs until {end} ({reason:?})"),
            CpuEvent::Preempt {
                pid,
                time,
                remaining,
            } => write!(f, "{time:>5}: {pid} preempted, {remaining} left"),
            CpuEvent::Complete { pid, time } => write!(f, "{time:>5}: {pid} completes"),
        }
    }
}

/// Result of one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub policy: Policy,
    pub timeline: Vec<Segment>,
    pub processes: Vec<ProcessReport>,
    pub metrics: Metrics,
    pub trace: Trace<CpuEvent>,
}

impl Schedule {
    /// Final clock value.
    pub fn total_time(&self) -> Time {
        self.metrics.total_time
    }

    pub fn report(&self, id: &str) -> Option<&ProcessReport> {
        self.processes.iter().find(|p| p.id == id)
    }

    /// All timeline segments belonging to `id`, in execution order.
    pub fn slices<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.timeline.iter().filter(move |s| s.pid == id)
    }

    /// Process ids in the order they first reached the CPU.
    pub fn dispatch_order(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.timeline
            .iter()
            .filter(|s| seen.insert(s.pid.as_str()))
            .map(|s| s.pid.as_str())
            .collect()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.policy)?;
        write!(f, "|")?;
        for seg in &self.timeline {
            write!(f, " {} [{}-{}] |", seg.pid, seg.start, seg.end)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:<8} {:>7} {:>5} {:>4} {:>10} {:>10} {:>7} {:>8}",
            "id", "arrival", "burst", "prio", "completion", "turnaround", "waiting", "response"
        )?;
        for p in &self.processes {
            writeln!(
                f,
                "{:<8} {:>7} {:>5} {:>4} {:>10} {:>10} {:>7} {:>8}",
                p.id,
                p.arrival,
                p.burst,
                p.priority,
                p.completion,
                p.turnaround,
                p.waiting,
                p.response
            )?;
        }
        write!(f, "{}", self.metrics)
    }
}

fn validate(processes: &[Process]) -> Result<()> {
    if processes.is_empty() {
        return Err(ValidationError::empty("processes"));
    }

    let mut ids = HashSet::new();
    let mut total_burst: Time = 0;
    let mut last_arrival: Time = 0;
    for (i, p) in processes.iter().enumerate() {
        if p.id.is_empty() {
            return Err(ValidationError::empty(format!("processes[{i}].id")));
        }
        if p.burst == 0 {
            return Err(ValidationError::out_of_range(
                format!("processes[{i}].burst"),
                "positive",
                p.burst,
            ));
        }
        if !ids.insert(p.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                field: format!("processes[{i}].id"),
                id: p.id.clone(),
            });
        }
        // The clock never passes the latest arrival plus every burst.
        total_burst = total_burst.checked_add(p.burst).ok_or_else(|| {
            ValidationError::out_of_range(
                format!("processes[{i}].burst"),
                "small enough for the total burst to fit in u64",
                p.burst,
            )
        })?;
        last_arrival = last_arrival.max(p.arrival);
        if last_arrival.checked_add(total_burst).is_none() {
            return Err(ValidationError::out_of_range(
                format!("processes[{i}].arrival"),
                "small enough for the schedule to end before u64::MAX",
                p.arrival,
            ));
        }
    }
    Ok(())
}

/// Run `policy` over `processes`.
///
/// Fails without simulating anything if the process list is empty, an id
/// is empty or repeated, a burst is zero, or a Round Robin quantum is zero.
pub fn simulate(processes: &[Process], policy: Policy) -> Result<Schedule> {
    validate(processes)?;

    let schedule = match policy {
        Policy::Fcfs => {
            nonpreemptive::run(processes, policy, DispatchReason::FirstCome, |_| ())
        }
        Policy::Sjf => {
            nonpreemptive::run(processes, policy, DispatchReason::ShortestJob, |p| p.burst)
        }
        Policy::Priority { preemptive: false } => {
            nonpreemptive::run(processes, policy, DispatchReason::HighestPriority, |p| {
                p.priority
            })
        }
        Policy::Priority { preemptive: true } => preemptive::priority(processes),
        Policy::RoundRobin { quantum } => {
            if quantum == 0 {
                return Err(ValidationError::out_of_range("quantum", "positive", quantum));
            }
            preemptive::round_robin(processes, quantum)
        }
    };

    log::debug!(
        "{}: {} processes finished at t={}",
        schedule.policy,
        schedule.processes.len(),
        schedule.total_time()
    );
    Ok(schedule)
}

pub fn fcfs(processes: &[Process]) -> Result<Schedule> {
    simulate(processes, Policy::Fcfs)
}

pub fn sjf(processes: &[Process]) -> Result<Schedule> {
    simulate(processes, Policy::Sjf)
}

pub fn priority(processes: &[Process], preemptive: bool) -> Result<Schedule> {
    simulate(processes, Policy::Priority { preemptive })
}

pub fn round_robin(processes: &[Process], quantum: Time) -> Result<Schedule> {
    simulate(processes, Policy::RoundRobin { quantum })
}
