//! Shared dispatch machinery for every CPU policy.

use crate::cpu::{CpuEvent, DispatchReason, Metrics, Policy, Process, ProcessReport, Schedule, Segment};
use crate::trace::Trace;
use crate::types::Time;

/// Clock, per-process bookkeeping and output buffers for one run.
///
/// Arrivals are admitted in `(arrival, input index)` order, so processes
/// arriving at the same instant enter the ready set in input order.
pub(super) struct Executor<'a> {
    procs: &'a [Process],
    clock: Time,
    remaining: Vec<Time>,
    first_run: Vec<Option<Time>>,
    completion: Vec<Option<Time>>,
    arrivals: Vec<usize>,
    next_arrival: usize,
    timeline: Vec<Segment>,
    trace: Trace<CpuEvent>,
}

impl<'a> Executor<'a> {
    pub(super) fn new(procs: &'a [Process]) -> Self {
        let mut arrivals: Vec<usize> = (0..procs.len()).collect();
        arrivals.sort_by_key(|&i| procs[i].arrival);

        Self {
            procs,
            clock: 0,
            remaining: procs.iter().map(|p| p.burst).collect(),
            first_run: vec![None; procs.len()],
            completion: vec![None; procs.len()],
            arrivals,
            next_arrival: 0,
            timeline: Vec::new(),
            trace: Trace::new(),
        }
    }

    pub(super) fn clock(&self) -> Time {
        self.clock
    }

    pub(super) fn remaining(&self, idx: usize) -> Time {
        self.remaining[idx]
    }

    /// Move every process that has arrived by now into the ready set.
    /// Returns the admitted indices in admission order.
    pub(super) fn admit(&mut self) -> Vec<usize> {
        let mut admitted = Vec::new();
        while let Some(&idx) = self.arrivals.get(self.next_arrival) {
            if self.procs[idx].arrival > self.clock {
                break;
            }
            self.trace.record(CpuEvent::Arrive {
                pid: self.procs[idx].id.clone(),
                time: self.procs[idx].arrival,
            });
            admitted.push(idx);
            self.next_arrival += 1;
        }
        admitted
    }

    /// Not-yet-admitted processes in admission order.
    pub(super) fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.arrivals[self.next_arrival..].iter().copied()
    }

    /// Advance the clock to the next arrival. Returns `false` if no process
    /// is left to arrive.
    pub(super) fn idle_until_next_arrival(&mut self) -> bool {
        let Some(idx) = self.pending().next() else {
            return false;
        };
        let to = self.procs[idx].arrival;
        if to > self.clock {
            self.trace.record(CpuEvent::Idle {
                from: self.clock,
                to,
            });
            log::trace!("idle {}..{}", self.clock, to);
            self.clock = to;
        }
        true
    }

    /// Run `idx` for `len` ticks starting now.
    pub(super) fn run(&mut self, idx: usize, len: Time, reason: DispatchReason) {
        debug_assert!(len > 0 && len <= self.remaining[idx]);
        let pid = self.procs[idx].id.clone();
        let start = self.clock;
        let end = start + len;

        self.first_run[idx].get_or_insert(start);
        self.remaining[idx] -= len;
        self.clock = end;

        log::trace!("{pid} runs {start}..{end} ({reason:?})");
        self.trace.record(CpuEvent::Dispatch {
            pid: pid.clone(),
            start,
            end,
            reason,
        });
        self.timeline.push(Segment { pid, start, end });
    }

    pub(super) fn preempt(&mut self, idx: usize) {
        self.trace.record(CpuEvent::Preempt {
            pid: self.procs[idx].id.clone(),
            time: self.clock,
            remaining: self.remaining[idx],
        });
    }

    pub(super) fn complete(&mut self, idx: usize) {
        debug_assert_eq!(self.remaining[idx], 0);
        self.completion[idx] = Some(self.clock);
        self.trace.record(CpuEvent::Complete {
            pid: self.procs[idx].id.clone(),
            time: self.clock,
        });
    }

    /// Freeze the run into a [`Schedule`]. Every process must have completed.
    pub(super) fn finish(self, policy: Policy) -> Schedule {
        let processes: Vec<ProcessReport> = self
            .procs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let first_run = self.first_run[i].unwrap_or(p.arrival);
                let completion = self.completion[i].unwrap_or(self.clock);
                let turnaround = completion - p.arrival;
                ProcessReport {
                    id: p.id.clone(),
                    arrival: p.arrival,
                    burst: p.burst,
                    priority: p.priority,
                    first_run,
                    completion,
                    turnaround,
                    waiting: turnaround - p.burst,
                    response: first_run - p.arrival,
                }
            })
            .collect();

        let metrics = Metrics::from_reports(&processes, self.clock);

        Schedule {
            policy,
            timeline: self.timeline,
            processes,
            metrics,
            trace: self.trace,
        }
    }
}
