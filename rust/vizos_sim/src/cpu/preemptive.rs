//! Preemptive policies: Round Robin and preemptive Priority.
//!
//! Both share one requeue discipline: after a slice ends, processes that
//! arrived during (or exactly at the end of) the slice join the ready set
//! first, then the preempted process is re-queued behind them. A process
//! with nothing left is finalized and never re-enters the ready set.

use std::collections::VecDeque;

use crate::cpu::executor::Executor;
use crate::cpu::{DispatchReason, Policy, Process, Schedule};
use crate::types::Time;

/// Round Robin with a fixed, positive quantum.
pub(super) fn round_robin(procs: &[Process], quantum: Time) -> Schedule {
    let mut exec = Executor::new(procs);
    let mut queue: VecDeque<usize> = VecDeque::new();

    loop {
        queue.extend(exec.admit());

        let Some(idx) = queue.pop_front() else {
            if !exec.idle_until_next_arrival() {
                break;
            }
            continue;
        };

        let slice = quantum.min(exec.remaining(idx));
        exec.run(idx, slice, DispatchReason::TimeSlice);

        queue.extend(exec.admit());
        if exec.remaining(idx) == 0 {
            exec.complete(idx);
        } else {
            exec.preempt(idx);
            queue.push_back(idx);
        }
    }

    exec.finish(Policy::RoundRobin { quantum })
}

/// Preemptive Priority.
///
/// The selected process runs until it completes or until a process with a
/// strictly better `(priority, arrival, input index)` key arrives. Equal
/// priorities never preempt, since a later arrival always has a larger key.
pub(super) fn priority(procs: &[Process]) -> Schedule {
    let key = |idx: usize| (procs[idx].priority, procs[idx].arrival, idx);

    let mut exec = Executor::new(procs);
    let mut ready: Vec<usize> = Vec::new();

    loop {
        ready.extend(exec.admit());

        let Some(pos) = (0..ready.len()).min_by_key(|&pos| key(ready[pos])) else {
            if !exec.idle_until_next_arrival() {
                break;
            }
            continue;
        };
        let idx = ready.remove(pos);

        let preempt_at = exec
            .pending()
            .filter(|&other| key(other) < key(idx))
            .map(|other| procs[other].arrival)
            .min();
        let mut slice = exec.remaining(idx);
        if let Some(at) = preempt_at {
            slice = slice.min(at - exec.clock());
        }
        exec.run(idx, slice, DispatchReason::HighestPriority);

        ready.extend(exec.admit());
        if exec.remaining(idx) == 0 {
            exec.complete(idx);
        } else {
            exec.preempt(idx);
            ready.push(idx);
        }
    }

    exec.finish(Policy::Priority { preemptive: true })
}

#[cfg(test)]
mod tests {
    use crate::cpu::{priority, round_robin, CpuEvent, Process};

    #[test]
    fn test_round_robin_textbook() {
        // q=2: A B C A B A
        let procs = vec![
            Process::new("A", 0, 5),
            Process::new("B", 1, 3),
            Process::new("C", 2, 1),
        ];
        let s = round_robin(&procs, 2).unwrap();
        let order: Vec<(&str, u64, u64)> = s
            .timeline
            .iter()
            .map(|seg| (seg.pid.as_str(), seg.start, seg.end))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A", 0, 2),
                ("B", 2, 4),
                ("C", 4, 5),
                ("A", 5, 7),
                ("B", 7, 8),
                ("A", 8, 9),
            ]
        );
        assert_eq!(s.report("A").unwrap().completion, 9);
        assert_eq!(s.report("C").unwrap().waiting, 2);
    }

    #[test]
    fn test_arrival_at_slice_end_queues_before_requeue() {
        let procs = vec![Process::new("A", 0, 4), Process::new("B", 2, 2)];
        let s = round_robin(&procs, 2).unwrap();
        assert_eq!(s.dispatch_order(), vec!["A", "B"]);
        assert_eq!(s.timeline[1].pid, "B");
        assert_eq!(s.timeline[1].start, 2);
    }

    #[test]
    fn test_finished_process_never_requeued() {
        let procs = vec![Process::new("A", 0, 2), Process::new("B", 0, 3)];
        let s = round_robin(&procs, 2).unwrap();
        assert_eq!(s.slices("A").count(), 1);
        assert_eq!(
            s.trace.count(|e| matches!(e, CpuEvent::Preempt { pid, .. } if pid == "A")),
            0
        );
    }

    #[test]
    fn test_preemptive_priority_preempts_on_better_arrival() {
        let procs = vec![
            Process::new("low", 0, 6).with_priority(5),
            Process::new("high", 2, 2).with_priority(1),
            Process::new("same", 3, 1).with_priority(5),
        ];
        let s = priority(&procs, true).unwrap();
        let order: Vec<(&str, u64, u64)> = s
            .timeline
            .iter()
            .map(|seg| (seg.pid.as_str(), seg.start, seg.end))
            .collect();
        assert_eq!(
            order,
            vec![("low", 0, 2), ("high", 2, 4), ("low", 4, 8), ("same", 8, 9)]
        );
        assert_eq!(s.report("low").unwrap().response, 0);
        assert_eq!(s.report("same").unwrap().waiting, 5);
    }

    #[test]
    fn test_preemptive_priority_without_preemption_matches_nonpreemptive() {
        let procs = vec![
            Process::new("A", 0, 3).with_priority(1),
            Process::new("B", 1, 2).with_priority(2),
            Process::new("C", 2, 2).with_priority(3),
        ];
        let pre = priority(&procs, true).unwrap();
        let non = priority(&procs, false).unwrap();
        assert_eq!(pre.timeline, non.timeline);
        assert_eq!(pre.processes, non.processes);
    }
}
