//! Run-to-completion policies: FCFS, SJF and non-preemptive Priority.

use crate::cpu::executor::Executor;
use crate::cpu::{DispatchReason, Policy, Process, Schedule};

/// Repeatedly dispatch the arrived process with the smallest
/// `(key, arrival, input index)` and run it to completion.
///
/// FCFS passes a unit key, which reduces selection to arrival order.
pub(super) fn run<K, F>(procs: &[Process], policy: Policy, reason: DispatchReason, key: F) -> Schedule
where
    K: Ord,
    F: Fn(&Process) -> K,
{
    let mut exec = Executor::new(procs);
    let mut ready: Vec<usize> = Vec::new();
    let mut done = 0;

    while done < procs.len() {
        ready.extend(exec.admit());

        if ready.is_empty() {
            if !exec.idle_until_next_arrival() {
                break;
            }
            continue;
        }

        let Some(pos) = (0..ready.len()).min_by_key(|&pos| {
            let idx = ready[pos];
            (key(&procs[idx]), procs[idx].arrival, idx)
        }) else {
            break;
        };
        let idx = ready.remove(pos);

        exec.run(idx, exec.remaining(idx), reason);
        exec.complete(idx);
        done += 1;
    }

    exec.finish(policy)
}

#[cfg(test)]
mod tests {
    use crate::cpu::{fcfs, priority, sjf, CpuEvent, Process};

    #[test]
    fn test_fcfs_idles_until_arrival() {
        let procs = vec![Process::new("A", 2, 3), Process::new("B", 10, 1)];
        let s = fcfs(&procs).unwrap();

        assert_eq!(s.timeline[0].start, 2);
        assert_eq!(s.timeline[1].start, 10);
        assert_eq!(s.total_time(), 11);
        assert_eq!(
            s.trace.count(|e| matches!(e, CpuEvent::Idle { .. })),
            2,
            "idle 0..2 and 5..10"
        );
    }

    #[test]
    fn test_fcfs_ties_keep_input_order() {
        let procs = vec![
            Process::new("B", 0, 2),
            Process::new("A", 0, 1),
            Process::new("C", 0, 1),
        ];
        let s = fcfs(&procs).unwrap();
        assert_eq!(s.dispatch_order(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_sjf_tie_breaks_on_arrival_then_input() {
        let procs = vec![
            Process::new("long", 0, 4),
            Process::new("x", 2, 2),
            Process::new("y", 1, 2),
            Process::new("z", 1, 2),
        ];
        let s = sjf(&procs).unwrap();
        assert_eq!(s.dispatch_order(), vec!["long", "y", "z", "x"]);
    }

    #[test]
    fn test_priority_lower_value_wins() {
        let procs = vec![
            Process::new("A", 0, 1).with_priority(3),
            Process::new("B", 0, 1).with_priority(1),
            Process::new("C", 0, 1).with_priority(2),
        ];
        let s = priority(&procs, false).unwrap();
        assert_eq!(s.dispatch_order(), vec!["B", "C", "A"]);
    }
}
