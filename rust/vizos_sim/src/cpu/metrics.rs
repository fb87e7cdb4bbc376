//! Aggregate performance metrics for a finished schedule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cpu::ProcessReport;
use crate::types::Time;

/// Running mean of a sample set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Average {
    count: usize,
    sum: u128,
}

impl Average {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: u64) {
        self.count += 1;
        self.sum += value as u128;
    }

    /// Mean value (or 0 if empty).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

impl FromIterator<u64> for Average {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut avg = Average::new();
        for v in iter {
            avg.add(v);
        }
        avg
    }
}

/// Schedule-wide metrics, computed once after the run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub avg_waiting: f64,
    pub avg_turnaround: f64,
    pub avg_response: f64,
    /// Total burst / total elapsed time.
    pub cpu_utilization: f64,
    /// Completed processes per tick of elapsed time.
    pub throughput: f64,
    /// Final clock value.
    pub total_time: Time,
    pub total_burst: Time,
    pub completed: usize,
}

impl Metrics {
    /// Derive metrics from per-process reports and the final clock.
    ///
    /// Utilization and throughput are zero when the final clock is zero.
    pub fn from_reports(reports: &[ProcessReport], total_time: Time) -> Self {
        let total_burst: Time = reports.iter().map(|r| r.burst).sum();
        let completed = reports.len();
        let (cpu_utilization, throughput) = if total_time == 0 {
            (0.0, 0.0)
        } else {
            (
                total_burst as f64 / total_time as f64,
                completed as f64 / total_time as f64,
            )
        };

        Self {
            avg_waiting: reports.iter().map(|r| r.waiting).collect::<Average>().mean(),
            avg_turnaround: reports.iter().map(|r| r.turnaround).collect::<Average>().mean(),
            avg_response: reports.iter().map(|r| r.response).collect::<Average>().mean(),
            cpu_utilization,
            throughput,
            total_time,
            total_burst,
            completed,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Metrics:")?;
        writeln!(f, "  avg_waiting:     {:.2}", self.avg_waiting)?;
        writeln!(f, "  avg_turnaround:  {:.2}", self.avg_turnaround)?;
        writeln!(f, "  avg_response:    {:.2}", self.avg_response)?;
        writeln!(f, "  cpu_utilization: {:.4}", self.cpu_utilization)?;
        writeln!(f, "  throughput:      {:.4}", self.throughput)?;
        writeln!(f, "  total_time:      {}", self.total_time)
    }
}
