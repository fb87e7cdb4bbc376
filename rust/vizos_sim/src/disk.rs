//! Disk-head scheduling engine.
//!
//! Requests are de-duplicated before scheduling. Every policy walks the head
//! from `head` through the serviced tracks; SCAN additionally sweeps to the
//! edge of the disk before reversing. The returned [`SeekResult::path`]
//! lists every position the head stopped at, so the total seek distance is
//! always the sum of absolute differences along the path.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::trace::Trace;
use crate::types::Track;

/// Default number of addressable tracks (0..=199).
pub const DEFAULT_DISK_SIZE: Track = 200;

fn default_disk_size() -> Track {
    DEFAULT_DISK_SIZE
}

/// Disk scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskPolicy {
    Fcfs,
    Sstf,
    Scan,
    Look,
}

impl fmt::Display for DiskPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiskPolicy::Fcfs => "FCFS",
            DiskPolicy::Sstf => "SSTF",
            DiskPolicy::Scan => "SCAN",
            DiskPolicy::Look => "LOOK",
        };
        f.write_str(name)
    }
}

/// Initial sweep direction for SCAN and LOOK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward higher track numbers.
    #[default]
    Up,
    /// Toward track 0.
    Down,
}

/// A batch of pending requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiskRequest {
    pub requests: Vec<Track>,
    /// Head position before the first seek.
    pub head: Track,
    /// Defaults to [`Direction::Up`].
    #[serde(default)]
    pub direction: Direction,
    /// Number of tracks; valid tracks are `0..disk_size`. Defaults to 200.
    #[serde(default = "default_disk_size")]
    pub disk_size: Track,
}

impl DiskRequest {
    pub fn new(requests: Vec<Track>, head: Track) -> Self {
        Self {
            requests,
            head,
            direction: Direction::default(),
            disk_size: DEFAULT_DISK_SIZE,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn disk_size(mut self, disk_size: Track) -> Self {
        self.disk_size = disk_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.disk_size == 0 {
            return Err(ValidationError::out_of_range("disk_size", "positive", 0));
        }
        let last = self.disk_size - 1;
        if self.head > last {
            return Err(ValidationError::out_of_range(
                "head",
                "within 0..disk_size",
                self.head,
            ));
        }
        if let Some((i, &t)) = self.requests.iter().enumerate().find(|(_, t)| **t > last) {
            return Err(ValidationError::out_of_range(
                format!("requests[{i}]"),
                "within 0..disk_size",
                t,
            ));
        }
        Ok(())
    }
}

/// Disk trace step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiskEvent {
    /// The head moved to `to` and serviced the request there.
    Service { from: Track, to: Track, distance: u64 },
    /// The head swept to the edge of the disk without servicing anything.
    Sweep { from: Track, to: Track, distance: u64 },
    /// The head changed direction at `at`.
    Reverse { at: Track },
}

impl fmt::Display for DiskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskEvent::Service { from, to, distance } => {
                write!(f, "seek {from} -> {to} ({distance}), service {to}")
            }
            DiskEvent::Sweep { from, to, distance } => {
                write!(f, "sweep {from} -> {to} ({distance})")
            }
            DiskEvent::Reverse { at } => write!(f, "reverse at {at}"),
        }
    }
}

/// Result of one disk scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeekResult {
    pub policy: DiskPolicy,
    /// Serviced tracks in order; a permutation of the de-duplicated requests.
    pub order: Vec<Track>,
    /// Every head position from the start through the last stop.
    pub path: Vec<Track>,
    pub total_seek: u64,
    /// `total_seek / order.len()`, or 0 with no requests.
    pub average_seek: f64,
    pub trace: Trace<DiskEvent>,
}

impl fmt::Display for SeekResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.policy)?;
        let path: Vec<String> = self.path.iter().map(|t| t.to_string()).collect();
        writeln!(f, "  path:         {}", path.join(" -> "))?;
        writeln!(f, "  total_seek:   {}", self.total_seek)?;
        writeln!(f, "  average_seek: {:.2}", self.average_seek)
    }
}

/// Moves the head and records every movement.
struct Head {
    pos: Track,
    order: Vec<Track>,
    path: Vec<Track>,
    total: u64,
    trace: Trace<DiskEvent>,
}

impl Head {
    fn new(start: Track) -> Self {
        Self {
            pos: start,
            order: Vec::new(),
            path: vec![start],
            total: 0,
            trace: Trace::new(),
        }
    }

    fn travel(&mut self, to: Track) -> (Track, u64) {
        let from = self.pos;
        let distance = from.abs_diff(to) as u64;
        self.total += distance;
        self.pos = to;
        self.path.push(to);
        (from, distance)
    }

    fn service(&mut self, track: Track) {
        let (from, distance) = self.travel(track);
        log::trace!("seek {from} -> {track} ({distance})");
        self.order.push(track);
        self.trace.record(DiskEvent::Service {
            from,
            to: track,
            distance,
        });
    }

    fn sweep_to(&mut self, edge: Track) {
        if edge == self.pos {
            return;
        }
        let (from, distance) = self.travel(edge);
        self.trace.record(DiskEvent::Sweep {
            from,
            to: edge,
            distance,
        });
    }

    fn reverse(&mut self) {
        self.trace.record(DiskEvent::Reverse { at: self.pos });
    }

    fn finish(self, policy: DiskPolicy) -> SeekResult {
        let average_seek = if self.order.is_empty() {
            0.0
        } else {
            self.total as f64 / self.order.len() as f64
        };
        SeekResult {
            policy,
            order: self.order,
            path: self.path,
            total_seek: self.total,
            average_seek,
            trace: self.trace,
        }
    }
}

/// Schedule `req` under `policy`.
pub fn schedule(req: &DiskRequest, policy: DiskPolicy) -> Result<SeekResult> {
    req.validate()?;

    let mut head = Head::new(req.head);
    match policy {
        DiskPolicy::Fcfs => fcfs(req, &mut head),
        DiskPolicy::Sstf => sstf(req, &mut head),
        DiskPolicy::Scan => sweep(req, &mut head, true),
        DiskPolicy::Look => sweep(req, &mut head, false),
    }

    let result = head.finish(policy);
    log::debug!(
        "{}: {} requests, total seek {}",
        policy,
        result.order.len(),
        result.total_seek
    );
    Ok(result)
}

/// Input order, first occurrence of each track kept.
fn fcfs(req: &DiskRequest, head: &mut Head) {
    let mut seen = HashSet::new();
    for &t in &req.requests {
        if seen.insert(t) {
            head.service(t);
        }
    }
}

/// Closest remaining request first; equal distances go to the lower track.
fn sstf(req: &DiskRequest, head: &mut Head) {
    let mut pending: BTreeSet<Track> = req.requests.iter().copied().collect();
    loop {
        let pos = head.pos;
        let Some(next) = pending.iter().copied().min_by_key(|&t| (t.abs_diff(pos), t)) else {
            break;
        };
        pending.remove(&next);
        head.service(next);
    }
}

/// SCAN (`to_edge`) and LOOK.
///
/// Requests at the head position belong to the upper partition. SCAN
/// reaches the edge in the starting direction whenever it serviced
/// anything on the way there.
fn sweep(req: &DiskRequest, head: &mut Head, to_edge: bool) {
    let sorted: BTreeSet<Track> = req.requests.iter().copied().collect();
    let lower: Vec<Track> = sorted.range(..req.head).rev().copied().collect();
    let upper: Vec<Track> = sorted.range(req.head..).copied().collect();

    let (first, second, edge) = match req.direction {
        Direction::Up => (upper, lower, req.disk_size - 1),
        Direction::Down => (lower, upper, 0),
    };

    for &t in &first {
        head.service(t);
    }
    if to_edge && !first.is_empty() {
        head.sweep_to(edge);
    }
    if !second.is_empty() {
        head.reverse();
    }
    for &t in &second {
        head.service(t);
    }
}
