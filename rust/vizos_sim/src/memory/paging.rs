//! FIFO and LRU page replacement.
//!
//! The resident set is kept in load order: an evicted page is removed from
//! wherever it sits and the incoming page is appended. Victim selection is
//! delegated to a [`Pager`] so both policies share the frame bookkeeping.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::trace::Trace;
use crate::types::PageNo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    Fifo,
    Lru,
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicy::Fifo => write!(f, "FIFO"),
            ReplacementPolicy::Lru => write!(f, "LRU"),
        }
    }
}

/// Chooses which resident page to evict.
trait Pager {
    /// Note a reference to `page` at position `at` in the string.
    fn touch(&mut self, page: PageNo, at: usize);

    /// Index into `resident` of the page to evict. `resident` is non-empty
    /// and in load order.
    fn select_victim(&self, resident: &[PageNo]) -> usize;
}

struct Fifo;

impl Pager for Fifo {
    fn touch(&mut self, _page: PageNo, _at: usize) {}

    fn select_victim(&self, _resident: &[PageNo]) -> usize {
        0
    }
}

#[derive(Default)]
struct Lru {
    last_used: HashMap<PageNo, usize>,
}

impl Pager for Lru {
    fn touch(&mut self, page: PageNo, at: usize) {
        self.last_used.insert(page, at);
    }

    fn select_victim(&self, resident: &[PageNo]) -> usize {
        resident
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| self.last_used.get(*p).copied().unwrap_or(0))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// One reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStep {
    pub page: PageNo,
    pub fault: bool,
    pub evicted: Option<PageNo>,
    /// Resident set after this reference, in load order.
    pub resident: Vec<PageNo>,
}

impl fmt::Display for PageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match (self.fault, self.evicted) {
            (false, _) => "hit".to_string(),
            (true, None) => "fault".to_string(),
            (true, Some(e)) => format!("fault, evict {e}"),
        };
        write!(f, "ref {:<4} {:<16} {:?}", self.page, state, self.resident)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingOutcome {
    pub policy: ReplacementPolicy,
    pub frames: usize,
    pub faults: usize,
    pub hits: usize,
    /// `faults / references`, 0 for an empty string.
    pub fault_rate: f64,
    pub hit_rate: f64,
    /// Final resident set in load order.
    pub resident: Vec<PageNo>,
    pub trace: Trace<PageStep>,
}

impl fmt::Display for PagingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Page Replacement ({}, {} frames)", self.policy, self.frames)?;
        write!(f, "{}", self.trace)?;
        writeln!(
            f,
            "faults: {}  hits: {}  fault rate: {:.2}%",
            self.faults,
            self.hits,
            self.fault_rate * 100.0
        )
    }
}

/// Run `refs` through a frame set of size `frames`.
pub fn replace_pages(
    policy: ReplacementPolicy,
    frames: usize,
    refs: &[PageNo],
) -> Result<PagingOutcome> {
    if frames == 0 {
        return Err(ValidationError::out_of_range("frames", "positive", 0u64));
    }

    let mut pager: Box<dyn Pager> = match policy {
        ReplacementPolicy::Fifo => Box::new(Fifo),
        ReplacementPolicy::Lru => Box::<Lru>::default(),
    };
    let mut resident: Vec<PageNo> = Vec::with_capacity(frames.min(refs.len()));
    let mut trace = Trace::new();
    let mut faults = 0;

    for (at, &page) in refs.iter().enumerate() {
        let fault = !resident.contains(&page);
        let mut evicted = None;

        if fault {
            faults += 1;
            if resident.len() == frames {
                let victim = pager.select_victim(&resident);
                evicted = Some(resident.remove(victim));
            }
            resident.push(page);
            log::trace!("{policy}: ref {page} faults, evicts {evicted:?}");
        }
        pager.touch(page, at);

        trace.record(PageStep {
            page,
            fault,
            evicted,
            resident: resident.clone(),
        });
    }

    let hits = refs.len() - faults;
    let rate = |n: usize| {
        if refs.is_empty() {
            0.0
        } else {
            n as f64 / refs.len() as f64
        }
    };
    log::debug!("{policy}: {faults} faults over {} references", refs.len());

    Ok(PagingOutcome {
        policy,
        frames,
        faults,
        hits,
        fault_rate: rate(faults),
        hit_rate: rate(hits),
        resident,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evictions(out: &PagingOutcome) -> Vec<Option<PageNo>> {
        out.trace.kinds().map(|s| s.evicted).collect()
    }

    #[test]
    fn test_fifo_short_string() {
        let out = replace_pages(ReplacementPolicy::Fifo, 3, &[1, 2, 3, 4, 1, 2, 5]).unwrap();
        // every reference misses: 4 evicts 1, 1 evicts 2, 2 evicts 3, 5 evicts 4
        assert_eq!(out.faults, 7);
        assert_eq!(
            evictions(&out),
            vec![None, None, None, Some(1), Some(2), Some(3), Some(4)]
        );
        assert_eq!(out.resident, vec![1, 2, 5]);
    }

    #[test]
    fn test_lru_hit_refreshes_recency() {
        let out = replace_pages(ReplacementPolicy::Lru, 3, &[1, 2, 3, 1, 2, 4]).unwrap();
        assert_eq!(out.faults, 4);
        assert_eq!(out.hits, 2);
        assert_eq!(out.trace.steps()[5].kind.evicted, Some(3));
        assert_eq!(out.resident, vec![1, 2, 4]);

        let fifo = replace_pages(ReplacementPolicy::Fifo, 3, &[1, 2, 3, 1, 2, 4]).unwrap();
        assert_eq!(fifo.trace.steps()[5].kind.evicted, Some(1));
    }

    #[test]
    fn test_belady_anomaly() {
        let refs = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];
        let three = replace_pages(ReplacementPolicy::Fifo, 3, &refs).unwrap();
        let four = replace_pages(ReplacementPolicy::Fifo, 4, &refs).unwrap();
        assert_eq!(three.faults, 9);
        assert_eq!(four.faults, 10);
    }

    #[test]
    fn test_empty_string() {
        let out = replace_pages(ReplacementPolicy::Lru, 2, &[]).unwrap();
        assert_eq!(out.faults, 0);
        assert_eq!(out.fault_rate, 0.0);
        assert!(out.trace.is_empty());
    }

    #[test]
    fn test_frames_far_beyond_references() {
        let out = replace_pages(ReplacementPolicy::Fifo, usize::MAX / 2, &[1, 2, 1]).unwrap();
        assert_eq!(out.faults, 2);
        assert_eq!(out.resident, vec![1, 2]);
        assert_eq!(out.frames, usize::MAX / 2);
    }

    #[test]
    fn test_zero_frames_is_rejected() {
        let err = replace_pages(ReplacementPolicy::Fifo, 0, &[1]).unwrap_err();
        assert_eq!(err.field(), "frames");
    }
}
