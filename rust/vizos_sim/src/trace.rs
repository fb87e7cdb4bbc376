//! Step recording shared by the sub-engines.
//!
//! Each engine defines its own step kind (dispatch, seek, pass, reference)
//! and appends it to a [`Trace`] in execution order. The trace alone is
//! enough to replay a run without re-simulating it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single recorded step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep<K> {
    /// Position of this step in the trace, starting at 0.
    pub seq: usize,
    /// The algorithm-specific payload.
    pub kind: K,
}

/// An append-only, ordered sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace<K> {
    steps: Vec<TraceStep<K>>,
}

impl<K> Default for Trace<K> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<K> Trace<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, kind: K) {
        let seq = self.steps.len();
        self.steps.push(TraceStep { seq, kind });
    }

    /// All steps in execution order.
    pub fn steps(&self) -> &[TraceStep<K>] {
        &self.steps
    }

    /// Iterate over step payloads only.
    pub fn kinds(&self) -> impl Iterator<Item = &K> {
        self.steps.iter().map(|s| &s.kind)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Count steps matching a predicate.
    pub fn count(&self, pred: impl Fn(&K) -> bool) -> usize {
        self.kinds().filter(|k| pred(k)).count()
    }
}

impl<K: fmt::Display> Trace<K> {
    /// Log every step at debug level.
    pub fn dump(&self) {
        for step in &self.steps {
            log::debug!("[{:>4}] {}", step.seq, step.kind);
        }
    }
}

impl<K: fmt::Display> fmt::Display for Trace<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "[{:>4}] {}", step.seq, step.kind)?;
        }
        Ok(())
    }
}
