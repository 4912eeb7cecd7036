//! Hint cache and search control.
//!
//! Proofs found for one snapshot are cached and re-validated against the
//! live grid before reuse; stale entries are dropped, never replayed. The
//! cache is bounded: hitting capacity is a control-flow signal that ends the
//! exhaustive pass early, not an error. Finding and caching all proofs per
//! graph build is cheaper in expectation than rebuilding per query.

use log::trace;

use super::explain::{Finding, InferenceResult};
use super::fabric::idx_to_pos;
use crate::Grid;

/// Snapshot invalidation key: (solved cell count, puzzle identity).
pub type SnapshotKey = (usize, u64);

/// Whether a query drains every available proof or stops at the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Find and cache every proof in one pass (default; amortizes the
    /// graph-build cost across queries).
    FindAll,
    /// Stop after the first proof.
    FindFirst,
}

/// Outcome of one strategy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// At least one proof was emitted.
    Found,
    /// Nothing provable here.
    NotFound,
    /// The sink is saturated; stop producing more.
    StopEarly,
}

impl SearchOutcome {
    /// Combine two pass outcomes, keeping the strongest signal.
    pub fn merge(self, other: SearchOutcome) -> SearchOutcome {
        match (self, other) {
            (SearchOutcome::StopEarly, _) | (_, SearchOutcome::StopEarly) => {
                SearchOutcome::StopEarly
            }
            (SearchOutcome::Found, _) | (_, SearchOutcome::Found) => SearchOutcome::Found,
            _ => SearchOutcome::NotFound,
        }
    }
}

/// Engine tunables.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Maximum number of cached proofs per snapshot.
    pub cache_capacity: usize,
    pub mode: SearchMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_capacity: 64,
            mode: SearchMode::FindAll,
        }
    }
}

/// Bounded collector the strategies emit findings into.
pub struct ProofSink {
    findings: Vec<Finding>,
    capacity: usize,
    mode: SearchMode,
}

impl ProofSink {
    pub fn new(capacity: usize, mode: SearchMode) -> Self {
        ProofSink {
            findings: Vec::new(),
            capacity,
            mode,
        }
    }

    /// Accept a finding. Returns `StopEarly` once the sink is saturated
    /// (capacity reached, or first finding in `FindFirst` mode).
    pub fn push(&mut self, finding: Finding) -> SearchOutcome {
        self.findings.push(finding);
        let saturated = self.findings.len() >= self.capacity
            || matches!(self.mode, SearchMode::FindFirst);
        if saturated {
            SearchOutcome::StopEarly
        } else {
            SearchOutcome::Found
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.findings.len() >= self.capacity
            || (matches!(self.mode, SearchMode::FindFirst) && !self.findings.is_empty())
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Cached proofs from the most recent exhaustive pass.
///
/// Persists across snapshots; entries are validated against the live grid on
/// every read and silently discarded once stale.
pub struct HintCache {
    findings: Vec<Finding>,
    /// Key of the last snapshot that was searched (even if it yielded
    /// nothing), so an empty result is not recomputed for the same state.
    searched: Option<SnapshotKey>,
}

impl HintCache {
    pub fn new() -> Self {
        HintCache {
            findings: Vec::new(),
            searched: None,
        }
    }

    /// Whether an exhaustive pass already ran for this key.
    pub fn searched(&self, key: SnapshotKey) -> bool {
        self.searched == Some(key)
    }

    /// Replace the cache contents with the results of a fresh pass.
    pub fn store(&mut self, key: SnapshotKey, findings: Vec<Finding>) {
        trace!("hint cache: storing {} findings", findings.len());
        self.findings = findings;
        self.searched = Some(key);
    }

    /// Drop entries inconsistent with the live grid, then return the first
    /// survivor. Entries are kept for later queries until they go stale.
    pub fn first_valid(&mut self, grid: &Grid) -> Option<Finding> {
        let before = self.findings.len();
        self.findings.retain(|f| finding_is_live(f, grid));
        let dropped = before - self.findings.len();
        if dropped > 0 {
            trace!("hint cache: dropped {} stale entries", dropped);
        }
        self.findings.first().cloned()
    }

    /// Drop entries inconsistent with the live grid, then return clones of
    /// every survivor.
    pub fn valid(&mut self, grid: &Grid) -> Vec<Finding> {
        self.findings.retain(|f| finding_is_live(f, grid));
        self.findings.clone()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl Default for HintCache {
    fn default() -> Self {
        Self::new()
    }
}

/// A finding is live while its target still matches the grid's candidate
/// state: the cell is unset and every targeted value is still a candidate.
fn finding_is_live(finding: &Finding, grid: &Grid) -> bool {
    match &finding.inference {
        InferenceResult::Placement { cell, value } => {
            let pos = idx_to_pos(*cell);
            grid.get(pos).is_none() && grid.get_candidates(pos).contains(*value)
        }
        InferenceResult::Elimination { cell, values } => {
            let pos = idx_to_pos(*cell);
            grid.get(pos).is_none()
                && values.iter().all(|&v| grid.get_candidates(pos).contains(v))
        }
    }
}
