//! Forcing-chain engine: implication graph, closures, and proof strategies.
//!
//! The engine treats each grid snapshot as immutable. On the first query for
//! a snapshot it builds the candidate fabric, wires the implication graph,
//! scans every closure root, runs all strategies exhaustively, and caches the
//! resulting proofs. Later queries against the same snapshot key are served
//! from the cache after re-validation against the live grid.
//!
//! Strategy order per snapshot: contradictions, then cell and region
//! reductions (closure-index bitsets, eliminations only), then cell and
//! region abductions (full effect sets, any consequence) as a fallback when
//! nothing cheaper was provable.

mod abduct;
mod cache;
mod closure;
mod contradiction;
mod effects;
mod explain;
mod fabric;
mod graph;
mod reduce;
mod types;

use log::debug;

use cache::{HintCache, ProofSink, SnapshotKey};
use closure::ClosureIndex;
use effects::EffectCache;
use explain::Finding;
use fabric::CandidateFabric;
use graph::ImplicationGraph;

pub use cache::{EngineConfig, SearchMode};
pub use explain::{DerivationChain, ForcingSource, ProofCertificate};
pub use graph::Polarity;
pub use types::{Hint, HintType, ProofSource, Technique};

use crate::Grid;

/// Everything derived from one grid snapshot, built together and discarded
/// together when the snapshot key changes.
struct SnapshotContext {
    key: SnapshotKey,
    fabric: CandidateFabric,
    graph: ImplicationGraph,
    closures: ClosureIndex,
    effects: EffectCache,
}

impl SnapshotContext {
    fn build(grid: &Grid) -> Self {
        let fabric = CandidateFabric::from_grid(grid);
        let graph = ImplicationGraph::build(&fabric);
        let closures = ClosureIndex::scan(&graph);
        SnapshotContext {
            key: fabric.fingerprint,
            fabric,
            graph,
            closures,
            effects: EffectCache::new(),
        }
    }
}

/// The public entry point: proves forced eliminations and placements for a
/// grid through exhaustive case analysis over the implication graph.
pub struct ChainEngine {
    config: EngineConfig,
    cache: HintCache,
    context: Option<SnapshotContext>,
}

impl ChainEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        ChainEngine {
            config,
            cache: HintCache::new(),
            context: None,
        }
    }

    /// The first provable deduction for this grid, if any.
    ///
    /// Cached proofs are re-validated against the live grid; entries that
    /// went stale through other deductions are dropped, never returned.
    pub fn hint(&mut self, grid: &Grid) -> Option<Hint> {
        self.ensure_searched(grid);
        self.cache.first_valid(grid).map(|f| f.to_hint())
    }

    /// Every currently valid proof for this grid, in discovery order.
    pub fn find_all(&mut self, grid: &Grid) -> Vec<Hint> {
        self.ensure_searched(grid);
        self.cache.valid(grid).iter().map(Finding::to_hint).collect()
    }

    /// Run the exhaustive pass for this snapshot unless the cache already
    /// holds its results.
    fn ensure_searched(&mut self, grid: &Grid) {
        let key = grid.fingerprint();
        if self.cache.searched(key) {
            return;
        }

        let rebuild = match &self.context {
            Some(ctx) => ctx.key != key,
            None => true,
        };
        if rebuild {
            debug!("building snapshot context for key {:?}", key);
            self.context = Some(SnapshotContext::build(grid));
        }
        let ctx = self.context.as_mut().expect("context built above");

        let mut sink = ProofSink::new(self.config.cache_capacity, self.config.mode);
        run_strategies(ctx, &mut sink);
        self.cache.store(key, sink.into_findings());
    }
}

impl Default for ChainEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the strategy passes in difficulty order, stopping once the sink is
/// saturated. Abduction only runs when the cheaper passes proved nothing.
fn run_strategies(ctx: &mut SnapshotContext, sink: &mut ProofSink) {
    use cache::SearchOutcome::{NotFound, StopEarly};

    let SnapshotContext {
        fabric,
        graph,
        closures,
        effects,
        ..
    } = ctx;

    let mut outcome = contradiction::find_contradictions(fabric, closures, sink);
    if outcome == StopEarly {
        return;
    }
    outcome = outcome.merge(reduce::find_cell_reductions(fabric, closures, sink));
    if outcome == StopEarly {
        return;
    }
    outcome = outcome.merge(reduce::find_region_reductions(fabric, closures, sink));
    if outcome != NotFound {
        return;
    }

    if abduct::find_cell_abductions(fabric, graph, effects, sink) == StopEarly {
        return;
    }
    abduct::find_region_abductions(fabric, graph, effects, sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::graph::tests::grid_with_candidates;
    use crate::Position;

    /// Row 0 cells 0, 4, 8 all bivalue {4, 8}: every assumption forces a
    /// contradiction.
    fn contradiction_grid() -> Grid {
        grid_with_candidates(&[(0, &[4, 8]), (4, &[4, 8]), (8, &[4, 8])], 1)
    }

    /// Cell 0 {2,5} and row 0's two 5-cells both force 5 off cell 10.
    fn reduction_grid() -> Grid {
        grid_with_candidates(&[(0, &[2, 5]), (2, &[3, 5]), (10, &[4, 5])], 1)
    }

    #[test]
    fn test_contradiction_hint_end_to_end() {
        let grid = contradiction_grid();
        let mut engine = ChainEngine::new();

        let hint = engine.hint(&grid).expect("contradiction grid yields a hint");
        assert_eq!(hint.technique, Technique::NishioForcingChain);
        assert_eq!(hint.source, ProofSource::Reduction);
        assert!(matches!(hint.hint_type, HintType::EliminateCandidates { .. }));
        assert!(matches!(
            hint.proof,
            Some(ProofCertificate::Contradiction { .. })
        ));
        assert!(!hint.explanation.is_empty());
        assert!(!hint.involved_cells.is_empty());
    }

    #[test]
    fn test_reduction_hint_end_to_end() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::new();

        let hint = engine.hint(&grid).expect("reduction grid yields a hint");
        assert_eq!(hint.technique, Technique::CellForcingChain);
        match &hint.hint_type {
            HintType::EliminateCandidates { pos, values } => {
                assert_eq!(*pos, Position::new(1, 1));
                assert_eq!(values, &vec![5]);
            }
            other => panic!("expected elimination, got {:?}", other),
        }
    }

    #[test]
    fn test_abduction_skipped_when_reduction_succeeds() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::new();
        engine.hint(&grid);

        let ctx = engine.context.as_ref().unwrap();
        assert!(ctx.effects.is_empty(), "effect sets computed needlessly");
    }

    #[test]
    fn test_abduction_runs_as_fallback() {
        // A lone bivalue cell proves nothing anywhere, so the engine falls
        // through to the abduction passes before giving up.
        let grid = grid_with_candidates(&[(0, &[3, 7])], 1);
        let mut engine = ChainEngine::new();

        assert!(engine.hint(&grid).is_none());
        let ctx = engine.context.as_ref().unwrap();
        assert!(!ctx.effects.is_empty(), "abduction pass never ran");
    }

    #[test]
    fn test_snapshot_searched_once() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::new();

        let first = engine.hint(&grid).unwrap();
        assert!(engine.cache.searched(grid.fingerprint()));
        let cached = engine.cache.len();

        // Same snapshot again: served from the cache, not recomputed.
        let second = engine.hint(&grid).unwrap();
        assert_eq!(engine.cache.len(), cached);
        assert_eq!(first.explanation, second.explanation);
    }

    #[test]
    fn test_stale_findings_not_replayed() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::new();
        assert!(engine.hint(&grid).is_some());

        // Apply the elimination by hand. The snapshot key is unchanged, so
        // the pass does not rerun; every cached proof targets the removed
        // candidate and must be dropped.
        let mut later = grid.clone();
        later.cell_mut(Position::new(1, 1)).remove_candidate(5);
        assert!(engine.hint(&later).is_none());
        assert!(engine.cache.is_empty());
    }

    #[test]
    fn test_new_snapshot_key_triggers_rescan() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::new();
        engine.hint(&grid);

        // Placing a value changes the solved count, hence the key.
        let mut later = grid.clone();
        later.set_cell_unchecked(Position::new(4, 4), Some(1));
        let rescanned = engine.hint(&later);
        assert!(engine.cache.searched(later.fingerprint()));

        let fresh = ChainEngine::new().hint(&later);
        match (rescanned, fresh) {
            (Some(a), Some(b)) => {
                assert_eq!(a.technique, b.technique);
                assert_eq!(a.explanation, b.explanation);
            }
            (None, None) => {}
            other => panic!("rescan disagrees with fresh engine: {:?}", other),
        }
    }

    #[test]
    fn test_find_first_caches_single_proof() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::with_config(EngineConfig {
            mode: SearchMode::FindFirst,
            ..EngineConfig::default()
        });

        assert!(engine.hint(&grid).is_some());
        assert_eq!(engine.cache.len(), 1);
    }

    #[test]
    fn test_cache_capacity_bounds_pass() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::with_config(EngineConfig {
            cache_capacity: 2,
            ..EngineConfig::default()
        });

        assert!(engine.hint(&grid).is_some());
        assert_eq!(engine.cache.len(), 2);
    }

    #[test]
    fn test_find_all_returns_every_valid_proof() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::new();

        let hints = engine.find_all(&grid);
        assert!(!hints.is_empty());
        for hint in &hints {
            assert!(matches!(
                hint.hint_type,
                HintType::EliminateCandidates { .. }
            ));
        }
    }

    #[test]
    fn test_solved_grid_yields_nothing() {
        let mut grid = Grid::empty();
        for idx in 0..81 {
            grid.set_cell_unchecked(fabric::idx_to_pos(idx), Some(1));
        }
        let mut engine = ChainEngine::new();
        assert!(engine.hint(&grid).is_none());
        assert!(engine.find_all(&grid).is_empty());
    }

    #[test]
    fn test_hint_serde_round_trip() {
        let grid = reduction_grid();
        let mut engine = ChainEngine::new();
        let hint = engine.hint(&grid).unwrap();

        let json = serde_json::to_string(&hint).unwrap();
        let back: Hint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.technique, hint.technique);
        assert_eq!(back.explanation, hint.explanation);
        assert_eq!(back.involved_cells, hint.involved_cells);
        // Proofs are engine-internal and not serialized.
        assert!(back.proof.is_none());
    }
}
