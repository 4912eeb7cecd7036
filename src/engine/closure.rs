//! Closure Index: one-pass transitive closure over every root literal.
//!
//! For each root (the On literal of every remaining candidate) a single
//! breadth-first walk populates per-value reachability bitsets and the global
//! contradiction list. The visited marker is keyed by (value, cell)
//! irrespective of polarity: a repeat visit whose opposite polarity was
//! already recorded means the root forces both "cell is value" and "cell is
//! not value". The scan is deliberately exhaustive; rebuilding the graph
//! costs far more than finishing it.

use std::collections::{HashMap, VecDeque};

use log::debug;

use super::explain::DerivationChain;
use super::graph::{ImplicationGraph, Literal, Polarity, LIT_COUNT};

/// Reachability of one closure root, as 81-bit cell sets per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureRecord {
    root: Literal,
    /// reachable_on[v-1]: cells whose literal (cell, v, On) is reachable.
    pub reachable_on: [u128; 9],
    /// reachable_off[v-1]: cells whose literal (cell, v, Off) is reachable.
    pub reachable_off: [u128; 9],
    /// First parent through which each literal was reached in this walk.
    first_parent: HashMap<Literal, Literal>,
}

impl ClosureRecord {
    fn new(root: Literal) -> Self {
        ClosureRecord {
            root,
            reachable_on: [0; 9],
            reachable_off: [0; 9],
            first_parent: HashMap::new(),
        }
    }

    pub fn root(&self) -> Literal {
        self.root
    }

    /// Derivation chain from `target` back to this record's root, inclusive.
    /// Returns None if the walk never reached `target`.
    pub fn derivation(&self, target: Literal) -> Option<DerivationChain> {
        derive_chain(self.root, target, &self.first_parent)
    }
}

/// Walk first-parent links from `target` back to `root`.
///
/// The link map is a forest rooted at `root` (each literal's first parent was
/// recorded strictly earlier in the walk), so this terminates.
pub(super) fn derive_chain(
    root: Literal,
    target: Literal,
    first_parent: &HashMap<Literal, Literal>,
) -> Option<DerivationChain> {
    let mut chain: DerivationChain = Vec::new();
    let mut lit = target;
    loop {
        chain.push((lit.cell(), lit.value(), lit.polarity()));
        if lit == root {
            return Some(chain);
        }
        lit = *first_parent.get(&lit)?;
        debug_assert!(chain.len() <= LIT_COUNT, "first-parent walk cycled");
    }
}

/// A root whose closure reached both polarities of (cell, value).
#[derive(Debug, Clone)]
pub struct Contradiction {
    pub root: Literal,
    pub cell: usize,
    pub value: u8,
    /// Chain deriving On(cell, value) from the root.
    pub on_chain: DerivationChain,
    /// Chain deriving Off(cell, value) from the root.
    pub off_chain: DerivationChain,
}

/// Per-root closure records plus the contradiction list, produced in a
/// single pass over the whole graph.
pub struct ClosureIndex {
    records: HashMap<usize, ClosureRecord>,
    contradictions: Vec<Contradiction>,
}

impl ClosureIndex {
    /// Walk every root once and record reachability and contradictions.
    pub fn scan(graph: &ImplicationGraph) -> Self {
        let mut records = HashMap::new();
        let mut contradictions = Vec::new();

        for root in graph.roots() {
            let record = walk_root(graph, root, &mut contradictions);
            records.insert(root.candidate(), record);
        }

        debug!(
            "closure scan: {} roots, {} contradictions",
            records.len(),
            contradictions.len()
        );
        ClosureIndex {
            records,
            contradictions,
        }
    }

    /// The record for root On(cell, value), if that candidate is live.
    pub fn record(&self, cell: usize, value: u8) -> Option<&ClosureRecord> {
        self.records.get(&Literal::on(cell, value).candidate())
    }

    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }
}

fn walk_root(
    graph: &ImplicationGraph,
    root: Literal,
    contradictions: &mut Vec<Contradiction>,
) -> ClosureRecord {
    let mut record = ClosureRecord::new(root);
    // Visited marker keyed by (value, cell), polarity-blind.
    let mut visited: [u128; 9] = [0; 9];
    let mut queue: VecDeque<Literal> = VecDeque::new();
    queue.push_back(root);

    while let Some(lit) = queue.pop_front() {
        let di = (lit.value() - 1) as usize;
        let bit = 1u128 << lit.cell();

        if visited[di] & bit == 0 {
            // First visit of this (value, cell) key: record the literal's own
            // polarity and expand its children.
            visited[di] |= bit;
            match lit.polarity() {
                Polarity::On => record.reachable_on[di] |= bit,
                Polarity::Off => record.reachable_off[di] |= bit,
            }
            if let Some(node) = graph.node(lit) {
                for &child in node.children() {
                    if child != root && !record.first_parent.contains_key(&child) {
                        record.first_parent.insert(child, lit);
                    }
                    queue.push_back(child);
                }
            }
            continue;
        }

        // Repeat visit: if the opposite polarity is already recorded and this
        // one is not, the root reaches both polarities of (cell, value).
        let (own, opposite) = match lit.polarity() {
            Polarity::On => (&mut record.reachable_on[di], record.reachable_off[di]),
            Polarity::Off => (&mut record.reachable_off[di], record.reachable_on[di]),
        };
        if opposite & bit != 0 && *own & bit == 0 {
            *own |= bit;
            let cell = lit.cell();
            let value = lit.value();
            let on_chain = derive_chain(root, Literal::on(cell, value), &record.first_parent)
                .expect("contradiction On side has no derivation");
            let off_chain = derive_chain(root, Literal::off(cell, value), &record.first_parent)
                .expect("contradiction Off side has no derivation");
            contradictions.push(Contradiction {
                root,
                cell,
                value,
                on_chain,
                off_chain,
            });
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fabric::CandidateFabric;
    use super::super::graph::tests::grid_with_candidates;
    use crate::Grid;
    use std::collections::HashSet;

    const PUZZLE: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

    /// Independent reimplementation of the scan semantics using hash-based
    /// bookkeeping instead of bitsets, for the soundness check.
    fn naive_closure(
        graph: &ImplicationGraph,
        root: Literal,
    ) -> (HashSet<(usize, u8)>, HashSet<(usize, u8)>) {
        let mut on = HashSet::new();
        let mut off = HashSet::new();
        let mut visited: HashSet<(u8, usize)> = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(root);
        while let Some(lit) = queue.pop_front() {
            let key = (lit.value(), lit.cell());
            if visited.insert(key) {
                match lit.polarity() {
                    Polarity::On => on.insert((lit.cell(), lit.value())),
                    Polarity::Off => off.insert((lit.cell(), lit.value())),
                };
                if let Some(node) = graph.node(lit) {
                    for &child in node.children() {
                        queue.push_back(child);
                    }
                }
            } else {
                let (own, opposite) = match lit.polarity() {
                    Polarity::On => (&mut on, &off),
                    Polarity::Off => (&mut off, &on),
                };
                if opposite.contains(&(lit.cell(), lit.value())) {
                    own.insert((lit.cell(), lit.value()));
                }
            }
        }
        (on, off)
    }

    fn bitsets_as_pairs(record: &ClosureRecord) -> (HashSet<(usize, u8)>, HashSet<(usize, u8)>) {
        let mut on = HashSet::new();
        let mut off = HashSet::new();
        for di in 0..9 {
            for cell in 0..81 {
                if record.reachable_on[di] & (1u128 << cell) != 0 {
                    on.insert((cell, di as u8 + 1));
                }
                if record.reachable_off[di] & (1u128 << cell) != 0 {
                    off.insert((cell, di as u8 + 1));
                }
            }
        }
        (on, off)
    }

    #[test]
    fn test_closure_soundness_against_naive_walk() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let fab = CandidateFabric::from_grid(&grid);
        let graph = ImplicationGraph::build(&fab);
        let index = ClosureIndex::scan(&graph);

        for root in graph.roots() {
            let record = index.record(root.cell(), root.value()).unwrap();
            let (fast_on, fast_off) = bitsets_as_pairs(record);
            let (naive_on, naive_off) = naive_closure(&graph, root);
            assert_eq!(fast_on, naive_on, "root {:?}", root);
            assert_eq!(fast_off, naive_off, "root {:?}", root);
        }
    }

    #[test]
    fn test_scenario1_bivalue_reachability() {
        // Cell 0 with candidates exactly {3, 7}: asserting On(0,3) must make
        // Off(0,7) a direct child and reachable.
        let grid = grid_with_candidates(&[(0, &[3, 7])], 1);
        let fab = CandidateFabric::from_grid(&grid);
        let graph = ImplicationGraph::build(&fab);
        let index = ClosureIndex::scan(&graph);

        let node = graph.node(Literal::on(0, 3)).unwrap();
        assert!(node.children().contains(&Literal::off(0, 7)));

        let record = index.record(0, 3).unwrap();
        assert!(record.reachable_off[6] & 1 != 0, "Off(0,7) not reachable");
    }

    /// Builds the two-path contradiction snapshot: On(X,4) reaches On(Z,8)
    /// through Z's bivalue cell and Off(Z,8) through W's.
    fn contradiction_grid() -> Grid {
        // Row 0: X = cell 0, W = cell 4, Z = cell 8, all bivalue {4, 8}.
        grid_with_candidates(&[(0, &[4, 8]), (4, &[4, 8]), (8, &[4, 8])], 1)
    }

    #[test]
    fn test_scenario3_contradiction_detected() {
        let grid = contradiction_grid();
        let fab = CandidateFabric::from_grid(&grid);
        let graph = ImplicationGraph::build(&fab);
        let index = ClosureIndex::scan(&graph);

        let found = index
            .contradictions()
            .iter()
            .any(|c| c.root == Literal::on(0, 4) && c.cell == 8 && c.value == 8);
        assert!(found, "expected contradiction (On(0,4), cell 8, value 8)");
    }

    #[test]
    fn test_contradiction_chains_terminate_at_root() {
        let grid = contradiction_grid();
        let fab = CandidateFabric::from_grid(&grid);
        let graph = ImplicationGraph::build(&fab);
        let index = ClosureIndex::scan(&graph);

        assert!(!index.contradictions().is_empty());
        for c in index.contradictions() {
            let root = (c.root.cell(), c.root.value(), Polarity::On);
            let on_last = *c.on_chain.last().unwrap();
            let off_last = *c.off_chain.last().unwrap();
            assert_eq!(on_last, root, "On chain does not end at root");
            assert_eq!(off_last, root, "Off chain does not end at root");
            assert_eq!(c.on_chain[0], (c.cell, c.value, Polarity::On));
            assert_eq!(c.off_chain[0], (c.cell, c.value, Polarity::Off));
            // Consecutive chain entries must be direct graph edges.
            for pair in c.on_chain.windows(2) {
                let (child, parent) = (pair[0], pair[1]);
                let parent_lit = Literal::new(parent.0, parent.1, parent.2);
                let child_lit = Literal::new(child.0, child.1, child.2);
                let node = graph.node(parent_lit).expect("parent missing");
                assert!(node.children().contains(&child_lit), "missing link");
            }
        }
    }

    #[test]
    fn test_idempotence_across_rebuild() {
        let grid = Grid::from_string(PUZZLE).unwrap();

        let fab1 = CandidateFabric::from_grid(&grid);
        let graph1 = ImplicationGraph::build(&fab1);
        let index1 = ClosureIndex::scan(&graph1);

        let fab2 = CandidateFabric::from_grid(&grid);
        let graph2 = ImplicationGraph::build(&fab2);
        let index2 = ClosureIndex::scan(&graph2);

        for root in graph1.roots() {
            let r1 = index1.record(root.cell(), root.value()).unwrap();
            let r2 = index2.record(root.cell(), root.value()).unwrap();
            assert_eq!(r1, r2);
        }
        assert_eq!(
            index1.contradictions().len(),
            index2.contradictions().len()
        );
    }
}
