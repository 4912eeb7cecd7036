//! Effect-Set cache: lazy full closures per literal.
//!
//! Where the closure index's polarity-blind visited discipline truncates at
//! the first contradiction, an effect set is the complete polarity-aware
//! closure of one On literal: every reachable literal of both polarities,
//! all values. Computed on first request and cached for the snapshot's
//! lifetime; each literal's full closure is computed at most once.

use std::collections::{HashMap, VecDeque};

use log::trace;

use super::closure::derive_chain;
use super::explain::DerivationChain;
use super::graph::{ImplicationGraph, Literal, Polarity, CAND_COUNT};

/// Full recursive closure of one On(cell, value) literal.
#[derive(Debug, Clone)]
pub struct EffectSet {
    root: Literal,
    /// on[v-1]: cells whose literal (cell, v, On) is reachable.
    pub on: [u128; 9],
    /// off[v-1]: cells whose literal (cell, v, Off) is reachable.
    pub off: [u128; 9],
    first_parent: HashMap<Literal, Literal>,
}

impl EffectSet {
    fn compute(graph: &ImplicationGraph, root: Literal) -> Self {
        let mut set = EffectSet {
            root,
            on: [0; 9],
            off: [0; 9],
            first_parent: HashMap::new(),
        };
        let mut queue: VecDeque<Literal> = VecDeque::new();
        queue.push_back(root);

        while let Some(lit) = queue.pop_front() {
            let di = (lit.value() - 1) as usize;
            let bit = 1u128 << lit.cell();
            let seen = match lit.polarity() {
                Polarity::On => &mut set.on[di],
                Polarity::Off => &mut set.off[di],
            };
            if *seen & bit != 0 {
                continue;
            }
            *seen |= bit;
            if let Some(node) = graph.node(lit) {
                for &child in node.children() {
                    if child != root && !set.first_parent.contains_key(&child) {
                        set.first_parent.insert(child, lit);
                    }
                    queue.push_back(child);
                }
            }
        }
        set
    }

    pub fn root(&self) -> Literal {
        self.root
    }

    /// Whether the closure reaches `lit`.
    pub fn reaches(&self, lit: Literal) -> bool {
        let di = (lit.value() - 1) as usize;
        let bit = 1u128 << lit.cell();
        match lit.polarity() {
            Polarity::On => self.on[di] & bit != 0,
            Polarity::Off => self.off[di] & bit != 0,
        }
    }

    /// Derivation chain from `target` back to the root, inclusive.
    pub fn derivation(&self, target: Literal) -> Option<DerivationChain> {
        derive_chain(self.root, target, &self.first_parent)
    }
}

/// Per-snapshot cache of effect sets, keyed by candidate slot.
pub struct EffectCache {
    sets: Vec<Option<Box<EffectSet>>>,
}

impl EffectCache {
    pub fn new() -> Self {
        EffectCache {
            sets: (0..CAND_COUNT).map(|_| None).collect(),
        }
    }

    /// The full closure of On(cell, value), computing it on first request.
    pub fn effects(&mut self, graph: &ImplicationGraph, cell: usize, value: u8) -> &EffectSet {
        let root = Literal::on(cell, value);
        let slot = root.candidate();
        if self.sets[slot].is_none() {
            trace!("computing effect set for On({}, {})", cell, value);
            self.sets[slot] = Some(Box::new(EffectSet::compute(graph, root)));
        }
        self.sets[slot].as_ref().unwrap()
    }

    /// Number of effect sets computed so far.
    pub fn len(&self) -> usize {
        self.sets.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EffectCache {
    fn default() -> Self {
        Self::new()
    }
}
