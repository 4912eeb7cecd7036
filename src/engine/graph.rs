//! Literal model and implication graph.
//!
//! One On and one Off node per live (cell, value) pair, stored in a flat
//! arena indexed by the literal's packed encoding. Edges are literal indices,
//! never owned references, so the cyclic implication structure needs no
//! shared ownership. The graph is built once per snapshot and frozen; every
//! later component reads it immutably.

use log::debug;

use super::fabric::CandidateFabric;

/// Number of (cell, value) candidate slots.
pub const CAND_COUNT: usize = 81 * 9;
/// Number of literal slots (two polarities per candidate).
pub const LIT_COUNT: usize = CAND_COUNT * 2;

/// Truth polarity of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Polarity {
    /// "cell holds value"
    On,
    /// "cell does not hold value"
    Off,
}

impl Polarity {
    #[inline]
    pub fn negate(self) -> Polarity {
        match self {
            Polarity::On => Polarity::Off,
            Polarity::Off => Polarity::On,
        }
    }
}

/// An immutable proposition about one candidate: (cell, value, polarity).
///
/// Packed into a single index `(cell * 9 + value - 1) * 2 + polarity` so the
/// node arena and visited sets are flat arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(u16);

impl Literal {
    #[inline]
    pub fn new(cell: usize, value: u8, polarity: Polarity) -> Self {
        debug_assert!(cell < 81);
        debug_assert!((1..=9).contains(&value));
        let cand = cell * 9 + (value - 1) as usize;
        let pol = match polarity {
            Polarity::On => 0,
            Polarity::Off => 1,
        };
        Literal((cand * 2 + pol) as u16)
    }

    #[inline]
    pub fn on(cell: usize, value: u8) -> Self {
        Literal::new(cell, value, Polarity::On)
    }

    #[inline]
    pub fn off(cell: usize, value: u8) -> Self {
        Literal::new(cell, value, Polarity::Off)
    }

    #[inline]
    pub fn cell(self) -> usize {
        self.0 as usize / 2 / 9
    }

    #[inline]
    pub fn value(self) -> u8 {
        (self.0 as usize / 2 % 9) as u8 + 1
    }

    #[inline]
    pub fn polarity(self) -> Polarity {
        if self.0 & 1 == 0 {
            Polarity::On
        } else {
            Polarity::Off
        }
    }

    /// The same proposition with the opposite polarity.
    #[inline]
    pub fn negate(self) -> Literal {
        Literal(self.0 ^ 1)
    }

    /// Packed arena index, 0..LIT_COUNT.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Candidate slot index (cell * 9 + value - 1), shared by both polarities.
    #[inline]
    pub fn candidate(self) -> usize {
        self.0 as usize / 2
    }
}

/// A literal's edges: direct consequences and direct causes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplicationNode {
    children: Vec<Literal>,
    parents: Vec<Literal>,
}

impl ImplicationNode {
    /// Immediate logical consequences, in insertion order, deduplicated.
    pub fn children(&self) -> &[Literal] {
        &self.children
    }

    /// Direct causes, in insertion order.
    pub fn parents(&self) -> &[Literal] {
        &self.parents
    }

    /// The first direct cause recorded, if any.
    pub fn first_parent(&self) -> Option<Literal> {
        self.parents.first().copied()
    }
}

/// The complete implication graph for one puzzle snapshot.
pub struct ImplicationGraph {
    nodes: Vec<Option<ImplicationNode>>,
    edge_count: usize,
}

impl ImplicationGraph {
    /// Build the graph from the fabric's candidate state, wiring the four
    /// direct-implication rules:
    ///
    /// 1. Cell exclusivity: On(c,v) -> Off(c,v') for every other candidate v'.
    /// 2. Peer exclusion: On(c,v) -> Off(p,v) for every peer p carrying v.
    /// 3. Last-candidate forcing: Off(c,v) -> On(c,v') when c is bivalue.
    /// 4. Last-place forcing: Off(c,v) -> On(c2,v) when a sector of c has
    ///    exactly two cells carrying v.
    ///
    /// Cells with no candidates contribute no nodes; that grid is already
    /// contradictory and downstream consumers find no usable graph.
    pub fn build(fab: &CandidateFabric) -> Self {
        let mut graph = ImplicationGraph {
            nodes: vec![None; LIT_COUNT],
            edge_count: 0,
        };

        // Node creation: one On and one Off per live candidate.
        for cell in 0..81 {
            if fab.values[cell].is_some() {
                continue;
            }
            for value in fab.cell_cands[cell].iter() {
                graph.nodes[Literal::on(cell, value).index()] = Some(ImplicationNode::default());
                graph.nodes[Literal::off(cell, value).index()] = Some(ImplicationNode::default());
            }
        }

        // Edge wiring.
        for cell in 0..81 {
            if fab.values[cell].is_some() {
                continue;
            }
            let cands = fab.cell_cands[cell];
            for value in cands.iter() {
                let on = Literal::on(cell, value);
                let off = Literal::off(cell, value);

                // Rule 1: cell exclusivity
                for other in cands.iter() {
                    if other != value {
                        graph.add_edge(on, Literal::off(cell, other));
                    }
                }

                // Rule 2: peer exclusion
                for &peer in &fab.peers[cell] {
                    let peer = peer as usize;
                    if fab.has_cand(peer, value) {
                        graph.add_edge(on, Literal::off(peer, value));
                    }
                }

                // Rule 3: last-candidate forcing
                if cands.count() == 2 {
                    let other = cands.iter().find(|&v| v != value).unwrap();
                    graph.add_edge(off, Literal::on(cell, other));
                }

                // Rule 4: last-place forcing
                for &sector in &fab.cell_sectors[cell] {
                    if fab.sector_cand_count(sector, value) == 2 {
                        let members = fab.members(sector, value);
                        let other = members.iter().copied().find(|&c| c != cell).unwrap();
                        graph.add_edge(off, Literal::on(other, value));
                    }
                }
            }
        }

        debug!(
            "implication graph built: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count
        );
        graph
    }

    /// Add a direct implication `from -> to`. Idempotent: re-adding an
    /// existing child is a no-op.
    fn add_edge(&mut self, from: Literal, to: Literal) {
        // A literal is never its own consequence under the four rules.
        debug_assert_ne!(from, to);
        debug_assert_ne!(from, to.negate());

        let from_node = self.nodes[from.index()]
            .as_mut()
            .expect("edge from a literal without a node");
        if from_node.children.contains(&to) {
            return;
        }
        from_node.children.push(to);

        let to_node = self.nodes[to.index()]
            .as_mut()
            .expect("edge to a literal without a node");
        to_node.parents.push(from);
        self.edge_count += 1;
    }

    /// The node for a literal, if that candidate is still live.
    #[inline]
    pub fn node(&self, lit: Literal) -> Option<&ImplicationNode> {
        self.nodes[lit.index()].as_ref()
    }

    /// Whether the literal's candidate is present in this snapshot.
    #[inline]
    pub fn contains(&self, lit: Literal) -> bool {
        self.nodes[lit.index()].is_some()
    }

    /// Every closure root: the On literal of each remaining candidate.
    pub fn roots(&self) -> impl Iterator<Item = Literal> + '_ {
        (0..CAND_COUNT).filter_map(move |cand| {
            let lit = Literal((cand * 2) as u16);
            self.nodes[lit.index()].as_ref().map(|_| lit)
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
