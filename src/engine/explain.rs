//! Finding -> Hint conversion and explanation generation.
//!
//! The strategy modules return `Finding` structs carrying a structural proof;
//! this module converts them to `Hint` with human-readable explanations.

use super::fabric::{idx_to_pos, sector_name};
use super::graph::Polarity;
use super::types::{Hint, HintType, ProofSource, Technique};
use crate::Position;

/// What the engine proved: either place a value or eliminate candidates.
#[derive(Debug, Clone)]
pub enum InferenceResult {
    /// Place a value in a cell
    Placement { cell: usize, value: u8 },
    /// Eliminate candidates from a cell
    Elimination { cell: usize, values: Vec<u8> },
}

/// One derivation chain: literals from the proof's target back to its root.
pub type DerivationChain = Vec<(usize, u8, Polarity)>;

/// The complete disjunction a forcing proof branches over.
#[derive(Debug, Clone)]
pub enum ForcingSource {
    /// All candidates of a cell.
    Cell(usize),
    /// All placements of a digit within a sector.
    Region { sector: usize, digit: u8 },
}

/// Structural evidence justifying a deduction.
#[derive(Debug, Clone)]
pub enum ProofCertificate {
    /// Every branch of a complete disjunction forces the target; one
    /// derivation chain per branch, each ending at that branch's root.
    Forcing {
        source: ForcingSource,
        branches: Vec<DerivationChain>,
    },
    /// The assumed root reaches both polarities of (cell, digit); the two
    /// chains derive each polarity from the root.
    Contradiction {
        root_cell: usize,
        root_digit: u8,
        on_chain: DerivationChain,
        off_chain: DerivationChain,
    },
}

/// Engine-specific explanation data for generating human-readable strings.
#[derive(Debug, Clone)]
pub enum ExplanationData {
    /// All candidates of a cell force the same conclusion.
    CellForcing { cell: usize, branches: usize },
    /// All placements of a digit in a sector force the same conclusion.
    RegionForcing {
        sector: usize,
        digit: u8,
        branches: usize,
    },
    /// An assumption forces both polarities of some candidate.
    Contradiction {
        cell: usize,
        digit: u8,
        conflict_cell: usize,
        conflict_digit: u8,
    },
}

/// A finding from a strategy, ready to be converted to a Hint.
#[derive(Debug, Clone)]
pub struct Finding {
    pub technique: Technique,
    pub inference: InferenceResult,
    pub involved_cells: Vec<usize>,
    pub explanation: ExplanationData,
    pub proof: ProofCertificate,
    pub source: ProofSource,
}

impl Finding {
    /// Convert this Finding into a public Hint.
    pub fn to_hint(&self) -> Hint {
        let hint_type = match &self.inference {
            InferenceResult::Placement { cell, value } => HintType::SetValue {
                pos: idx_to_pos(*cell),
                value: *value,
            },
            InferenceResult::Elimination { cell, values } => HintType::EliminateCandidates {
                pos: idx_to_pos(*cell),
                values: values.clone(),
            },
        };

        let involved_cells: Vec<Position> = self
            .involved_cells
            .iter()
            .map(|&idx| idx_to_pos(idx))
            .collect();

        Hint {
            technique: self.technique,
            hint_type,
            explanation: self.render_explanation(),
            involved_cells,
            source: self.source,
            proof: Some(self.proof.clone()),
        }
    }

    fn render_explanation(&self) -> String {
        match &self.explanation {
            ExplanationData::CellForcing { cell, branches } => {
                let pos = idx_to_pos(*cell);
                format!(
                    "Cell Forcing Chain: all {} candidates of ({}, {}) lead to the same conclusion.",
                    branches,
                    pos.row + 1,
                    pos.col + 1
                )
            }
            ExplanationData::RegionForcing {
                sector,
                digit,
                branches,
            } => {
                format!(
                    "Region Forcing Chain: all {} placements of {} in {} lead to the same conclusion.",
                    branches,
                    digit,
                    sector_name(*sector)
                )
            }
            ExplanationData::Contradiction {
                cell,
                digit,
                conflict_cell,
                conflict_digit,
            } => {
                let pos = idx_to_pos(*cell);
                let conflict = idx_to_pos(*conflict_cell);
                format!(
                    "Assuming {} in ({}, {}) forces ({}, {}) both to be and not to be {}, which is absurd.",
                    digit,
                    pos.row + 1,
                    pos.col + 1,
                    conflict.row + 1,
                    conflict.col + 1,
                    conflict_digit
                )
            }
        }
    }
}

/// Collect the distinct cells a set of derivation chains touches, sorted.
pub fn chain_cells(chains: &[DerivationChain]) -> Vec<usize> {
    let mut cells: Vec<usize> = chains
        .iter()
        .flat_map(|c| c.iter().map(|&(cell, _, _)| cell))
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}
