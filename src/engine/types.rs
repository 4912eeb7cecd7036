use crate::Position;
use serde::{Deserialize, Serialize};

use super::explain::ProofCertificate;

/// Proof strategy that produced a hint (ordered by difficulty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Technique {
    /// A single assumption forces both polarities of some literal.
    NishioForcingChain,
    /// Every candidate of one cell forces the same conclusion.
    CellForcingChain,
    /// Every placement of a value in one region forces the same conclusion.
    RegionForcingChain,
}

impl Technique {
    /// Sudoku Explainer (SE) numerical rating, the community-standard
    /// difficulty scale.
    pub fn se_rating(&self) -> f32 {
        match self {
            Technique::NishioForcingChain => 7.5,
            Technique::CellForcingChain => 8.3,
            Technique::RegionForcingChain => 8.5,
        }
    }
}

impl std::fmt::Display for Technique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Technique::NishioForcingChain => write!(f, "Nishio Forcing Chain"),
            Technique::CellForcingChain => write!(f, "Cell Forcing Chain"),
            Technique::RegionForcingChain => write!(f, "Region Forcing Chain"),
        }
    }
}

/// Which closure family backed a proof.
///
/// `Reduction` proofs come from the precomputed closure-index bitsets: fast,
/// eliminations only. `Abduction` proofs come from full effect sets: slower,
/// but able to prove any common consequence including forced values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofSource {
    Reduction,
    Abduction,
}

/// Type of hint provided
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HintType {
    /// Place this value in this cell
    SetValue { pos: Position, value: u8 },
    /// Remove these candidates from this cell
    EliminateCandidates { pos: Position, values: Vec<u8> },
}

/// A proven deduction, ready to apply to the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hint {
    /// The technique used to find this hint
    pub technique: Technique,
    /// The type of hint
    pub hint_type: HintType,
    /// Explanation of the hint
    pub explanation: String,
    /// Cells involved in the reasoning
    pub involved_cells: Vec<Position>,
    /// Completeness flag: reduction-sourced or abduction-sourced.
    pub source: ProofSource,
    /// Structural proof with derivation chains (not serialized)
    #[serde(skip)]
    pub proof: Option<ProofCertificate>,
}
