//! Forcing-chain implication-graph engine for Sudoku.
//!
//! Builds a literal-level implication graph from the current candidate state,
//! computes transitive closures over it, and proves forced eliminations and
//! placements through exhaustive case analysis: contradictions, cell/region
//! reductions (fast, elimination-only), and cell/region abductions (thorough,
//! any consequence). No search, no backtracking.

mod bitset;
mod grid;
pub mod engine;

pub use bitset::BitSet;
pub use engine::{ChainEngine, EngineConfig, Hint, HintType, ProofSource, SearchMode, Technique};
pub use grid::{Cell, Grid, GridParseError, Position};
