//! Grid, cell, and position types.
//!
//! The engine treats the grid as a read-only data source; the small mutation
//! surface here (placing values, removing candidates) exists for callers that
//! apply hints and for tests that set up specific candidate states.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BitSet;

/// A (row, col) coordinate on the 9x9 grid, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        debug_assert!(row < 9 && col < 9);
        Position { row, col }
    }
}

/// A single cell: a placed value or a set of remaining candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    value: Option<u8>,
    is_given: bool,
    candidates: BitSet,
}

impl Cell {
    fn empty() -> Self {
        Cell {
            value: None,
            is_given: false,
            candidates: BitSet::full(),
        }
    }

    fn given(value: u8) -> Self {
        Cell {
            value: Some(value),
            is_given: true,
            candidates: BitSet::empty(),
        }
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn is_given(&self) -> bool {
        self.is_given
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn candidates(&self) -> BitSet {
        self.candidates
    }

    /// Remove a candidate digit from this cell.
    pub fn remove_candidate(&mut self, digit: u8) {
        self.candidates.remove(digit);
    }
}

/// Error parsing a puzzle string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("expected 81 characters, got {0}")]
    WrongLength(usize),
    #[error("invalid character {ch:?} at index {index}")]
    InvalidChar { ch: char, index: usize },
}

/// The 9x9 puzzle grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Cell>,
    /// Hash of the givens; stable across solving moves on the same puzzle.
    identity: u64,
}

impl Grid {
    /// An empty grid: all cells unset with full candidate sets.
    pub fn empty() -> Self {
        let mut grid = Grid {
            cells: vec![Cell::empty(); 81],
            identity: 0,
        };
        grid.identity = grid.compute_identity();
        grid
    }

    /// Parse a puzzle from an 81-character string. `0` or `.` marks an empty
    /// cell, `1`..`9` a given.
    pub fn from_string(s: &str) -> Result<Self, GridParseError> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 81 {
            return Err(GridParseError::WrongLength(chars.len()));
        }
        let mut cells = Vec::with_capacity(81);
        for (index, &ch) in chars.iter().enumerate() {
            match ch {
                '0' | '.' => cells.push(Cell::empty()),
                '1'..='9' => cells.push(Cell::given(ch as u8 - b'0')),
                _ => return Err(GridParseError::InvalidChar { ch, index }),
            }
        }
        let mut grid = Grid { cells, identity: 0 };
        grid.identity = grid.compute_identity();
        grid.recalculate_candidates();
        Ok(grid)
    }

    fn compute_identity(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (idx, cell) in self.cells.iter().enumerate() {
            if cell.is_given {
                (idx, cell.value).hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    #[inline]
    fn index(pos: Position) -> usize {
        pos.row * 9 + pos.col
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[Self::index(pos)]
    }

    pub fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        &mut self.cells[Self::index(pos)]
    }

    /// The placed value at `pos`, if any.
    pub fn get(&self, pos: Position) -> Option<u8> {
        self.cell(pos).value
    }

    /// The candidate set at `pos` (empty for placed cells).
    pub fn get_candidates(&self, pos: Position) -> BitSet {
        self.cell(pos).candidates
    }

    /// Place (or clear) a value without validity checks.
    pub fn set_cell_unchecked(&mut self, pos: Position, value: Option<u8>) {
        let cell = self.cell_mut(pos);
        cell.value = value;
        cell.candidates = BitSet::empty();
    }

    /// Recompute every empty cell's candidates from its peers' placed values.
    /// Discards manual candidate removals.
    pub fn recalculate_candidates(&mut self) {
        for row in 0..9 {
            for col in 0..9 {
                let pos = Position::new(row, col);
                if self.get(pos).is_some() {
                    continue;
                }
                let mut cands = BitSet::full();
                for peer in peer_positions(pos) {
                    if let Some(v) = self.get(peer) {
                        cands.remove(v);
                    }
                }
                self.cell_mut(pos).candidates = cands;
            }
        }
    }

    /// All positions without a placed value.
    pub fn empty_positions(&self) -> Vec<Position> {
        (0..81)
            .filter(|&i| self.cells[i].is_empty())
            .map(|i| Position::new(i / 9, i % 9))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.value.is_some())
    }

    /// Number of cells with a placed value.
    pub fn solved_count(&self) -> usize {
        self.cells.iter().filter(|c| c.value.is_some()).count()
    }

    /// Stable identity of the puzzle (derived from the givens).
    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Cheap snapshot fingerprint: changes whenever a cell is solved or a
    /// different puzzle is loaded.
    pub fn fingerprint(&self) -> (usize, u64) {
        (self.solved_count(), self.identity)
    }

    pub fn deep_clone(&self) -> Self {
        self.clone()
    }
}

/// The 20 peer positions of a cell (same row, column, or box).
fn peer_positions(pos: Position) -> Vec<Position> {
    let mut peers = Vec::with_capacity(20);
    for c in 0..9 {
        if c != pos.col {
            peers.push(Position::new(pos.row, c));
        }
    }
    for r in 0..9 {
        if r != pos.row {
            peers.push(Position::new(r, pos.col));
        }
    }
    let box_row = (pos.row / 3) * 3;
    let box_col = (pos.col / 3) * 3;
    for dr in 0..3 {
        for dc in 0..3 {
            let r = box_row + dr;
            let c = box_col + dc;
            if r != pos.row && c != pos.col {
                peers.push(Position::new(r, c));
            }
        }
    }
    peers
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..9 {
            for col in 0..9 {
                match self.get(Position::new(row, col)) {
                    Some(v) => write!(f, "{}", v)?,
                    None => write!(f, ".")?,
                }
                if col == 2 || col == 5 {
                    write!(f, "|")?;
                }
            }
            writeln!(f)?;
            if row == 2 || row == 5 {
                writeln!(f, "---+---+---")?;
            }
        }
        Ok(())
    }
}
