//! CandidateFabric: dual-indexed candidate snapshot built from Grid.
//!
//! Provides O(1) lookups for "which cells in sector S have candidate d?" and
//! "which sectors does cell C belong to?". Every engine component reads only
//! the fabric once a snapshot context exists; the Grid itself is never
//! touched after the build.

use crate::{BitSet, Grid, Position};

/// Sector index convention: 0..8 = rows, 9..17 = columns, 18..26 = boxes.
pub const SECTOR_ROW_BASE: usize = 0;
pub const SECTOR_COL_BASE: usize = 9;
pub const SECTOR_BOX_BASE: usize = 18;

/// Dual-indexed candidate state, built once per snapshot.
pub struct CandidateFabric {
    /// Per-cell candidates (indexed by linear cell index 0..80)
    pub cell_cands: [BitSet; 81],
    /// Placed values (None if empty)
    pub values: [Option<u8>; 81],
    /// sector_digit_cells[sector][digit-1] = bitmask of cell positions within
    /// that sector (bits 0..8) that carry `digit` as a candidate.
    pub sector_digit_cells: [[u16; 9]; 27],
    /// Candidate count per sector per digit
    pub sector_digit_count: [[u8; 9]; 27],
    /// Which 3 sectors each cell belongs to: [row, col, box]
    pub cell_sectors: [[usize; 3]; 81],
    /// Precomputed 20 peers per cell (same row/col/box, excluding self)
    pub peers: [[u8; 20]; 81],
    /// Snapshot fingerprint: (solved cell count, puzzle identity)
    pub fingerprint: (usize, u64),
}

/// Convert (row, col) to linear cell index
#[inline]
pub fn cell_index(row: usize, col: usize) -> usize {
    row * 9 + col
}

/// Convert linear cell index back to (row, col)
#[inline]
pub fn cell_pos(idx: usize) -> (usize, usize) {
    (idx / 9, idx % 9)
}

/// Convert linear cell index to Position
#[inline]
pub fn idx_to_pos(idx: usize) -> Position {
    let (r, c) = cell_pos(idx);
    Position::new(r, c)
}

/// Get the 9 cell indices belonging to a sector
pub fn sector_cells(sector: usize) -> [usize; 9] {
    if sector < SECTOR_COL_BASE {
        let row = sector;
        std::array::from_fn(|col| cell_index(row, col))
    } else if sector < SECTOR_BOX_BASE {
        let col = sector - SECTOR_COL_BASE;
        std::array::from_fn(|row| cell_index(row, col))
    } else {
        let box_idx = sector - SECTOR_BOX_BASE;
        let box_row = (box_idx / 3) * 3;
        let box_col = (box_idx % 3) * 3;
        std::array::from_fn(|i| cell_index(box_row + i / 3, box_col + i % 3))
    }
}

/// Human-readable sector name, 1-based ("Row 1", "Column 4", "Box 9").
pub fn sector_name(sector: usize) -> String {
    if sector < SECTOR_COL_BASE {
        format!("Row {}", sector + 1)
    } else if sector < SECTOR_BOX_BASE {
        format!("Column {}", sector - SECTOR_COL_BASE + 1)
    } else {
        format!("Box {}", sector - SECTOR_BOX_BASE + 1)
    }
}

/// Compute the 20 peers of a cell (same row/col/box, excluding self)
fn compute_peers(idx: usize) -> [u8; 20] {
    let (row, col) = cell_pos(idx);
    let box_row = (row / 3) * 3;
    let box_col = (col / 3) * 3;
    let mut peers = [0u8; 20];
    let mut count = 0;

    for c in 0..9 {
        if c != col {
            peers[count] = cell_index(row, c) as u8;
            count += 1;
        }
    }
    for r in 0..9 {
        if r != row {
            peers[count] = cell_index(r, col) as u8;
            count += 1;
        }
    }
    for dr in 0..3 {
        for dc in 0..3 {
            let r = box_row + dr;
            let c = box_col + dc;
            if r != row && c != col {
                peers[count] = cell_index(r, c) as u8;
                count += 1;
            }
        }
    }
    debug_assert_eq!(count, 20);
    peers
}

/// Precompute which 3 sectors each cell belongs to
fn compute_cell_sectors(idx: usize) -> [usize; 3] {
    let (row, col) = cell_pos(idx);
    let box_idx = (row / 3) * 3 + col / 3;
    [
        SECTOR_ROW_BASE + row,
        SECTOR_COL_BASE + col,
        SECTOR_BOX_BASE + box_idx,
    ]
}

/// Find the position (0..8) of cell `idx` within the given sector.
fn sector_cell_position(sector: usize, idx: usize) -> usize {
    let cells = sector_cells(sector);
    cells
        .iter()
        .position(|&c| c == idx)
        .expect("cell not in sector")
}

impl CandidateFabric {
    /// Build the fabric from a Grid snapshot. Call once per snapshot.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut fab = CandidateFabric {
            cell_cands: [BitSet::empty(); 81],
            values: [None; 81],
            sector_digit_cells: [[0u16; 9]; 27],
            sector_digit_count: [[0u8; 9]; 27],
            cell_sectors: [[0; 3]; 81],
            peers: [[0; 20]; 81],
            fingerprint: grid.fingerprint(),
        };

        // Static topology
        for idx in 0..81 {
            fab.cell_sectors[idx] = compute_cell_sectors(idx);
            fab.peers[idx] = compute_peers(idx);
        }

        for idx in 0..81 {
            let pos = idx_to_pos(idx);
            if let Some(v) = grid.get(pos) {
                fab.values[idx] = Some(v);
                continue;
            }
            let cands = grid.get_candidates(pos);
            fab.cell_cands[idx] = cands;

            let sectors = fab.cell_sectors[idx];
            for d in cands.iter() {
                let di = (d - 1) as usize;
                for &sec in &sectors {
                    let pos_in_sector = sector_cell_position(sec, idx);
                    fab.sector_digit_cells[sec][di] |= 1u16 << pos_in_sector;
                    fab.sector_digit_count[sec][di] += 1;
                }
            }
        }

        fab
    }

    /// Check if two cells see each other (same row, col, or box)
    #[inline]
    pub fn sees(&self, a: usize, b: usize) -> bool {
        self.cell_sectors[a][0] == self.cell_sectors[b][0]
            || self.cell_sectors[a][1] == self.cell_sectors[b][1]
            || self.cell_sectors[a][2] == self.cell_sectors[b][2]
    }

    /// Check if cell has candidate
    #[inline]
    pub fn has_cand(&self, idx: usize, digit: u8) -> bool {
        self.cell_cands[idx].contains(digit)
    }

    /// Number of candidates for a cell
    #[inline]
    pub fn cand_count(&self, idx: usize) -> u32 {
        self.cell_cands[idx].count()
    }

    /// Cells in a sector still carrying `digit`, as linear cell indices.
    pub fn members(&self, sector: usize, digit: u8) -> Vec<usize> {
        let di = (digit - 1) as usize;
        let mask = self.sector_digit_cells[sector][di];
        let cells = sector_cells(sector);
        (0..9)
            .filter(|&i| mask & (1u16 << i) != 0)
            .map(|i| cells[i])
            .collect()
    }

    /// Candidate count for digit in sector
    #[inline]
    pub fn sector_cand_count(&self, sector: usize, digit: u8) -> u8 {
        self.sector_digit_count[sector][(digit - 1) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

    #[test]
    fn test_cell_index_roundtrip() {
        for row in 0..9 {
            for col in 0..9 {
                let idx = cell_index(row, col);
                assert_eq!(cell_pos(idx), (row, col));
            }
        }
    }

    #[test]
    fn test_sector_cells() {
        assert_eq!(sector_cells(0), [0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(sector_cells(9), [0, 9, 18, 27, 36, 45, 54, 63, 72]);
        assert_eq!(sector_cells(18), [0, 1, 2, 9, 10, 11, 18, 19, 20]);
    }

    #[test]
    fn test_sector_names() {
        assert_eq!(sector_name(0), "Row 1");
        assert_eq!(sector_name(12), "Column 4");
        assert_eq!(sector_name(26), "Box 9");
    }

    #[test]
    fn test_members_matches_candidates() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let fab = CandidateFabric::from_grid(&grid);
        for sector in 0..27 {
            for digit in 1..=9u8 {
                let members = fab.members(sector, digit);
                assert_eq!(members.len() as u8, fab.sector_cand_count(sector, digit));
                for cell in members {
                    assert!(fab.has_cand(cell, digit));
                }
            }
        }
    }

    #[test]
    fn test_sees() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let fab = CandidateFabric::from_grid(&grid);
        assert!(fab.sees(0, 5)); // same row
        assert!(fab.sees(0, 9)); // same col
        assert!(fab.sees(0, 10)); // same box
        assert!(!fab.sees(0, 40)); // (0,0) vs (4,4)
    }

    #[test]
    fn test_fingerprint_carried() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let fab = CandidateFabric::from_grid(&grid);
        assert_eq!(fab.fingerprint, grid.fingerprint());
    }
}
