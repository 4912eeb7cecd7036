//! Basic example: prove forcing-chain deductions for a puzzle

use sudoku_chains::{ChainEngine, Grid, HintType};

fn main() {
    env_logger::init();

    let puzzle_string =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    let grid = Grid::from_string(puzzle_string).expect("valid puzzle string");

    println!("Puzzle:");
    println!("{}", grid);
    println!("Solved cells: {}", grid.solved_count());

    let mut engine = ChainEngine::new();

    // First provable deduction
    if let Some(hint) = engine.hint(&grid) {
        println!("\nFirst hint:");
        println!("Technique: {} (SE {})", hint.technique, hint.technique.se_rating());
        println!("Explanation: {}", hint.explanation);
        match &hint.hint_type {
            HintType::SetValue { pos, value } => {
                println!("Place {} at ({}, {})", value, pos.row + 1, pos.col + 1);
            }
            HintType::EliminateCandidates { pos, values } => {
                println!(
                    "Eliminate {:?} from ({}, {})",
                    values,
                    pos.row + 1,
                    pos.col + 1
                );
            }
        }
    } else {
        println!("\nNo forcing-chain deduction available for this snapshot.");
    }

    // Everything provable for this snapshot
    let hints = engine.find_all(&grid);
    println!("\nTotal proofs for this snapshot: {}", hints.len());
    for hint in hints.iter().take(5) {
        println!("  [{}] {}", hint.technique, hint.explanation);
    }
}
