//! Reducer: cell and region reduction from the closure index.
//!
//! Both flavors intersect precomputed `reachable_off` bitsets across every
//! branch of a complete disjunction; no graph walking happens at query time.
//! A surviving bit is a proven elimination: whichever assumption holds, the
//! victim candidate is forced off.

use super::cache::{ProofSink, SearchOutcome};
use super::closure::{ClosureIndex, ClosureRecord};
use super::explain::{
    chain_cells, DerivationChain, ExplanationData, Finding, ForcingSource, InferenceResult,
    ProofCertificate,
};
use super::fabric::CandidateFabric;
use super::graph::Literal;
use super::types::{ProofSource, Technique};

/// Cell reduction: every candidate of one cell forces the same elimination.
pub fn find_cell_reductions(
    fab: &CandidateFabric,
    index: &ClosureIndex,
    sink: &mut ProofSink,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::NotFound;

    for cell in 0..81 {
        if fab.values[cell].is_some() || fab.cand_count(cell) < 2 {
            continue;
        }
        let cands: Vec<u8> = fab.cell_cands[cell].iter().collect();
        let records: Vec<&ClosureRecord> = cands
            .iter()
            .map(|&v| {
                index
                    .record(cell, v)
                    .expect("live candidate without closure record")
            })
            .collect();

        for value in 1..=9u8 {
            let di = (value - 1) as usize;
            let mut intersection = records[0].reachable_off[di];
            for record in &records[1..] {
                intersection &= record.reachable_off[di];
                if intersection == 0 {
                    break;
                }
            }
            if intersection == 0 {
                continue;
            }

            for victim in survivors(fab, intersection, value) {
                let branches: Vec<DerivationChain> = records
                    .iter()
                    .map(|r| {
                        r.derivation(Literal::off(victim, value))
                            .expect("intersection bit without derivation")
                    })
                    .collect();
                let finding = elimination_finding(
                    Technique::CellForcingChain,
                    victim,
                    value,
                    ForcingSource::Cell(cell),
                    ExplanationData::CellForcing {
                        cell,
                        branches: cands.len(),
                    },
                    branches,
                );
                if sink.push(finding) == SearchOutcome::StopEarly {
                    return SearchOutcome::StopEarly;
                }
                outcome = SearchOutcome::Found;
            }
        }
    }
    outcome
}

/// Region reduction: every placement of a value in one region forces the
/// same elimination.
pub fn find_region_reductions(
    fab: &CandidateFabric,
    index: &ClosureIndex,
    sink: &mut ProofSink,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::NotFound;

    for sector in 0..27 {
        for digit in 1..=9u8 {
            let members = fab.members(sector, digit);
            if members.len() < 2 {
                continue;
            }
            let records: Vec<&ClosureRecord> = members
                .iter()
                .map(|&c| {
                    index
                        .record(c, digit)
                        .expect("live candidate without closure record")
                })
                .collect();

            for value in 1..=9u8 {
                let di = (value - 1) as usize;
                let mut intersection = records[0].reachable_off[di];
                for record in &records[1..] {
                    intersection &= record.reachable_off[di];
                    if intersection == 0 {
                        break;
                    }
                }
                if intersection == 0 {
                    continue;
                }

                for victim in survivors(fab, intersection, value) {
                    let branches: Vec<DerivationChain> = records
                        .iter()
                        .map(|r| {
                            r.derivation(Literal::off(victim, value))
                                .expect("intersection bit without derivation")
                        })
                        .collect();
                    let finding = elimination_finding(
                        Technique::RegionForcingChain,
                        victim,
                        value,
                        ForcingSource::Region { sector, digit },
                        ExplanationData::RegionForcing {
                            sector,
                            digit,
                            branches: members.len(),
                        },
                        branches,
                    );
                    if sink.push(finding) == SearchOutcome::StopEarly {
                        return SearchOutcome::StopEarly;
                    }
                    outcome = SearchOutcome::Found;
                }
            }
        }
    }
    outcome
}

/// Cells of an intersection whose candidate bit is still live. Defends
/// against closures that went stale through another deduction.
fn survivors(fab: &CandidateFabric, intersection: u128, value: u8) -> Vec<usize> {
    (0..81)
        .filter(|&cell| intersection & (1u128 << cell) != 0 && fab.has_cand(cell, value))
        .collect()
}

fn elimination_finding(
    technique: Technique,
    victim: usize,
    value: u8,
    source: ForcingSource,
    explanation: ExplanationData,
    branches: Vec<DerivationChain>,
) -> Finding {
    let mut involved = chain_cells(&branches);
    if !involved.contains(&victim) {
        involved.push(victim);
        involved.sort_unstable();
    }
    Finding {
        technique,
        inference: InferenceResult::Elimination {
            cell: victim,
            values: vec![value],
        },
        involved_cells: involved,
        explanation,
        proof: ProofCertificate::Forcing { source, branches },
        source: ProofSource::Reduction,
    }
}
