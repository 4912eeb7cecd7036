//! Abductor: cell and region abduction from full effect sets.
//!
//! Same disjunctive structure as the reducer, but intersecting complete
//! closures instead of precomputed elimination bitsets, so any common
//! consequence can be proven: forced values as well as eliminations. Slower
//! per query; used as the thorough pass when reduction finds nothing. The
//! running intersection is abandoned the moment it goes empty.

use super::cache::{ProofSink, SearchOutcome};
use super::effects::EffectCache;
use super::explain::{
    chain_cells, DerivationChain, ExplanationData, Finding, ForcingSource, InferenceResult,
    ProofCertificate,
};
use super::fabric::CandidateFabric;
use super::graph::{ImplicationGraph, Literal};
use super::types::{ProofSource, Technique};

/// Cell abduction: every candidate of one cell forces a common consequence.
pub fn find_cell_abductions(
    fab: &CandidateFabric,
    graph: &ImplicationGraph,
    effects: &mut EffectCache,
    sink: &mut ProofSink,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::NotFound;

    for cell in 0..81 {
        if fab.values[cell].is_some() || fab.cand_count(cell) < 2 {
            continue;
        }
        let cands: Vec<u8> = fab.cell_cands[cell].iter().collect();
        let branches: Vec<(usize, u8)> = cands.iter().map(|&v| (cell, v)).collect();

        match emit_common_consequences(
            fab,
            graph,
            effects,
            &branches,
            Technique::CellForcingChain,
            ForcingSource::Cell(cell),
            ExplanationData::CellForcing {
                cell,
                branches: branches.len(),
            },
            sink,
        ) {
            SearchOutcome::StopEarly => return SearchOutcome::StopEarly,
            SearchOutcome::Found => outcome = SearchOutcome::Found,
            SearchOutcome::NotFound => {}
        }
    }
    outcome
}

/// Region abduction: every placement of a value in one region forces a
/// common consequence.
pub fn find_region_abductions(
    fab: &CandidateFabric,
    graph: &ImplicationGraph,
    effects: &mut EffectCache,
    sink: &mut ProofSink,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::NotFound;

    for sector in 0..27 {
        for digit in 1..=9u8 {
            let members = fab.members(sector, digit);
            if members.len() < 2 {
                continue;
            }
            let branches: Vec<(usize, u8)> = members.iter().map(|&c| (c, digit)).collect();

            match emit_common_consequences(
                fab,
                graph,
                effects,
                &branches,
                Technique::RegionForcingChain,
                ForcingSource::Region { sector, digit },
                ExplanationData::RegionForcing {
                    sector,
                    digit,
                    branches: branches.len(),
                },
                sink,
            ) {
                SearchOutcome::StopEarly => return SearchOutcome::StopEarly,
                SearchOutcome::Found => outcome = SearchOutcome::Found,
                SearchOutcome::NotFound => {}
            }
        }
    }
    outcome
}

/// Intersect the branches' full effect sets incrementally and emit a finding
/// for every surviving common literal.
#[allow(clippy::too_many_arguments)]
fn emit_common_consequences(
    fab: &CandidateFabric,
    graph: &ImplicationGraph,
    effects: &mut EffectCache,
    branches: &[(usize, u8)],
    technique: Technique,
    source: ForcingSource,
    explanation: ExplanationData,
    sink: &mut ProofSink,
) -> SearchOutcome {
    let (first_cell, first_value) = branches[0];
    let first = effects.effects(graph, first_cell, first_value);
    let mut common_on = first.on;
    let mut common_off = first.off;

    for &(cell, value) in &branches[1..] {
        let set = effects.effects(graph, cell, value);
        let mut live = false;
        for di in 0..9 {
            common_on[di] &= set.on[di];
            common_off[di] &= set.off[di];
            live |= common_on[di] != 0 || common_off[di] != 0;
        }
        // Abandon as soon as the running intersection is empty.
        if !live {
            return SearchOutcome::NotFound;
        }
    }

    let mut outcome = SearchOutcome::NotFound;
    for value in 1..=9u8 {
        let di = (value - 1) as usize;
        for victim in 0..81usize {
            let bit = 1u128 << victim;
            if !fab.has_cand(victim, value) {
                continue;
            }

            // Common On literal: the victim cell is forced to hold value.
            if common_on[di] & bit != 0 && !branches.contains(&(victim, value)) {
                let finding = consequence_finding(
                    graph,
                    effects,
                    branches,
                    Literal::on(victim, value),
                    InferenceResult::Placement {
                        cell: victim,
                        value,
                    },
                    technique,
                    source.clone(),
                    explanation.clone(),
                );
                if sink.push(finding) == SearchOutcome::StopEarly {
                    return SearchOutcome::StopEarly;
                }
                outcome = SearchOutcome::Found;
            }

            // Common Off literal: the victim candidate is eliminated.
            if common_off[di] & bit != 0 {
                let finding = consequence_finding(
                    graph,
                    effects,
                    branches,
                    Literal::off(victim, value),
                    InferenceResult::Elimination {
                        cell: victim,
                        values: vec![value],
                    },
                    technique,
                    source.clone(),
                    explanation.clone(),
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

#[allow(clippy::too_many_arguments)]
fn consequence_finding(
    graph: &ImplicationGraph,
    effects: &mut EffectCache,
    branches: &[(usize, u8)],
    target: Literal,
    inference: InferenceResult,
    technique: Technique,
    source: ForcingSource,
    explanation: ExplanationData,
) -> Finding {
    let chains: Vec<DerivationChain> = branches
        .iter()
        .map(|&(cell, value)| {
            effects
                .effects(graph, cell, value)
                .derivation(target)
                .expect("common consequence without derivation")
        })
        .collect();
    let mut involved = chain_cells(&chains);
    if !involved.contains(&target.cell()) {
        involved.push(target.cell());
        involved.sort_unstable();
    }
    Finding {
        technique,
        inference,
        involved_cells: involved,
        explanation,
        proof: ProofCertificate::Forcing {
            source,
            branches: chains,
        },
        source: ProofSource::Abduction,
    }
}
