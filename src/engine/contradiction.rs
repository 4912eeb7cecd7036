//! Contradiction rule: converts the closure scan's contradiction list into
//! proofs.
//!
//! A root whose closure reaches both polarities of some literal cannot hold,
//! so its negation does. Each proof carries both derivation chains for the
//! rendering collaborator. Roots whose candidate has since been cleared are
//! skipped, never surfaced as errors.

use super::cache::{ProofSink, SearchOutcome};
use super::closure::ClosureIndex;
use super::explain::{chain_cells, ExplanationData, Finding, InferenceResult, ProofCertificate};
use super::fabric::CandidateFabric;
use super::types::{ProofSource, Technique};

/// Drain the contradiction list into elimination proofs.
pub fn find_contradictions(
    fab: &CandidateFabric,
    index: &ClosureIndex,
    sink: &mut ProofSink,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::NotFound;

    for c in index.contradictions() {
        let root_cell = c.root.cell();
        let root_value = c.root.value();
        // Staleness guard: the assumption must still be a live candidate.
        if !fab.has_cand(root_cell, root_value) {
            continue;
        }

        let chains = [c.on_chain.clone(), c.off_chain.clone()];
        let finding = Finding {
            technique: Technique::NishioForcingChain,
            inference: InferenceResult::Elimination {
                cell: root_cell,
                values: vec![root_value],
            },
            involved_cells: chain_cells(&chains),
            explanation: ExplanationData::Contradiction {
                cell: root_cell,
                digit: root_value,
                conflict_cell: c.cell,
                conflict_digit: c.value,
            },
            proof: ProofCertificate::Contradiction {
                root_cell,
                root_digit: root_value,
                on_chain: c.on_chain.clone(),
                off_chain: c.off_chain.clone(),
            },
            source: ProofSource::Reduction,
        };
        if sink.push(finding) == SearchOutcome::StopEarly {
            return SearchOutcome::StopEarly;
        }
        outcome = SearchOutcome::Found;
    }
    outcome
}
