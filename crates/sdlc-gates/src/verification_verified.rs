//! The `verification_pending -> verified` gate: evidence validation plus
//! boundary enforcement. Boundary enforcement always runs, even when
//! evidence has already failed — both sets of errors are collected.

use chrono::{DateTime, Utc};
use sdlc_core::{Bead, BeadType, BoundaryRegistry, DecisionLedgerEntry, EvidenceBundle, EvidenceStatus};

/// Everything the `verification_pending -> verified` gate needs, pre-loaded
/// by the caller so this crate stays pure and file-system-free.
pub struct VerificationToVerifiedInput<'a> {
    /// The bead under evaluation, still in `verification_pending`.
    pub bead: &'a Bead,
    /// The bead's `EvidenceBundle`, if present.
    pub evidence: Option<&'a EvidenceBundle>,
    /// Every decision ledger entry for this bead (coverage waivers).
    pub decision_entries: &'a [DecisionLedgerEntry],
    /// Current time, for waiver-expiry evaluation.
    pub now: DateTime<Utc>,
    /// Files changed since the bead started, for boundary evaluation.
    pub touched_files: &'a [String],
    /// The resolved boundary registry, if loadable.
    pub boundary_registry: Option<&'a BoundaryRegistry>,
    /// Discovery-allowlist prefixes in effect (discovery beads only).
    pub discovery_allowlist: &'a [String],
    /// File-touched budget in effect (implementation beads only).
    pub max_files_touched: usize,
    /// Subsystem-touched budget in effect (implementation beads only).
    pub max_subsystems_touched: usize,
}

/// Evaluate the `verification_pending -> verified` edge: evidence gate plus
/// boundary enforcement, both always run and collected.
pub fn evaluate(input: &VerificationToVerifiedInput<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    match input.evidence {
        None => errors.push("EvidenceBundle missing".to_string()),
        Some(evidence) => {
            if evidence.status != EvidenceStatus::Validated {
                errors.push("EvidenceBundle not validated".to_string());
            } else {
                errors.extend(sdlc_evidence::evidence_validation_errors(
                    input.bead,
                    evidence,
                    input.decision_entries,
                    input.now,
                ));
            }
        }
    }

    match input.boundary_registry {
        None => errors.push("Boundary registry not found".to_string()),
        Some(registry) => {
            if input.bead.bead_type == BeadType::Discovery {
                errors.extend(sdlc_boundary::enforce_discovery_policy(registry, input.touched_files, input.discovery_allowlist));
            } else {
                errors.extend(sdlc_boundary::enforce_implementation_boundary(
                    registry,
                    input.touched_files,
                    input.max_files_touched,
                    input.max_subsystems_touched,
                ));
            }
        }
    }

    errors
}
