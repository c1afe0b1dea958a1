#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-core
//!
//! The stable data model and canonical codec for the SDLC lifecycle engine:
//! beads and the artifacts that gate their transitions (review, grounding,
//! evidence, decisions, execution records, boundary registry, openspec
//! refs), plus the canonical JSON codec used to hash every one of them.
//!
//! If you only take one dependency to read/write lifecycle artifacts, take
//! this one — everything downstream (`sdlc-gates`, `sdlc-engine`,
//! `sdlc-store`) builds on these types.

/// The bead and its legal state-machine edges.
pub mod bead;
/// Named subsystems used to bound blast radius.
pub mod boundary;
/// Canonical JSON serialization and content hashing.
pub mod codec;
/// Envelope fields shared by every artifact.
pub mod common;
/// Decision ledger entries.
pub mod decision;
/// Collected acceptance-check/test/verification results.
pub mod evidence;
/// Journal (execution record) entries.
pub mod execution;
/// Curated context pack + policy for an implementation attempt.
pub mod grounding;
/// Link to an external specification artifact.
pub mod openspec;
/// Sizing/splitting verdict.
pub mod review;

pub use bead::{
    AcceptanceCheck, Bead, BeadStatus, BeadType, ExecutionProfile, is_valid_bead_id, legal_edge,
};
pub use boundary::{BoundaryRegistry, Subsystem};
pub use codec::{canonical_bytes, canonical_hash, canonical_json, sha256_hex};
pub use common::{Actor, ActorKind, ArtifactLink, Envelope, FileRef, HashRef};
pub use decision::{DecisionLedgerEntry, DecisionType};
pub use evidence::{EvidenceBundle, EvidenceItem, EvidenceStatus, EvidenceType};
pub use execution::{ExecutionRecord, GitRef, RunPhase};
pub use grounding::{GroundingBundle, GroundingItem, GroundingItemKind};
pub use openspec::{OpenSpecRef, OpenSpecState};
pub use review::{BeadReview, EffortBucket, ProposedBeadDraft, RiskFlag, SplitProposal};

/// Current contract version string, bumped when a breaking schema change
/// ships across every artifact type at once.
pub const CONTRACT_VERSION: &str = "sdlc/v1";

/// Phase inference for a requested transition's target status, matching the
/// gates' authoritative table (§4.2 phase inference): `{sized, ready}` ->
/// plan, `{in_progress, verification_pending}` -> implement, `{verified,
/// approval_pending, done}` -> verify, otherwise implement.
pub fn infer_phase(to: BeadStatus) -> RunPhase {
    use BeadStatus::*;
    match to {
        Sized | Ready => RunPhase::Plan,
        InProgress | VerificationPending => RunPhase::Implement,
        Verified | ApprovalPending | Done => RunPhase::Verify,
        _ => RunPhase::Implement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_inference_matches_table() {
        assert_eq!(infer_phase(BeadStatus::Sized), RunPhase::Plan);
        assert_eq!(infer_phase(BeadStatus::Ready), RunPhase::Plan);
        assert_eq!(infer_phase(BeadStatus::InProgress), RunPhase::Implement);
        assert_eq!(infer_phase(BeadStatus::VerificationPending), RunPhase::Implement);
        assert_eq!(infer_phase(BeadStatus::Verified), RunPhase::Verify);
        assert_eq!(infer_phase(BeadStatus::ApprovalPending), RunPhase::Verify);
        assert_eq!(infer_phase(BeadStatus::Done), RunPhase::Verify);
        assert_eq!(infer_phase(BeadStatus::Blocked), RunPhase::Implement);
        assert_eq!(infer_phase(BeadStatus::Draft), RunPhase::Implement);
    }
}
