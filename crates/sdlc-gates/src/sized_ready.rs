//! The `sized -> ready` gate: the one edge whose gate is documented to
//! mutate the bead (adopting `tightened_acceptance_checks`) as part of its
//! defined side effect, rather than leaving mutation solely to the
//! transition engine.

use sdlc_core::{BeadReview, EffortBucket, canonical_hash};

use crate::snapshot::ReadyAcceptanceSnapshot;

/// Outcome of evaluating the `sized -> ready` gate.
pub struct SizedToReadyOutcome {
    /// Collected error lines; empty means the gate passed.
    pub errors: Vec<String>,
    /// The acceptance snapshot to persist, present only when the gate
    /// passed.
    pub snapshot: Option<ReadyAcceptanceSnapshot>,
}

/// Evaluate the `sized -> ready` gate. On success, mutates `bead` in place
/// (adopting `review.tightened_acceptance_checks`) and returns the snapshot
/// to persist as `runs/<bead_id>/ready_acceptance_hash.json`.
pub fn evaluate(bead: &mut sdlc_core::Bead, review: Option<&BeadReview>) -> SizedToReadyOutcome {
    let Some(review) = review else {
        return SizedToReadyOutcome { errors: vec!["BeadReview missing".to_string()], snapshot: None };
    };

    if review.effort_bucket == EffortBucket::Xl {
        return SizedToReadyOutcome {
            errors: vec!["BeadReview effort bucket XL not allowed".to_string()],
            snapshot: None,
        };
    }

    bead.acceptance_checks = review.tightened_acceptance_checks.clone();
    let acceptance_checks_hash = canonical_hash(&bead.acceptance_checks);
    let bead_hash = canonical_hash(bead);

    SizedToReadyOutcome {
        errors: Vec::new(),
        snapshot: Some(ReadyAcceptanceSnapshot { bead_id: bead.bead_id.clone(), acceptance_checks_hash, bead_hash }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sdlc_core::{Actor, BeadStatus, BeadType, bead, review};

    fn sample_bead() -> sdlc_core::Bead {
        sdlc_core::Bead {
            schema_name: bead::SCHEMA_NAME.to_string(),
            schema_version: bead::SCHEMA_VERSION,
            artifact_id: "work-abc123".to_string(),
            created_at: Utc::now(),
            created_by: Actor::human("alice"),
            links: vec![],
            bead_id: "work-abc123".to_string(),
            title: "t".to_string(),
            bead_type: BeadType::Implementation,
            status: BeadStatus::Sized,
            priority: 3,
            owner: None,
            openspec_ref: None,
            boundary_registry_ref: None,
            requirements_md: String::new(),
            acceptance_criteria_md: String::new(),
            context_md: String::new(),
            acceptance_checks: vec![],
            execution_profile: Default::default(),
            depends_on: vec![],
            max_elapsed_minutes: None,
            max_interventions: None,
        }
    }

    fn sample_review(effort: EffortBucket, checks: Vec<sdlc_core::AcceptanceCheck>) -> BeadReview {
        BeadReview {
            schema_name: review::SCHEMA_NAME.to_string(),
            schema_version: review::SCHEMA_VERSION,
            artifact_id: "rev-1".to_string(),
            created_at: Utc::now(),
            created_by: Actor::human("alice"),
            links: vec![],
            bead_id: "work-abc123".to_string(),
            reviewed_bead_hash: None,
            effort_bucket: effort,
            risk_flags: vec![],
            estimated_files_touched: None,
            estimated_subsystems_touched: None,
            tightened_acceptance_checks: checks,
            split_required: false,
            split_proposal: None,
            notes: None,
        }
    }

    #[test]
    fn missing_review_is_rejected() {
        let mut bead = sample_bead();
        let outcome = evaluate(&mut bead, None);
        assert_eq!(outcome.errors, vec!["BeadReview missing".to_string()]);
        assert!(outcome.snapshot.is_none());
    }

    #[test]
    fn xl_effort_bucket_is_rejected_without_adopting_checks() {
        let mut bead = sample_bead();
        let review = sample_review(EffortBucket::Xl, vec![]);
        let outcome = evaluate(&mut bead, Some(&review));
        assert_eq!(outcome.errors, vec!["BeadReview effort bucket XL not allowed".to_string()]);
        assert!(outcome.snapshot.is_none());
        assert!(bead.acceptance_checks.is_empty());
    }

    #[test]
    fn passing_review_adopts_checks_and_produces_snapshot() {
        let mut bead = sample_bead();
        let check = sdlc_core::AcceptanceCheck {
            name: "run".to_string(),
            command: "cargo test".to_string(),
            cwd: None,
            timeout_seconds: None,
            expect_exit_code: 0,
            expected_outputs: vec![],
        };
        let review = sample_review(EffortBucket::M, vec![check.clone()]);
        let outcome = evaluate(&mut bead, Some(&review));
        assert!(outcome.errors.is_empty());
        assert_eq!(bead.acceptance_checks, vec![check]);
        let snapshot = outcome.snapshot.expect("snapshot");
        assert_eq!(snapshot.bead_id, "work-abc123");
        assert_eq!(snapshot.acceptance_checks_hash, canonical_hash(&bead.acceptance_checks));
    }
}
