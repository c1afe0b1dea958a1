//! Staleness invalidation: a previously `validated` [`EvidenceBundle`] is
//! invalidated out-of-band (not as part of a requested transition) whenever
//! the bead has changed since validation or the working tree has drifted
//! from the state it was validated against.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sdlc_core::{Actor, ArtifactLink, Bead, EvidenceBundle, EvidenceStatus, ExecutionRecord, RunPhase, canonical_hash};

/// Compute the (deduplicated, deterministically ordered) set of reasons a
/// currently-`validated` bundle is now stale. Returns an empty set for any
/// bundle not currently `validated` — staleness invalidation never acts on
/// a bundle that is merely `collected` or already `invalidated`.
pub fn staleness_reasons(
    bead: &Bead,
    evidence: &EvidenceBundle,
    current_head: Option<&str>,
    current_dirty: Option<bool>,
    journal: &[ExecutionRecord],
) -> BTreeSet<String> {
    let mut reasons = BTreeSet::new();
    if evidence.status != EvidenceStatus::Validated {
        return reasons;
    }

    if evidence.for_bead_hash.as_ref() != Some(&canonical_hash(bead)) {
        reasons.insert("bead hash changed".to_string());
    }

    let evidence_path = format!("runs/{}/evidence.json", bead.bead_id);
    let last_good = journal
        .iter()
        .filter(|r| {
            r.bead_id == bead.bead_id
                && r.phase == RunPhase::Verify
                && r.exit_code == Some(0)
                && r.git.is_some()
                && r.produced_artifacts.iter().any(|f| f.path == evidence_path)
        })
        .max_by_key(|r| r.created_at);

    if let Some(record) = last_good {
        let git = record.git.as_ref().expect("filtered for git.is_some()");
        if let (Some(before), Some(now)) = (git.head_before.as_deref(), current_head) {
            if before != now {
                reasons.insert("git head changed".to_string());
            }
        }
        if let (Some(before), Some(now)) = (git.dirty_before, current_dirty) {
            if before != now {
                reasons.insert("git dirty state changed".to_string());
            }
        }
    }

    reasons
}

/// Apply staleness invalidation: if `reasons` is non-empty, mark `evidence`
/// `invalidated` with the `;`-joined reason string and build the verify-phase
/// `ExecutionRecord` (`exit_code = 1`) documenting it. Returns `None` (no
/// mutation) when `reasons` is empty — the bundle never up-revalidates
/// automatically, only `mark_validated` can set it back to `validated`.
pub fn apply_invalidation(
    bead: &Bead,
    evidence: &mut EvidenceBundle,
    reasons: BTreeSet<String>,
    record_artifact_id: String,
    created_by: Actor,
    created_at: DateTime<Utc>,
) -> Option<ExecutionRecord> {
    if reasons.is_empty() {
        return None;
    }

    let reason = reasons.into_iter().collect::<Vec<_>>().join("; ");
    evidence.status = EvidenceStatus::Invalidated;
    evidence.invalidated_reason = Some(reason.clone());

    Some(ExecutionRecord {
        schema_name: sdlc_core::execution::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::execution::SCHEMA_VERSION,
        artifact_id: record_artifact_id,
        created_at,
        created_by,
        links: vec![ArtifactLink::new("evidence_bundle", evidence.artifact_id.clone())],
        bead_id: bead.bead_id.clone(),
        phase: RunPhase::Verify,
        engine_version: None,
        policy_version: None,
        container_image: None,
        container_digest: None,
        commands: vec![],
        exit_code: Some(1),
        produced_artifacts: vec![],
        git: None,
        notes_md: Some(format!("Evidence invalidated: {reason}")),
        requested_transition: None,
        applied_transition: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdlc_core::{BeadStatus, BeadType, GitRef, bead, evidence};

    fn sample_bead() -> Bead {
        Bead {
            schema_name: bead::SCHEMA_NAME.to_string(),
            schema_version: bead::SCHEMA_VERSION,
            artifact_id: "work-abc123".to_string(),
            created_at: Utc::now(),
            created_by: Actor::human("alice"),
            links: vec![],
            bead_id: "work-abc123".to_string(),
            title: "t".to_string(),
            bead_type: BeadType::Implementation,
            status: BeadStatus::Verified,
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

    fn validated_bundle(bead: &Bead) -> EvidenceBundle {
        EvidenceBundle {
            schema_name: evidence::SCHEMA_NAME.to_string(),
            schema_version: evidence::SCHEMA_VERSION,
            artifact_id: "ev-1".to_string(),
            created_at: Utc::now(),
            created_by: Actor::human("alice"),
            links: vec![],
            bead_id: bead.bead_id.clone(),
            for_bead_hash: Some(canonical_hash(bead)),
            status: EvidenceStatus::Validated,
            items: vec![],
            invalidated_reason: None,
        }
    }

    fn good_record(bead: &Bead, head_before: &str, dirty_before: bool) -> ExecutionRecord {
        ExecutionRecord {
            schema_name: sdlc_core::execution::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::execution::SCHEMA_VERSION,
            artifact_id: "rec-1".to_string(),
            created_at: Utc::now(),
            created_by: Actor::system("engine"),
            links: vec![],
            bead_id: bead.bead_id.clone(),
            phase: RunPhase::Verify,
            engine_version: None,
            policy_version: None,
            container_image: None,
            container_digest: None,
            commands: vec![],
            exit_code: Some(0),
            produced_artifacts: vec![sdlc_core::FileRef {
                path: format!("runs/{}/evidence.json", bead.bead_id),
                content_hash: None,
            }],
            git: Some(GitRef {
                head_before: Some(head_before.to_string()),
                head_after: Some(head_before.to_string()),
                dirty_before: Some(dirty_before),
                dirty_after: Some(dirty_before),
            }),
            notes_md: None,
            requested_transition: None,
            applied_transition: None,
        }
    }

    #[test]
    fn unvalidated_bundle_is_never_stale() {
        let bead = sample_bead();
        let mut ev = validated_bundle(&bead);
        ev.status = EvidenceStatus::Collected;
        let reasons = staleness_reasons(&bead, &ev, Some("abc"), Some(false), &[]);
        assert!(reasons.is_empty());
    }

    #[test]
    fn bead_hash_change_is_detected() {
        let bead = sample_bead();
        let mut other = sample_bead();
        other.title = "changed".to_string();
        let ev = validated_bundle(&other);
        let reasons = staleness_reasons(&bead, &ev, None, None, &[]);
        assert!(reasons.contains("bead hash changed"));
    }

    #[test]
    fn git_head_drift_is_detected() {
        let bead = sample_bead();
        let ev = validated_bundle(&bead);
        let record = good_record(&bead, "commit-a", false);
        let reasons = staleness_reasons(&bead, &ev, Some("commit-b"), Some(false), &[record]);
        assert!(reasons.contains("git head changed"));
    }

    #[test]
    fn git_dirty_drift_is_detected() {
        let bead = sample_bead();
        let ev = validated_bundle(&bead);
        let record = good_record(&bead, "commit-a", false);
        let reasons = staleness_reasons(&bead, &ev, Some("commit-a"), Some(true), &[record]);
        assert!(reasons.contains("git dirty state changed"));
    }

    #[test]
    fn unchanged_state_has_no_reasons() {
        let bead = sample_bead();
        let ev = validated_bundle(&bead);
        let record = good_record(&bead, "commit-a", false);
        let reasons = staleness_reasons(&bead, &ev, Some("commit-a"), Some(false), &[record]);
        assert!(reasons.is_empty());
    }

    #[test]
    fn apply_invalidation_sets_status_and_builds_record() {
        let bead = sample_bead();
        let mut ev = validated_bundle(&bead);
        let mut reasons = BTreeSet::new();
        reasons.insert("git head changed".to_string());
        let record = apply_invalidation(&bead, &mut ev, reasons, "rec-2".to_string(), Actor::system("engine"), Utc::now())
            .expect("reasons non-empty");
        assert_eq!(ev.status, EvidenceStatus::Invalidated);
        assert_eq!(ev.invalidated_reason.as_deref(), Some("git head changed"));
        assert_eq!(record.exit_code, Some(1));
        assert_eq!(record.notes_md.as_deref(), Some("Evidence invalidated: git head changed"));
    }

    #[test]
    fn apply_invalidation_noop_when_no_reasons() {
        let bead = sample_bead();
        let mut ev = validated_bundle(&bead);
        let record = apply_invalidation(&bead, &mut ev, BTreeSet::new(), "rec-3".to_string(), Actor::system("engine"), Utc::now());
        assert!(record.is_none());
        assert_eq!(ev.status, EvidenceStatus::Validated);
    }
}
