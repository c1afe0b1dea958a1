//! Every repo-mutating operation besides `request_transition` that the CLI
//! and daemon both need: approval/abort, evidence collection/validation/
//! staleness invalidation, grounding generation, and openspec sync. Keeping
//! these here (rather than duplicated in `sdlc-cli` and `sdlc-daemon`) is
//! what makes both adapters "thin" in the sense the ambient-stack spec
//! means: no lifecycle logic lives in either binary.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sdlc_core::{Actor, ArtifactLink, Bead, BeadStatus, DecisionLedgerEntry, DecisionType, EvidenceBundle, GroundingBundle, OpenSpecRef, canonical_hash};
use sdlc_error::{ErrorCode, SdlcError};
use sdlc_store::{append_decision_entry, append_execution_record, read_artifact, read_journal_for_bead, write_artifact_atomic};

use crate::loaders::load_optional;
use crate::transition::{TransitionOutcome, TransitionRequest};
use crate::SdlcRepo;

/// The result of requesting an approval.
pub struct ApproveOutcome {
    /// The decision ledger entry that was appended.
    pub entry: DecisionLedgerEntry,
    /// Non-fatal advisory: set when `summary` does not start with
    /// `"APPROVAL:"`. The caller (CLI/daemon) surfaces this as a warning,
    /// not a failure — the decision is appended either way.
    pub warning: Option<String>,
}

impl SdlcRepo {
    /// Append an [`DecisionType::Approval`] entry for `bead_id`. Never fails
    /// the call when `summary` doesn't start with `"APPROVAL:"` — that only
    /// produces an advisory warning the caller is expected to surface.
    pub fn approve(&self, bead_id: &str, summary: String, actor: Actor, now: DateTime<Utc>) -> Result<ApproveOutcome, SdlcError> {
        let warning = if summary.starts_with("APPROVAL:") {
            None
        } else {
            Some(format!("approval summary does not start with 'APPROVAL:': {summary:?}"))
        };

        let entry = DecisionLedgerEntry {
            schema_name: sdlc_core::decision::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::decision::SCHEMA_VERSION,
            artifact_id: format!("dec-{}", Uuid::new_v4()),
            created_at: now,
            created_by: actor,
            links: vec![ArtifactLink::new("bead", bead_id.to_string())],
            bead_id: Some(bead_id.to_string()),
            decision_type: DecisionType::Approval,
            summary,
            rationale_md: None,
            expires_at: None,
            waived_acceptance_checks: vec![],
        };
        append_decision_entry(&self.paths, &entry)?;

        if let Some(w) = &warning {
            tracing::warn!(bead_id, "{w}");
        }

        Ok(ApproveOutcome { entry, warning })
    }

    /// Abort a bead: per the decided Open Question (b), always appends the
    /// `scope_change` decision entry first (summary prefixed `"ABORT: "`),
    /// then always attempts the `-> aborted:needs-discovery` transition and
    /// returns its outcome, even when that transition is itself illegal
    /// (e.g. the bead is already terminal).
    pub fn abort(&self, bead_id: &str, reason: String, actor: Actor, now: DateTime<Utc>) -> Result<TransitionOutcome, SdlcError> {
        let entry = DecisionLedgerEntry {
            schema_name: sdlc_core::decision::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::decision::SCHEMA_VERSION,
            artifact_id: format!("dec-{}", Uuid::new_v4()),
            created_at: now,
            created_by: actor.clone(),
            links: vec![ArtifactLink::new("bead", bead_id.to_string())],
            bead_id: Some(bead_id.to_string()),
            decision_type: DecisionType::ScopeChange,
            summary: format!("ABORT: {reason}"),
            rationale_md: None,
            expires_at: None,
            waived_acceptance_checks: vec![],
        };
        append_decision_entry(&self.paths, &entry)?;

        self.request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::AbortedNeedsDiscovery,
            actor,
            touched_files: Vec::new(),
            now,
        })
    }

    /// Persist a freshly collected [`EvidenceBundle`] for `bead_id`. Does not
    /// validate it — use [`Self::validate_evidence`] for that.
    pub fn collect_evidence(&self, bead_id: &str, evidence: &EvidenceBundle) -> Result<(), SdlcError> {
        write_artifact_atomic(&self.paths.evidence_json(bead_id), evidence)
    }

    /// Validate the collected [`EvidenceBundle`] for `bead_id` against its
    /// acceptance checks (§4.4). On success, marks it `validated` and
    /// appends a verify-phase `ExecutionRecord` (`exit_code = 0`, carrying
    /// the current git head/dirty state) that staleness invalidation later
    /// uses as its reference point. Returns the collected error lines
    /// (empty on success) without persisting anything on failure.
    pub fn validate_evidence(&self, bead_id: &str, actor: Actor, now: DateTime<Utc>) -> Result<Vec<String>, SdlcError> {
        let bead: Bead = read_artifact(&self.paths.bead_json(bead_id))?;
        let Some(mut evidence) = load_optional::<EvidenceBundle>(&self.paths.evidence_json(bead_id)) else {
            return Ok(vec!["EvidenceBundle missing".to_string()]);
        };
        let decision_entries = sdlc_store::read_decision_ledger_for_bead(&self.paths, bead_id)?;

        let errors = sdlc_evidence::evidence_validation_errors(&bead, &evidence, &decision_entries, now);
        if !errors.is_empty() {
            return Ok(errors);
        }

        sdlc_evidence::mark_validated(&bead, &mut evidence);
        write_artifact_atomic(&self.paths.evidence_json(bead_id), &evidence)?;

        let head = sdlc_git::head(self.paths.root());
        let dirty = sdlc_git::is_dirty(self.paths.root());
        let record = sdlc_core::ExecutionRecord {
            schema_name: sdlc_core::execution::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::execution::SCHEMA_VERSION,
            artifact_id: format!("exec-{}", Uuid::new_v4()),
            created_at: now,
            created_by: actor,
            links: vec![ArtifactLink::new("evidence_bundle", evidence.artifact_id.clone())],
            bead_id: bead_id.to_string(),
            phase: sdlc_core::RunPhase::Verify,
            engine_version: Some(sdlc_core::CONTRACT_VERSION.to_string()),
            policy_version: None,
            container_image: None,
            container_digest: None,
            commands: vec![],
            exit_code: Some(0),
            produced_artifacts: vec![sdlc_core::FileRef { path: format!("runs/{bead_id}/evidence.json"), content_hash: None }],
            git: Some(sdlc_core::GitRef { head_before: head.clone(), head_after: head, dirty_before: dirty, dirty_after: dirty }),
            notes_md: None,
            requested_transition: None,
            applied_transition: None,
        };
        append_execution_record(&self.paths, &record)?;

        Ok(Vec::new())
    }

    /// Out-of-band staleness check (§4.4) for `bead_id`'s evidence. Returns
    /// `Ok(None)` when the bundle is not currently `validated` or no
    /// reasons apply; returns `Ok(Some(reason))` (the `"; "`-joined reason
    /// string) when it was just invalidated.
    pub fn invalidate_evidence_if_stale(&self, bead_id: &str, actor: Actor, now: DateTime<Utc>) -> Result<Option<String>, SdlcError> {
        let bead: Bead = read_artifact(&self.paths.bead_json(bead_id))?;
        let Some(mut evidence) = load_optional::<EvidenceBundle>(&self.paths.evidence_json(bead_id)) else {
            return Ok(None);
        };

        let current_head = sdlc_git::head(self.paths.root());
        let current_dirty = sdlc_git::is_dirty(self.paths.root());
        let journal = read_journal_for_bead(&self.paths, bead_id)?;
        let reasons = sdlc_evidence::staleness_reasons(&bead, &evidence, current_head.as_deref(), current_dirty, &journal);

        let record_id = format!("exec-{}", Uuid::new_v4());
        let record = sdlc_evidence::apply_invalidation(&bead, &mut evidence, reasons, record_id, actor, now);
        match record {
            None => Ok(None),
            Some(record) => {
                write_artifact_atomic(&self.paths.evidence_json(bead_id), &evidence)?;
                append_execution_record(&self.paths, &record)?;
                Ok(evidence.invalidated_reason.clone())
            }
        }
    }

    /// Generate a (currently non-LLM-backed; see `DESIGN.md`) grounding
    /// scaffold for `bead_id`: an empty curated-context pack stamped with
    /// the bead's current canonical hash, satisfying the
    /// `ready -> in_progress` gate's "`GroundingBundle` must exist"
    /// requirement until a real grounding-generation backend is wired in.
    pub fn generate_grounding(&self, bead_id: &str, actor: Actor, now: DateTime<Utc>) -> Result<GroundingBundle, SdlcError> {
        let bead: Bead = read_artifact(&self.paths.bead_json(bead_id))?;
        let bundle = GroundingBundle {
            schema_name: sdlc_core::grounding::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::grounding::SCHEMA_VERSION,
            artifact_id: format!("grd-{}", Uuid::new_v4()),
            created_at: now,
            created_by: actor,
            links: vec![ArtifactLink::new("bead", bead_id.to_string())],
            bead_id: bead_id.to_string(),
            generated_for_bead_hash: Some(canonical_hash(&bead)),
            items: Vec::new(),
            allowed_commands: Vec::new(),
            disallowed_commands: Vec::new(),
            excluded_paths: Vec::new(),
            summary_md: None,
        };
        write_artifact_atomic(&self.paths.grounding_json(bead_id), &bundle)?;
        Ok(bundle)
    }

    /// Refresh `runs/<bead_id>/openspec_ref.json` from the canonical
    /// `openspec/refs/<artifact_id>.json` entry `bead.openspec_ref` points
    /// at.
    pub fn sync_openspec(&self, bead_id: &str) -> Result<OpenSpecRef, SdlcError> {
        let bead: Bead = read_artifact(&self.paths.bead_json(bead_id))?;
        let link = bead
            .openspec_ref
            .as_ref()
            .ok_or_else(|| SdlcError::new(ErrorCode::NotFound, "bead has no openspec_ref link").with_context("bead_id", bead_id))?;

        let canonical: OpenSpecRef = read_artifact(&self.paths.openspec_ref_registry_json(&link.artifact_id))?;
        write_artifact_atomic(&self.paths.openspec_ref_json(bead_id), &canonical)?;
        tracing::info!(bead_id, change_id = %canonical.change_id, state = ?canonical.state, "openspec ref synced");
        Ok(canonical)
    }
}
