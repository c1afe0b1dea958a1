//! The request lifecycle (§4.2): load, check `from == status`, check edge
//! legality, check authority, run the edge's gate composite, persist on
//! success, journal unconditionally.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sdlc_core::{Actor, ActorKind, Bead, BeadStatus, BeadType, EvidenceBundle, RunPhase, infer_phase, legal_edge};
use sdlc_error::SdlcError;
use sdlc_store::{append_execution_record, read_artifact, read_decision_ledger_for_bead, write_artifact_atomic};

use crate::SdlcRepo;
use crate::loaders::{load_optional, resolve_boundary_registry, resolve_dependency_statuses};

/// One requested lifecycle transition.
pub struct TransitionRequest {
    /// The bead to transition.
    pub bead_id: String,
    /// The target status.
    pub to: BeadStatus,
    /// Who is requesting the transition (governs the one authority check).
    pub actor: Actor,
    /// Files changed since the bead started work, for the boundary and
    /// discovery-policy gates.
    pub touched_files: Vec<String>,
    /// When this request is being evaluated.
    pub now: DateTime<Utc>,
}

/// The result of evaluating a [`TransitionRequest`].
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// Whether the transition was applied.
    pub ok: bool,
    /// Collected gate/legality/authority error lines; empty on success.
    pub notes: Vec<String>,
    /// `"{from} -> {to}"`, present only when the transition was applied.
    pub applied_transition: Option<String>,
    /// The inferred run phase for the requested target status.
    pub phase: RunPhase,
    /// The `artifact_id` of the journal record this call appended.
    pub record_artifact_id: String,
}

impl SdlcRepo {
    /// Evaluate and, if legal, apply a requested transition. Always appends
    /// exactly one [`sdlc_core::ExecutionRecord`] to `runs/journal.jsonl`,
    /// whether the transition succeeds, is rejected by a gate, or the bead
    /// could not even be loaded.
    pub fn request_transition(&self, req: TransitionRequest) -> Result<TransitionOutcome, SdlcError> {
        let record_id = format!("exec-{}", Uuid::new_v4());
        let phase = infer_phase(req.to);
        let bead_path = self.paths.bead_json(&req.bead_id);

        let bead = match read_artifact::<Bead>(&bead_path) {
            Ok(bead) => bead,
            Err(err) => {
                let record = sdlc_core::ExecutionRecord {
                    schema_name: sdlc_core::execution::SCHEMA_NAME.to_string(),
                    schema_version: sdlc_core::execution::SCHEMA_VERSION,
                    artifact_id: record_id.clone(),
                    created_at: req.now,
                    created_by: req.actor.clone(),
                    links: vec![],
                    bead_id: req.bead_id.clone(),
                    phase,
                    engine_version: Some(sdlc_core::CONTRACT_VERSION.to_string()),
                    policy_version: None,
                    container_image: None,
                    container_digest: None,
                    commands: vec![],
                    exit_code: Some(1),
                    produced_artifacts: vec![],
                    git: None,
                    notes_md: Some(err.message.clone()),
                    requested_transition: Some(format!("? -> {}", req.to.as_wire_str())),
                    applied_transition: None,
                };
                append_execution_record(&self.paths, &record)?;
                return Ok(TransitionOutcome {
                    ok: false,
                    notes: vec![err.message],
                    applied_transition: None,
                    phase,
                    record_artifact_id: record_id,
                });
            }
        };

        let from = bead.status;
        let requested_transition = format!("{} -> {}", from.as_wire_str(), req.to.as_wire_str());
        let mut errors = Vec::new();

        if !legal_edge(from, req.to) {
            errors.push(format!("Illegal transition: {requested_transition} is not a legal edge"));
        }

        if from == BeadStatus::VerificationPending && req.to == BeadStatus::Verified && req.actor.kind != ActorKind::System {
            errors.push("Authority violation: verification_pending -> verified requires a system actor".to_string());
        }

        let mut bead = bead;
        let mut snapshot_to_write = None;
        let mut evidence_to_persist: Option<EvidenceBundle> = None;

        if errors.is_empty() {
            errors.extend(self.run_gate(&mut bead, &req, from, &mut snapshot_to_write, &mut evidence_to_persist)?);
        }

        let ok = errors.is_empty();
        let applied_transition = if ok { Some(requested_transition.clone()) } else { None };

        if ok {
            bead.status = req.to;
            write_artifact_atomic(&bead_path, &bead)?;
            if let Some(snapshot) = snapshot_to_write {
                write_artifact_atomic(&self.paths.ready_acceptance_hash_json(&req.bead_id), &snapshot)?;
            }
            if let Some(evidence) = evidence_to_persist {
                write_artifact_atomic(&self.paths.evidence_json(&req.bead_id), &evidence)?;
            }
            tracing::info!(bead_id = %req.bead_id, %requested_transition, "transition applied");
        } else {
            tracing::warn!(bead_id = %req.bead_id, %requested_transition, errors = %errors.join("; "), "transition rejected");
        }

        let record = sdlc_core::ExecutionRecord {
            schema_name: sdlc_core::execution::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::execution::SCHEMA_VERSION,
            artifact_id: record_id.clone(),
            created_at: req.now,
            created_by: req.actor.clone(),
            links: vec![sdlc_core::ArtifactLink::new("bead", req.bead_id.clone())],
            bead_id: req.bead_id.clone(),
            phase,
            engine_version: Some(sdlc_core::CONTRACT_VERSION.to_string()),
            policy_version: None,
            container_image: None,
            container_digest: None,
            commands: vec![],
            exit_code: Some(if ok { 0 } else { 1 }),
            produced_artifacts: vec![],
            git: None,
            notes_md: if ok { None } else { Some(errors.join("; ")) },
            requested_transition: Some(requested_transition),
            applied_transition: applied_transition.clone(),
        };
        append_execution_record(&self.paths, &record)?;

        Ok(TransitionOutcome { ok, notes: errors, applied_transition, phase, record_artifact_id: record_id })
    }

    /// Dispatch to the gate for edge `(from, req.to)`. Returns the edge's
    /// collected error lines (empty on pass) and, via the `out_*`
    /// parameters, whatever extra artifact this edge's gate prepares for
    /// persistence on success.
    fn run_gate(
        &self,
        bead: &mut Bead,
        req: &TransitionRequest,
        from: BeadStatus,
        out_snapshot: &mut Option<sdlc_gates::ReadyAcceptanceSnapshot>,
        out_evidence: &mut Option<EvidenceBundle>,
    ) -> Result<Vec<String>, SdlcError> {
        use BeadStatus::*;

        let errors = match (from, req.to) {
            (Sized, Ready) => {
                let review = load_optional(&self.paths.review_json(&req.bead_id));
                let outcome = sdlc_gates::evaluate_sized_to_ready(bead, review.as_ref());
                *out_snapshot = outcome.snapshot;
                outcome.errors
            }
            (Ready, InProgress) => {
                let review = load_optional(&self.paths.review_json(&req.bead_id));
                let snapshot = load_optional(&self.paths.ready_acceptance_hash_json(&req.bead_id));
                let dependencies = resolve_dependency_statuses(&self.paths, &bead.depends_on);
                let openspec_ref_on_disk = load_optional(&self.paths.openspec_ref_json(&req.bead_id));
                let grounding = load_optional(&self.paths.grounding_json(&req.bead_id));
                let decision_entries = read_decision_ledger_for_bead(&self.paths, &req.bead_id)?;
                let boundary_registry = if bead.bead_type == BeadType::Discovery {
                    resolve_boundary_registry(&self.paths, bead)
                } else {
                    None
                };
                let input = sdlc_gates::ReadyToInProgressInput {
                    bead,
                    review: review.as_ref(),
                    snapshot: snapshot.as_ref(),
                    dependencies: &dependencies,
                    openspec_ref_on_disk: openspec_ref_on_disk.as_ref(),
                    grounding: grounding.as_ref(),
                    decision_entries: &decision_entries,
                    now: req.now,
                    touched_files: &req.touched_files,
                    boundary_registry: boundary_registry.as_ref(),
                    discovery_allowlist: &self.config.discovery_allowlist,
                };
                sdlc_gates::evaluate_ready_to_in_progress(&input)
            }
            (VerificationPending, Verified) => {
                let evidence = load_optional::<EvidenceBundle>(&self.paths.evidence_json(&req.bead_id));
                let decision_entries = read_decision_ledger_for_bead(&self.paths, &req.bead_id)?;
                let boundary_registry = resolve_boundary_registry(&self.paths, bead);
                let input = sdlc_gates::VerificationToVerifiedInput {
                    bead,
                    evidence: evidence.as_ref(),
                    decision_entries: &decision_entries,
                    now: req.now,
                    touched_files: &req.touched_files,
                    boundary_registry: boundary_registry.as_ref(),
                    discovery_allowlist: &self.config.discovery_allowlist,
                    max_files_touched: self.config.max_files_touched,
                    max_subsystems_touched: self.config.max_subsystems_touched,
                };
                let gate_errors = sdlc_gates::evaluate_verification_to_verified(&input);
                if gate_errors.is_empty() {
                    if let Some(mut evidence) = evidence {
                        sdlc_evidence::mark_validated(bead, &mut evidence);
                        *out_evidence = Some(evidence);
                    }
                }
                gate_errors
            }
            (ApprovalPending, Done) => {
                let decision_entries = read_decision_ledger_for_bead(&self.paths, &req.bead_id)?;
                sdlc_gates::evaluate_approval_to_done(&decision_entries)
            }
            // draft->sized, in_progress->verification_pending,
            // verified->approval_pending, and every failure edge carry no
            // gate (§4.3).
            _ => Vec::new(),
        };

        Ok(errors)
    }
}
