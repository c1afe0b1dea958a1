//! Human-readable rendering of engine outcomes for the CLI's stdout/stderr.
//!
//! Every command also has an available `--json` path (the caller passes the
//! underlying `serde_json::Value` straight through); these functions are
//! only for the default terminal-facing rendering.

use sdlc_core::{DecisionLedgerEntry, EvidenceBundle, GroundingBundle, OpenSpecRef};
use sdlc_engine::{ApproveOutcome, TransitionOutcome};

/// Render a [`TransitionOutcome`] the way an operator reads a CI job result:
/// the applied (or rejected) edge first, then one line per collected error.
pub fn transition_outcome(outcome: &TransitionOutcome) -> String {
    let mut out = String::new();
    match &outcome.applied_transition {
        Some(t) => out.push_str(&format!("ok: {t} (phase={:?})\n", outcome.phase)),
        None => out.push_str(&format!("rejected (phase={:?})\n", outcome.phase)),
    }
    for note in &outcome.notes {
        out.push_str(&format!("  - {note}\n"));
    }
    out
}

/// Render an [`ApproveOutcome`]: the appended decision entry plus the
/// advisory warning, if any.
pub fn approve_outcome(outcome: &ApproveOutcome) -> String {
    let mut out = format!("recorded approval {}\n", outcome.entry.artifact_id);
    if let Some(warning) = &outcome.warning {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out
}

/// Render an [`EvidenceBundle`]: status, then one line per collected item.
pub fn evidence_bundle(bundle: &EvidenceBundle) -> String {
    let mut out = format!("evidence {} status={:?} items={}\n", bundle.artifact_id, bundle.status, bundle.items.len());
    for item in &bundle.items {
        let exit = item.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("  - {} exit={exit}\n", item.name));
    }
    out
}

/// Render the collected errors from a failed `evidence validate` call.
pub fn evidence_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        return "evidence validated\n".to_string();
    }
    let mut out = String::from("evidence rejected\n");
    for e in errors {
        out.push_str(&format!("  - {e}\n"));
    }
    out
}

/// Render the result of `evidence invalidate-if-stale`.
pub fn staleness_result(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!("invalidated: {reason}\n"),
        None => "evidence still fresh\n".to_string(),
    }
}

/// Render a freshly generated [`GroundingBundle`].
pub fn grounding_bundle(bundle: &GroundingBundle) -> String {
    format!("generated grounding {} for bead {}\n", bundle.artifact_id, bundle.bead_id)
}

/// Render a synced [`OpenSpecRef`].
pub fn openspec_ref(entry: &OpenSpecRef) -> String {
    format!("synced openspec ref {} state={:?} change={}\n", entry.artifact_id, entry.state, entry.change_id)
}

/// Render an aborted decision entry.
pub fn decision_entry(entry: &DecisionLedgerEntry) -> String {
    format!("recorded decision {} ({:?})\n", entry.artifact_id, entry.decision_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sdlc_core::Actor;

    #[test]
    fn transition_outcome_renders_applied_edge() {
        let outcome = TransitionOutcome {
            ok: true,
            notes: vec![],
            applied_transition: Some("draft -> sized".to_string()),
            phase: sdlc_core::RunPhase::Plan,
            record_artifact_id: "exec-1".to_string(),
        };
        let rendered = transition_outcome(&outcome);
        assert!(rendered.starts_with("ok: draft -> sized"));
    }

    #[test]
    fn transition_outcome_renders_rejection_notes() {
        let outcome = TransitionOutcome {
            ok: false,
            notes: vec!["BeadReview missing".to_string()],
            applied_transition: None,
            phase: sdlc_core::RunPhase::Plan,
            record_artifact_id: "exec-1".to_string(),
        };
        let rendered = transition_outcome(&outcome);
        assert!(rendered.contains("rejected"));
        assert!(rendered.contains("BeadReview missing"));
    }

    #[test]
    fn approve_outcome_surfaces_warning() {
        let outcome = ApproveOutcome {
            entry: DecisionLedgerEntry {
                schema_name: "decision_ledger_entry".to_string(),
                schema_version: 1,
                artifact_id: "dec-1".to_string(),
                created_at: Utc::now(),
                created_by: Actor::human("alice"),
                links: vec![],
                bead_id: Some("work-abc123".to_string()),
                decision_type: sdlc_core::DecisionType::Approval,
                summary: "looks good".to_string(),
                rationale_md: None,
                expires_at: None,
                waived_acceptance_checks: vec![],
            },
            warning: Some("approval summary does not start with 'APPROVAL:': \"looks good\"".to_string()),
        };
        let rendered = approve_outcome(&outcome);
        assert!(rendered.contains("warning:"));
    }
}
