//! `evidence_validation_errors`: the gate-facing entry point run at
//! `verification_pending -> verified`, plus `mark_validated` for committing
//! a clean result.

use chrono::{DateTime, Utc};
use sdlc_core::{ActorKind, Bead, DecisionLedgerEntry, EvidenceBundle, EvidenceItem, EvidenceType, canonical_hash};

use crate::coverage::acceptance_coverage_errors;

/// Validate `evidence` against `bead`, in the fixed order: hash binding,
/// manual-check requirement, acceptance coverage, then per-check exit-code
/// resolution. Every stage runs and contributes its own errors — an early
/// failure never suppresses a later one.
pub fn evidence_validation_errors(
    bead: &Bead,
    evidence: &EvidenceBundle,
    decision_entries: &[DecisionLedgerEntry],
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut errors = Vec::new();

    match &evidence.for_bead_hash {
        None => errors.push("EvidenceBundle.for_bead_hash missing".to_string()),
        Some(hash) if *hash != canonical_hash(bead) => {
            errors.push("EvidenceBundle.for_bead_hash does not match bead hash; evidence is stale".to_string());
        }
        Some(_) => {}
    }

    for item in &evidence.items {
        if item.evidence_type != EvidenceType::ManualCheck {
            continue;
        }
        if evidence.created_by.kind != ActorKind::Human {
            errors.push(format!("Manual check evidence item '{}' requires a human bundle creator", item.name));
        }
        if item.summary_md.as_deref().is_none_or(|s| s.trim().is_empty()) {
            errors.push(format!("Manual check evidence item '{}' missing summary_md", item.name));
        }
    }

    errors.extend(acceptance_coverage_errors(bead, evidence, decision_entries, now));

    for check in &bead.acceptance_checks {
        match find_item_for_check(evidence, check) {
            None => errors.push(format!("Missing evidence for command check '{}'", check.name)),
            Some(item) => match item.exit_code {
                None => errors.push(format!("Evidence item {} missing exit_code", check.name)),
                Some(actual) if actual != check.expect_exit_code => errors.push(format!(
                    "Evidence item {} expected exit_code {} got {}",
                    check.name, check.expect_exit_code, actual
                )),
                Some(_) => {}
            },
        }
    }

    errors
}

/// Resolve the evidence item for an acceptance check: by `name` first, then
/// by `command`.
fn find_item_for_check<'a>(evidence: &'a EvidenceBundle, check: &sdlc_core::AcceptanceCheck) -> Option<&'a EvidenceItem> {
    evidence
        .items
        .iter()
        .find(|item| item.name == check.name)
        .or_else(|| evidence.items.iter().find(|item| item.command.as_deref() == Some(check.command.as_str())))
}

/// Commit a clean validation result: `status = validated`, `for_bead_hash`
/// refreshed to the current bead hash. Caller persists.
pub fn mark_validated(bead: &Bead, evidence: &mut EvidenceBundle) {
    evidence.status = sdlc_core::EvidenceStatus::Validated;
    evidence.for_bead_hash = Some(canonical_hash(bead));
    evidence.invalidated_reason = None;
}
