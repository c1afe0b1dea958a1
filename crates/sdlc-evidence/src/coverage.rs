//! Acceptance-check coverage: does a collected [`EvidenceBundle`] actually
//! demonstrate that each of a bead's acceptance checks ran, accounting for
//! waivers recorded in the decision ledger?

use chrono::{DateTime, Utc};
use sdlc_core::{AcceptanceCheck, ActorKind, Bead, DecisionLedgerEntry, EvidenceBundle};

/// For each acceptance check not waived by an active exception entry,
/// require at least one of three kinds of coverage: a command-match (an
/// item whose `command` and `exit_code` agree with the check), a
/// human-summary (a human-created bundle with an item whose `summary_md`
/// names the check), or an output-match (an attached file whose path and
/// content hash match one of the check's `expected_outputs`).
pub fn acceptance_coverage_errors(
    bead: &Bead,
    evidence: &EvidenceBundle,
    decision_entries: &[DecisionLedgerEntry],
    now: DateTime<Utc>,
) -> Vec<String> {
    let waived: std::collections::BTreeSet<&str> = decision_entries
        .iter()
        .filter(|e| e.bead_id.as_deref() == Some(bead.bead_id.as_str()) && e.is_active_exception(now))
        .flat_map(|e| e.waived_acceptance_checks.iter().map(String::as_str))
        .collect();

    let mut errors = Vec::new();
    for check in &bead.acceptance_checks {
        if waived.contains(check.name.as_str()) {
            continue;
        }
        if !is_covered(check, evidence) {
            errors.push(format!(
                "Acceptance check '{}' not covered by evidence (no command-match, human-summary, or output-match)",
                check.name
            ));
        }
    }
    errors
}

fn is_covered(check: &AcceptanceCheck, evidence: &EvidenceBundle) -> bool {
    let command_match = evidence
        .items
        .iter()
        .any(|item| item.command.as_deref() == Some(check.command.as_str()) && item.exit_code == Some(check.expect_exit_code));

    let human_summary = evidence.created_by.kind == ActorKind::Human
        && evidence.items.iter().any(|item| {
            item.summary_md.as_deref().is_some_and(|s| s.contains(check.name.as_str()))
        });

    let output_match = evidence.items.iter().any(|item| {
        item.attachments
            .iter()
            .any(|att| check.expected_outputs.iter().any(|exp| exp.path == att.path && exp.content_hash == att.content_hash))
    });

    command_match || human_summary || output_match
}
