//! The `approval_pending -> done` gate: a single approval check.

use sdlc_core::DecisionLedgerEntry;

/// Evaluate the `approval_pending -> done` edge: passes only when
/// `decision_entries` contains at least one valid approval (human actor,
/// non-empty summary).
pub fn evaluate(decision_entries: &[DecisionLedgerEntry]) -> Vec<String> {
    if decision_entries.iter().any(|e| e.is_valid_approval()) {
        Vec::new()
    } else {
        vec!["Approval DecisionLedgerEntry missing".to_string()]
    }
}
