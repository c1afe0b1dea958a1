#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-store
//!
//! The filesystem layer (§4.6): where artifacts live ([`paths`]), how a
//! single artifact is read and atomically written ([`artifact`]), and how
//! the two append-only NDJSON logs are appended to and read ([`ndjson`]).
//! `sdlc-gates`/`sdlc-engine` depend on this crate for every disk access;
//! nothing above this layer touches `std::fs` directly.

mod artifact;
mod ndjson;
mod paths;

pub use artifact::{artifact_exists, read_artifact, write_artifact_atomic};
pub use ndjson::{append_line, read_lines};
pub use paths::RepoPaths;

use sdlc_core::{DecisionLedgerEntry, ExecutionRecord};
use sdlc_error::SdlcError;

/// Append an [`ExecutionRecord`] to `runs/journal.jsonl`.
pub fn append_execution_record(paths: &RepoPaths, record: &ExecutionRecord) -> Result<(), SdlcError> {
    append_line(&paths.journal(), record)
}

/// Read every [`ExecutionRecord`] ever appended to `runs/journal.jsonl`, in
/// file order (oldest first).
pub fn read_journal(paths: &RepoPaths) -> Result<Vec<ExecutionRecord>, SdlcError> {
    read_lines(&paths.journal())
}

/// Read the journal filtered to a single bead, in file order.
pub fn read_journal_for_bead(paths: &RepoPaths, bead_id: &str) -> Result<Vec<ExecutionRecord>, SdlcError> {
    Ok(read_journal(paths)?.into_iter().filter(|r| r.bead_id == bead_id).collect())
}

/// Append a [`DecisionLedgerEntry`] to `decision_ledger.jsonl`.
pub fn append_decision_entry(paths: &RepoPaths, entry: &DecisionLedgerEntry) -> Result<(), SdlcError> {
    append_line(&paths.decision_ledger(), entry)
}

/// Read every [`DecisionLedgerEntry`] ever appended, in file order.
pub fn read_decision_ledger(paths: &RepoPaths) -> Result<Vec<DecisionLedgerEntry>, SdlcError> {
    read_lines(&paths.decision_ledger())
}

/// Read the decision ledger filtered to a single bead, in file order.
pub fn read_decision_ledger_for_bead(paths: &RepoPaths, bead_id: &str) -> Result<Vec<DecisionLedgerEntry>, SdlcError> {
    Ok(read_decision_ledger(paths)?.into_iter().filter(|e| e.bead_id.as_deref() == Some(bead_id)).collect())
}
