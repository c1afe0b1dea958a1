//! The acceptance-checks snapshot the `sized -> ready` gate freezes, and the
//! `ready -> in_progress` gate checks against.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use sdlc_core::HashRef;

/// Persisted as `runs/<bead_id>/ready_acceptance_hash.json`. Freezes the
/// acceptance checks a bead carried the moment it left `sized`, so a later
/// edit can't silently weaken (or strengthen) what `verified` attests to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadyAcceptanceSnapshot {
    /// The bead this snapshot belongs to.
    pub bead_id: String,
    /// Canonical hash of `bead.acceptance_checks` at the moment of freezing.
    pub acceptance_checks_hash: HashRef,
    /// Canonical hash of the whole bead at the moment of freezing.
    pub bead_hash: HashRef,
}
