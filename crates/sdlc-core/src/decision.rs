//! One human/system judgment recorded in the append-only decision ledger.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ArtifactLink};

/// `schema_name` under which decision ledger entries are registered.
pub const SCHEMA_NAME: &str = "decision_ledger_entry";
/// Current `schema_version` for [`DecisionLedgerEntry`].
pub const SCHEMA_VERSION: u32 = 1;

/// What kind of judgment a [`DecisionLedgerEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// Human sign-off required to move `approval_pending -> done`.
    Approval,
    /// A recorded assumption made during planning or implementation.
    Assumption,
    /// A recorded tradeoff.
    Tradeoff,
    /// A documented exception, required when `execution_profile ==
    /// exception`; may also waive specific acceptance checks.
    Exception,
    /// A recorded change of scope.
    ScopeChange,
}

/// One human/system judgment. Appended to `decision_ledger.jsonl`; never
/// mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DecisionLedgerEntry {
    /// Registered schema name; always `"decision_ledger_entry"`.
    pub schema_name: String,
    /// Schema version.
    pub schema_version: u32,
    /// Identifier of this artifact.
    pub artifact_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: Actor,
    /// Outbound links.
    #[serde(default)]
    pub links: Vec<ArtifactLink>,

    /// The bead this decision concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bead_id: Option<String>,
    /// What kind of judgment this is.
    pub decision_type: DecisionType,
    /// Short summary; required non-empty for approvals.
    pub summary: String,
    /// Extended rationale.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rationale_md: Option<String>,
    /// When this decision stops being active (exceptions only, typically).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Acceptance check names this decision waives from evidence coverage.
    #[serde(default)]
    pub waived_acceptance_checks: Vec<String>,
}

impl DecisionLedgerEntry {
    /// `true` for an [`DecisionType::Exception`] entry that has not expired
    /// and carries a non-empty summary — the exact condition the
    /// `ready->in_progress` gate requires for `execution_profile ==
    /// exception` beads.
    pub fn is_active_exception(&self, now: DateTime<Utc>) -> bool {
        self.decision_type == DecisionType::Exception
            && !self.summary.trim().is_empty()
            && self.expires_at.is_none_or(|exp| exp > now)
    }

    /// `true` for an [`DecisionType::Approval`] entry created by a human
    /// actor with a non-empty summary — the exact condition the
    /// `approval_pending->done` gate requires.
    pub fn is_valid_approval(&self) -> bool {
        self.decision_type == DecisionType::Approval
            && self.created_by.kind == crate::common::ActorKind::Human
            && !self.summary.trim().is_empty()
    }
}
