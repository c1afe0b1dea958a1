//! Collected acceptance-check/test/verification results.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ArtifactLink, FileRef, HashRef};

/// `schema_name` under which evidence bundles are registered.
pub const SCHEMA_NAME: &str = "evidence_bundle";
/// Current `schema_version` for [`EvidenceBundle`].
pub const SCHEMA_VERSION: u32 = 1;

/// How a single [`EvidenceItem`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// A test-suite run.
    TestRun,
    /// A linter run.
    Lint,
    /// A typechecker run.
    Typecheck,
    /// A benchmark run.
    Benchmark,
    /// Comparison against a golden/reference output.
    GoldenCompare,
    /// A human-attested manual check.
    ManualCheck,
    /// Evidence pulled from a CI run.
    CiRun,
}

/// Validation state of an [`EvidenceBundle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    /// Collected but not yet validated.
    Collected,
    /// Validated against the current bead hash and boundary policy.
    Validated,
    /// Previously validated, now stale.
    Invalidated,
}

impl Default for EvidenceStatus {
    fn default() -> Self {
        Self::Collected
    }
}

/// One collected evidence item (a single acceptance-check run, or a manual
/// attestation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EvidenceItem {
    /// Name, matched first against an [`crate::bead::AcceptanceCheck::name`].
    pub name: String,
    /// What kind of evidence this is.
    pub evidence_type: EvidenceType,
    /// Command executed, if any; matched second against
    /// [`crate::bead::AcceptanceCheck::command`].
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub command: Option<String>,
    /// Process exit code, if the evidence came from running a command.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exit_code: Option<i32>,
    /// When the underlying run started.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the underlying run finished.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Captured output files / logs.
    #[serde(default)]
    pub attachments: Vec<FileRef>,
    /// Free-form summary; required and non-empty for `manual_check` items.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary_md: Option<String>,
}

/// Collected test/verification results for a bead; required (and
/// `status == validated`) to move `verification_pending -> verified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EvidenceBundle {
    /// Registered schema name; always `"evidence_bundle"`.
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

    /// The bead this evidence was collected for.
    pub bead_id: String,
    /// SHA-256 of the canonical bead payload at collection/validation time.
    /// Binds evidence to a specific bead revision.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub for_bead_hash: Option<HashRef>,
    /// Validation state.
    #[serde(default)]
    pub status: EvidenceStatus,
    /// Collected items.
    #[serde(default)]
    pub items: Vec<EvidenceItem>,
    /// `;`-joined reasons the bundle was last invalidated, if ever.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub invalidated_reason: Option<String>,
}
