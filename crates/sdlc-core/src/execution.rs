//! The journal: one append-only `ExecutionRecord` per attempted transition
//! or evidence/boundary evaluation.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ArtifactLink, FileRef};

/// `schema_name` under which execution records are registered.
pub const SCHEMA_NAME: &str = "execution_record";
/// Current `schema_version` for [`ExecutionRecord`].
pub const SCHEMA_VERSION: u32 = 1;

/// Which phase of work an [`ExecutionRecord`] belongs to, inferred from the
/// target status of the transition it accompanies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Sizing/review work (`draft->sized`, `sized->ready`).
    Plan,
    /// Implementation work (`ready->in_progress`, `in_progress->verification_pending`).
    Implement,
    /// Verification/approval work (`verified`, `approval_pending`, `done`).
    Verify,
}

/// VCS head/dirty snapshot before and after an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GitRef {
    /// HEAD commit before the attempt, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub head_before: Option<String>,
    /// HEAD commit after the attempt, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub head_after: Option<String>,
    /// Working tree dirty before the attempt, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dirty_before: Option<bool>,
    /// Working tree dirty after the attempt, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dirty_after: Option<bool>,
}

/// One entry in the append-only journal (`runs/journal.jsonl`); recorded for
/// every attempted transition, whether accepted or rejected, and for
/// out-of-band evaluations (evidence invalidation) that need an audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExecutionRecord {
    /// Registered schema name; always `"execution_record"`.
    pub schema_name: String,
    /// Schema version.
    pub schema_version: u32,
    /// Identifier of this artifact.
    pub artifact_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: Actor,
    /// Outbound links (e.g. to the boundary registry evaluated).
    #[serde(default)]
    pub links: Vec<ArtifactLink>,

    /// The bead this record concerns.
    pub bead_id: String,
    /// Inferred lifecycle phase.
    pub phase: RunPhase,
    /// Engine version that produced this record.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub engine_version: Option<String>,
    /// Policy/config version in effect.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub policy_version: Option<String>,
    /// Container image used for acceptance-check execution, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub container_image: Option<String>,
    /// Container image digest, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub container_digest: Option<String>,
    /// Commands executed as part of this attempt.
    #[serde(default)]
    pub commands: Vec<String>,
    /// Overall exit code for this attempt (0 typically means accepted).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exit_code: Option<i32>,
    /// Artifacts this attempt produced or refreshed.
    #[serde(default)]
    pub produced_artifacts: Vec<FileRef>,
    /// VCS state before/after.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub git: Option<GitRef>,
    /// Free-form notes (e.g. invalidation reasons).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes_md: Option<String>,
    /// The `"from -> to"` edge that was requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub requested_transition: Option<String>,
    /// The `"from -> to"` edge that was actually applied; `None` when the
    /// attempt was rejected.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub applied_transition: Option<String>,
}
