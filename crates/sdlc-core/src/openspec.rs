//! Link to an external specification artifact consumed by the
//! `ready -> in_progress` gate for implementation beads.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ArtifactLink, HashRef};

/// `schema_name` under which openspec refs are registered.
pub const SCHEMA_NAME: &str = "openspec_ref";
/// Current `schema_version` for [`OpenSpecRef`].
pub const SCHEMA_VERSION: u32 = 1;

/// Lifecycle of an external specification change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OpenSpecState {
    /// Drafted, not yet approved.
    Proposal,
    /// Approved; implementation beads may reference it.
    Approved,
    /// Superseded by a later change.
    Superseded,
}

/// A reference to an external specification artifact. `openspec sync` copies
/// the `approved` ref from `openspec/refs/<artifact_id>.json` into a bead's
/// `runs/<bead_id>/openspec_ref.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OpenSpecRef {
    /// Registered schema name; always `"openspec_ref"`.
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

    /// The change id in `openspec/changes/<change_id>/`.
    pub change_id: String,
    /// Approval state.
    pub state: OpenSpecState,
    /// Repo-relative path to the underlying spec content.
    pub path: String,
    /// When the change was approved.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Who approved the change.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approved_by: Option<Actor>,
    /// Content hash of the spec at approval time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content_hash: Option<HashRef>,
}
