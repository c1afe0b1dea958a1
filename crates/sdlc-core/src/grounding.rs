//! Curated context pack + policy for an implementation attempt.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ArtifactLink, FileRef, HashRef};

/// `schema_name` under which grounding bundles are registered.
pub const SCHEMA_NAME: &str = "grounding_bundle";
/// Current `schema_version` for [`GroundingBundle`].
pub const SCHEMA_VERSION: u32 = 1;

/// The kind of content a [`GroundingItem`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroundingItemKind {
    /// A curated file snippet.
    File,
    /// Documentation for an API the bead is expected to use.
    Api,
    /// A pattern to imitate elsewhere in the codebase.
    Pattern,
    /// An allowed or illustrative command.
    Command,
    /// A free-form note.
    Note,
}

/// One curated piece of context handed to the implementation subprocess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GroundingItem {
    /// What this item is.
    pub kind: GroundingItemKind,
    /// Short title.
    pub title: String,
    /// Markdown body.
    pub content_md: String,
    /// Source file, if this item was extracted from one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_ref: Option<FileRef>,
}

/// Context pack + command/path policy for a bead's implementation attempt;
/// required to move `ready -> in_progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GroundingBundle {
    /// Registered schema name; always `"grounding_bundle"`.
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

    /// The bead this grounding pack was generated for.
    pub bead_id: String,
    /// Canonical hash of the bead at generation time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub generated_for_bead_hash: Option<HashRef>,
    /// Curated context items.
    #[serde(default)]
    pub items: Vec<GroundingItem>,
    /// Command patterns the implementation subprocess may run.
    #[serde(default)]
    pub allowed_commands: Vec<String>,
    /// Command patterns the implementation subprocess may not run.
    #[serde(default)]
    pub disallowed_commands: Vec<String>,
    /// Path prefixes excluded from the implementation subprocess's view.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Free-form summary of the grounding strategy.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary_md: Option<String>,
}
