//! Envelope fields shared by every artifact, and small value types referenced
//! throughout the data model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Who created an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A human operator.
    Human,
    /// An LLM-backed planner/verifier/proposer.
    Agent,
    /// The lifecycle engine itself.
    System,
}

/// The actor that created or requested an artifact/transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Actor {
    /// Broad category of actor.
    pub kind: ActorKind,
    /// Display name.
    pub name: String,
    /// Optional contact email (human actors only, by convention).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
}

impl Actor {
    /// Construct a human actor.
    pub fn human(name: impl Into<String>) -> Self {
        Self { kind: ActorKind::Human, name: name.into(), email: None }
    }

    /// Construct a system actor.
    pub fn system(name: impl Into<String>) -> Self {
        Self { kind: ActorKind::System, name: name.into(), email: None }
    }

    /// Construct an agent actor.
    pub fn agent(name: impl Into<String>) -> Self {
        Self { kind: ActorKind::Agent, name: name.into(), email: None }
    }
}

/// A content hash reference, always SHA-256 today but tagged with the
/// algorithm so the format can evolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HashRef {
    /// Hash algorithm identifier, currently always `"sha256"`.
    pub hash_alg: String,
    /// Lowercase hex digest.
    pub hash: String,
}

/// A reference to a file, optionally pinned to its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FileRef {
    /// Repo-relative path.
    pub path: String,
    /// Content hash at the time this reference was recorded.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content_hash: Option<HashRef>,
}

/// An outbound reference from one artifact to another. Artifacts never hold
/// a typed pointer graph — every link is re-resolved by loading the target
/// from disk by `(artifact_type, artifact_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ArtifactLink {
    /// Logical artifact kind, e.g. `"bead"`, `"boundary_registry"`, `"openspec_ref"`.
    pub artifact_type: String,
    /// Identifier of the target artifact.
    pub artifact_id: String,
    /// `schema_name` of the target, if known at link-creation time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub schema_name: Option<String>,
    /// `schema_version` of the target, if known at link-creation time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub schema_version: Option<u32>,
}

impl ArtifactLink {
    /// Build a link, leaving `schema_name`/`schema_version` unset.
    pub fn new(artifact_type: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            artifact_id: artifact_id.into(),
            schema_name: None,
            schema_version: None,
        }
    }
}

/// Fields every persisted artifact carries, in addition to its type-specific
/// payload. Concrete artifact structs flatten this in via `#[serde(flatten)]`
/// so the wire format is a single flat JSON object with `schema_name` as the
/// type discriminator for the schema registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Registered schema name, e.g. `"bead"`, `"evidence_bundle"`.
    pub schema_name: String,
    /// Schema version for this artifact type.
    pub schema_version: u32,
    /// Identifier of this artifact (6-128 chars).
    pub artifact_id: String,
    /// UTC creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Who created this artifact.
    pub created_by: Actor,
    /// Outbound links to other artifacts.
    #[serde(default)]
    pub links: Vec<ArtifactLink>,
}

impl Envelope {
    /// Construct a new envelope for `schema_name`/`schema_version`, stamped
    /// `now` and attributed to `created_by`.
    pub fn new(
        schema_name: impl Into<String>,
        schema_version: u32,
        artifact_id: impl Into<String>,
        created_at: DateTime<Utc>,
        created_by: Actor,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_version,
            artifact_id: artifact_id.into(),
            created_at,
            created_by,
            links: Vec::new(),
        }
    }

    /// `true` when `artifact_id` is within the 6-128 character bound that
    /// every artifact identifier must satisfy.
    pub fn has_valid_artifact_id_length(&self) -> bool {
        (6..=128).contains(&self.artifact_id.len())
    }
}
