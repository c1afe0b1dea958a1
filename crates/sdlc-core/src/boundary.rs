//! Named subsystems used to bound the blast radius of a change.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ArtifactLink};

/// `schema_name` under which boundary registries are registered.
pub const SCHEMA_NAME: &str = "boundary_registry";
/// Current `schema_version` for [`BoundaryRegistry`].
pub const SCHEMA_VERSION: u32 = 1;

/// A named subsystem: a set of path prefixes and informational invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Subsystem {
    /// Subsystem name.
    pub name: String,
    /// Path prefixes (repo-relative) that attribute a changed file to this
    /// subsystem.
    pub paths: Vec<String>,
    /// Free-form invariants this subsystem is expected to uphold.
    #[serde(default)]
    pub invariants: Vec<String>,
}

/// The registry of named subsystems, loaded from `sdlc/boundary_registry.json`
/// (or a bead-specific override) by the boundary enforcer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BoundaryRegistry {
    /// Registered schema name; always `"boundary_registry"`.
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

    /// Display name for this registry.
    pub registry_name: String,
    /// The registered subsystems.
    #[serde(default)]
    pub subsystems: Vec<Subsystem>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}
