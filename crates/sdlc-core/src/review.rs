//! Sizing/splitting verdict required to move a bead from `sized` to `ready`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::bead::{AcceptanceCheck, BeadType};
use crate::common::{Actor, ArtifactLink, HashRef};

/// `schema_name` under which bead reviews are registered.
pub const SCHEMA_NAME: &str = "bead_review";
/// Current `schema_version` for [`BeadReview`].
pub const SCHEMA_VERSION: u32 = 1;

/// Sizing bucket. `XL` is forbidden — it must be split before `ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EffortBucket {
    /// Small.
    S,
    /// Medium.
    M,
    /// Large.
    L,
    /// Extra-large; forbidden at `sized->ready`.
    Xl,
}

/// Risk flags a reviewer may raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    /// Requirements reference unknowns the bead cannot resolve alone.
    Unknowns,
    /// A dependency is risky, missing, or unclear.
    DependencyHazard,
    /// Acceptance criteria are underspecified.
    UnclearAcceptance,
    /// Touches more than one subsystem boundary.
    CrossBoundaryChange,
    /// A design decision is assumed but not recorded.
    DesignDecisionMissing,
    /// Likely to touch more files than the boundary budget allows.
    TooManyFiles,
    /// Likely to touch more subsystems than the boundary budget allows.
    TooManySubsystems,
    /// Bundles more than one primary concern; a split candidate.
    MultiplePrimaryConcerns,
}

/// One proposed child bead in a [`SplitProposal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProposedBeadDraft {
    /// Working title for the split-off bead.
    pub title: String,
    /// Implementation vs. discovery.
    pub bead_type: BeadType,
    /// Draft requirements.
    pub requirements_md: String,
    /// Draft acceptance criteria.
    pub acceptance_criteria_md: String,
    /// Draft context notes.
    pub context_md: String,
    /// Other (already-existing or sibling draft) bead ids this depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// A reviewer's proposal to split a bead into smaller units of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SplitProposal {
    /// Draft child beads.
    pub proposed_beads: Vec<ProposedBeadDraft>,
    /// Why the split is needed.
    pub rationale: String,
}

/// Sizing/splitting verdict; required to move `sized -> ready`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BeadReview {
    /// Registered schema name; always `"bead_review"`.
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

    /// The bead this review covers.
    pub bead_id: String,
    /// Canonical hash of the bead at review time, for staleness detection.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reviewed_bead_hash: Option<HashRef>,
    /// Sizing bucket; `XL` forbids `sized->ready`.
    pub effort_bucket: EffortBucket,
    /// Risk flags raised during review.
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    /// Reviewer's estimate of files touched.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimated_files_touched: Option<u32>,
    /// Reviewer's estimate of subsystems touched.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimated_subsystems_touched: Option<Vec<String>>,
    /// Acceptance checks to adopt onto the bead at `sized->ready`, replacing
    /// whatever the bead currently declares.
    #[serde(default)]
    pub tightened_acceptance_checks: Vec<AcceptanceCheck>,
    /// Reviewer's recommendation that the bead be split; informational, the
    /// `sized->ready` gate itself only enforces `effort_bucket != XL`.
    #[serde(default)]
    pub split_required: bool,
    /// Proposed split, when `split_required` is set.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub split_proposal: Option<SplitProposal>,
    /// Free-form reviewer notes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}
