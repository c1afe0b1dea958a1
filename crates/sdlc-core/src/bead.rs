//! The bead: the unit of work traversing the lifecycle, plus its legal
//! state-machine edges.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ArtifactLink};

/// `schema_name` under which beads are registered.
pub const SCHEMA_NAME: &str = "bead";
/// Current `schema_version` for [`Bead`].
pub const SCHEMA_VERSION: u32 = 1;

/// Whether a bead is implementation work (touches production code, subject
/// to the file/subsystem boundary budget) or discovery work (exploratory,
/// confined to the discovery allowlist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BeadType {
    /// Production-code change, bounded by the boundary enforcer's budget.
    Implementation,
    /// Exploratory work, confined to the discovery allowlist.
    Discovery,
}

/// Lifecycle status of a bead. `AbortedNeedsDiscovery` serializes to the
/// literal, colon-containing string `"aborted:needs-discovery"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BeadStatus {
    /// Freshly created, not yet sized.
    Draft,
    /// Sized and reviewed; not yet frozen for work.
    Sized,
    /// Acceptance checks frozen; ready to start.
    Ready,
    /// Actively being implemented.
    InProgress,
    /// Implementation complete; awaiting evidence validation.
    VerificationPending,
    /// Evidence validated and boundaries respected.
    Verified,
    /// Awaiting human approval.
    ApprovalPending,
    /// Terminal: approved and complete.
    Done,
    /// Non-terminal failure state; may be retried via the failure edges.
    Blocked,
    /// Non-terminal: boundary or scope violation requires a discovery bead.
    #[serde(rename = "aborted:needs-discovery")]
    AbortedNeedsDiscovery,
    /// Terminal: could not be completed.
    Failed,
    /// Terminal: superseded by another bead or change.
    Superseded,
}

impl BeadStatus {
    /// Terminal statuses permit no outbound edge except to [`Self::Superseded`].
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Superseded)
    }

    /// Wire representation, matching the `serde(rename_all)`/`rename` above.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sized => "sized",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::VerificationPending => "verification_pending",
            Self::Verified => "verified",
            Self::ApprovalPending => "approval_pending",
            Self::Done => "done",
            Self::Blocked => "blocked",
            Self::AbortedNeedsDiscovery => "aborted:needs-discovery",
            Self::Failed => "failed",
            Self::Superseded => "superseded",
        }
    }
}

/// How strictly acceptance-check execution is sandboxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionProfile {
    /// Default: isolated sandbox.
    Sandbox,
    /// Mirrors the CI environment more closely.
    CiLike,
    /// Requires an active exception [`crate::DecisionType::Exception`] entry.
    Exception,
}

impl Default for ExecutionProfile {
    fn default() -> Self {
        Self::Sandbox
    }
}

/// One acceptance check a bead must pass before evidence can validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AcceptanceCheck {
    /// Unique (within this bead) identifier for the check.
    pub name: String,
    /// Shell command to execute.
    pub command: String,
    /// Working directory, relative to the repo root.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cwd: Option<String>,
    /// Maximum wall-clock seconds before the check is treated as a failure.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_seconds: Option<u64>,
    /// Exit code that counts as success.
    #[serde(default = "default_expect_exit_code")]
    pub expect_exit_code: i32,
    /// Output files whose content hash is checked as alternate evidence of
    /// having run this check.
    #[serde(default)]
    pub expected_outputs: Vec<crate::common::FileRef>,
}

fn default_expect_exit_code() -> i32 {
    0
}

/// The unit of work traversing the lifecycle state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Bead {
    /// Registered schema name; always `"bead"`.
    pub schema_name: String,
    /// Schema version.
    pub schema_version: u32,
    /// Identifier of this artifact; must equal `bead_id`.
    pub artifact_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: Actor,
    /// Outbound links.
    #[serde(default)]
    pub links: Vec<ArtifactLink>,

    /// Stable identifier, matching `^work-[a-z0-9]+(\.[a-z0-9]+)?$`.
    pub bead_id: String,
    /// Short human title.
    pub title: String,
    /// Implementation vs. discovery.
    pub bead_type: BeadType,
    /// Current lifecycle status.
    pub status: BeadStatus,
    /// 1 (lowest) to 5 (highest), default 3.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Optional human owner.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<String>,
    /// Link to an approved external specification artifact.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub openspec_ref: Option<ArtifactLink>,
    /// Link to the boundary registry this bead is evaluated against; falls
    /// back to the default registry path when absent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub boundary_registry_ref: Option<ArtifactLink>,
    /// Free-form requirements description.
    #[serde(default)]
    pub requirements_md: String,
    /// Free-form acceptance criteria description.
    #[serde(default)]
    pub acceptance_criteria_md: String,
    /// Free-form context notes.
    #[serde(default)]
    pub context_md: String,
    /// Acceptance checks; frozen once the bead reaches `ready`.
    #[serde(default)]
    pub acceptance_checks: Vec<AcceptanceCheck>,
    /// Execution sandboxing profile.
    #[serde(default)]
    pub execution_profile: ExecutionProfile,
    /// Other beads that must be `done` before this one may start.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Soft budget on implementation wall-clock time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_elapsed_minutes: Option<u32>,
    /// Soft budget on human interventions during implementation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_interventions: Option<u32>,
}

fn default_priority() -> u8 {
    3
}

impl Bead {
    /// `true` when `bead_id` matches `^work-[a-z0-9]+(\.[a-z0-9]+)?$`.
    pub fn has_valid_bead_id(&self) -> bool {
        is_valid_bead_id(&self.bead_id)
    }

    /// `true` when the invariant `artifact_id == bead_id` holds.
    pub fn artifact_id_matches_bead_id(&self) -> bool {
        self.artifact_id == self.bead_id
    }
}

/// Validate the `^work-[a-z0-9]+(\.[a-z0-9]+)?$` bead-id pattern without
/// pulling in a regex dependency.
pub fn is_valid_bead_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("work-") else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let (first, second) = match rest.split_once('.') {
        Some((a, b)) => (a, Some(b)),
        None => (rest, None),
    };
    let is_alnum_lower = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !is_alnum_lower(first) {
        return false;
    }
    match second {
        Some(s) => is_alnum_lower(s),
        None => true,
    }
}

/// Legal edges of the lifecycle state machine (happy path plus the four
/// failure edges available from any non-terminal status). This table is the
/// single source of truth `sdlc-gates`/`sdlc-engine` consult for edge
/// legality; it never changes at runtime.
pub fn legal_edge(from: BeadStatus, to: BeadStatus) -> bool {
    use BeadStatus::*;
    if from.is_terminal() {
        return matches!(to, Superseded);
    }
    let happy_path = matches!(
        (from, to),
        (Draft, Sized)
            | (Sized, Ready)
            | (Ready, InProgress)
            | (InProgress, VerificationPending)
            | (VerificationPending, Verified)
            | (Verified, ApprovalPending)
            | (ApprovalPending, Done)
    );
    happy_path || matches!(to, Blocked | AbortedNeedsDiscovery | Failed | Superseded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bead_id_pattern() {
        assert!(is_valid_bead_id("work-abc123"));
        assert!(is_valid_bead_id("work-abc123.def4"));
        assert!(!is_valid_bead_id("work-"));
        assert!(!is_valid_bead_id("work-ABC"));
        assert!(!is_valid_bead_id("bead-abc"));
        assert!(!is_valid_bead_id("work-abc.DEF"));
    }

    #[test]
    fn happy_path_is_legal() {
        use BeadStatus::*;
        assert!(legal_edge(Draft, Sized));
        assert!(legal_edge(Sized, Ready));
        assert!(legal_edge(Ready, InProgress));
        assert!(legal_edge(InProgress, VerificationPending));
        assert!(legal_edge(VerificationPending, Verified));
        assert!(legal_edge(Verified, ApprovalPending));
        assert!(legal_edge(ApprovalPending, Done));
    }

    #[test]
    fn failure_edges_available_from_any_nonterminal_state() {
        use BeadStatus::*;
        for from in [Draft, Sized, Ready, InProgress, VerificationPending, Verified, ApprovalPending, Blocked] {
            assert!(legal_edge(from, Blocked));
            assert!(legal_edge(from, AbortedNeedsDiscovery));
            assert!(legal_edge(from, Failed));
            assert!(legal_edge(from, Superseded));
        }
    }

    #[test]
    fn terminal_states_only_permit_superseded() {
        use BeadStatus::*;
        for from in [Done, Failed, Superseded] {
            assert!(legal_edge(from, Superseded));
            assert!(!legal_edge(from, Blocked));
            assert!(!legal_edge(from, Draft));
        }
    }

    #[test]
    fn skipping_a_happy_path_step_is_illegal() {
        use BeadStatus::*;
        assert!(!legal_edge(Draft, Ready));
        assert!(!legal_edge(Sized, InProgress));
        assert!(!legal_edge(Ready, Done));
    }

    #[test]
    fn status_wire_strings_match_serde_rename() {
        assert_eq!(BeadStatus::AbortedNeedsDiscovery.as_wire_str(), "aborted:needs-discovery");
        let v = serde_json::to_value(BeadStatus::AbortedNeedsDiscovery).unwrap();
        assert_eq!(v, serde_json::json!("aborted:needs-discovery"));
    }
}
