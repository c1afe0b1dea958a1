//! HTTP request/response envelopes for the daemon's observability surface
//! (§4.7). Handlers in `lib.rs` convert between these and `sdlc-engine`'s
//! own request/outcome types; no lifecycle logic lives here.

use serde::{Deserialize, Serialize};

use sdlc_core::{Actor, ActorKind, Bead, BeadStatus};

/// `GET /api/repo` response: the facts a dashboard needs about the repo this
/// daemon instance is bound to.
#[derive(Debug, Serialize)]
pub struct RepoInfo {
    /// Absolute path to the repo root.
    pub root: String,
    /// `max_files_touched` the engine was configured with.
    pub max_files_touched: usize,
    /// `max_subsystems_touched` the engine was configured with.
    pub max_subsystems_touched: usize,
    /// The discovery allowlist prefixes.
    pub discovery_allowlist: Vec<String>,
}

/// `GET /api/beads` list entry: enough to render a board without fetching
/// every bead's full body.
#[derive(Debug, Serialize)]
pub struct BeadSummary {
    /// The bead id.
    pub bead_id: String,
    /// Current lifecycle status.
    pub status: BeadStatus,
    /// Title.
    pub title: String,
    /// Priority.
    pub priority: u8,
}

impl From<&Bead> for BeadSummary {
    fn from(bead: &Bead) -> Self {
        Self { bead_id: bead.bead_id.clone(), status: bead.status, title: bead.title.clone(), priority: bead.priority }
    }
}

/// `POST /api/beads/{id}/transition` request body.
#[derive(Debug, Deserialize)]
pub struct TransitionRequestBody {
    /// Target status.
    pub to: BeadStatus,
    /// Requesting actor.
    pub actor: ActorPayload,
    /// Files touched since the bead started work.
    #[serde(default)]
    pub touched_files: Vec<String>,
}

/// `POST /api/beads/{id}/approve` request body.
#[derive(Debug, Deserialize)]
pub struct ApproveRequestBody {
    /// Approval summary; should start with `"APPROVAL:"`.
    pub summary: String,
    /// Requesting actor.
    pub actor: ActorPayload,
}

/// `POST /api/beads/{id}/abort` request body.
#[derive(Debug, Deserialize)]
pub struct AbortRequestBody {
    /// Abort reason.
    pub reason: String,
    /// Requesting actor.
    pub actor: ActorPayload,
}

/// `POST .../evidence/*` and `.../grounding/generate` request body: only the
/// requesting actor is needed.
#[derive(Debug, Deserialize, Default)]
pub struct ActorOnlyBody {
    /// Requesting actor; defaults to a system actor named `"sdlc-daemon"`
    /// when omitted, matching a scheduled/automated caller.
    #[serde(default = "default_actor")]
    pub actor: ActorPayload,
}

fn default_actor() -> ActorPayload {
    ActorPayload { kind: ActorKindPayload::System, name: "sdlc-daemon".to_string() }
}

/// Wire representation of [`Actor`].
#[derive(Debug, Deserialize, Serialize)]
pub struct ActorPayload {
    /// Actor kind.
    pub kind: ActorKindPayload,
    /// Actor display name.
    pub name: String,
}

impl ActorPayload {
    /// Convert into the core [`Actor`] type.
    pub fn into_actor(self) -> Actor {
        match self.kind {
            ActorKindPayload::Human => Actor::human(self.name),
            ActorKindPayload::Agent => Actor::agent(self.name),
            ActorKindPayload::System => Actor::system(self.name),
        }
    }
}

/// Wire representation of [`ActorKind`].
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKindPayload {
    /// A human operator.
    Human,
    /// An autonomous agent.
    Agent,
    /// The engine itself.
    System,
}

impl From<ActorKindPayload> for ActorKind {
    fn from(value: ActorKindPayload) -> Self {
        match value {
            ActorKindPayload::Human => ActorKind::Human,
            ActorKindPayload::Agent => ActorKind::Agent,
            ActorKindPayload::System => ActorKind::System,
        }
    }
}

/// `GET /api/beads/{id}/artifacts` response: which per-bead artifact files
/// currently exist on disk.
#[derive(Debug, Serialize)]
pub struct ArtifactIndex {
    /// `bead.json` always exists for a known bead.
    pub bead: bool,
    /// `bead_review.json`.
    pub review: bool,
    /// `grounding.json`.
    pub grounding: bool,
    /// `evidence.json`.
    pub evidence: bool,
    /// `openspec_ref.json`.
    pub openspec_ref: bool,
    /// `ready_acceptance_hash.json`.
    pub ready_acceptance_hash: bool,
}
