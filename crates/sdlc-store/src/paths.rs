//! Filesystem layout: where every artifact, the journal, and the decision
//! ledger live relative to a repo root.

use std::path::{Path, PathBuf};

/// The on-disk layout rooted at a repo checkout.
#[derive(Debug, Clone)]
pub struct RepoPaths {
    root: PathBuf,
}

impl RepoPaths {
    /// Root the layout at `root` (the repo checkout, i.e. the directory
    /// containing `.git`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The repo root itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `runs/<bead_id>/`, the directory holding every per-bead artifact.
    pub fn bead_dir(&self, bead_id: &str) -> PathBuf {
        self.root.join("runs").join(bead_id)
    }

    /// `runs/<bead_id>/bead.json`.
    pub fn bead_json(&self, bead_id: &str) -> PathBuf {
        self.bead_dir(bead_id).join("bead.json")
    }

    /// `runs/<bead_id>/bead_review.json`.
    pub fn review_json(&self, bead_id: &str) -> PathBuf {
        self.bead_dir(bead_id).join("bead_review.json")
    }

    /// `runs/<bead_id>/grounding.json`.
    pub fn grounding_json(&self, bead_id: &str) -> PathBuf {
        self.bead_dir(bead_id).join("grounding.json")
    }

    /// `runs/<bead_id>/evidence.json`.
    pub fn evidence_json(&self, bead_id: &str) -> PathBuf {
        self.bead_dir(bead_id).join("evidence.json")
    }

    /// `runs/<bead_id>/openspec_ref.json`.
    pub fn openspec_ref_json(&self, bead_id: &str) -> PathBuf {
        self.bead_dir(bead_id).join("openspec_ref.json")
    }

    /// `runs/<bead_id>/ready_acceptance_hash.json`, the acceptance-checks
    /// snapshot frozen by the `sized -> ready` gate.
    pub fn ready_acceptance_hash_json(&self, bead_id: &str) -> PathBuf {
        self.bead_dir(bead_id).join("ready_acceptance_hash.json")
    }

    /// `openspec/refs/<artifact_id>.json`, the canonical `OpenSpecRef`
    /// registry entry that `openspec sync` copies into a bead's
    /// `openspec_ref.json`.
    pub fn openspec_ref_registry_json(&self, artifact_id: &str) -> PathBuf {
        self.root.join("openspec").join("refs").join(format!("{artifact_id}.json"))
    }

    /// `openspec/changes/<change_id>/`, the directory holding the change
    /// proposal `openspec sync` reads to refresh a ref's state.
    pub fn openspec_change_dir(&self, change_id: &str) -> PathBuf {
        self.root.join("openspec").join("changes").join(change_id)
    }

    /// `runs/journal.jsonl`, the append-only execution-record log.
    pub fn journal(&self) -> PathBuf {
        self.root.join("runs").join("journal.jsonl")
    }

    /// `decision_ledger.jsonl` at the repo root.
    pub fn decision_ledger(&self) -> PathBuf {
        self.root.join("decision_ledger.jsonl")
    }

    /// `sdlc/boundary_registry.json`, the default boundary registry path used
    /// when a bead carries no `boundary_registry_ref`.
    pub fn default_boundary_registry(&self) -> PathBuf {
        self.root.join("sdlc").join("boundary_registry.json")
    }

    /// `sdlc/{artifact_id}.json`, the path a `boundary_registry_ref` link
    /// resolves to.
    pub fn boundary_registry(&self, artifact_id: &str) -> PathBuf {
        self.root.join("sdlc").join(format!("{artifact_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bead_artifact_paths_are_rooted_under_runs() {
        let paths = RepoPaths::new("/repo");
        assert_eq!(paths.bead_json("work-abc123"), PathBuf::from("/repo/runs/work-abc123/bead.json"));
        assert_eq!(paths.evidence_json("work-abc123"), PathBuf::from("/repo/runs/work-abc123/evidence.json"));
    }

    #[test]
    fn journal_and_ledger_are_repo_root_relative() {
        let paths = RepoPaths::new("/repo");
        assert_eq!(paths.journal(), PathBuf::from("/repo/runs/journal.jsonl"));
        assert_eq!(paths.decision_ledger(), PathBuf::from("/repo/decision_ledger.jsonl"));
    }

    #[test]
    fn boundary_registry_resolves_by_artifact_id() {
        let paths = RepoPaths::new("/repo");
        assert_eq!(paths.default_boundary_registry(), PathBuf::from("/repo/sdlc/boundary_registry.json"));
        assert_eq!(paths.boundary_registry("reg-1"), PathBuf::from("/repo/sdlc/reg-1.json"));
    }
}
