#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-engine
//!
//! The transition engine (§4.2): the only crate that mutates a bead's
//! status. Owns the request lifecycle (load, check legality, check
//! authority, run the edge's gate composite, persist on success, journal
//! unconditionally) and the handful of other repo-mutating operations the
//! CLI and daemon both need (`approve`, `abort`, evidence collection and
//! validation, grounding generation, openspec sync) so neither adapter
//! carries lifecycle logic of its own — both just call [`SdlcRepo`].

mod config;
mod lifecycle;
mod loaders;
mod runner;
mod transition;

pub use config::EngineConfig;
pub use lifecycle::ApproveOutcome;
pub use transition::{TransitionOutcome, TransitionRequest};

use std::path::PathBuf;

use sdlc_store::RepoPaths;

/// A facade over one repo checkout: every lifecycle-mutating operation the
/// CLI and daemon expose goes through this type. Every read re-parses from
/// disk; no in-memory cache crosses a call boundary (§9).
pub struct SdlcRepo {
    paths: RepoPaths,
    config: EngineConfig,
}

impl SdlcRepo {
    /// Root the facade at `root` (the repo checkout), with `config`
    /// governing boundary budgets and the discovery allowlist.
    pub fn new(root: impl Into<PathBuf>, config: EngineConfig) -> Self {
        Self { paths: RepoPaths::new(root), config }
    }

    /// The underlying path layout, for callers (the daemon's artifact-index
    /// endpoint, `xtask`) that need to read artifacts this facade does not
    /// wrap directly.
    pub fn paths(&self) -> &RepoPaths {
        &self.paths
    }

    /// The engine configuration this facade was constructed with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
