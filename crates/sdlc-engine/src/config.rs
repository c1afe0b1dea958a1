//! Engine-level configuration: the boundary budgets and discovery allowlist
//! every gate dispatch needs. `sdlc-config` is responsible for sourcing
//! these values from `sdlc.toml` and environment overrides; this type is
//! just the value the engine consumes, so this crate never touches
//! environment variables or files itself.

/// Boundary budgets and discovery allowlist in effect for one [`crate::SdlcRepo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum distinct files an implementation bead may touch before
    /// `verification_pending -> verified` rejects it.
    pub max_files_touched: usize,
    /// Maximum distinct subsystems an implementation bead may touch before
    /// `verification_pending -> verified` rejects it.
    pub max_subsystems_touched: usize,
    /// Path prefixes a discovery bead is confined to under Policy A.
    pub discovery_allowlist: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_files_touched: sdlc_boundary::DEFAULT_MAX_FILES_TOUCHED,
            max_subsystems_touched: sdlc_boundary::DEFAULT_MAX_SUBSYSTEMS_TOUCHED,
            discovery_allowlist: sdlc_boundary::DEFAULT_DISCOVERY_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_boundary_crate_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_files_touched, 8);
        assert_eq!(cfg.max_subsystems_touched, 2);
        assert_eq!(cfg.discovery_allowlist, vec!["docs/", "notes/", "tools/", "experiments/", "runs/"]);
    }
}
