//! Small helpers for loading optional per-bead artifacts. Centralized here
//! so `transition.rs` and `lifecycle.rs` don't each reinvent "parse this
//! file if it exists, otherwise `None`".

use std::path::Path;

use serde::de::DeserializeOwned;

use sdlc_core::{Bead, BoundaryRegistry};
use sdlc_gates::DependencyStatus;
use sdlc_store::RepoPaths;

/// Read and parse the artifact at `path`, returning `None` if it does not
/// exist or fails to parse rather than propagating an error — every gate
/// input in this crate treats a missing/unreadable optional artifact as
/// absent, letting the gate itself report the specific missing-artifact
/// error.
pub fn load_optional<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !sdlc_store::artifact_exists(path) {
        return None;
    }
    sdlc_store::read_artifact(path).ok()
}

/// Resolve the boundary registry a bead is evaluated against: the registry
/// `bead.boundary_registry_ref` points at (only if its `artifact_type` is
/// `"boundary_registry"`), falling back to the default repo-wide registry.
pub fn resolve_boundary_registry(paths: &RepoPaths, bead: &Bead) -> Option<BoundaryRegistry> {
    let path = match &bead.boundary_registry_ref {
        Some(link) if link.artifact_type == "boundary_registry" => paths.boundary_registry(&link.artifact_id),
        _ => paths.default_boundary_registry(),
    };
    load_optional(&path)
}

/// Resolve the current status of every bead `bead_id` depends on, for the
/// `ready -> in_progress` dependency gate.
pub fn resolve_dependency_statuses(paths: &RepoPaths, depends_on: &[String]) -> Vec<DependencyStatus> {
    depends_on
        .iter()
        .map(|dep_id| {
            let status = load_optional::<Bead>(&paths.bead_json(dep_id)).map(|b| b.status);
            DependencyStatus { bead_id: dep_id.clone(), status }
        })
        .collect()
}
