#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-boundary
//!
//! The boundary enforcer (§4.5): maps changed files to registered
//! subsystems by path-prefix attribution, then applies one of two policies
//! depending on bead kind —
//!
//! - **Implementation beads** (`verification_pending -> verified`): a hard
//!   budget on files touched and subsystems touched.
//! - **Discovery beads** ("Policy A", `ready -> in_progress` and the
//!   `verified` entry point): changed files must all fall inside a
//!   configured allowlist and must not touch any registered production
//!   subsystem.
//!
//! Both policies report errors as single pre-joined lines (`"; "`-separated)
//! so the gate composite that calls them can simply append the string.

use sdlc_change_tracker::normalize_path;
use sdlc_core::{BoundaryRegistry, canonical_hash};

/// Attribution of a set of changed files to registered subsystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchedSubsystems {
    /// Sorted, deduplicated subsystem names touched.
    pub subsystems: Vec<String>,
    /// Count of distinct normalized files touched.
    pub files_touched: usize,
}

/// Normalize every path, then attribute each to every subsystem whose any
/// path prefix is a string prefix of the normalized path.
pub fn compute_touched_subsystems(registry: &BoundaryRegistry, files: &[String]) -> TouchedSubsystems {
    let normalized: Vec<String> = files.iter().map(|f| normalize_path(f)).collect();

    let mut subsystems = std::collections::BTreeSet::new();
    for file in &normalized {
        for subsystem in &registry.subsystems {
            if subsystem.paths.iter().any(|prefix| file.starts_with(prefix.as_str())) {
                subsystems.insert(subsystem.name.clone());
            }
        }
    }

    TouchedSubsystems {
        subsystems: subsystems.into_iter().collect(),
        files_touched: normalized.len(),
    }
}

fn registry_hash(registry: &BoundaryRegistry) -> String {
    canonical_hash(registry).hash
}

/// Enforce the implementation-bead boundary budget. Returns an empty `Vec`
/// when within budget, or exactly two error lines on violation: the
/// counts/limits line and the abort-or-split guidance line.
pub fn enforce_implementation_boundary(
    registry: &BoundaryRegistry,
    files: &[String],
    max_files_touched: usize,
    max_subsystems_touched: usize,
) -> Vec<String> {
    let touched = compute_touched_subsystems(registry, files);

    if touched.files_touched <= max_files_touched && touched.subsystems.len() <= max_subsystems_touched {
        return Vec::new();
    }

    let mut parts = vec![
        format!(
            "Boundary violation: files_touched={} (limit {})",
            touched.files_touched, max_files_touched
        ),
        format!(
            "subsystems_touched={} (limit {})",
            touched.subsystems.len(),
            max_subsystems_touched
        ),
    ];
    if !touched.subsystems.is_empty() {
        parts.push(format!("touched_subsystems={{{}}}", touched.subsystems.join(", ")));
    }
    parts.push(format!("boundary_registry_hash={}", registry_hash(registry)));

    vec![
        parts.join("; "),
        "Boundary limit exceeded: abort bead (aborted:needs-discovery) or split via BeadReview".to_string(),
    ]
}

/// Enforce the discovery-bead policy ("Policy A"): changed files must all be
/// inside `allowlist` and must not hit any registered production subsystem.
/// Returns an empty `Vec` when compliant, or exactly one joined error line
/// on violation.
pub fn enforce_discovery_policy(registry: &BoundaryRegistry, files: &[String], allowlist: &[String]) -> Vec<String> {
    let normalized: Vec<String> = files.iter().map(|f| normalize_path(f)).collect();

    let mut production_paths_hit: Vec<String> = normalized
        .iter()
        .filter(|file| {
            registry
                .subsystems
                .iter()
                .any(|s| s.paths.iter().any(|prefix| file.starts_with(prefix.as_str())))
        })
        .cloned()
        .collect();
    production_paths_hit.sort();
    production_paths_hit.dedup();

    let mut outside_allowlist: Vec<String> = normalized
        .iter()
        .filter(|file| !allowlist.iter().any(|prefix| file.starts_with(prefix.as_str())))
        .cloned()
        .collect();
    outside_allowlist.sort();
    outside_allowlist.dedup();

    if production_paths_hit.is_empty() && outside_allowlist.is_empty() {
        return Vec::new();
    }

    let mut parts = vec!["Discovery policy violation (Policy A)".to_string()];
    if !production_paths_hit.is_empty() {
        parts.push(format!(
            "production_paths_hit=[{}]",
            production_paths_hit.iter().map(|p| format!("'{p}'")).collect::<Vec<_>>().join(", ")
        ));
    }
    if !outside_allowlist.is_empty() {
        parts.push(format!(
            "outside_allowlist=[{}]",
            outside_allowlist.iter().map(|p| format!("'{p}'")).collect::<Vec<_>>().join(", ")
        ));
    }
    parts.push(format!(
        "allowlist=[{}]",
        allowlist.iter().map(|p| format!("'{p}'")).collect::<Vec<_>>().join(", ")
    ));
    parts.push(format!("boundary_registry_hash={}", registry_hash(registry)));

    vec![parts.join("; ")]
}

/// Default discovery allowlist prefixes, used when
/// `SDLC_DISCOVERY_ALLOWLIST` is unset.
pub const DEFAULT_DISCOVERY_ALLOWLIST: &[&str] = &["docs/", "notes/", "tools/", "experiments/", "runs/"];

/// Default file-touched budget, used when `SDLC_MAX_FILES_TOUCHED` is unset.
pub const DEFAULT_MAX_FILES_TOUCHED: usize = 8;
/// Default subsystem-touched budget, used when
/// `SDLC_MAX_SUBSYSTEMS_TOUCHED` is unset.
pub const DEFAULT_MAX_SUBSYSTEMS_TOUCHED: usize = 2;
