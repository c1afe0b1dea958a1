//! The `ready -> in_progress` gate: the busiest edge in the lifecycle —
//! acceptance-freeze, dependency, openspec, grounding, exception, and
//! (for discovery beads) discovery-policy checks, all independent and all
//! collected.

use chrono::{DateTime, Utc};
use sdlc_core::{
    ArtifactLink, Bead, BeadReview, BeadStatus, BeadType, BoundaryRegistry, DecisionLedgerEntry, ExecutionProfile,
    GroundingBundle, OpenSpecRef, OpenSpecState, canonical_hash,
};

use crate::snapshot::ReadyAcceptanceSnapshot;

/// Status of each dependency bead, as resolved by the caller before invoking
/// this gate (`None` means the dependency bead could not be found at all).
pub struct DependencyStatus {
    /// The dependency's `bead_id`.
    pub bead_id: String,
    /// Its current status, or `None` if it does not exist.
    pub status: Option<BeadStatus>,
}

/// Everything the `ready -> in_progress` gate needs, pre-loaded by the
/// caller (`sdlc-engine`) so this crate stays pure and file-system-free.
pub struct ReadyToInProgressInput<'a> {
    /// The bead under evaluation, still in `ready`.
    pub bead: &'a Bead,
    /// The `BeadReview` that produced the frozen snapshot, if still
    /// resolvable.
    pub review: Option<&'a BeadReview>,
    /// The snapshot persisted by the `sized -> ready` gate.
    pub snapshot: Option<&'a ReadyAcceptanceSnapshot>,
    /// Resolved status of every bead in `bead.depends_on`.
    pub dependencies: &'a [DependencyStatus],
    /// The `OpenSpecRef` loaded from `runs/<bead_id>/openspec_ref.json`, if
    /// present and parseable.
    pub openspec_ref_on_disk: Option<&'a OpenSpecRef>,
    /// The bead's `GroundingBundle`, if present.
    pub grounding: Option<&'a GroundingBundle>,
    /// Every decision ledger entry for this bead.
    pub decision_entries: &'a [DecisionLedgerEntry],
    /// Current time, for exception-expiry evaluation.
    pub now: DateTime<Utc>,
    /// Files changed since the bead started (for discovery-policy
    /// evaluation on discovery beads).
    pub touched_files: &'a [String],
    /// The resolved boundary registry, if loadable.
    pub boundary_registry: Option<&'a BoundaryRegistry>,
    /// Discovery-allowlist prefixes in effect.
    pub discovery_allowlist: &'a [String],
}

/// Evaluate every independent check for the `ready -> in_progress` edge and
/// collect all resulting error lines; never short-circuits.
pub fn evaluate(input: &ReadyToInProgressInput<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    errors.extend(acceptance_freeze_errors(input));
    errors.extend(dependency_errors(input.dependencies));

    if input.bead.bead_type == BeadType::Implementation {
        errors.extend(openspec_errors(input.bead, input.openspec_ref_on_disk));
    }

    if input.grounding.is_none() {
        errors.push("GroundingBundle missing".to_string());
    }

    if input.bead.execution_profile == ExecutionProfile::Exception {
        let active = input
            .decision_entries
            .iter()
            .any(|e| e.bead_id.as_deref() == Some(input.bead.bead_id.as_str()) && e.is_active_exception(input.now));
        if !active {
            errors.push("execution_profile=exception requires an active exception DecisionLedgerEntry".to_string());
        }
    }

    if input.bead.bead_type == BeadType::Discovery {
        match input.boundary_registry {
            None => errors.push("Boundary registry not found".to_string()),
            Some(registry) => {
                errors.extend(sdlc_boundary::enforce_discovery_policy(registry, input.touched_files, input.discovery_allowlist));
            }
        }
    }

    errors
}

fn acceptance_freeze_errors(input: &ReadyToInProgressInput<'_>) -> Vec<String> {
    let Some(snapshot) = input.snapshot else {
        return vec!["Acceptance checks snapshot missing after ready".to_string()];
    };

    let current_hash = canonical_hash(&input.bead.acceptance_checks);
    let mut changed = current_hash != snapshot.acceptance_checks_hash;
    if let Some(review) = input.review {
        if review.tightened_acceptance_checks != input.bead.acceptance_checks {
            changed = true;
        }
    }

    if changed { vec!["Acceptance checks changed after ready".to_string()] } else { Vec::new() }
}

fn dependency_errors(dependencies: &[DependencyStatus]) -> Vec<String> {
    let not_done: Vec<String> = dependencies
        .iter()
        .filter_map(|dep| match dep.status {
            Some(BeadStatus::Done) => None,
            Some(status) => Some(format!("{} ({})", dep.bead_id, status.as_wire_str())),
            None => Some(format!("{} (missing)", dep.bead_id)),
        })
        .collect();

    if not_done.is_empty() { Vec::new() } else { vec![format!("Dependencies not done: {}", not_done.join(", "))] }
}

fn openspec_errors(bead: &Bead, on_disk: Option<&OpenSpecRef>) -> Vec<String> {
    let Some(link) = bead.openspec_ref.as_ref() else {
        return vec!["openspec_ref missing".to_string()];
    };

    if link.artifact_type != "openspec_ref" {
        return vec![format!(
            "openspec_ref link has wrong artifact_type '{}', expected 'openspec_ref'",
            link.artifact_type
        )];
    }

    let Some(osr) = on_disk else {
        return vec![format!("runs/{}/openspec_ref.json missing or unreadable", bead.bead_id)];
    };

    if osr.state != OpenSpecState::Approved {
        return vec!["openspec_ref is not approved".to_string()];
    }

    if osr.artifact_id != link.artifact_id {
        return vec![format!(
            "openspec_ref artifact_id mismatch: bead references '{}' but runs/{}/openspec_ref.json has '{}'",
            link.artifact_id, bead.bead_id, osr.artifact_id
        )];
    }

    Vec::new()
}

/// Build an `ArtifactLink` of type `"openspec_ref"` for a bead — a small
/// convenience the CLI/engine use when wiring `bead.openspec_ref`.
pub fn openspec_link(artifact_id: impl Into<String>) -> ArtifactLink {
    ArtifactLink::new("openspec_ref", artifact_id)
}
