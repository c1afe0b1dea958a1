//! The acceptance-check subprocess runner.
//!
//! Per §1, acceptance-check subprocess execution is named an "injected
//! primitive" — the gates and evidence validator only ever consume an
//! already-collected [`EvidenceBundle`]; they never shell out themselves.
//! This module is the default concrete implementation of that primitive:
//! `sdlc collect` and `POST .../evidence/collect` both call
//! [`SdlcRepo::collect_evidence_by_running_checks`] rather than executing
//! processes themselves, so neither adapter carries subprocess logic of its
//! own (the same "thin adapter" rule `lifecycle.rs` documents for the rest
//! of the repo-mutating operations).

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sdlc_core::{AcceptanceCheck, Actor, ArtifactLink, Bead, EvidenceBundle, EvidenceItem, EvidenceStatus, EvidenceType, canonical_hash};
use sdlc_error::SdlcError;
use sdlc_store::read_artifact;

use crate::SdlcRepo;

/// Exit code recorded for a check that exceeded its `timeout_seconds`,
/// matching the conventional shell timeout(1) exit status.
const TIMEOUT_EXIT_CODE: i32 = 124;

/// How often the runner polls a running child for completion while waiting
/// out its timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

impl SdlcRepo {
    /// Run every one of `bead_id`'s `acceptance_checks` as a subprocess,
    /// build an [`EvidenceBundle`] of `command`-type items from the results,
    /// persist it (via [`SdlcRepo::collect_evidence`]), and return it.
    ///
    /// Does not validate the collected bundle — call
    /// [`SdlcRepo::validate_evidence`] afterward for that. A check whose
    /// process fails to spawn, or that exceeds its `timeout_seconds`, is
    /// still recorded as an item (with `exit_code` either absent or
    /// [`TIMEOUT_EXIT_CODE`]) rather than aborting collection for the whole
    /// bead — the evidence validator is what turns missing/failed coverage
    /// into a gate rejection.
    pub fn collect_evidence_by_running_checks(
        &self,
        bead_id: &str,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<EvidenceBundle, SdlcError> {
        let bead: Bead = read_artifact(&self.paths().bead_json(bead_id))?;

        let items: Vec<EvidenceItem> = bead
            .acceptance_checks
            .iter()
            .map(|check| run_check(self.paths().root(), check, now))
            .collect();

        let bundle = EvidenceBundle {
            schema_name: sdlc_core::evidence::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::evidence::SCHEMA_VERSION,
            artifact_id: format!("ev-{}", Uuid::new_v4()),
            created_at: now,
            created_by: actor,
            links: vec![ArtifactLink::new("bead", bead_id.to_string())],
            bead_id: bead_id.to_string(),
            for_bead_hash: Some(canonical_hash(&bead)),
            status: EvidenceStatus::Collected,
            items,
            invalidated_reason: None,
        };

        self.collect_evidence(bead_id, &bundle)?;
        Ok(bundle)
    }
}

/// Run one acceptance check via `sh -c`, polling for completion so a
/// `timeout_seconds` can be enforced without a background reaper thread.
fn run_check(repo_root: &Path, check: &AcceptanceCheck, started_at: DateTime<Utc>) -> EvidenceItem {
    let cwd = match &check.cwd {
        Some(rel) => repo_root.join(rel),
        None => repo_root.to_path_buf(),
    };

    let spawned = Command::new("sh")
        .arg("-c")
        .arg(&check.command)
        .current_dir(&cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(err) => {
            return EvidenceItem {
                name: check.name.clone(),
                evidence_type: EvidenceType::TestRun,
                command: Some(check.command.clone()),
                exit_code: None,
                started_at: Some(started_at),
                finished_at: Some(Utc::now()),
                attachments: Vec::new(),
                summary_md: Some(format!("failed to spawn: {err}")),
            };
        }
    };

    let deadline = check.timeout_seconds.map(|secs| Instant::now() + Duration::from_secs(secs));
    let exit_code = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status.code(),
            Ok(None) => {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        break Some(TIMEOUT_EXIT_CODE);
                    }
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(_) => break None,
        }
    };

    EvidenceItem {
        name: check.name.clone(),
        evidence_type: EvidenceType::TestRun,
        command: Some(check.command.clone()),
        exit_code,
        started_at: Some(started_at),
        finished_at: Some(Utc::now()),
        attachments: Vec::new(),
        summary_md: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdlc_core::bead::{BeadStatus, BeadType, ExecutionProfile};
    use sdlc_store::{write_artifact_atomic, RepoPaths};
    use tempfile::tempdir;

    fn sample_bead(checks: Vec<AcceptanceCheck>) -> Bead {
        Bead {
            schema_name: sdlc_core::bead::SCHEMA_NAME.to_string(),
            schema_version: sdlc_core::bead::SCHEMA_VERSION,
            artifact_id: "work-runner1".to_string(),
            created_at: Utc::now(),
            created_by: Actor::human("alice"),
            links: vec![],
            bead_id: "work-runner1".to_string(),
            title: "Runner test".to_string(),
            bead_type: BeadType::Implementation,
            status: BeadStatus::InProgress,
            priority: 3,
            owner: None,
            openspec_ref: None,
            boundary_registry_ref: None,
            requirements_md: String::new(),
            acceptance_criteria_md: String::new(),
            context_md: String::new(),
            acceptance_checks: checks,
            execution_profile: ExecutionProfile::Sandbox,
            depends_on: vec![],
            max_elapsed_minutes: None,
            max_interventions: None,
        }
    }

    #[test]
    fn collects_one_item_per_check_with_exit_codes() {
        let dir = tempdir().unwrap();
        let paths = RepoPaths::new(dir.path());
        let bead = sample_bead(vec![
            AcceptanceCheck {
                name: "ok".to_string(),
                command: "true".to_string(),
                cwd: None,
                timeout_seconds: None,
                expect_exit_code: 0,
                expected_outputs: vec![],
            },
            AcceptanceCheck {
                name: "fail".to_string(),
                command: "false".to_string(),
                cwd: None,
                timeout_seconds: None,
                expect_exit_code: 0,
                expected_outputs: vec![],
            },
        ]);
        write_artifact_atomic(&paths.bead_json("work-runner1"), &bead).unwrap();

        let repo = SdlcRepo::new(dir.path(), crate::EngineConfig::default());
        let bundle = repo
            .collect_evidence_by_running_checks("work-runner1", Actor::system("engine"), Utc::now())
            .unwrap();

        assert_eq!(bundle.items.len(), 2);
        assert_eq!(bundle.items[0].exit_code, Some(0));
        assert_eq!(bundle.items[1].exit_code, Some(1));
        assert!(sdlc_store::artifact_exists(&paths.evidence_json("work-runner1")));
    }

    #[test]
    fn timeout_is_recorded_as_timeout_exit_code() {
        let dir = tempdir().unwrap();
        let paths = RepoPaths::new(dir.path());
        let bead = sample_bead(vec![AcceptanceCheck {
            name: "slow".to_string(),
            command: "sleep 5".to_string(),
            cwd: None,
            timeout_seconds: Some(1),
            expect_exit_code: 0,
            expected_outputs: vec![],
        }]);
        write_artifact_atomic(&paths.bead_json("work-runner1"), &bead).unwrap();

        let repo = SdlcRepo::new(dir.path(), crate::EngineConfig::default());
        let bundle = repo
            .collect_evidence_by_running_checks("work-runner1", Actor::system("engine"), Utc::now())
            .unwrap();

        assert_eq!(bundle.items[0].exit_code, Some(TIMEOUT_EXIT_CODE));
    }
}
