//! End-to-end lifecycle scenarios driving a temp repo through `SdlcRepo`,
//! the same facade `sdlc-cli` and `sdlc-daemon` call. Each test here is
//! self-contained: it seeds exactly the artifacts its scenario needs, then
//! asserts on the resulting bead state, journal, and decision ledger.

use chrono::Utc;
use sdlc_core::{
    AcceptanceCheck, Actor, ArtifactLink, Bead, BeadReview, BeadStatus, BeadType, BoundaryRegistry, DecisionLedgerEntry,
    DecisionType, EffortBucket, EvidenceBundle, EvidenceItem, EvidenceStatus, EvidenceType, GroundingBundle,
    OpenSpecRef, OpenSpecState, Subsystem, canonical_hash,
};
use sdlc_engine::{EngineConfig, SdlcRepo, TransitionRequest};
use sdlc_store::RepoPaths;
use tempfile::TempDir;

fn base_bead(bead_id: &str, status: BeadStatus, bead_type: BeadType) -> Bead {
    Bead {
        schema_name: sdlc_core::bead::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::bead::SCHEMA_VERSION,
        artifact_id: bead_id.to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: bead_id.to_string(),
        title: "Add retry support".to_string(),
        bead_type,
        status,
        priority: 3,
        owner: None,
        openspec_ref: None,
        boundary_registry_ref: None,
        requirements_md: "Add retries around the flaky upstream call".to_string(),
        acceptance_criteria_md: "A failing call is retried and the test suite proves it".to_string(),
        context_md: String::new(),
        acceptance_checks: vec![],
        execution_profile: Default::default(),
        depends_on: vec![],
        max_elapsed_minutes: None,
        max_interventions: None,
    }
}

fn default_registry() -> BoundaryRegistry {
    BoundaryRegistry {
        schema_name: sdlc_core::boundary::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::boundary::SCHEMA_VERSION,
        artifact_id: "boundary_registry".to_string(),
        created_at: Utc::now(),
        created_by: Actor::system("engine"),
        links: vec![],
        registry_name: "default".to_string(),
        subsystems: vec![Subsystem { name: "core".to_string(), paths: vec!["src/".to_string()], invariants: vec![] }],
        notes: None,
    }
}

fn sample_grounding(bead_id: &str, bead: &Bead) -> GroundingBundle {
    GroundingBundle {
        schema_name: sdlc_core::grounding::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::grounding::SCHEMA_VERSION,
        artifact_id: "grd-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::system("engine"),
        links: vec![ArtifactLink::new("bead", bead_id.to_string())],
        bead_id: bead_id.to_string(),
        generated_for_bead_hash: Some(canonical_hash(bead)),
        items: vec![],
        allowed_commands: vec![],
        disallowed_commands: vec![],
        excluded_paths: vec![],
        summary_md: None,
    }
}

fn approved_openspec_ref(artifact_id: &str) -> OpenSpecRef {
    OpenSpecRef {
        schema_name: sdlc_core::openspec::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::openspec::SCHEMA_VERSION,
        artifact_id: artifact_id.to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        change_id: "chg-1".to_string(),
        state: OpenSpecState::Approved,
        path: "openspec/changes/chg-1".to_string(),
        approved_at: Some(Utc::now()),
        approved_by: Some(Actor::human("bob")),
        content_hash: None,
    }
}

fn check(name: &str, command: &str, expect_exit_code: i32) -> AcceptanceCheck {
    AcceptanceCheck { name: name.to_string(), command: command.to_string(), cwd: None, timeout_seconds: None, expect_exit_code, expected_outputs: vec![] }
}

struct Fixture {
    _dir: TempDir,
    repo: SdlcRepo,
    paths: RepoPaths,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let paths = RepoPaths::new(dir.path());
    let repo = SdlcRepo::new(dir.path(), EngineConfig::default());
    Fixture { _dir: dir, repo, paths }
}

fn current_bead(paths: &RepoPaths, bead_id: &str) -> Bead {
    sdlc_store::read_artifact(&paths.bead_json(bead_id)).unwrap()
}

/// E1 — happy path: every gated edge passes and the bead reaches `done`.
#[test]
fn e1_happy_path_reaches_done() {
    let f = fixture();
    let bead_id = "work-abc123";

    let mut bead = base_bead(bead_id, BeadStatus::Sized, BeadType::Implementation);
    bead.openspec_ref = Some(ArtifactLink::new("openspec_ref", "spec-1"));
    sdlc_store::write_artifact_atomic(&f.paths.bead_json(bead_id), &bead).unwrap();

    let review = BeadReview {
        schema_name: sdlc_core::review::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::review::SCHEMA_VERSION,
        artifact_id: "rev-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: bead_id.to_string(),
        reviewed_bead_hash: None,
        effort_bucket: EffortBucket::M,
        risk_flags: vec![],
        estimated_files_touched: None,
        estimated_subsystems_touched: None,
        tightened_acceptance_checks: vec![check("run", "run", 0)],
        split_required: false,
        split_proposal: None,
        notes: None,
    };
    sdlc_store::write_artifact_atomic(&f.paths.review_json(bead_id), &review).unwrap();
    sdlc_store::write_artifact_atomic(&f.paths.grounding_json(bead_id), &sample_grounding(bead_id, &bead)).unwrap();
    sdlc_store::write_artifact_atomic(&f.paths.openspec_ref_json(bead_id), &approved_openspec_ref("spec-1")).unwrap();
    sdlc_store::write_artifact_atomic(&f.paths.default_boundary_registry(), &default_registry()).unwrap();

    let mut accepted = Vec::new();

    // sized -> ready
    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::Ready,
            actor: Actor::human("alice"),
            touched_files: vec![],
            now: Utc::now(),
        })
        .unwrap();
    assert!(outcome.ok, "{:?}", outcome.notes);
    accepted.push(outcome.applied_transition.clone().unwrap());

    // ready -> in_progress
    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::InProgress,
            actor: Actor::human("alice"),
            touched_files: vec!["src/retry.rs".to_string()],
            now: Utc::now(),
        })
        .unwrap();
    assert!(outcome.ok, "{:?}", outcome.notes);
    accepted.push(outcome.applied_transition.clone().unwrap());

    // in_progress -> verification_pending (ungated)
    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::VerificationPending,
            actor: Actor::human("alice"),
            touched_files: vec!["src/retry.rs".to_string()],
            now: Utc::now(),
        })
        .unwrap();
    assert!(outcome.ok, "{:?}", outcome.notes);
    accepted.push(outcome.applied_transition.clone().unwrap());

    // supply the evidence bundle, bound to the bead's current hash
    let bead_now = current_bead(&f.paths, bead_id);
    let evidence = EvidenceBundle {
        schema_name: sdlc_core::evidence::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::evidence::SCHEMA_VERSION,
        artifact_id: "ev-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: bead_id.to_string(),
        for_bead_hash: Some(canonical_hash(&bead_now)),
        status: EvidenceStatus::Collected,
        items: vec![EvidenceItem {
            name: "run".to_string(),
            evidence_type: EvidenceType::TestRun,
            command: Some("run".to_string()),
            exit_code: Some(0),
            started_at: None,
            finished_at: None,
            attachments: vec![],
            summary_md: None,
        }],
        invalidated_reason: None,
    };
    f.repo.collect_evidence(bead_id, &evidence).unwrap();

    // validate (system)
    let errors = f.repo.validate_evidence(bead_id, Actor::system("engine"), Utc::now()).unwrap();
    assert!(errors.is_empty(), "{errors:?}");

    // verification_pending -> verified (system, authority-restricted)
    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::Verified,
            actor: Actor::system("engine"),
            touched_files: vec!["src/retry.rs".to_string()],
            now: Utc::now(),
        })
        .unwrap();
    assert!(outcome.ok, "{:?}", outcome.notes);
    accepted.push(outcome.applied_transition.clone().unwrap());

    // verified -> approval_pending (ungated)
    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::ApprovalPending,
            actor: Actor::human("alice"),
            touched_files: vec![],
            now: Utc::now(),
        })
        .unwrap();
    assert!(outcome.ok, "{:?}", outcome.notes);
    accepted.push(outcome.applied_transition.clone().unwrap());

    // append the approval decision
    let approve = f.repo.approve(bead_id, "APPROVAL: ok".to_string(), Actor::human("alice"), Utc::now()).unwrap();
    assert!(approve.warning.is_none());

    // approval_pending -> done
    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::Done,
            actor: Actor::human("alice"),
            touched_files: vec![],
            now: Utc::now(),
        })
        .unwrap();
    assert!(outcome.ok, "{:?}", outcome.notes);
    accepted.push(outcome.applied_transition.clone().unwrap());

    assert_eq!(accepted.len(), 6);
    assert_eq!(
        accepted,
        vec![
            "sized -> ready",
            "ready -> in_progress",
            "in_progress -> verification_pending",
            "verification_pending -> verified",
            "verified -> approval_pending",
            "approval_pending -> done",
        ]
    );

    let final_bead = current_bead(&f.paths, bead_id);
    assert_eq!(final_bead.status, BeadStatus::Done);

    let journal = sdlc_store::read_journal(&f.paths).unwrap();
    let applied: Vec<&str> = journal.iter().filter_map(|r| r.applied_transition.as_deref()).collect();
    assert_eq!(applied, accepted.iter().map(String::as_str).collect::<Vec<_>>());
}

/// E2 — stale evidence: changing the bead after validation invalidates its
/// evidence, and the gate then reports the bundle as unvalidated.
#[test]
fn e2_stale_evidence_blocks_reverification() {
    let f = fixture();
    let bead_id = "work-stale01";

    let mut bead = base_bead(bead_id, BeadStatus::VerificationPending, BeadType::Implementation);
    bead.acceptance_checks = vec![check("run", "run", 0)];
    sdlc_store::write_artifact_atomic(&f.paths.bead_json(bead_id), &bead).unwrap();
    sdlc_store::write_artifact_atomic(&f.paths.default_boundary_registry(), &default_registry()).unwrap();

    let evidence = EvidenceBundle {
        schema_name: sdlc_core::evidence::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::evidence::SCHEMA_VERSION,
        artifact_id: "ev-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: bead_id.to_string(),
        for_bead_hash: Some(canonical_hash(&bead)),
        status: EvidenceStatus::Collected,
        items: vec![EvidenceItem {
            name: "run".to_string(),
            evidence_type: EvidenceType::TestRun,
            command: Some("run".to_string()),
            exit_code: Some(0),
            started_at: None,
            finished_at: None,
            attachments: vec![],
            summary_md: None,
        }],
        invalidated_reason: None,
    };
    f.repo.collect_evidence(bead_id, &evidence).unwrap();
    let errors = f.repo.validate_evidence(bead_id, Actor::system("engine"), Utc::now()).unwrap();
    assert!(errors.is_empty(), "{errors:?}");

    // mutate the bead after validation: append a new acceptance check
    let mut changed = current_bead(&f.paths, bead_id);
    changed.acceptance_checks.push(check("lint", "lint", 0));
    sdlc_store::write_artifact_atomic(&f.paths.bead_json(bead_id), &changed).unwrap();

    let reason = f.repo.invalidate_evidence_if_stale(bead_id, Actor::system("engine"), Utc::now()).unwrap();
    assert_eq!(reason.as_deref(), Some("bead hash changed"));

    let bundle: EvidenceBundle = sdlc_store::read_artifact(&f.paths.evidence_json(bead_id)).unwrap();
    assert_eq!(bundle.status, EvidenceStatus::Invalidated);

    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::Verified,
            actor: Actor::system("engine"),
            touched_files: vec!["src/a.rs".to_string()],
            now: Utc::now(),
        })
        .unwrap();
    assert!(!outcome.ok);
    assert!(outcome.notes.iter().any(|n| n == "EvidenceBundle not validated"), "{:?}", outcome.notes);
}

/// E3 — authority violation: an agent actor cannot apply the one
/// authority-restricted edge.
#[test]
fn e3_agent_cannot_mark_verified() {
    let f = fixture();
    let bead_id = "work-auth001";
    let bead = base_bead(bead_id, BeadStatus::VerificationPending, BeadType::Implementation);
    sdlc_store::write_artifact_atomic(&f.paths.bead_json(bead_id), &bead).unwrap();

    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::Verified,
            actor: Actor::agent("auto-verifier"),
            touched_files: vec![],
            now: Utc::now(),
        })
        .unwrap();

    assert!(!outcome.ok);
    assert!(outcome.notes.iter().any(|n| n.contains("Authority violation")), "{:?}", outcome.notes);
    assert!(outcome.applied_transition.is_none());

    let unchanged = current_bead(&f.paths, bead_id);
    assert_eq!(unchanged.status, BeadStatus::VerificationPending);

    let journal = sdlc_store::read_journal_for_bead(&f.paths, bead_id).unwrap();
    assert_eq!(journal.len(), 1);
    assert!(journal[0].applied_transition.is_none());
    assert_ne!(journal[0].exit_code, Some(0));
}

/// E4 — discovery production leak: a discovery bead that touches a
/// production path is rejected under Policy A, even though one of its
/// files is within the discovery allowlist.
#[test]
fn e4_discovery_bead_touching_production_path_is_rejected() {
    let f = fixture();
    let bead_id = "work-disco01";
    let mut bead = base_bead(bead_id, BeadStatus::Ready, BeadType::Discovery);
    bead.openspec_ref = None;
    sdlc_store::write_artifact_atomic(&f.paths.bead_json(bead_id), &bead).unwrap();
    sdlc_store::write_artifact_atomic(&f.paths.ready_acceptance_hash_json(bead_id), &sdlc_gates::ReadyAcceptanceSnapshot {
        bead_id: bead_id.to_string(),
        acceptance_checks_hash: canonical_hash(&bead.acceptance_checks),
        bead_hash: canonical_hash(&bead),
    })
    .unwrap();
    sdlc_store::write_artifact_atomic(&f.paths.grounding_json(bead_id), &sample_grounding(bead_id, &bead)).unwrap();
    sdlc_store::write_artifact_atomic(&f.paths.default_boundary_registry(), &default_registry()).unwrap();

    let outcome = f
        .repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to: BeadStatus::InProgress,
            actor: Actor::human("alice"),
            touched_files: vec!["src/main.py".to_string(), "docs/notes.md".to_string()],
            now: Utc::now(),
        })
        .unwrap();

    assert!(!outcome.ok);
    assert!(outcome.notes.iter().any(|n| n.contains("Discovery policy violation")), "{:?}", outcome.notes);
    assert!(outcome.notes.iter().any(|n| n.contains("production_paths_hit=['src/main.py']")), "{:?}", outcome.notes);

    let journal = sdlc_store::read_journal_for_bead(&f.paths, bead_id).unwrap();
    assert_eq!(journal.len(), 1);
    assert!(journal[0].links.iter().any(|l| l.artifact_type == "bead"));
}

/// E5 — coverage via waiver: an acceptance check absent from evidence is
/// still covered when an active exception entry waives it.
#[test]
fn e5_waived_acceptance_check_needs_no_evidence() {
    let bead = {
        let mut b = base_bead("work-waiv001", BeadStatus::VerificationPending, BeadType::Implementation);
        b.acceptance_checks = vec![check("run", "run", 0)];
        b
    };
    let evidence = EvidenceBundle {
        schema_name: sdlc_core::evidence::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::evidence::SCHEMA_VERSION,
        artifact_id: "ev-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: bead.bead_id.clone(),
        for_bead_hash: Some(canonical_hash(&bead)),
        status: EvidenceStatus::Collected,
        items: vec![],
        invalidated_reason: None,
    };
    let waiver = DecisionLedgerEntry {
        schema_name: sdlc_core::decision::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::decision::SCHEMA_VERSION,
        artifact_id: "dec-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: Some(bead.bead_id.clone()),
        decision_type: DecisionType::Exception,
        summary: "outage, waiving the run check for this cycle".to_string(),
        rationale_md: None,
        expires_at: None,
        waived_acceptance_checks: vec!["run".to_string()],
    };

    let errors = sdlc_evidence::acceptance_coverage_errors(&bead, &evidence, &[waiver], Utc::now());
    assert!(errors.is_empty(), "{errors:?}");
}

/// E6 — name-preferred evidence matching: two checks share the same
/// command; matching by `name` first keeps them from being confused.
#[test]
fn e6_evidence_items_are_matched_by_name_before_command() {
    let mut bead = base_bead("work-name001", BeadStatus::VerificationPending, BeadType::Implementation);
    bead.acceptance_checks = vec![check("cmd-ok", "run", 0), check("cmd-fail", "run", 2)];

    let evidence = EvidenceBundle {
        schema_name: sdlc_core::evidence::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::evidence::SCHEMA_VERSION,
        artifact_id: "ev-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: bead.bead_id.clone(),
        for_bead_hash: Some(canonical_hash(&bead)),
        status: EvidenceStatus::Collected,
        items: vec![
            EvidenceItem {
                name: "cmd-ok".to_string(),
                evidence_type: EvidenceType::TestRun,
                command: Some("run".to_string()),
                exit_code: Some(0),
                started_at: None,
                finished_at: None,
                attachments: vec![],
                summary_md: None,
            },
            EvidenceItem {
                name: "cmd-fail".to_string(),
                evidence_type: EvidenceType::TestRun,
                command: Some("run".to_string()),
                exit_code: Some(2),
                started_at: None,
                finished_at: None,
                attachments: vec![],
                summary_md: None,
            },
        ],
        invalidated_reason: None,
    };

    let errors = sdlc_evidence::evidence_validation_errors(&bead, &evidence, &[], Utc::now());
    assert!(errors.is_empty(), "{errors:?}");
}
