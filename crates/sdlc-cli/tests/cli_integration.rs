//! End-to-end tests against the `sdlc` binary: a temp repo root is seeded
//! with artifact JSON files, then each subcommand is driven through
//! `assert_cmd` exactly as an operator or CI job would invoke it.

use std::fs;

use assert_cmd::Command;
use chrono::Utc;
use predicates::prelude::*;
use sdlc_core::{Actor, AcceptanceCheck, Bead, BeadReview, BeadStatus, BeadType, EffortBucket};
use tempfile::tempdir;

fn sdlc() -> Command {
    Command::cargo_bin("sdlc").expect("binary builds")
}

fn sample_bead(bead_id: &str, status: BeadStatus) -> Bead {
    Bead {
        schema_name: sdlc_core::bead::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::bead::SCHEMA_VERSION,
        artifact_id: bead_id.to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: bead_id.to_string(),
        title: "Add a feature".to_string(),
        bead_type: BeadType::Implementation,
        status,
        priority: 3,
        owner: None,
        openspec_ref: None,
        boundary_registry_ref: None,
        requirements_md: "do the thing".to_string(),
        acceptance_criteria_md: "it works".to_string(),
        context_md: String::new(),
        acceptance_checks: vec![],
        execution_profile: Default::default(),
        depends_on: vec![],
        max_elapsed_minutes: None,
        max_interventions: None,
    }
}

fn write_bead(root: &std::path::Path, bead: &Bead) {
    let dir = root.join("runs").join(&bead.bead_id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("bead.json"), serde_json::to_vec_pretty(bead).unwrap()).unwrap();
}

#[test]
fn request_draft_to_sized_succeeds_with_no_gate() {
    let dir = tempdir().unwrap();
    write_bead(dir.path(), &sample_bead("work-cli001", BeadStatus::Draft));

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["request", "work-cli001", "draft -> sized"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: draft -> sized"));

    let journal = fs::read_to_string(dir.path().join("runs/journal.jsonl")).unwrap();
    assert_eq!(journal.lines().count(), 1);
}

#[test]
fn request_rejects_illegal_edge() {
    let dir = tempdir().unwrap();
    write_bead(dir.path(), &sample_bead("work-cli002", BeadStatus::Draft));

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["request", "work-cli002", "draft -> done"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("rejected"));
}

#[test]
fn request_on_missing_bead_exits_one_and_still_journals() {
    let dir = tempdir().unwrap();

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["request", "work-missing", "draft -> sized"])
        .assert()
        .code(1);

    assert!(dir.path().join("runs/journal.jsonl").exists());
}

#[test]
fn sized_to_ready_adopts_tightened_checks_via_review() {
    let dir = tempdir().unwrap();
    write_bead(dir.path(), &sample_bead("work-cli003", BeadStatus::Sized));

    let review = BeadReview {
        schema_name: sdlc_core::review::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::review::SCHEMA_VERSION,
        artifact_id: "rev-cli003".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        bead_id: "work-cli003".to_string(),
        reviewed_bead_hash: None,
        effort_bucket: EffortBucket::M,
        risk_flags: vec![],
        estimated_files_touched: None,
        estimated_subsystems_touched: None,
        tightened_acceptance_checks: vec![AcceptanceCheck {
            name: "unit".to_string(),
            command: "true".to_string(),
            cwd: None,
            timeout_seconds: None,
            expect_exit_code: 0,
            expected_outputs: vec![],
        }],
        split_required: false,
        split_proposal: None,
        notes: None,
    };
    fs::write(
        dir.path().join("runs/work-cli003/bead_review.json"),
        serde_json::to_vec_pretty(&review).unwrap(),
    )
    .unwrap();

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["request", "work-cli003", "sized -> ready"])
        .assert()
        .success();

    let bead: Bead = serde_json::from_slice(&fs::read(dir.path().join("runs/work-cli003/bead.json")).unwrap()).unwrap();
    assert_eq!(bead.status, BeadStatus::Ready);
    assert_eq!(bead.acceptance_checks.len(), 1);
    assert!(dir.path().join("runs/work-cli003/ready_acceptance_hash.json").exists());
}

#[test]
fn abort_always_applies_even_from_draft() {
    let dir = tempdir().unwrap();
    write_bead(dir.path(), &sample_bead("work-cli004", BeadStatus::Draft));

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["abort", "work-cli004", "--reason", "requirements unclear"])
        .assert()
        .success();

    let bead: Bead = serde_json::from_slice(&fs::read(dir.path().join("runs/work-cli004/bead.json")).unwrap()).unwrap();
    assert_eq!(bead.status, BeadStatus::AbortedNeedsDiscovery);

    let ledger = fs::read_to_string(dir.path().join("decision_ledger.jsonl")).unwrap();
    assert!(ledger.contains("ABORT: requirements unclear"));
}

#[test]
fn approve_warns_when_summary_missing_prefix() {
    let dir = tempdir().unwrap();
    write_bead(dir.path(), &sample_bead("work-cli005", BeadStatus::Verified));

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["approve", "work-cli005", "--summary", "looks fine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning:"));
}

#[test]
fn approve_with_proper_prefix_has_no_warning() {
    let dir = tempdir().unwrap();
    write_bead(dir.path(), &sample_bead("work-cli006", BeadStatus::Verified));

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["approve", "work-cli006", "--summary", "APPROVAL: ship it"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recorded approval").and(predicate::str::contains("warning:").not()));
}

#[test]
fn validate_rejects_unknown_schema_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"schema_name": "not_a_thing"}"#).unwrap();

    sdlc().args(["validate", path.to_str().unwrap()]).assert().code(2);
}

#[test]
fn validate_accepts_a_well_formed_bead() {
    let dir = tempdir().unwrap();
    let bead = sample_bead("work-cli007", BeadStatus::Draft);
    let path = dir.path().join("bead.json");
    fs::write(&path, serde_json::to_vec_pretty(&bead).unwrap()).unwrap();

    sdlc().args(["validate", path.to_str().unwrap()]).assert().success().stdout("valid\n");
}

#[test]
fn hash_prints_a_64_char_hex_digest() {
    let dir = tempdir().unwrap();
    let bead = sample_bead("work-cli008", BeadStatus::Draft);
    let path = dir.path().join("bead.json");
    fs::write(&path, serde_json::to_vec_pretty(&bead).unwrap()).unwrap();

    let output = sdlc().args(["hash", path.to_str().unwrap()]).output().unwrap();
    let hash = String::from_utf8(output.stdout).unwrap();
    let hash = hash.trim();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn schema_export_writes_one_file_per_registered_artifact_type() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("schemas");

    sdlc().args(["schema", "export", "--out", out_dir.to_str().unwrap()]).assert().success();

    let files: Vec<_> = fs::read_dir(&out_dir).unwrap().collect();
    assert_eq!(files.len(), 8);
}

#[test]
fn openspec_sync_copies_the_registry_entry() {
    let dir = tempdir().unwrap();
    let mut bead = sample_bead("work-cli009", BeadStatus::Verified);
    bead.openspec_ref = Some(sdlc_core::ArtifactLink::new("openspec_ref", "change-1"));
    write_bead(dir.path(), &bead);

    let entry = sdlc_core::OpenSpecRef {
        schema_name: sdlc_core::openspec::SCHEMA_NAME.to_string(),
        schema_version: sdlc_core::openspec::SCHEMA_VERSION,
        artifact_id: "change-1".to_string(),
        created_at: Utc::now(),
        created_by: Actor::human("alice"),
        links: vec![],
        change_id: "change-1".to_string(),
        state: sdlc_core::OpenSpecState::Approved,
        path: "openspec/changes/change-1/proposal.md".to_string(),
        approved_at: Some(Utc::now()),
        approved_by: Some(Actor::human("bob")),
        content_hash: None,
    };
    let refs_dir = dir.path().join("openspec/refs");
    fs::create_dir_all(&refs_dir).unwrap();
    fs::write(refs_dir.join("change-1.json"), serde_json::to_vec_pretty(&entry).unwrap()).unwrap();

    sdlc()
        .env("SDLC_REPO_ROOT", dir.path())
        .args(["openspec", "sync", "work-cli009"])
        .assert()
        .success()
        .stdout(predicate::str::contains("change-1"));

    assert!(dir.path().join("runs/work-cli009/openspec_ref.json").exists());
}
