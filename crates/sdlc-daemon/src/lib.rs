// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
//! The daemon's HTTP control-plane (§4.7): a thin `axum` surface over
//! [`SdlcRepo`]. Every handler either reads straight from disk (listing,
//! artifact inspection, journal/decision tailing) or calls into
//! `sdlc-engine`'s already-complete facade — no lifecycle logic is
//! duplicated here, matching the "thin adapter" rule `sdlc-engine`'s own
//! `lifecycle.rs` module doc documents.

pub mod api;
mod middleware;

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path as AxPath, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::StreamExt;

use sdlc_core::Bead;
use sdlc_engine::{EngineConfig, SdlcRepo, TransitionRequest};
use sdlc_error::SdlcError;
use sdlc_store::{read_artifact, read_decision_ledger_for_bead, read_journal_for_bead};

use api::{
    AbortRequestBody, ActorOnlyBody, ApproveRequestBody, ArtifactIndex, BeadSummary, RepoInfo,
    TransitionRequestBody,
};

pub use middleware::{CorsConfig, RateLimiter, RequestId, RequestLogger};

/// Shared state behind every handler: an `Arc`-wrapped [`SdlcRepo`] facade.
/// There is no receipt-hydration cache to warm at startup — every read
/// re-parses the repo from disk per §5/§9.
#[derive(Clone)]
pub struct AppState {
    /// The engine facade this daemon instance serves.
    pub repo: Arc<SdlcRepo>,
}

impl AppState {
    /// Build state rooted at `repo_root` with `engine_config`.
    pub fn new(repo_root: impl Into<PathBuf>, engine_config: EngineConfig) -> Self {
        Self { repo: Arc::new(SdlcRepo::new(repo_root, engine_config)) }
    }
}

/// A JSON API error envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl From<SdlcError> for ApiError {
    fn from(err: SdlcError) -> Self {
        let status = match err.category() {
            sdlc_error::ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            sdlc_error::ErrorCategory::Schema => StatusCode::UNPROCESSABLE_ENTITY,
            sdlc_error::ErrorCategory::Transition
            | sdlc_error::ErrorCategory::Authority
            | sdlc_error::ErrorCategory::Gate
            | sdlc_error::ErrorCategory::Evidence
            | sdlc_error::ErrorCategory::Boundary => StatusCode::CONFLICT,
            sdlc_error::ErrorCategory::Config => StatusCode::BAD_REQUEST,
            sdlc_error::ErrorCategory::Io | sdlc_error::ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the Axum router with every route from §4.7.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(cmd_health))
        .route("/api/repo", get(cmd_repo))
        .route("/api/beads", get(cmd_list_beads))
        .route("/api/beads/{id}", get(cmd_get_bead))
        .route("/api/beads/{id}/review", get(cmd_get_review))
        .route("/api/beads/{id}/grounding", get(cmd_get_grounding))
        .route("/api/beads/{id}/evidence", get(cmd_get_evidence))
        .route("/api/beads/{id}/openspec-ref", get(cmd_get_openspec_ref))
        .route("/api/beads/{id}/artifacts", get(cmd_get_artifacts))
        .route("/api/beads/{id}/journal", get(cmd_get_journal))
        .route("/api/beads/{id}/decisions", get(cmd_get_decisions))
        .route("/api/beads/{id}/transition", post(cmd_transition))
        .route("/api/beads/{id}/approve", post(cmd_approve))
        .route("/api/beads/{id}/abort", post(cmd_abort))
        .route("/api/beads/{id}/grounding/generate", post(cmd_generate_grounding))
        .route("/api/beads/{id}/evidence/collect", post(cmd_collect_evidence))
        .route("/api/beads/{id}/evidence/validate", post(cmd_validate_evidence))
        .route("/api/beads/{id}/evidence/invalidate-if-stale", post(cmd_invalidate_evidence))
        .route("/api/beads/{id}/openspec/sync", post(cmd_sync_openspec))
        .route("/api/events", get(cmd_events))
        .layer(axum::middleware::from_fn(middleware::RequestLogger::layer))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(CorsConfig { allowed_origins: vec!["*".to_string()], allowed_methods: vec!["GET".to_string(), "POST".to_string()], allowed_headers: vec!["content-type".to_string()] }.to_cors_layer())
        .with_state(state)
}

async fn cmd_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "contract_version": sdlc_core::CONTRACT_VERSION,
        "time": Utc::now().to_rfc3339(),
    }))
}

async fn cmd_repo(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.repo.config();
    Json(RepoInfo {
        root: state.repo.paths().root().display().to_string(),
        max_files_touched: config.max_files_touched,
        max_subsystems_touched: config.max_subsystems_touched,
        discovery_allowlist: config.discovery_allowlist.clone(),
    })
}

/// List every bead under `runs/`, each a directory containing `bead.json`.
async fn cmd_list_beads(State(state): State<Arc<AppState>>) -> Result<Json<Vec<BeadSummary>>, ApiError> {
    let repo = Arc::clone(&state.repo);
    let beads = tokio::task::spawn_blocking(move || list_beads(&repo))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    Ok(Json(beads.iter().map(BeadSummary::from).collect()))
}

fn list_beads(repo: &SdlcRepo) -> Result<Vec<Bead>, ApiError> {
    let runs_dir = repo.paths().root().join("runs");
    let mut out = Vec::new();
    let entries = match std::fs::read_dir(&runs_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    };
    for entry in entries {
        let entry = entry.map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        if !entry.path().is_dir() {
            continue;
        }
        let Some(bead_id) = entry.file_name().to_str().map(str::to_string) else { continue };
        if let Ok(bead) = read_artifact::<Bead>(&repo.paths().bead_json(&bead_id)) {
            out.push(bead);
        }
    }
    out.sort_by(|a, b| a.bead_id.cmp(&b.bead_id));
    Ok(out)
}

async fn cmd_get_bead(State(state): State<Arc<AppState>>, AxPath(id): AxPath<String>) -> Result<Json<Bead>, ApiError> {
    let bead: Bead = read_artifact(&state.repo.paths().bead_json(&id))?;
    Ok(Json(bead))
}

async fn cmd_get_review(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<sdlc_core::BeadReview>, ApiError> {
    let review: sdlc_core::BeadReview = read_artifact(&state.repo.paths().review_json(&id))?;
    Ok(Json(review))
}

async fn cmd_get_grounding(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<sdlc_core::GroundingBundle>, ApiError> {
    let bundle: sdlc_core::GroundingBundle = read_artifact(&state.repo.paths().grounding_json(&id))?;
    Ok(Json(bundle))
}

async fn cmd_get_evidence(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<sdlc_core::EvidenceBundle>, ApiError> {
    let bundle: sdlc_core::EvidenceBundle = read_artifact(&state.repo.paths().evidence_json(&id))?;
    Ok(Json(bundle))
}

async fn cmd_get_openspec_ref(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<sdlc_core::OpenSpecRef>, ApiError> {
    let entry: sdlc_core::OpenSpecRef = read_artifact(&state.repo.paths().openspec_ref_json(&id))?;
    Ok(Json(entry))
}

async fn cmd_get_artifacts(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<ArtifactIndex>, ApiError> {
    let paths = state.repo.paths();
    Ok(Json(ArtifactIndex {
        bead: paths.bead_json(&id).exists(),
        review: paths.review_json(&id).exists(),
        grounding: paths.grounding_json(&id).exists(),
        evidence: paths.evidence_json(&id).exists(),
        openspec_ref: paths.openspec_ref_json(&id).exists(),
        ready_acceptance_hash: paths.ready_acceptance_hash_json(&id).exists(),
    }))
}

async fn cmd_get_journal(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<Vec<sdlc_core::ExecutionRecord>>, ApiError> {
    let records = read_journal_for_bead(state.repo.paths(), &id)?;
    Ok(Json(records))
}

async fn cmd_get_decisions(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<Vec<sdlc_core::DecisionLedgerEntry>>, ApiError> {
    let entries = read_decision_ledger_for_bead(state.repo.paths(), &id)?;
    Ok(Json(entries))
}

async fn cmd_transition(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
    Json(body): Json<TransitionRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = Arc::clone(&state.repo);
    let outcome = tokio::task::spawn_blocking(move || {
        repo.request_transition(TransitionRequest {
            bead_id: id,
            to: body.to,
            actor: body.actor.into_actor(),
            touched_files: body.touched_files,
            now: Utc::now(),
        })
    })
    .await
    .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;

    let status = if outcome.ok { StatusCode::OK } else { StatusCode::CONFLICT };
    Ok((status, Json(json!({
        "ok": outcome.ok,
        "notes": outcome.notes,
        "applied_transition": outcome.applied_transition,
        "phase": outcome.phase,
    }))))
}

async fn cmd_approve(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
    Json(body): Json<ApproveRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = Arc::clone(&state.repo);
    let outcome = tokio::task::spawn_blocking(move || repo.approve(&id, body.summary, body.actor.into_actor(), Utc::now()))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    Ok(Json(json!({ "entry": outcome.entry, "warning": outcome.warning })))
}

async fn cmd_abort(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
    Json(body): Json<AbortRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = Arc::clone(&state.repo);
    let outcome = tokio::task::spawn_blocking(move || repo.abort(&id, body.reason, body.actor.into_actor(), Utc::now()))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    let status = if outcome.ok { StatusCode::OK } else { StatusCode::CONFLICT };
    Ok((status, Json(json!({ "ok": outcome.ok, "notes": outcome.notes, "applied_transition": outcome.applied_transition }))))
}

async fn cmd_generate_grounding(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
    body: Option<Json<ActorOnlyBody>>,
) -> Result<Json<sdlc_core::GroundingBundle>, ApiError> {
    let actor = body.map(|Json(b)| b).unwrap_or_default().actor.into_actor();
    let repo = Arc::clone(&state.repo);
    let bundle = tokio::task::spawn_blocking(move || repo.generate_grounding(&id, actor, Utc::now()))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    Ok(Json(bundle))
}

async fn cmd_collect_evidence(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
    body: Option<Json<ActorOnlyBody>>,
) -> Result<Json<sdlc_core::EvidenceBundle>, ApiError> {
    let actor = body.map(|Json(b)| b).unwrap_or_default().actor.into_actor();
    let repo = Arc::clone(&state.repo);
    let bundle = tokio::task::spawn_blocking(move || repo.collect_evidence_by_running_checks(&id, actor, Utc::now()))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    Ok(Json(bundle))
}

async fn cmd_validate_evidence(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
    body: Option<Json<ActorOnlyBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = body.map(|Json(b)| b).unwrap_or_default().actor.into_actor();
    let repo = Arc::clone(&state.repo);
    let errors = tokio::task::spawn_blocking(move || repo.validate_evidence(&id, actor, Utc::now()))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    let status = if errors.is_empty() { StatusCode::OK } else { StatusCode::CONFLICT };
    Ok((status, Json(json!({ "errors": errors }))))
}

async fn cmd_invalidate_evidence(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
    body: Option<Json<ActorOnlyBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = body.map(|Json(b)| b).unwrap_or_default().actor.into_actor();
    let repo = Arc::clone(&state.repo);
    let reason = tokio::task::spawn_blocking(move || repo.invalidate_evidence_if_stale(&id, actor, Utc::now()))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    Ok(Json(json!({ "invalidated_reason": reason })))
}

async fn cmd_sync_openspec(
    State(state): State<Arc<AppState>>,
    AxPath(id): AxPath<String>,
) -> Result<Json<sdlc_core::OpenSpecRef>, ApiError> {
    let repo = Arc::clone(&state.repo);
    let entry = tokio::task::spawn_blocking(move || repo.sync_openspec(&id))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    bead_id: Option<String>,
}

/// `GET /api/events`: an SSE stream polling both append-only logs every
/// second, emitting only lines not yet seen, optionally filtered to one
/// bead. A comment-only keep-alive line is sent on idle ticks.
async fn cmd_events(
    State(state): State<Arc<AppState>>,
    Query(q): Query<EventsQuery>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let repo = Arc::clone(&state.repo);
    let bead_filter = q.bead_id;
    let mut seen_journal = 0usize;
    let mut seen_decisions = 0usize;

    let stream = tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(1)))
        .map(move |_| {
            let journal = sdlc_store::read_journal(repo.paths()).unwrap_or_default();
            let decisions = sdlc_store::read_decision_ledger(repo.paths()).unwrap_or_default();

            let mut events: Vec<Result<SseEvent, Infallible>> = Vec::new();
            for record in journal.iter().skip(seen_journal) {
                let matches = bead_filter.as_deref().map(|f| f == record.bead_id).unwrap_or(true);
                if matches {
                    if let Ok(data) = serde_json::to_string(record) {
                        events.push(Ok(SseEvent::default().event("execution_record").data(data)));
                    }
                }
            }
            seen_journal = journal.len();

            for entry in decisions.iter().skip(seen_decisions) {
                let matches = bead_filter.as_deref().map(|f| entry.bead_id.as_deref() == Some(f)).unwrap_or(true);
                if matches {
                    if let Ok(data) = serde_json::to_string(entry) {
                        events.push(Ok(SseEvent::default().event("decision_entry").data(data)));
                    }
                }
            }
            seen_decisions = decisions.len();

            if events.is_empty() {
                events.push(Ok(SseEvent::default().comment("keep-alive")));
            }
            events
        })
        .flat_map(tokio_stream::iter);

    Sse::new(stream).keep_alive(KeepAlive::default())
}
