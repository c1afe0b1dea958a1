#![deny(unsafe_code)]
//! `sdlc`: the command-line surface over the lifecycle engine. Every
//! subcommand either inspects an artifact on disk or calls straight into
//! `sdlc-engine`'s `SdlcRepo` facade — no lifecycle logic lives here.

mod format;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use sdlc_core::{Actor, ActorKind, BeadStatus};
use sdlc_engine::{EngineConfig, SdlcRepo, TransitionRequest};
use sdlc_error::SdlcError;
use tracing_subscriber::EnvFilter;

/// Exit code for a rejected engine operation (illegal transition, gate
/// failure, missing artifact).
const EXIT_ENGINE_REJECTION: i32 = 1;
/// Exit code for malformed input (bad JSON, unregistered schema, unparsable
/// status string).
const EXIT_MALFORMED_INPUT: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "sdlc", version, about = "Lifecycle engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Optional `sdlc.toml` path; falls back to defaults plus `SDLC_*` env overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a JSON artifact file against the registered schema it declares.
    Validate {
        /// Path to the artifact JSON file.
        path: PathBuf,
    },
    /// Print the canonical content hash of a JSON artifact file.
    Hash {
        /// Path to the artifact JSON file.
        path: PathBuf,
    },
    /// Export every registered JSON Schema.
    Schema {
        #[command(subcommand)]
        action: SchemaCommand,
    },
    /// Request a lifecycle transition for a bead.
    Request {
        /// Bead identifier.
        bead_id: String,
        /// `"from -> to"`; only the target status after `->` is evaluated,
        /// the current status is always read from the bead on disk.
        edge: String,
        #[command(flatten)]
        actor: ActorArgs,
        /// Files touched since the bead started work (boundary/discovery gates).
        #[arg(long = "touched-file")]
        touched_files: Vec<String>,
    },
    /// Evidence collection, validation, and staleness invalidation.
    Evidence {
        #[command(subcommand)]
        action: EvidenceCommand,
    },
    /// Grounding pack generation.
    Grounding {
        #[command(subcommand)]
        action: GroundingCommand,
    },
    /// Record a human approval decision.
    Approve {
        /// Bead identifier.
        bead_id: String,
        /// Approval summary; should start with `"APPROVAL:"`.
        #[arg(long)]
        summary: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Abort a bead into `aborted:needs-discovery`.
    Abort {
        /// Bead identifier.
        bead_id: String,
        /// Reason for the abort.
        #[arg(long)]
        reason: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// OpenSpec reference sync.
    Openspec {
        #[command(subcommand)]
        action: OpenspecCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Write one JSON Schema file per registered artifact type.
    Export {
        /// Output directory.
        #[arg(long, default_value = "sdlc/schemas")]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum EvidenceCommand {
    /// Run a bead's acceptance checks and persist the resulting bundle.
    Collect {
        /// Bead identifier.
        bead_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Validate the collected evidence bundle against its acceptance checks.
    Validate {
        /// Bead identifier.
        bead_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Invalidate the evidence bundle if the bead or git state has moved on.
    InvalidateIfStale {
        /// Bead identifier.
        bead_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
}

#[derive(Subcommand, Debug)]
enum GroundingCommand {
    /// Generate a grounding pack for a bead.
    Generate {
        /// Bead identifier.
        bead_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
}

#[derive(Subcommand, Debug)]
enum OpenspecCommand {
    /// Refresh a bead's `openspec_ref.json` from the canonical registry entry.
    Sync {
        /// Bead identifier.
        bead_id: String,
    },
}

#[derive(clap::Args, Debug)]
struct ActorArgs {
    /// Actor kind requesting this operation.
    #[arg(long = "actor-kind", value_enum, default_value_t = ActorKindArg::System)]
    actor_kind: ActorKindArg,
    /// Actor display name.
    #[arg(long = "actor-name", default_value = "sdlc-cli")]
    actor_name: String,
}

impl ActorArgs {
    fn into_actor(self) -> Actor {
        match self.actor_kind {
            ActorKindArg::Human => Actor::human(self.actor_name),
            ActorKindArg::Agent => Actor::agent(self.actor_name),
            ActorKindArg::System => Actor::system(self.actor_name),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ActorKindArg {
    Human,
    Agent,
    System,
}

impl From<ActorKindArg> for ActorKind {
    fn from(value: ActorKindArg) -> Self {
        match value {
            ActorKindArg::Human => ActorKind::Human,
            ActorKindArg::Agent => ActorKind::Agent,
            ActorKindArg::System => ActorKind::System,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("SDLC_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code as u8),
    }
}

fn run(cli: Cli) -> Result<(), i32> {
    let config = sdlc_config::load_config(cli.config.as_deref()).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_MALFORMED_INPUT
    })?;

    match cli.command {
        Command::Validate { path } => cmd_validate(&path),
        Command::Hash { path } => cmd_hash(&path),
        Command::Schema { action: SchemaCommand::Export { out } } => cmd_schema_export(&out),
        Command::Request { bead_id, edge, actor, touched_files } => {
            cmd_request(&config, &bead_id, &edge, actor, touched_files)
        }
        Command::Evidence { action } => cmd_evidence(&config, action),
        Command::Grounding { action: GroundingCommand::Generate { bead_id, actor } } => {
            cmd_grounding_generate(&config, &bead_id, actor)
        }
        Command::Approve { bead_id, summary, actor } => cmd_approve(&config, &bead_id, summary, actor),
        Command::Abort { bead_id, reason, actor } => cmd_abort(&config, &bead_id, reason, actor),
        Command::Openspec { action: OpenspecCommand::Sync { bead_id } } => cmd_openspec_sync(&config, &bead_id),
    }
}

// ── artifact inspection ─────────────────────────────────────────────────

fn read_json(path: &PathBuf) -> Result<serde_json::Value, i32> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("error: read {}: {e}", path.display());
        EXIT_MALFORMED_INPUT
    })?;
    serde_json::from_str(&content).map_err(|e| {
        eprintln!("error: parse {}: {e}", path.display());
        EXIT_MALFORMED_INPUT
    })
}

fn cmd_validate(path: &PathBuf) -> Result<(), i32> {
    let value = read_json(path)?;
    match sdlc_schema::validate_artifact(&value) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            Err(err.exit_code())
        }
    }
}

fn cmd_hash(path: &PathBuf) -> Result<(), i32> {
    let value = read_json(path)?;
    let hash = sdlc_core::canonical_hash(&value);
    println!("{}", hash.hash);
    Ok(())
}

fn cmd_schema_export(out: &PathBuf) -> Result<(), i32> {
    let written = sdlc_schema::export_schemas(out).map_err(|e| {
        eprintln!("error: {e}");
        e.exit_code()
    })?;
    eprintln!("wrote {} schemas to {}", written.len(), out.display());
    Ok(())
}

// ── engine operations ────────────────────────────────────────────────────

fn repo(config: &sdlc_config::SdlcConfig) -> Result<SdlcRepo, i32> {
    let root = config.effective_repo_root().map_err(|e| {
        eprintln!("error: resolve repo root: {e}");
        EXIT_MALFORMED_INPUT
    })?;
    let engine_config = EngineConfig {
        max_files_touched: config.max_files_touched.unwrap_or(EngineConfig::default().max_files_touched),
        max_subsystems_touched: config
            .max_subsystems_touched
            .unwrap_or(EngineConfig::default().max_subsystems_touched),
        discovery_allowlist: config
            .discovery_allowlist
            .clone()
            .unwrap_or_else(|| EngineConfig::default().discovery_allowlist),
    };
    Ok(SdlcRepo::new(root, engine_config))
}

fn engine_err(err: SdlcError) -> i32 {
    eprintln!("error: {err}");
    err.exit_code()
}

fn cmd_request(
    config: &sdlc_config::SdlcConfig,
    bead_id: &str,
    edge: &str,
    actor: ActorArgs,
    touched_files: Vec<String>,
) -> Result<(), i32> {
    let to_str = edge.split("->").next_back().unwrap_or(edge).trim();
    let to: BeadStatus = serde_json::from_value(serde_json::json!(to_str)).map_err(|_| {
        eprintln!("error: unrecognized status '{to_str}'");
        EXIT_MALFORMED_INPUT
    })?;

    let repo = repo(config)?;
    let outcome = repo
        .request_transition(TransitionRequest {
            bead_id: bead_id.to_string(),
            to,
            actor: actor.into_actor(),
            touched_files,
            now: Utc::now(),
        })
        .map_err(engine_err)?;

    print!("{}", format::transition_outcome(&outcome));
    if outcome.ok { Ok(()) } else { Err(EXIT_ENGINE_REJECTION) }
}

fn cmd_evidence(config: &sdlc_config::SdlcConfig, action: EvidenceCommand) -> Result<(), i32> {
    match action {
        EvidenceCommand::Collect { bead_id, actor } => {
            let repo = repo(config)?;
            let bundle = repo
                .collect_evidence_by_running_checks(&bead_id, actor.into_actor(), Utc::now())
                .map_err(engine_err)?;
            print!("{}", format::evidence_bundle(&bundle));
            Ok(())
        }
        EvidenceCommand::Validate { bead_id, actor } => {
            let repo = repo(config)?;
            let errors = repo.validate_evidence(&bead_id, actor.into_actor(), Utc::now()).map_err(engine_err)?;
            print!("{}", format::evidence_errors(&errors));
            if errors.is_empty() { Ok(()) } else { Err(EXIT_ENGINE_REJECTION) }
        }
        EvidenceCommand::InvalidateIfStale { bead_id, actor } => {
            let repo = repo(config)?;
            let reason =
                repo.invalidate_evidence_if_stale(&bead_id, actor.into_actor(), Utc::now()).map_err(engine_err)?;
            print!("{}", format::staleness_result(&reason));
            Ok(())
        }
    }
}

fn cmd_grounding_generate(config: &sdlc_config::SdlcConfig, bead_id: &str, actor: ActorArgs) -> Result<(), i32> {
    let repo = repo(config)?;
    let bundle = repo.generate_grounding(bead_id, actor.into_actor(), Utc::now()).map_err(engine_err)?;
    print!("{}", format::grounding_bundle(&bundle));
    Ok(())
}

fn cmd_approve(config: &sdlc_config::SdlcConfig, bead_id: &str, summary: String, actor: ActorArgs) -> Result<(), i32> {
    let repo = repo(config)?;
    let outcome = repo.approve(bead_id, summary, actor.into_actor(), Utc::now()).map_err(engine_err)?;
    print!("{}", format::approve_outcome(&outcome));
    Ok(())
}

fn cmd_abort(config: &sdlc_config::SdlcConfig, bead_id: &str, reason: String, actor: ActorArgs) -> Result<(), i32> {
    let repo = repo(config)?;
    let outcome = repo.abort(bead_id, reason, actor.into_actor(), Utc::now()).map_err(engine_err)?;
    print!("{}", format::transition_outcome(&outcome));
    if outcome.ok { Ok(()) } else { Err(EXIT_ENGINE_REJECTION) }
}

fn cmd_openspec_sync(config: &sdlc_config::SdlcConfig, bead_id: &str) -> Result<(), i32> {
    let repo = repo(config)?;
    let entry = repo.sync_openspec(bead_id).map_err(engine_err)?;
    print!("{}", format::openspec_ref(&entry));
    Ok(())
}
