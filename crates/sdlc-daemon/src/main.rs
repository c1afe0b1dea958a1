#![deny(unsafe_code)]
//! `sdlc-daemon`: the HTTP control-plane binary. Loads `sdlc.toml` plus
//! `SDLC_*` env overrides the same way `sdlc-cli` does, then serves the
//! routes `sdlc_daemon::build_app` wires up.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sdlc_daemon::{build_app, AppState};
use sdlc_engine::EngineConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sdlc-daemon", version, about = "Lifecycle engine HTTP daemon")]
struct Args {
    /// Path to `sdlc.toml`; falls back to defaults plus `SDLC_*` env overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind address from config/env.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = sdlc_config::load_config(args.config.as_deref()).context("load config")?;
    if let Some(bind) = args.bind {
        config.bind = Some(bind);
    }

    let filter = EnvFilter::try_new(config.log_level.clone().unwrap_or_else(|| "info".to_string()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let repo_root = config.effective_repo_root().context("resolve repo root")?;
    let engine_config = EngineConfig {
        max_files_touched: config.max_files_touched.unwrap_or(EngineConfig::default().max_files_touched),
        max_subsystems_touched: config
            .max_subsystems_touched
            .unwrap_or(EngineConfig::default().max_subsystems_touched),
        discovery_allowlist: config.discovery_allowlist.clone().unwrap_or_else(|| EngineConfig::default().discovery_allowlist),
    };

    let bind = config.bind.clone().unwrap_or_else(|| sdlc_config::DEFAULT_BIND.to_string());
    let state = std::sync::Arc::new(AppState::new(repo_root.clone(), engine_config));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind).await.with_context(|| format!("bind {bind}"))?;
    info!(%bind, repo_root = %repo_root.display(), "sdlc-daemon listening");

    axum::serve(listener, app).await.context("serve")
}
