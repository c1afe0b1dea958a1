//! Configuration loading, validation, and merging for the SDLC lifecycle
//! engine.
//!
//! This crate provides [`SdlcConfig`] — the top-level runtime settings for
//! the `sdlc` CLI and `sdlc-daemon` binary — together with helpers for
//! loading from an optional `sdlc.toml`, applying `SDLC_*` environment
//! overrides, merging overlays, and producing advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// The boundary budget is configured unusually large, which defeats the
    /// point of bounding blast radius.
    LargeBoundaryBudget {
        /// Which budget field.
        field: String,
        /// The configured value.
        value: usize,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::LargeBoundaryBudget { field, value } => {
                write!(f, "'{field}' is unusually large ({value})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config type
// ---------------------------------------------------------------------------

/// Top-level runtime configuration for the SDLC lifecycle engine.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SdlcConfig {
    /// Repo checkout root. Falls back to the current working directory when
    /// unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_root: Option<String>,

    /// Maximum distinct files an implementation bead may touch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files_touched: Option<usize>,

    /// Maximum distinct subsystems an implementation bead may touch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_subsystems_touched: Option<usize>,

    /// Path prefixes a discovery bead is confined to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_allowlist: Option<Vec<String>>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`), consumed by
    /// `tracing_subscriber::EnvFilter`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// `sdlc-daemon` HTTP bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

impl Default for SdlcConfig {
    fn default() -> Self {
        Self {
            repo_root: None,
            max_files_touched: Some(DEFAULT_MAX_FILES_TOUCHED),
            max_subsystems_touched: Some(DEFAULT_MAX_SUBSYSTEMS_TOUCHED),
            discovery_allowlist: Some(DEFAULT_DISCOVERY_ALLOWLIST.iter().map(|s| s.to_string()).collect()),
            log_level: Some("info".into()),
            bind: Some(DEFAULT_BIND.into()),
        }
    }
}

impl SdlcConfig {
    /// The repo root to operate against: `repo_root` if set, otherwise the
    /// current working directory.
    pub fn effective_repo_root(&self) -> std::io::Result<PathBuf> {
        match &self.repo_root {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default `max_files_touched`, matching `sdlc_boundary::DEFAULT_MAX_FILES_TOUCHED`.
pub const DEFAULT_MAX_FILES_TOUCHED: usize = 8;
/// Default `max_subsystems_touched`, matching `sdlc_boundary::DEFAULT_MAX_SUBSYSTEMS_TOUCHED`.
pub const DEFAULT_MAX_SUBSYSTEMS_TOUCHED: usize = 2;
/// Default discovery allowlist, matching `sdlc_boundary::DEFAULT_DISCOVERY_ALLOWLIST`.
pub const DEFAULT_DISCOVERY_ALLOWLIST: &[&str] = &["docs/", "notes/", "tools/", "experiments/", "runs/"];
/// Default `sdlc-daemon` bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:4173";

/// Threshold above which a boundary budget generates an advisory warning.
const LARGE_BUDGET_THRESHOLD: usize = 100;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`SdlcConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`SdlcConfig::default()`].
///
/// `SDLC_*` environment overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<SdlcConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => SdlcConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into an [`SdlcConfig`].
pub fn parse_toml(content: &str) -> Result<SdlcConfig, ConfigError> {
    toml::from_str::<SdlcConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply `SDLC_*` environment variable overrides.
///
/// Recognised variables:
/// - `SDLC_REPO_ROOT`
/// - `SDLC_MAX_FILES_TOUCHED` (parsed as `usize`; ignored if unparseable)
/// - `SDLC_MAX_SUBSYSTEMS_TOUCHED` (parsed as `usize`; ignored if unparseable)
/// - `SDLC_DISCOVERY_ALLOWLIST` (comma-separated path prefixes)
/// - `SDLC_LOG_LEVEL`
/// - `SDLC_BIND`
pub fn apply_env_overrides(config: &mut SdlcConfig) {
    if let Ok(val) = std::env::var("SDLC_REPO_ROOT") {
        config.repo_root = Some(val);
    }
    if let Ok(val) = std::env::var("SDLC_MAX_FILES_TOUCHED")
        && let Ok(n) = val.parse::<usize>()
    {
        config.max_files_touched = Some(n);
    }
    if let Ok(val) = std::env::var("SDLC_MAX_SUBSYSTEMS_TOUCHED")
        && let Ok(n) = val.parse::<usize>()
    {
        config.max_subsystems_touched = Some(n);
    }
    if let Ok(val) = std::env::var("SDLC_DISCOVERY_ALLOWLIST") {
        config.discovery_allowlist = Some(val.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect());
    }
    if let Ok(val) = std::env::var("SDLC_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Ok(val) = std::env::var("SDLC_BIND") {
        config.bind = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (invalid log level, zero budgets, empty allowlist entries,
/// unparseable bind address) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &SdlcConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if let Some(n) = config.max_files_touched {
        if n == 0 {
            errors.push("max_files_touched must be at least 1".to_string());
        } else if n > LARGE_BUDGET_THRESHOLD {
            warnings.push(ConfigWarning::LargeBoundaryBudget { field: "max_files_touched".to_string(), value: n });
        }
    }

    if let Some(n) = config.max_subsystems_touched {
        if n == 0 {
            errors.push("max_subsystems_touched must be at least 1".to_string());
        } else if n > LARGE_BUDGET_THRESHOLD {
            warnings.push(ConfigWarning::LargeBoundaryBudget { field: "max_subsystems_touched".to_string(), value: n });
        }
    }

    if let Some(ref allowlist) = config.discovery_allowlist {
        if allowlist.is_empty() {
            errors.push("discovery_allowlist must not be empty".to_string());
        }
        for prefix in allowlist {
            if prefix.trim().is_empty() {
                errors.push("discovery_allowlist entries must not be empty".to_string());
            }
        }
    }

    if let Some(ref bind) = config.bind
        && bind.parse::<SocketAddr>().is_err()
    {
        errors.push(format!("invalid bind address '{bind}'"));
    }

    if config.repo_root.is_none() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "repo_root".to_string(),
            hint: "falling back to the current working directory".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values in `overlay` take precedence over `base`;
/// `discovery_allowlist` is replaced wholesale rather than combined, since
/// overlaying two allowlists is rarely what a caller wants.
pub fn merge_configs(base: SdlcConfig, overlay: SdlcConfig) -> SdlcConfig {
    SdlcConfig {
        repo_root: overlay.repo_root.or(base.repo_root),
        max_files_touched: overlay.max_files_touched.or(base.max_files_touched),
        max_subsystems_touched: overlay.max_subsystems_touched.or(base.max_subsystems_touched),
        discovery_allowlist: overlay.discovery_allowlist.or(base.discovery_allowlist),
        log_level: overlay.log_level.or(base.log_level),
        bind: overlay.bind.or(base.bind),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
