//! Unified error taxonomy with stable error codes for the SDLC lifecycle engine.
//!
//! Every [`SdlcError`] carries an [`ErrorCode`] (a machine-readable, stable
//! string tag), a human-readable message, an optional cause chain, and
//! arbitrary key-value context. Use the builder returned by [`SdlcError::new`]
//! to construct errors fluently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Artifact failed schema validation.
    Schema,
    /// A requested state-machine edge is not legal.
    Transition,
    /// An actor attempted an edge it is not authorized for.
    Authority,
    /// A gate composite rejected a transition.
    Gate,
    /// An artifact is stale relative to the bead it was validated against.
    Evidence,
    /// A change exceeded the boundary/discovery policy.
    Boundary,
    /// A referenced artifact does not exist.
    NotFound,
    /// Filesystem / subprocess I/O failure.
    Io,
    /// Malformed configuration.
    Config,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Schema => "schema",
            Self::Transition => "transition",
            Self::Authority => "authority",
            Self::Gate => "gate",
            Self::Evidence => "evidence",
            Self::Boundary => "boundary",
            Self::NotFound => "not_found",
            Self::Io => "io",
            Self::Config => "config",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Artifact has an unknown top-level field, missing required field, or
    /// invalid enum value.
    SchemaViolation,
    /// `schema_name` is not registered.
    SchemaUnknown,
    /// Requested edge is not in the legal transition table, or `from` does
    /// not match the bead's current status.
    IllegalTransition,
    /// Actor kind is not permitted to request this edge.
    AuthorityViolation,
    /// A gate composite produced one or more errors.
    GateFailure,
    /// Evidence is stale relative to the bead's current canonical hash or
    /// the recorded git state.
    StaleArtifact,
    /// Changed files/subsystems exceed the configured boundary limits, or a
    /// discovery bead touched paths outside its allowlist.
    BoundaryViolation,
    /// A referenced bead or artifact does not exist.
    NotFound,
    /// Filesystem or subprocess operation failed.
    Io,
    /// JSON (de)serialization failed.
    Serialization,
    /// Configuration value is invalid.
    Configuration,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SchemaViolation | Self::SchemaUnknown => ErrorCategory::Schema,
            Self::IllegalTransition => ErrorCategory::Transition,
            Self::AuthorityViolation => ErrorCategory::Authority,
            Self::GateFailure => ErrorCategory::Gate,
            Self::StaleArtifact => ErrorCategory::Evidence,
            Self::BoundaryViolation => ErrorCategory::Boundary,
            Self::NotFound => ErrorCategory::NotFound,
            Self::Io | Self::Serialization => ErrorCategory::Io,
            Self::Configuration => ErrorCategory::Config,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation of the code, e.g. `"SDLC-E001"`.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::SchemaViolation => "SDLC-E001",
            Self::SchemaUnknown => "SDLC-E002",
            Self::IllegalTransition => "SDLC-E003",
            Self::AuthorityViolation => "SDLC-E004",
            Self::GateFailure => "SDLC-E005",
            Self::StaleArtifact => "SDLC-E006",
            Self::BoundaryViolation => "SDLC-E007",
            Self::NotFound => "SDLC-E008",
            Self::Io => "SDLC-E009",
            Self::Serialization => "SDLC-E010",
            Self::Configuration => "SDLC-E011",
            Self::Internal => "SDLC-E099",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

// ---------------------------------------------------------------------------
// SdlcError
// ---------------------------------------------------------------------------

/// Unified lifecycle-engine error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use sdlc_error::{SdlcError, ErrorCode};
///
/// let err = SdlcError::new(ErrorCode::NotFound, "bead not found")
///     .with_context("bead_id", "work-abc123");
/// ```
pub struct SdlcError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl SdlcError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Build a [`SchemaViolation`](ErrorCode::SchemaViolation) error.
    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaViolation, message)
    }

    /// Build an [`IllegalTransition`](ErrorCode::IllegalTransition) error.
    pub fn illegal_transition(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IllegalTransition, message)
    }

    /// Build an [`AuthorityViolation`](ErrorCode::AuthorityViolation) error.
    pub fn authority_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthorityViolation, message)
    }

    /// Build a [`GateFailure`](ErrorCode::GateFailure) from collected gate
    /// error lines, joined with `"; "` per the propagation policy.
    pub fn gate_failure(errors: &[String]) -> Self {
        Self::new(ErrorCode::GateFailure, errors.join("; "))
    }

    /// Build a [`NotFound`](ErrorCode::NotFound) error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// The CLI exit code this error maps to: 2 for malformed input
    /// ([`ErrorCode::SchemaViolation`] / [`ErrorCode::SchemaUnknown`]), 1 for
    /// every other engine rejection.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::SchemaViolation | ErrorCode::SchemaUnknown => 2,
            _ => 1,
        }
    }
}

impl fmt::Debug for SdlcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("SdlcError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for SdlcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_code(), self.message)?;
        if !self.context.is_empty() {
            // Deterministic output thanks to BTreeMap.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for SdlcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for SdlcError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for SdlcError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::Serialization, err.to_string()).with_source(err)
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of an [`SdlcError`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SdlcErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&SdlcError> for SdlcErrorDto {
    fn from(err: &SdlcError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}
