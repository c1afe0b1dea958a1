#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-schema
//!
//! Tagged artifact decoding keyed by `(schema_name, schema_version)`, and
//! `schemars`-based JSON Schema export. Decoding replaces runtime type
//! dispatch with a sum type ([`DecodedArtifact`]): callers match on the
//! variant instead of probing fields by hand. Every concrete artifact struct
//! in `sdlc-core` already carries `#[serde(deny_unknown_fields)]`, so
//! "strict, no extra fields" validation falls directly out of deserializing
//! through this registry.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::schema_for;
use sdlc_core::{
    Bead, BeadReview, BoundaryRegistry, DecisionLedgerEntry, EvidenceBundle, ExecutionRecord,
    GroundingBundle, OpenSpecRef, bead, boundary, decision, evidence, execution, grounding,
    openspec, review,
};
use sdlc_error::{ErrorCode, SdlcError};
use serde_json::Value;

/// A decoded artifact, dispatched by `schema_name`. Replaces hand-rolled
/// `match value["schema_name"].as_str() { ... }` dispatch at every call site.
#[derive(Debug, Clone)]
pub enum DecodedArtifact {
    /// A [`Bead`].
    Bead(Box<Bead>),
    /// A [`BeadReview`].
    BeadReview(Box<BeadReview>),
    /// A [`GroundingBundle`].
    GroundingBundle(Box<GroundingBundle>),
    /// An [`EvidenceBundle`].
    EvidenceBundle(Box<EvidenceBundle>),
    /// A [`DecisionLedgerEntry`].
    DecisionLedgerEntry(Box<DecisionLedgerEntry>),
    /// An [`ExecutionRecord`].
    ExecutionRecord(Box<ExecutionRecord>),
    /// A [`BoundaryRegistry`].
    BoundaryRegistry(Box<BoundaryRegistry>),
    /// An [`OpenSpecRef`].
    OpenSpecRef(Box<OpenSpecRef>),
}

impl DecodedArtifact {
    /// The `schema_name` this artifact was decoded under.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::Bead(_) => bead::SCHEMA_NAME,
            Self::BeadReview(_) => review::SCHEMA_NAME,
            Self::GroundingBundle(_) => grounding::SCHEMA_NAME,
            Self::EvidenceBundle(_) => evidence::SCHEMA_NAME,
            Self::DecisionLedgerEntry(_) => decision::SCHEMA_NAME,
            Self::ExecutionRecord(_) => execution::SCHEMA_NAME,
            Self::BoundaryRegistry(_) => boundary::SCHEMA_NAME,
            Self::OpenSpecRef(_) => openspec::SCHEMA_NAME,
        }
    }
}

/// All `(schema_name, schema_version)` pairs currently registered. This is
/// the registry's enumeration surface, consulted by `schema export`.
pub fn registered_schemas() -> &'static [(&'static str, u32)] {
    &[
        (bead::SCHEMA_NAME, bead::SCHEMA_VERSION),
        (review::SCHEMA_NAME, review::SCHEMA_VERSION),
        (grounding::SCHEMA_NAME, grounding::SCHEMA_VERSION),
        (evidence::SCHEMA_NAME, evidence::SCHEMA_VERSION),
        (decision::SCHEMA_NAME, decision::SCHEMA_VERSION),
        (execution::SCHEMA_NAME, execution::SCHEMA_VERSION),
        (boundary::SCHEMA_NAME, boundary::SCHEMA_VERSION),
        (openspec::SCHEMA_NAME, openspec::SCHEMA_VERSION),
    ]
}

/// Decode `value` by reading its `schema_name` field and dispatching to the
/// matching concrete type's strict (`deny_unknown_fields`) deserializer.
///
/// # Errors
///
/// Returns [`ErrorCode::SchemaUnknown`] when `schema_name` is missing or not
/// a registered name, or [`ErrorCode::SchemaViolation`] when the payload
/// fails to deserialize as that type (unknown field, missing field, bad enum
/// value, ...).
pub fn decode_artifact(value: &Value) -> Result<DecodedArtifact, SdlcError> {
    let schema_name = value
        .get("schema_name")
        .and_then(Value::as_str)
        .ok_or_else(|| SdlcError::new(ErrorCode::SchemaUnknown, "missing schema_name field"))?;

    let decode = |result: serde_json::Result<_>| {
        result.map_err(|e| {
            SdlcError::schema_violation(format!("{schema_name}: {e}")).with_context("schema_name", schema_name)
        })
    };

    match schema_name {
        n if n == bead::SCHEMA_NAME => {
            decode(serde_json::from_value::<Bead>(value.clone())).map(|v| DecodedArtifact::Bead(Box::new(v)))
        }
        n if n == review::SCHEMA_NAME => decode(serde_json::from_value::<BeadReview>(value.clone()))
            .map(|v| DecodedArtifact::BeadReview(Box::new(v))),
        n if n == grounding::SCHEMA_NAME => decode(serde_json::from_value::<GroundingBundle>(value.clone()))
            .map(|v| DecodedArtifact::GroundingBundle(Box::new(v))),
        n if n == evidence::SCHEMA_NAME => decode(serde_json::from_value::<EvidenceBundle>(value.clone()))
            .map(|v| DecodedArtifact::EvidenceBundle(Box::new(v))),
        n if n == decision::SCHEMA_NAME => decode(serde_json::from_value::<DecisionLedgerEntry>(value.clone()))
            .map(|v| DecodedArtifact::DecisionLedgerEntry(Box::new(v))),
        n if n == execution::SCHEMA_NAME => decode(serde_json::from_value::<ExecutionRecord>(value.clone()))
            .map(|v| DecodedArtifact::ExecutionRecord(Box::new(v))),
        n if n == boundary::SCHEMA_NAME => decode(serde_json::from_value::<BoundaryRegistry>(value.clone()))
            .map(|v| DecodedArtifact::BoundaryRegistry(Box::new(v))),
        n if n == openspec::SCHEMA_NAME => decode(serde_json::from_value::<OpenSpecRef>(value.clone()))
            .map(|v| DecodedArtifact::OpenSpecRef(Box::new(v))),
        other => Err(SdlcError::new(ErrorCode::SchemaUnknown, format!("unregistered schema_name: {other}"))
            .with_context("schema_name", other)),
    }
}

/// Validate `value` against its declared schema, returning the first error
/// as a string. Used by the `validate` CLI subcommand.
pub fn validate_artifact(value: &Value) -> Result<(), SdlcError> {
    decode_artifact(value).map(|_| ())
}

/// Write one JSON Schema file per registered `(schema_name, schema_version)`
/// pair into `out_dir`, named `{schema_name}.v{schema_version}.json`.
/// Returns the paths written, in registration order.
///
/// # Errors
///
/// Returns [`ErrorCode::Io`] if `out_dir` cannot be created or a file cannot
/// be written.
pub fn export_schemas(out_dir: &Path) -> Result<Vec<PathBuf>, SdlcError> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    macro_rules! export_one {
        ($ty:ty, $name:expr, $version:expr) => {{
            let schema = schema_for!($ty);
            let path = out_dir.join(format!("{}.v{}.json", $name, $version));
            let bytes = serde_json::to_vec_pretty(&schema)?;
            fs::write(&path, bytes)?;
            tracing::info!(schema_name = $name, schema_version = $version, path = %path.display(), "wrote schema");
            written.push(path);
        }};
    }

    export_one!(Bead, bead::SCHEMA_NAME, bead::SCHEMA_VERSION);
    export_one!(BeadReview, review::SCHEMA_NAME, review::SCHEMA_VERSION);
    export_one!(GroundingBundle, grounding::SCHEMA_NAME, grounding::SCHEMA_VERSION);
    export_one!(EvidenceBundle, evidence::SCHEMA_NAME, evidence::SCHEMA_VERSION);
    export_one!(DecisionLedgerEntry, decision::SCHEMA_NAME, decision::SCHEMA_VERSION);
    export_one!(ExecutionRecord, execution::SCHEMA_NAME, execution::SCHEMA_VERSION);
    export_one!(BoundaryRegistry, boundary::SCHEMA_NAME, boundary::SCHEMA_VERSION);
    export_one!(OpenSpecRef, openspec::SCHEMA_NAME, openspec::SCHEMA_VERSION);

    Ok(written)
}
