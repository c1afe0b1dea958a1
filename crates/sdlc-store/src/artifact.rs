//! Typed, atomic single-artifact reads and writes.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sdlc_error::{ErrorCode, SdlcError};

/// Read and strictly deserialize the artifact at `path`.
///
/// # Errors
///
/// [`ErrorCode::NotFound`] if `path` does not exist, [`ErrorCode::Io`] on any
/// other read failure, [`ErrorCode::Serialization`] if the contents do not
/// parse as `T`.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, SdlcError> {
    if !path.exists() {
        return Err(SdlcError::not_found(format!("artifact not found: {}", path.display()))
            .with_context("path", path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        SdlcError::new(ErrorCode::Serialization, e.to_string()).with_context("path", path.display().to_string())
    })
}

/// `true` when an artifact exists at `path` (used by the artifact-index
/// endpoint to report which expected artifacts exist under `runs/<bead_id>/`
/// without attempting to parse them).
pub fn artifact_exists(path: &Path) -> bool {
    path.is_file()
}

/// Serialize `value` and atomically replace the file at `path`: write to a
/// sibling `.tmp` file in the same directory, flush, then rename over the
/// destination. A reader can never observe a partially written artifact.
///
/// # Errors
///
/// [`ErrorCode::Io`] if the parent directory cannot be created, the temp
/// file cannot be written, or the rename fails.
pub fn write_artifact_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), SdlcError> {
    let parent = path.parent().ok_or_else(|| SdlcError::new(ErrorCode::Io, "artifact path has no parent directory"))?;
    fs::create_dir_all(parent)?;

    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("artifact")
    ));
    fs::write(&tmp_path, &bytes)?;
    fs::rename(&tmp_path, path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
    Ok(())
}
