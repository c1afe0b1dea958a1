//! Append-only NDJSON logs (`runs/journal.jsonl`, `decision_ledger.jsonl`).
//!
//! Writers hold an OS advisory lock (the `fd-lock` crate — a sibling repo
//! under the same organization as the original teacher crate pulls in
//! exactly this crate for the same "one process, one writer" guarantee; see
//! DESIGN.md) around open-append-write-flush so two processes appending at
//! once can never interleave a single line. Readers never take a lock: they
//! tolerate empty lines and a partially written tail line by skipping
//! whatever fails to parse, rather than failing the whole read.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use fd_lock::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sdlc_error::SdlcError;

/// Append one NDJSON line to `path`, creating the file (and its parent
/// directory) if necessary. Holds an advisory write lock for the duration of
/// the open-write-flush so concurrent appenders never interleave partial
/// lines.
///
/// # Errors
///
/// [`sdlc_error::ErrorCode::Io`] on any filesystem failure,
/// [`sdlc_error::ErrorCode::Serialization`] if `value` cannot be serialized.
pub fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<(), SdlcError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut lock = RwLock::new(file);
    let mut guard = lock.write().map_err(|e| {
        sdlc_error::SdlcError::new(sdlc_error::ErrorCode::Io, format!("failed to lock {}: {e}", path.display()))
    })?;

    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    guard.write_all(&line)?;
    guard.flush()?;
    Ok(())
}

/// Read every line of `path`, deserializing each as `T`. Lines that are
/// empty, whitespace-only, or fail to parse are skipped rather than failing
/// the whole read — this is the reader-side complement to the writer's
/// whole-line-atomicity guarantee: a line torn by a crash mid-write is
/// simply dropped, never misread as the start of the next record.
///
/// Returns an empty `Vec` if `path` does not exist yet.
///
/// # Errors
///
/// [`sdlc_error::ErrorCode::Io`] if `path` exists but cannot be opened.
pub fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SdlcError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<T>(trimmed) {
            out.push(value);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    #[test]
    fn appends_one_line_per_call() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        append_line(&path, &json!({"n": 1})).unwrap();
        append_line(&path, &json!({"n": 2})).unwrap();
        let values: Vec<Value> = read_lines(&path).unwrap();
        assert_eq!(values, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.jsonl");
        let values: Vec<Value> = read_lines(&path).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn blank_and_malformed_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        std::fs::write(&path, "{\"n\": 1}\n\n   \n{not json\n{\"n\": 2}\n").unwrap();
        let values: Vec<Value> = read_lines(&path).unwrap();
        assert_eq!(values, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn parent_directory_is_created_on_first_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runs").join("journal.jsonl");
        append_line(&path, &json!({"n": 1})).unwrap();
        assert!(path.exists());
    }
}
