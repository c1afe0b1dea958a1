#![deny(unsafe_code)]
#![warn(missing_docs)]
//! File-change classification primitives.
//!
//! Turns raw `git status --porcelain=v1` / `git diff --name-status` output
//! into classified [`FileChange`]s, and normalizes paths the way the
//! boundary enforcer requires (§4.5: "path normalization strips a leading
//! `./`"). [`sdlc-boundary`](../sdlc_boundary) consumes the normalized path
//! list; it does not care about the change kind, only the path.

use serde::{Deserialize, Serialize};

/// The kind of change observed for a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ChangeKind {
    /// A new file was created.
    Created,
    /// An existing file was modified.
    Modified,
    /// A file was deleted.
    Deleted,
    /// A file was renamed from a previous path.
    Renamed {
        /// The original path before the rename.
        from: String,
    },
    /// A change whose porcelain status code this tracker does not
    /// specifically classify (e.g. a merge conflict marker).
    Other,
}

/// A single recorded file change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Normalized (leading `./` stripped), repo-relative path.
    pub path: String,
    /// What kind of change occurred.
    pub kind: ChangeKind,
}

/// Strip a leading `./` from `path`, leaving all other separators intact.
/// This is the exact normalization the boundary enforcer applies before
/// attributing a file to a subsystem.
pub fn normalize_path(path: &str) -> String {
    path.strip_prefix("./").unwrap_or(path).to_string()
}

/// Normalize every path in `paths`.
pub fn normalize_paths(paths: &[String]) -> Vec<String> {
    paths.iter().map(|p| normalize_path(p)).collect()
}

/// Parse `git status --porcelain=v1` output into classified, normalized
/// [`FileChange`]s. Lines that don't parse as a two-character status code
/// plus a path are classified [`ChangeKind::Other`] rather than dropped, so
/// callers never silently lose a touched file.
pub fn parse_porcelain_status(output: &str) -> Vec<FileChange> {
    let mut changes = Vec::new();
    for line in output.lines() {
        if line.len() < 4 {
            continue;
        }
        let status = &line[0..2];
        let rest = line[3..].trim();
        if rest.is_empty() {
            continue;
        }

        if let Some((from, to)) = rest.split_once(" -> ") {
            changes.push(FileChange {
                path: normalize_path(to),
                kind: ChangeKind::Renamed { from: normalize_path(from) },
            });
            continue;
        }

        let kind = if status.contains('A') || status == "??" {
            ChangeKind::Created
        } else if status.contains('D') {
            ChangeKind::Deleted
        } else if status.contains('M') {
            ChangeKind::Modified
        } else {
            ChangeKind::Other
        };

        changes.push(FileChange { path: normalize_path(rest), kind });
    }
    changes
}

/// Aggregate statistics derived from a set of [`FileChange`]s, surfaced by
/// the observability daemon alongside the raw touched-file list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// Number of created files.
    pub created: usize,
    /// Number of modified files.
    pub modified: usize,
    /// Number of deleted files.
    pub deleted: usize,
    /// Number of renamed files.
    pub renamed: usize,
}

/// Summarize a slice of [`FileChange`]s.
pub fn summarize(changes: &[FileChange]) -> ChangeSummary {
    let mut s = ChangeSummary::default();
    for c in changes {
        match &c.kind {
            ChangeKind::Created => s.created += 1,
            ChangeKind::Modified => s.modified += 1,
            ChangeKind::Deleted => s.deleted += 1,
            ChangeKind::Renamed { .. } => s.renamed += 1,
            ChangeKind::Other => {}
        }
    }
    s
}

/// Unique, normalized touched paths from a slice of [`FileChange`]s, in
/// first-seen order.
pub fn touched_paths(changes: &[FileChange]) -> Vec<String> {
    let mut seen = Vec::new();
    for c in changes {
        if !seen.contains(&c.path) {
            seen.push(c.path.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_leading_dot_slash() {
        assert_eq!(normalize_path("./src/lib.rs"), "src/lib.rs");
        assert_eq!(normalize_path("src/lib.rs"), "src/lib.rs");
    }

    #[test]
    fn parses_added_modified_deleted() {
        let out = " M src/lib.rs\nA  new.rs\n D old.rs\n?? untracked.rs\n";
        let changes = parse_porcelain_status(out);
        assert_eq!(changes.len(), 4);
        assert_eq!(changes[0].kind, ChangeKind::Modified);
        assert_eq!(changes[1].kind, ChangeKind::Created);
        assert_eq!(changes[2].kind, ChangeKind::Deleted);
        assert_eq!(changes[3].kind, ChangeKind::Created);
    }

    #[test]
    fn parses_renames() {
        let out = "R  old_name.rs -> new_name.rs\n";
        let changes = parse_porcelain_status(out);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "new_name.rs");
        assert_eq!(changes[0].kind, ChangeKind::Renamed { from: "old_name.rs".to_string() });
    }

    #[test]
    fn summary_counts_each_kind() {
        let changes = parse_porcelain_status(" M a.rs\nA  b.rs\n D c.rs\n");
        let summary = summarize(&changes);
        assert_eq!(summary, ChangeSummary { created: 1, modified: 1, deleted: 1, renamed: 0 });
    }

    #[test]
    fn touched_paths_deduplicates() {
        let changes = vec![
            FileChange { path: "a.rs".into(), kind: ChangeKind::Modified },
            FileChange { path: "a.rs".into(), kind: ChangeKind::Modified },
        ];
        assert_eq!(touched_paths(&changes), vec!["a.rs".to_string()]);
    }
}
