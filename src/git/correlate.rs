//! Linking turns and file artifacts to commits by time.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{
    Artifact, ArtifactKind, CommitLink, CommitRef, EditPreview, Role, Session, TurnBody,
};
use crate::parsers::text::{detect_language, truncate_chars};

const EDIT_PREVIEW_CHARS: usize = 100;

/// The commit closest in time to `at`, if one lies within `window_seconds`.
///
/// `commits` must be ordered by time. Returns the index of the commit and the
/// signed delta `commit - at` in whole seconds. On equal distance the earliest
/// commit wins.
pub fn nearest_commit(
    at: DateTime<Utc>,
    commits: &[CommitRef],
    window_seconds: u64,
) -> Option<(usize, i64)> {
    let window_ms = i64::try_from(window_seconds).unwrap_or(i64::MAX / 1000).saturating_mul(1000);
    let mut best: Option<(usize, i64)> = None;

    for (idx, commit) in commits.iter().enumerate() {
        let delta_ms = (commit.timestamp - at).num_milliseconds();
        if delta_ms.abs() > window_ms {
            continue;
        }
        // Strict comparison keeps the earliest of equally distant commits.
        if best.is_none_or(|(_, best_ms)| delta_ms.abs() < best_ms.abs()) {
            best = Some((idx, delta_ms));
        }
    }

    best.map(|(idx, delta_ms)| (idx, delta_ms / 1000))
}

/// Attach the nearest commit to every assistant and tool turn
///
/// Each turn decides on its own, so several turns may share one commit. Any
/// previous correlation is replaced, which keeps rebuilds idempotent.
///
/// Returns the number of correlated turns.
pub fn correlate_turns(sessions: &mut [Session], commits: &[CommitRef], window_seconds: u64) -> usize {
    let mut correlated = 0;

    for turn in sessions.iter_mut().flat_map(|s| s.turns.iter_mut()) {
        turn.commit = None;
        if !matches!(turn.role(), Role::Assistant | Role::Tool) {
            continue;
        }
        if let Some((idx, delta_seconds)) = nearest_commit(turn.timestamp, commits, window_seconds) {
            let commit = &commits[idx];
            turn.commit = Some(CommitLink {
                hash: commit.hash.clone(),
                short_hash: commit.short_hash.clone(),
                delta_seconds,
            });
            correlated += 1;
        }
    }

    correlated
}

/// Collect file reads/writes/edits from tool turns and tag the turns with their ids.
pub fn extract_artifacts(sessions: &mut [Session], repo_root: &Path) -> Vec<Artifact> {
    let mut artifacts = Vec::new();

    for session in sessions.iter_mut() {
        for turn in session.turns.iter_mut() {
            turn.artifacts.clear();
            let TurnBody::Tool { call } = &turn.body else {
                continue;
            };
            let kind = match call.name.as_str() {
                "Read" => ArtifactKind::FileRead,
                "Write" => ArtifactKind::FileCreate,
                "Edit" => ArtifactKind::FileEdit,
                _ => continue,
            };
            let Some(file_path) = call.input.get("file_path").and_then(Value::as_str) else {
                continue;
            };
            if file_path.is_empty() {
                continue;
            }

            let preview = (kind == ArtifactKind::FileEdit).then(|| EditPreview {
                before: edit_side(&call.input, "old_string"),
                after: edit_side(&call.input, "new_string"),
            });

            let artifact = Artifact {
                id: artifact_id(&turn.id, file_path),
                kind,
                path: file_path.to_string(),
                relative_path: relative_to_repo(file_path, repo_root),
                operation: call.name.clone(),
                timestamp: turn.timestamp,
                session_id: session.id.clone(),
                turn_id: turn.id.clone(),
                tool_call_id: call.id.clone(),
                language: detect_language(file_path).to_string(),
                preview,
                commits: Vec::new(),
            };
            turn.artifacts.push(artifact.id.clone());
            artifacts.push(artifact);
        }
    }

    artifacts
}

/// Record on each artifact the commits that changed its file within
/// `window_seconds` after the tool call.
pub fn link_artifacts(artifacts: &mut [Artifact], commits: &[CommitRef], window_seconds: u64) {
    let window_ms = i64::try_from(window_seconds).unwrap_or(i64::MAX / 1000).saturating_mul(1000);

    for artifact in artifacts.iter_mut() {
        artifact.commits = commits
            .iter()
            .filter(|commit| {
                let delta_ms = (commit.timestamp - artifact.timestamp).num_milliseconds();
                (0..=window_ms).contains(&delta_ms)
                    && commit.files_changed.iter().any(|f| f.path == artifact.relative_path)
            })
            .map(|commit| commit.short_hash.clone())
            .collect();
    }
}

fn edit_side(input: &Value, key: &str) -> String {
    let text = input.get(key).and_then(Value::as_str).unwrap_or_default();
    text.chars().take(EDIT_PREVIEW_CHARS).collect()
}

fn artifact_id(turn_id: &str, file_path: &str) -> String {
    let digest = Sha256::digest(format!("{}_{}", turn_id, file_path).as_bytes());
    let hex = format!("{:x}", digest);
    format!("art_{}", &hex[..8])
}

fn relative_to_repo(file_path: &str, repo_root: &Path) -> String {
    let path = Path::new(file_path);
    match path.strip_prefix(repo_root) {
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| truncate_chars(file_path, 80)),
    }
}
