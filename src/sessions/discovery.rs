use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};

use crate::models::SessionSource;
use crate::models::transcript::SessionIndexFile;

/// Index Claude Code keeps next to the session logs (optional).
pub const SESSIONS_INDEX_FILE: &str = "sessions-index.json";

/// Maximum number of session logs to process (security: prevent resource exhaustion)
const MAX_SESSION_FILES: usize = 10_000;

const FIRST_PROMPT_CHARS: usize = 100;

/// Discover the session logs recorded for one repository
///
/// Reads `sessions-index.json` when present and adds every `*.jsonl` file the index
/// does not list. Sessions are returned oldest first (by creation time, then id).
///
/// # Arguments
///
/// * `sessions_dir` - The Claude project directory, e.g. `~/.claude/projects/-Users-me-repo`
///
/// # Returns
///
/// An empty Vec if the directory doesn't exist (not an error: the repository
/// simply has no recorded sessions yet).
///
/// # Errors
///
/// Returns an error if:
/// - The directory exists but cannot be read
/// - More than [`MAX_SESSION_FILES`] session logs are found
///
/// A malformed `sessions-index.json` is logged as a warning and ignored.
pub fn discover_sessions(sessions_dir: &Path) -> Result<Vec<SessionSource>> {
    if !sessions_dir.exists() {
        tracing::warn!("No session directory at {}", sessions_dir.display());
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    let mut seen = HashSet::new();

    for source in read_sessions_index(sessions_dir) {
        if seen.insert(source.id.clone()) {
            sessions.push(source);
        }
    }

    let entries = fs::read_dir(sessions_dir)
        .with_context(|| format!("Failed to read session directory: {}", sessions_dir.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if !path.is_file() || path.extension().is_none_or(|ext| ext != "jsonl") {
            continue;
        }

        let Some(id) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }

        // Security: Enforce maximum session files limit
        if sessions.len() >= MAX_SESSION_FILES {
            bail!(
                "Resource limit exceeded: Found more than {} session logs in {}",
                MAX_SESSION_FILES,
                sessions_dir.display()
            );
        }

        let modified = file_modified_rfc3339(&path);
        sessions.push(SessionSource {
            id,
            path,
            created: modified.clone(),
            modified,
            first_prompt: None,
            branch: None,
        });
    }

    sessions.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
    Ok(sessions)
}

fn read_sessions_index(sessions_dir: &Path) -> Vec<SessionSource> {
    let index_path = sessions_dir.join(SESSIONS_INDEX_FILE);
    if !index_path.exists() {
        return Vec::new();
    }

    let parsed = fs::read_to_string(&index_path)
        .map_err(anyhow::Error::from)
        .and_then(|raw| serde_json::from_str::<SessionIndexFile>(&raw).map_err(Into::into));

    match parsed {
        Ok(index) => index
            .entries
            .into_iter()
            .filter(|entry| {
                let safe = is_safe_session_id(&entry.session_id);
                if !safe {
                    tracing::warn!("Skipping index entry with unsafe session id: {:?}", entry.session_id);
                }
                safe
            })
            .map(|entry| SessionSource {
                id: entry.session_id,
                path: PathBuf::from(entry.full_path),
                created: entry.created,
                modified: entry.modified,
                first_prompt: entry
                    .first_prompt
                    .map(|p| p.chars().take(FIRST_PROMPT_CHARS).collect()),
                branch: entry.git_branch,
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable {}: {}", index_path.display(), e);
            Vec::new()
        }
    }
}

/// Session ids become directory names in the output.
fn is_safe_session_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

fn file_modified_rfc3339(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified).to_rfc3339())
}
