use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::paths::encode_project_path;

/// Get the Claude directory path (~/.claude)
pub fn get_claude_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".claude"))
}

/// Directory holding the session logs recorded for `repo_path`
pub fn get_sessions_dir(repo_path: &Path) -> Result<PathBuf> {
    Ok(get_claude_dir()?.join("projects").join(encode_project_path(repo_path)))
}
