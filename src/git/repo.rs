use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, bail};

use super::log::{LOG_FORMAT, parse_log_output};
use crate::models::CommitRef;

/// Result of reading the commit log. Never an error: git problems only mean
/// the site is built without correlation.
#[derive(Debug, Clone, Default)]
pub struct CommitLog {
    /// Oldest first.
    pub commits: Vec<CommitRef>,
    /// True if the directory is not a git repository.
    pub not_a_repo: bool,
    /// Why the log could not be read (git missing, corrupt repo, no commits, ...).
    pub error: Option<String>,
}

impl CommitLog {
    fn failed(error: String) -> Self {
        Self { error: Some(error), ..Default::default() }
    }
}

/// Blocking access to a repository through the `git` executable.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
    executable: PathBuf,
}

impl GitRepo {
    pub fn open(root: &Path) -> Self {
        Self::with_executable(root, Path::new("git"))
    }

    /// Use a specific git binary (tests point this at a missing file).
    pub fn with_executable(root: &Path, executable: &Path) -> Self {
        Self { root: root.to_path_buf(), executable: executable.to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.executable)
            .arg("-C")
            .arg(&self.root)
            .args(["-c", "core.quotepath=off"])
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))
    }

    fn run_checked<I, S>(&self, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.run(args)?;
        if !output.status.success() {
            bail!(
                "git exited with {}: {}",
                output.status.code().map_or("signal".to_string(), |c| c.to_string()),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output.stdout)
    }

    pub fn is_repository(&self) -> Result<bool> {
        Ok(self.run(["rev-parse", "--git-dir"])?.status.success())
    }

    /// Read the full history of HEAD, oldest commit first.
    pub fn commit_log(&self) -> CommitLog {
        if !self.root.exists() {
            return CommitLog { not_a_repo: true, ..CommitLog::failed("Directory does not exist".into()) };
        }

        match self.is_repository() {
            Ok(true) => {}
            Ok(false) => {
                return CommitLog { not_a_repo: true, ..Default::default() };
            }
            Err(e) => return CommitLog::failed(format!("{:#}", e)),
        }

        let format = format!("--format={}", LOG_FORMAT);
        let args = ["log", "--reverse", "--no-renames", "--name-status", format.as_str()];
        match self.run_checked(args) {
            Ok(stdout) => {
                let mut commits = parse_log_output(&String::from_utf8_lossy(&stdout));
                // --reverse is topological; rebased history can still be out of time order.
                commits.sort_by_key(|c| c.timestamp);
                CommitLog { commits, ..Default::default() }
            }
            Err(e) => CommitLog::failed(format!("{:#}", e)),
        }
    }

    /// Contents of `path` as of `commit`.
    pub fn show_blob(&self, commit: &str, path: &str) -> Result<Vec<u8>> {
        let spec = format!("{}:{}", commit, path);
        self.run_checked(["show", spec.as_str()])
            .with_context(|| format!("Failed to read {} at {}", path, commit))
    }

    pub fn remote_url(&self, remote: &str) -> Option<String> {
        let stdout = self.run_checked(["remote", "get-url", remote]).ok()?;
        let url = String::from_utf8_lossy(&stdout).trim().to_string();
        (!url.is_empty()).then_some(url)
    }
}

/// Turn a remote URL into something a browser can open.
pub fn normalize_remote_url(url: &str) -> String {
    let url = match url.strip_prefix("git@github.com:") {
        Some(rest) => format!("https://github.com/{}", rest),
        None => url.to_string(),
    };
    url.strip_suffix(".git").map(str::to_string).unwrap_or(url)
}
