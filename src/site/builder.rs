//! The build pipeline: sessions in, static site out.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use super::emitter::{SiteData, SiteStats, write_site};
use crate::config::SiteConfig;
use crate::git::{
    GitRepo, correlate_turns, current_images, extract_artifacts, image_history, link_artifacts,
};
use crate::indexer::build_search_index;
use crate::pages::paginate_sessions;
use crate::parsers::ParseOptions;
use crate::sessions::{discover_sessions, load_sessions};
use crate::utils::get_sessions_dir;

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Repository root (absolute).
    pub repo_path: PathBuf,
    pub output_dir: PathBuf,
    /// Overrides the Claude project directory derived from `repo_path`.
    pub sessions_dir: Option<PathBuf>,
    /// Git binary; `None` uses `git` from `PATH`.
    pub git_executable: Option<PathBuf>,
}

impl BuildRequest {
    pub fn new(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
            output_dir: repo_path.join("docs"),
            sessions_dir: None,
            git_executable: None,
        }
    }
}

/// What a build produced plus the input problems it tolerated.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub stats: SiteStats,
    pub skipped_lines: usize,
    pub failed_sessions: usize,
    /// Why git history was unavailable, if it was.
    pub git_unavailable: Option<String>,
}

/// Run the whole pipeline and write the site
///
/// Input defects (broken session lines, unreadable logs, missing git) are
/// logged and degrade the output. Configuration and output errors abort.
pub fn build_site(request: &BuildRequest, config: &SiteConfig) -> Result<BuildReport> {
    config.validate().context("Invalid configuration")?;

    let sessions_dir = match &request.sessions_dir {
        Some(dir) => dir.clone(),
        None => get_sessions_dir(&request.repo_path)?,
    };
    tracing::info!("Reading sessions from {}", sessions_dir.display());

    let sources = discover_sessions(&sessions_dir)?;
    tracing::info!("Found {} sessions", sources.len());

    let loaded = load_sessions(&sources, ParseOptions::from_config(&config.build));
    let mut sessions = loaded.sessions;

    let repo = match &request.git_executable {
        Some(exe) => GitRepo::with_executable(&request.repo_path, exe),
        None => GitRepo::open(&request.repo_path),
    };
    let log = repo.commit_log();
    let git_unavailable = if log.not_a_repo {
        Some("not a git repository".to_string())
    } else {
        log.error.clone()
    };
    if let Some(reason) = &git_unavailable {
        tracing::warn!("Building without git history: {}", reason);
    }
    let commits = log.commits;
    tracing::info!("Found {} commits", commits.len());

    let window = config.build.commit_window_seconds;
    let correlated = correlate_turns(&mut sessions, &commits, window);
    tracing::info!("Correlated {} turns with commits", correlated);

    let mut artifacts = extract_artifacts(&mut sessions, &request.repo_path);
    link_artifacts(&mut artifacts, &commits, window);

    let folders = &config.build.image_folders;
    let history = image_history(&repo, &commits, folders);
    let images = current_images(&request.repo_path, folders);
    tracing::info!("Found {} images, {} with version history", images.len(), history.len());

    let paged = paginate_sessions(&sessions, config.build.messages_per_page, &commits, &history);
    let search_index = build_search_index(&paged, config.build.min_term_length);
    tracing::info!("Search index: {} terms", search_index.term_count());

    let data = SiteData {
        config,
        generated: Utc::now(),
        sessions: &sessions,
        paged: &paged,
        commits: &commits,
        artifacts: &artifacts,
        current_images: &images,
        image_history: &history,
        search_index: &search_index,
    };
    let stats = write_site(&request.output_dir, &data, &request.repo_path)?;

    Ok(BuildReport {
        stats,
        skipped_lines: loaded.warnings,
        failed_sessions: loaded.failed.len(),
        git_unavailable,
    })
}
