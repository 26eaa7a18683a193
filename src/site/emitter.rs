//! Writing the generated site to disk.
//!
//! # Error Handling Strategy
//!
//! Output problems are fatal: a partially written site is worse than none.
//! Every failure carries the path that could not be written. The one
//! exception is a single image (blob or current file) that cannot be copied,
//! which is logged and skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assets::STATIC_ASSETS;
use crate::config::{ProjectConfig, SiteConfig};
use crate::models::{
    Artifact, CommitRef, CurrentImage, ImageVersion, PagedSession, Role, SearchIndex, Session,
};
use crate::utils::join_relative;

pub const DATA_VERSION: &str = "1.0";

/// Everything the emitter needs, borrowed from the pipeline.
pub struct SiteData<'a> {
    pub config: &'a SiteConfig,
    pub generated: DateTime<Utc>,
    pub sessions: &'a [Session],
    pub paged: &'a [PagedSession],
    pub commits: &'a [CommitRef],
    pub artifacts: &'a [Artifact],
    pub current_images: &'a [CurrentImage],
    pub image_history: &'a BTreeMap<String, Vec<ImageVersion>>,
    pub search_index: &'a SearchIndex,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub tool_calls: usize,
    pub total_artifacts: usize,
    pub total_commits: usize,
    pub correlated_turns: usize,
    pub total_images: usize,
    pub image_versions: usize,
    pub sessions: usize,
    pub pages: usize,
    pub search_terms: usize,
}

impl SiteStats {
    pub fn collect(data: &SiteData<'_>) -> Self {
        let turns = || data.sessions.iter().flat_map(|s| s.turns.iter());
        let count_role = |role: Role| turns().filter(|t| t.role() == role).count();

        Self {
            total_messages: turns().count(),
            user_messages: count_role(Role::User),
            assistant_messages: count_role(Role::Assistant),
            tool_calls: count_role(Role::Tool),
            total_artifacts: data.artifacts.len(),
            total_commits: data.commits.len(),
            correlated_turns: turns().filter(|t| t.commit.is_some()).count(),
            total_images: data.current_images.len(),
            image_versions: data.image_history.values().map(Vec::len).sum(),
            sessions: data.sessions.len(),
            pages: data.paged.iter().map(|p| p.pages.len()).sum(),
            search_terms: data.search_index.term_count(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteManifest<'a> {
    version: &'static str,
    project: &'a ProjectConfig,
    generated: DateTime<Utc>,
    stats: &'a SiteStats,
    pagination: Pagination,
    sessions: Vec<SessionEntry<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    messages_per_page: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionEntry<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_prompt: Option<&'a str>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    turns: usize,
    pages: usize,
}

/// A turn correlated with a commit, as listed in `commits.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRef {
    pub session_id: String,
    pub turn_id: String,
    pub page: usize,
    pub delta_seconds: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitEntry<'a> {
    #[serde(flatten)]
    commit: &'a CommitRef,
    related_turns: Vec<TurnRef>,
}

#[derive(Serialize)]
struct Versioned<'a, T: Serialize> {
    version: &'static str,
    #[serde(flatten)]
    body: BTreeMap<&'static str, &'a T>,
}

fn versioned<'a, T: Serialize>(key: &'static str, body: &'a T) -> Versioned<'a, T> {
    Versioned { version: DATA_VERSION, body: BTreeMap::from([(key, body)]) }
}

/// Commit hash to the turns correlated with it, in session and turn order.
pub fn related_turns(paged: &[PagedSession]) -> BTreeMap<String, Vec<TurnRef>> {
    let mut related: BTreeMap<String, Vec<TurnRef>> = BTreeMap::new();
    for page in paged.iter().flat_map(|s| s.pages.iter()) {
        for turn in &page.turns {
            if let Some(link) = &turn.commit {
                related.entry(link.hash.clone()).or_default().push(TurnRef {
                    session_id: page.session_id.clone(),
                    turn_id: turn.id.clone(),
                    page: page.page,
                    delta_seconds: link.delta_seconds,
                });
            }
        }
    }
    related
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Pretty JSON for the small metadata files, compact for pages and the index.
fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let encoded = if pretty { serde_json::to_vec_pretty(value) } else { serde_json::to_vec(value) };
    let bytes = encoded.with_context(|| format!("Failed to serialize {}", path.display()))?;
    write_bytes(path, &bytes)
}

/// Directories under `data/` written only by the generator.
const OWNED_DATA_DIRS: [&str; 2] = ["sessions", "blobs"];

/// Files under `data/` rewritten by every build.
const OWNED_DATA_FILES: [&str; 6] = [
    "manifest.json",
    "index.json",
    "commits.json",
    "artifacts.json",
    "images.json",
    "image-versions.json",
];

#[derive(Deserialize)]
struct PreviousImages {
    #[serde(default)]
    images: Vec<PreviousImage>,
}

#[derive(Deserialize)]
struct PreviousImage {
    path: String,
}

/// Remove what an earlier build wrote, and nothing else.
///
/// Copied images are found through the previous `data/images.json`, so files
/// placed under `images/` or `data/` by hand survive a rebuild.
fn clear_previous_build(out_dir: &Path) -> Result<()> {
    let data_dir = out_dir.join("data");
    remove_previous_images(out_dir, &data_dir.join("images.json"))?;

    for name in OWNED_DATA_DIRS {
        let dir = data_dir.join(name);
        if dir.is_dir() {
            fs::remove_dir_all(&dir).with_context(|| format!("Failed to clear {}", dir.display()))?;
        }
    }
    for name in OWNED_DATA_FILES {
        let file = data_dir.join(name);
        if file.is_file() {
            fs::remove_file(&file)
                .with_context(|| format!("Failed to remove {}", file.display()))?;
        }
    }
    Ok(())
}

fn remove_previous_images(out_dir: &Path, listing: &Path) -> Result<()> {
    let Ok(bytes) = fs::read(listing) else {
        return Ok(());
    };
    let previous: PreviousImages = match serde_json::from_slice(&bytes) {
        Ok(previous) => previous,
        Err(e) => {
            tracing::warn!("Ignoring unreadable {}: {}", listing.display(), e);
            return Ok(());
        }
    };

    for image in previous.images {
        if !image.path.starts_with("images/") {
            continue;
        }
        let Ok(path) = join_relative(out_dir, &image.path) else {
            continue;
        };
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

/// Write the whole site under `out_dir`
///
/// Output of the previous build is removed first so files from it (a
/// session that has since shrunk to fewer pages, say) never linger. Other
/// files in `out_dir` are left alone.
pub fn write_site(out_dir: &Path, data: &SiteData<'_>, repo_root: &Path) -> Result<SiteStats> {
    let data_dir = out_dir.join("data");
    clear_previous_build(out_dir)?;
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create output directory: {}", data_dir.display()))?;

    let stats = SiteStats::collect(data);

    write_sessions(&data_dir, data.paged)?;
    write_json(&data_dir.join("index.json"), data.search_index, false)?;

    let related = related_turns(data.paged);
    let commits: Vec<CommitEntry<'_>> = data
        .commits
        .iter()
        .map(|commit| CommitEntry {
            commit,
            related_turns: related.get(&commit.hash).cloned().unwrap_or_default(),
        })
        .collect();
    write_json(&data_dir.join("commits.json"), &versioned("commits", &commits), true)?;
    write_json(&data_dir.join("artifacts.json"), &versioned("artifacts", &data.artifacts), true)?;
    write_json(&data_dir.join("images.json"), &versioned("images", &data.current_images), true)?;
    write_json(
        &data_dir.join("image-versions.json"),
        &versioned("imageVersions", data.image_history),
        true,
    )?;

    write_blobs(out_dir, data.image_history)?;
    copy_current_images(out_dir, repo_root, data.current_images)?;

    let manifest = SiteManifest {
        version: DATA_VERSION,
        project: &data.config.project,
        generated: data.generated,
        stats: &stats,
        pagination: Pagination { messages_per_page: data.config.build.messages_per_page },
        sessions: data
            .sessions
            .iter()
            .zip(data.paged)
            .map(|(session, paged)| SessionEntry {
                id: &session.id,
                branch: session.branch.as_deref(),
                first_prompt: session.first_prompt.as_deref(),
                started_at: session.started_at(),
                ended_at: session.ended_at(),
                turns: session.turns.len(),
                pages: paged.pages.len(),
            })
            .collect(),
    };
    write_json(&data_dir.join("manifest.json"), &manifest, true)?;

    for (name, contents) in STATIC_ASSETS {
        write_bytes(&out_dir.join(name), contents.as_bytes())?;
    }

    tracing::info!("Wrote site to {}", out_dir.display());
    Ok(stats)
}

fn write_sessions(data_dir: &Path, paged: &[PagedSession]) -> Result<()> {
    for session in paged {
        let dir = join_relative(&data_dir.join("sessions"), &session.manifest.session_id)
            .with_context(|| format!("Unsafe session id: {}", session.manifest.session_id))?;
        write_json(&dir.join("manifest.json"), &session.manifest, true)?;
        for page in &session.pages {
            write_json(&dir.join(page.file_name()), page, false)?;
        }
    }
    Ok(())
}

fn write_blobs(out_dir: &Path, history: &BTreeMap<String, Vec<ImageVersion>>) -> Result<()> {
    for version in history.values().flatten() {
        match join_relative(out_dir, &version.local_path) {
            Ok(path) => write_bytes(&path, &version.content)?,
            Err(e) => tracing::warn!("Skipping image blob {}: {:#}", version.local_path, e),
        }
    }
    Ok(())
}

fn copy_current_images(out_dir: &Path, repo_root: &Path, images: &[CurrentImage]) -> Result<()> {
    let images_dir = out_dir.join("images");
    fs::create_dir_all(&images_dir)
        .with_context(|| format!("Failed to create directory: {}", images_dir.display()))?;

    for image in images {
        let from = repo_root.join(&image.source);
        let to = out_dir.join(&image.path);
        if let Err(e) = fs::copy(&from, &to) {
            tracing::warn!("Failed to copy image {}: {}", from.display(), e);
        }
    }
    Ok(())
}
