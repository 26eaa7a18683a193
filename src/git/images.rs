//! Image snapshots from git history and the image folders' current contents.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::repo::GitRepo;
use crate::models::{CommitRef, CurrentImage, ImageVersion};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

pub fn is_image_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn in_folders(path: &str, folders: &[String]) -> bool {
    folders.iter().any(|folder| {
        let folder = folder.trim_end_matches('/');
        path.strip_prefix(folder).is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Site-relative location an extracted blob is written to.
pub fn blob_local_path(short_hash: &str, path: &str) -> String {
    format!("data/blobs/{}/{}", short_hash, path)
}

/// Every historical version of the images under `folders`, keyed by repo path
///
/// `commits` must be ordered by time. Blobs that git cannot produce are
/// skipped with a warning.
pub fn image_history(
    repo: &GitRepo,
    commits: &[CommitRef],
    folders: &[String],
) -> BTreeMap<String, Vec<ImageVersion>> {
    let mut history: BTreeMap<String, Vec<ImageVersion>> = BTreeMap::new();

    for commit in commits {
        for change in &commit.files_changed {
            if change.is_deletion() || !is_image_path(&change.path) || !in_folders(&change.path, folders) {
                continue;
            }
            let content = match repo.show_blob(&commit.hash, &change.path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping image version: {:#}", e);
                    continue;
                }
            };
            history.entry(change.path.clone()).or_default().push(ImageVersion {
                path: change.path.clone(),
                commit_hash: commit.hash.clone(),
                short_hash: commit.short_hash.clone(),
                timestamp: commit.timestamp,
                local_path: blob_local_path(&commit.short_hash, &change.path),
                size: content.len() as u64,
                content,
            });
        }
    }

    for versions in history.values_mut() {
        normalize_versions(versions);
    }
    history
}

/// Order versions by time, drop repeated commits, and keep only the last
/// version recorded within any one second.
pub fn normalize_versions(versions: &mut Vec<ImageVersion>) {
    // Stable: equal timestamps keep history order.
    versions.sort_by_key(|v| v.timestamp);

    let mut seen = BTreeSet::new();
    let mut out: Vec<ImageVersion> = Vec::with_capacity(versions.len());
    for version in versions.drain(..) {
        if !seen.insert(version.commit_hash.clone()) {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.timestamp == version.timestamp => *last = version,
            _ => out.push(version),
        }
    }
    *versions = out;
}

/// Images currently in the top level of each image folder
///
/// Missing folders are ignored. When two folders hold the same file name the
/// first folder wins.
pub fn current_images(repo_root: &Path, folders: &[String]) -> Vec<CurrentImage> {
    let mut images = Vec::new();
    let mut names = BTreeSet::new();

    for folder in folders {
        let dir = repo_root.join(folder);
        if !dir.is_dir() {
            continue;
        }

        let walker = WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_image_path(&name) {
                continue;
            }
            if !names.insert(name.clone()) {
                tracing::warn!("Image {} in {} shadowed by an earlier folder", name, folder);
                continue;
            }

            let metadata = entry.metadata().ok();
            let stem = Path::new(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            images.push(CurrentImage {
                id: format!("img_{}", stem),
                source: format!("{}/{}", folder.trim_end_matches('/'), name),
                path: format!("images/{}", name),
                modified: metadata
                    .as_ref()
                    .and_then(|m| m.modified().ok())
                    .map(DateTime::<Utc>::from),
                file_size: metadata.map_or(0, |m| m.len()),
                name,
            });
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn version(hash: char, secs: i64) -> ImageVersion {
        let commit_hash = hash.to_string().repeat(40);
        ImageVersion {
            path: "figures/a.png".to_string(),
            short_hash: commit_hash[..7].to_string(),
            local_path: blob_local_path(&commit_hash[..7], "figures/a.png"),
            commit_hash,
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            size: 1,
            content: vec![0],
        }
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path("figures/plot.PNG"));
        assert!(is_image_path("a/b.webp"));
        assert!(!is_image_path("figures/data.csv"));
        assert!(!is_image_path("png"));
    }

    #[test]
    fn test_in_folders() {
        let folders = vec!["figures".to_string(), "outputs/".to_string()];
        assert!(in_folders("figures/a.png", &folders));
        assert!(in_folders("outputs/run1/b.png", &folders));
        assert!(!in_folders("figures-old/a.png", &folders));
        assert!(!in_folders("a.png", &folders));
    }

    #[test]
    fn test_normalize_versions_orders_and_dedups() {
        let mut versions = vec![version('c', 20), version('a', 0), version('b', 10), version('a', 0)];
        normalize_versions(&mut versions);

        let hashes: Vec<char> = versions.iter().map(|v| v.commit_hash.chars().next().unwrap()).collect();
        assert_eq!(hashes, vec!['a', 'b', 'c']);
        assert!(versions.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_normalize_versions_collapses_same_second() {
        let mut versions = vec![version('a', 0), version('b', 5), version('c', 5)];
        normalize_versions(&mut versions);

        assert_eq!(versions.len(), 2);
        assert!(versions[1].commit_hash.starts_with('c'));
    }

    #[test]
    fn test_image_history_without_git_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = GitRepo::with_executable(dir.path(), Path::new("/nonexistent/git"));
        let commit = CommitRef {
            hash: "a".repeat(40),
            short_hash: "aaaaaaa".to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            message: "add".to_string(),
            author: "Ada".to_string(),
            files_changed: vec![crate::models::FileChange {
                status: "A".to_string(),
                path: "figures/a.png".to_string(),
            }],
        };

        let history = image_history(&repo, &[commit], &["figures".to_string()]);
        assert!(history.is_empty());
    }

    #[test]
    fn test_current_images() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("figures/nested")).unwrap();
        fs::create_dir_all(dir.path().join("outputs")).unwrap();
        fs::write(dir.path().join("figures/b.png"), b"png").unwrap();
        fs::write(dir.path().join("figures/a.svg"), b"<svg/>").unwrap();
        fs::write(dir.path().join("figures/notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("figures/nested/c.png"), b"x").unwrap();
        fs::write(dir.path().join("outputs/b.png"), b"other").unwrap();

        let folders = vec!["figures".to_string(), "outputs".to_string(), "missing".to_string()];
        let images = current_images(dir.path(), &folders);

        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.svg", "b.png"]);
        assert_eq!(images[1].id, "img_b");
        assert_eq!(images[1].source, "figures/b.png");
        assert_eq!(images[1].path, "images/b.png");
        assert_eq!(images[1].file_size, 3);
    }
}
