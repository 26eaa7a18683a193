//! Git history: commit log, turn/artifact correlation and image versions.
//!
//! Everything here talks to the `git` executable through blocking
//! subprocesses. A missing binary or a directory that is not a repository is
//! not an error; callers get an empty [`CommitLog`] and build without
//! correlation.

pub mod correlate;
pub mod images;
pub mod log;
pub mod repo;

pub use correlate::{correlate_turns, extract_artifacts, link_artifacts, nearest_commit};
pub use images::{current_images, image_history};
pub use repo::{CommitLog, GitRepo, normalize_remote_url};
