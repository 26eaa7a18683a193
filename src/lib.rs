//! Hypertransparency - publish AI coding sessions as a static site
//!
//! Reads the Claude Code session logs recorded for a git repository, links
//! each assistant and tool turn to the nearest commit, tracks how images in the
//! repository changed over time, and writes a paginated, searchable static
//! site that can be hosted anywhere.
//!
//! The pipeline, leaves first:
//!
//! - [`sessions`] - find and parse the session logs (`~/.claude/projects/<repo>`)
//! - [`git`] - commit log, turn/artifact correlation, image history
//! - [`pages`] - fixed-size pages per session
//! - [`indexer`] - inverted search index over the pages
//! - [`site`] - write the output tree, or serve a built one
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use hypertransparency::{BuildRequest, SiteConfig, build_site};
//!
//! let mut config = SiteConfig::default();
//! config.resolve_for_repo(Path::new("/home/ada/paper"));
//! let report = build_site(&BuildRequest::new(Path::new("/home/ada/paper")), &config)?;
//! println!("Built {} messages", report.stats.total_messages);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod git;
pub mod indexer;
pub mod models;
pub mod pages;
pub mod parsers;
pub mod sessions;
pub mod site;
pub mod utils;

// Re-export commonly used types
pub use config::SiteConfig;
pub use indexer::build_search_index;
pub use models::{Page, SearchIndex, Session, Turn};
pub use parsers::{ParseOptions, parse_transcript_file};
pub use site::{BuildReport, BuildRequest, build_site};
pub use utils::paths::{encode_project_path, format_path_with_tilde};
