use serde::{Deserialize, Serialize};

use super::git::{CommitRef, ImageVersion};
use super::session::Turn;

/// A fixed-size slice of one session's turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub session_id: String,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    /// Index of the first turn in the session (inclusive).
    pub start_index: usize,
    /// Index one past the last turn (exclusive).
    pub end_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<usize>,
    pub turns: Vec<Turn>,
    pub commits: Vec<CommitRef>,
    pub image_versions: Vec<ImageVersion>,
}

impl Page {
    pub fn file_name(&self) -> String {
        page_file_name(self.page)
    }
}

pub fn page_file_name(page: usize) -> String {
    format!("page-{:03}.json", page)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page: usize,
    pub file: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// Lists the pages of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionManifest {
    pub session_id: String,
    pub total_turns: usize,
    pub messages_per_page: usize,
    pub pages: Vec<PageSummary>,
}

/// All pages of a session plus their manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedSession {
    pub manifest: SessionManifest,
    pub pages: Vec<Page>,
}
