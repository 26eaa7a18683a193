use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// `git log --name-status` letter (`A`, `M`, `D`, `R100`, ...).
    pub status: String,
    pub path: String,
}

impl FileChange {
    pub fn is_deletion(&self) -> bool {
        self.status.starts_with('D')
    }
}

/// A commit from the repository log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRef {
    pub hash: String,
    pub short_hash: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub author: String,
    pub files_changed: Vec<FileChange>,
}

/// A historical snapshot of an image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVersion {
    pub path: String,
    pub commit_hash: String,
    pub short_hash: String,
    pub timestamp: DateTime<Utc>,
    /// Location of the extracted blob relative to the site root.
    pub local_path: String,
    pub size: u64,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// An image currently present in one of the configured image folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentImage {
    pub id: String,
    pub name: String,
    /// Path inside the repository.
    pub source: String,
    /// Path relative to the site root.
    pub path: String,
    pub modified: Option<DateTime<Utc>>,
    pub file_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    FileRead,
    FileCreate,
    FileEdit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPreview {
    pub before: String,
    pub after: String,
}

/// A file touched by a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub kind: ArtifactKind,
    pub path: String,
    pub relative_path: String,
    pub operation: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub turn_id: String,
    pub tool_call_id: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<EditPreview>,
    /// Short hashes of commits that later changed this file.
    #[serde(default)]
    pub commits: Vec<String>,
}
