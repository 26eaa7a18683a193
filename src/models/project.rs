use std::path::PathBuf;

/// A session log found on disk, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSource {
    pub id: String,
    pub path: PathBuf,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub first_prompt: Option<String>,
    pub branch: Option<String>,
}
