//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Builder for a directory of session logs
pub struct SessionDirBuilder {
    temp_dir: TempDir,
}

impl SessionDirBuilder {
    /// Create a new builder with an empty session directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add `<id>.jsonl` with raw content
    pub fn with_raw_session(self, id: &str, content: &str) -> Self {
        let path = self.temp_dir.path().join(format!("{}.jsonl", id));
        let mut file = fs::File::create(path).expect("Failed to create session file");
        file.write_all(content.as_bytes()).expect("Failed to write session file");
        self
    }

    /// Add `<id>.jsonl` with one line per record
    pub fn with_session(self, id: &str, records: &[RecordBuilder]) -> Self {
        let content = records.iter().map(|r| r.to_json() + "\n").collect::<String>();
        self.with_raw_session(id, &content)
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for SessionDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `user`/`assistant` line of a session log
pub struct RecordBuilder {
    record_type: String,
    blocks: Vec<String>,
    timestamp: String,
    uuid: String,
}

impl RecordBuilder {
    pub fn user(text: &str) -> Self {
        Self::new("user").block(Self::text_block(text))
    }

    pub fn assistant(text: &str) -> Self {
        Self::new("assistant").block(Self::text_block(text))
    }

    /// An empty record of the given type; add blocks with [`RecordBuilder::block`]
    pub fn new(record_type: &str) -> Self {
        Self {
            record_type: record_type.to_string(),
            blocks: Vec::new(),
            timestamp: "\"2024-01-15T10:00:00Z\"".to_string(),
            uuid: "00000000-0000-0000-0000-000000000000".to_string(),
        }
    }

    pub fn block(mut self, block: String) -> Self {
        self.blocks.push(block);
        self
    }

    /// RFC3339 timestamp
    pub fn at(mut self, rfc3339: &str) -> Self {
        self.timestamp = format!("\"{}\"", rfc3339);
        self
    }

    /// Integer milliseconds since the epoch
    pub fn at_millis(mut self, millis: i64) -> Self {
        self.timestamp = millis.to_string();
        self
    }

    pub fn uuid(mut self, uuid: &str) -> Self {
        self.uuid = uuid.to_string();
        self
    }

    pub fn text_block(text: &str) -> String {
        serde_json::json!({"type": "text", "text": text}).to_string()
    }

    pub fn thinking_block(text: &str) -> String {
        serde_json::json!({"type": "thinking", "thinking": text}).to_string()
    }

    pub fn tool_use_block(id: &str, name: &str, input: serde_json::Value) -> String {
        serde_json::json!({"type": "tool_use", "id": id, "name": name, "input": input}).to_string()
    }

    pub fn tool_result_block(tool_use_id: &str, content: &str, is_error: bool) -> String {
        serde_json::json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content,
            "is_error": is_error
        })
        .to_string()
    }

    pub fn to_json(&self) -> String {
        format!(
            r#"{{"type":"{}","message":{{"role":"{}","content":[{}]}},"timestamp":{},"uuid":"{}","sessionId":"test"}}"#,
            self.record_type,
            self.record_type,
            self.blocks.join(","),
            self.timestamp,
            self.uuid
        )
    }
}

/// `n` alternating user/assistant records, one minute apart, starting at 10:00 UTC
pub fn conversation(n: usize) -> Vec<RecordBuilder> {
    (0..n)
        .map(|i| {
            let at = format!("2024-01-15T{:02}:{:02}:00Z", 10 + i / 60, i % 60);
            let uuid = format!("{:08x}-0000-0000-0000-000000000000", i);
            let record = if i % 2 == 0 {
                RecordBuilder::user(&format!("question number {}", i))
            } else {
                RecordBuilder::assistant(&format!("answer number {}", i))
            };
            record.at(&at).uuid(&uuid)
        })
        .collect()
}

/// True if a `git` executable is on PATH
pub fn git_available() -> bool {
    Command::new("git").arg("--version").output().map(|o| o.status.success()).unwrap_or(false)
}

/// Throwaway git repository with deterministic commit dates
pub struct GitRepoBuilder {
    temp_dir: TempDir,
}

impl GitRepoBuilder {
    /// Returns `None` when git is unavailable so callers can skip
    pub fn new() -> Option<Self> {
        if !git_available() {
            eprintln!("git not available, skipping");
            return None;
        }
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let builder = Self { temp_dir };
        builder.git(&["init", "-q"], None);
        builder.git(&["config", "user.name", "Test Author"], None);
        builder.git(&["config", "user.email", "test@example.com"], None);
        builder.git(&["config", "commit.gpgsign", "false"], None);
        Some(builder)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn git(&self, args: &[&str], date: Option<&str>) {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(self.temp_dir.path()).args(args);
        if let Some(date) = date {
            cmd.env("GIT_AUTHOR_DATE", date).env("GIT_COMMITTER_DATE", date);
        }
        let output = cmd.output().expect("Failed to run git");
        assert!(output.status.success(), "git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
    }

    pub fn write(self, rel: &str, content: &[u8]) -> Self {
        let path = self.temp_dir.path().join(rel);
        fs::create_dir_all(path.parent().expect("file has a parent")).expect("Failed to create dir");
        fs::write(path, content).expect("Failed to write file");
        self
    }

    /// Stage everything and commit at `date` (RFC3339)
    pub fn commit(self, message: &str, date: &str) -> Self {
        self.git(&["add", "-A"], None);
        self.git(&["commit", "-q", "--allow-empty", "-m", message], Some(date));
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

/// All files under `dir`, relative, sorted
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir).expect("under dir").to_path_buf())
        .collect();
    files.sort();
    files
}
