use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Conversational record kinds. Everything else in a session log is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    User,
    Assistant,
}

/// One `user`/`assistant` line of a session log.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub message: RecordMessage,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub uuid: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordMessage {
    #[serde(default)]
    pub content: MessageContent,
}

/// `message.content` is either a bare string or an array of blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Blocks(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: Option<bool>,
    },
    /// Images, documents and block types added by newer clients.
    #[serde(other)]
    Unsupported,
}

/// One entry of `sessions-index.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIndexEntry {
    pub session_id: String,
    pub full_path: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub first_prompt: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionIndexFile {
    #[serde(default)]
    pub entries: Vec<SessionIndexEntry>,
}
