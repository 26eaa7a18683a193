use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A tool invocation with its (flattened, truncated) result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
    pub input_preview: String,
    pub result: Option<String>,
    pub is_error: bool,
}

/// Role-specific payload of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum TurnBody {
    User {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(rename = "hasThinking")]
        has_thinking: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        thinking: Option<String>,
    },
    Tool {
        call: ToolCall,
    },
}

/// The commit a turn was correlated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitLink {
    pub hash: String,
    pub short_hash: String,
    /// `commit_time - turn_time`; negative when the commit came first.
    pub delta_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub body: TurnBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitLink>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub artifacts: Vec<String>,
}

impl Turn {
    pub fn new(id: String, timestamp: DateTime<Utc>, body: TurnBody) -> Self {
        Self { id, timestamp, body, commit: None, artifacts: Vec::new() }
    }

    pub fn role(&self) -> Role {
        match self.body {
            TurnBody::User { .. } => Role::User,
            TurnBody::Assistant { .. } => Role::Assistant,
            TurnBody::Tool { .. } => Role::Tool,
        }
    }

    /// Text fed to the search index.
    pub fn searchable_text(&self) -> String {
        match &self.body {
            TurnBody::User { text } => text.clone(),
            TurnBody::Assistant { text, thinking, .. } => match thinking {
                Some(thinking) => format!("{}\n{}", text, thinking),
                None => text.clone(),
            },
            TurnBody::Tool { call } => {
                let mut parts = vec![call.name.as_str(), call.input_preview.as_str()];
                if let Some(result) = &call.result {
                    parts.push(result);
                }
                parts.join("\n")
            }
        }
    }

    /// Short text used for search result previews.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = match &self.body {
            TurnBody::User { text } | TurnBody::Assistant { text, .. } => text.as_str(),
            TurnBody::Tool { call } => call.input_preview.as_str(),
        };
        crate::parsers::text::truncate_chars(text, max_chars)
    }
}

/// One recorded conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_prompt: Option<String>,
    pub turns: Vec<Turn>,
}

impl Session {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.turns.first().map(|t| t.timestamp)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.turns.last().map(|t| t.timestamp)
    }
}
