//! Text cleanup shared by the transcript parser and the page data.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Context the client injects into user text; never part of the conversation.
static INJECTED_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<system-reminder>.*?</system-reminder>|<ide_opened_file>.*?</ide_opened_file>|<ide_selection>.*?</ide_selection>|<ide_file_context>.*?</ide_file_context>",
    )
    .expect("static regex")
});

pub fn strip_injected_context(text: &str) -> String {
    INJECTED_CONTEXT.replace_all(text, "").trim().to_string()
}

/// Keep the first `max_chars` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn file_name_of(input: &Value) -> String {
    let path = input.get("file_path").and_then(Value::as_str).unwrap_or_default();
    Path::new(path).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn str_field<'a>(input: &'a Value, key: &str) -> &'a str {
    input.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Human-readable one-liner for a tool call.
pub fn tool_input_preview(name: &str, input: &Value) -> String {
    match name {
        "Read" | "Write" | "Edit" => format!("{} {}", name, file_name_of(input)),
        "Bash" => format!("Run: {}", truncate_chars(str_field(input, "command"), 50)),
        "Glob" => format!("Find files: {}", str_field(input, "pattern")),
        "Grep" => format!("Search: {}", truncate_chars(str_field(input, "pattern"), 30)),
        _ => name.to_string(),
    }
}

/// Truncate long string arguments so large file writes don't bloat the pages.
pub fn sanitize_tool_input(input: &Value, max_len: usize) -> Value {
    match input {
        Value::Object(map) => {
            let sanitized: Map<String, Value> = map
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => Value::String(truncate_chars(s, max_len)),
                        other => other.clone(),
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(sanitized)
        }
        Value::String(s) => Value::String(truncate_chars(s, max_len)),
        other => other.clone(),
    }
}

/// Tool results are a string or a list of content blocks; keep only the text.
pub fn flatten_tool_result(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                Value::Object(_) if item.get("type").and_then(Value::as_str) == Some("text") => {
                    item.get("text").and_then(Value::as_str)
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn detect_language(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "py" => "python",
        "do" => "stata",
        "js" => "javascript",
        "ts" => "typescript",
        "rs" => "rust",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "md" => "markdown",
        "sh" => "bash",
        "r" => "r",
        _ => "text",
    }
}
