use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::config::BuildConfig;
use crate::models::{
    ContentBlock, MessageContent, RecordType, ToolCall, TranscriptRecord, Turn, TurnBody,
};
use crate::parsers::text::{
    flatten_tool_result, sanitize_tool_input, strip_injected_context, tool_input_preview,
    truncate_chars,
};

const THINKING_PREVIEW_CHARS: usize = 300;
const ANSWER_PREFIX: &str = "User has answered";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub show_thinking: bool,
    pub tool_result_max_length: usize,
}

impl ParseOptions {
    pub fn from_config(build: &BuildConfig) -> Self {
        Self {
            show_thinking: build.show_thinking_preview,
            tool_result_max_length: build.tool_result_max_length,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_config(&BuildConfig::default())
    }
}

/// Why a line produced no turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidJson(String),
    MissingField(&'static str),
    Malformed(String),
    /// `summary`, `system`, `file-history-snapshot`, ...
    NotConversation,
    /// A conversational record with nothing to show.
    Empty,
}

impl SkipReason {
    /// Routine skips are not worth a warning.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            SkipReason::InvalidJson(_) | SkipReason::MissingField(_) | SkipReason::Malformed(_)
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            SkipReason::MissingField(field) => write!(f, "missing required field `{}`", field),
            SkipReason::Malformed(e) => write!(f, "malformed record: {}", e),
            SkipReason::NotConversation => write!(f, "not a conversation record"),
            SkipReason::Empty => write!(f, "no text or tool calls"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number.
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptParse {
    pub turns: Vec<Turn>,
    pub warnings: Vec<ParseWarning>,
}

/// Decode one line into a conversational record.
pub fn parse_record(line: &str) -> std::result::Result<TranscriptRecord, SkipReason> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| SkipReason::InvalidJson(e.to_string()))?;

    let Some(record_type) = value.get("type") else {
        return Err(SkipReason::MissingField("type"));
    };
    if !matches!(record_type.as_str(), Some("user") | Some("assistant")) {
        return Err(SkipReason::NotConversation);
    }
    if value.get("timestamp").is_none_or(Value::is_null) {
        return Err(SkipReason::MissingField("timestamp"));
    }

    serde_json::from_value(value).map_err(|e| SkipReason::Malformed(e.to_string()))
}

/// Turns records into turns, pairing tool results with their calls.
struct TurnAssembler {
    options: ParseOptions,
    turns: Vec<Turn>,
    tool_turns: HashMap<String, usize>,
    pending_thinking: Option<String>,
}

impl TurnAssembler {
    fn new(options: ParseOptions) -> Self {
        Self { options, turns: Vec::new(), tool_turns: HashMap::new(), pending_thinking: None }
    }

    fn push(&mut self, record: TranscriptRecord, line: usize) -> std::result::Result<usize, SkipReason> {
        let blocks = match record.message.content {
            MessageContent::Text(text) => vec![ContentBlock::Text { text }],
            MessageContent::Blocks(blocks) => blocks,
        };

        let mut texts = Vec::new();
        let mut thinking: Option<String> = None;
        let mut tool_uses = Vec::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text } => {
                    let text = strip_injected_context(&text);
                    if !text.is_empty() {
                        texts.push(text);
                    }
                }
                ContentBlock::Thinking { thinking: t } if !t.trim().is_empty() => {
                    thinking = Some(match thinking {
                        Some(prev) => format!("{}\n\n{}", prev, t),
                        None => t,
                    });
                }
                ContentBlock::Thinking { .. } => {}
                ContentBlock::ToolUse { id, name, input } => tool_uses.push((id, name, input)),
                ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                    let text = flatten_tool_result(&content);
                    if text.starts_with(ANSWER_PREFIX) {
                        texts.push(text.clone());
                    }
                    self.attach_result(&tool_use_id, &text, is_error.unwrap_or(false));
                }
                ContentBlock::Unsupported => {}
            }
        }

        let base_id = turn_id(&record.uuid, line);
        let text = texts.join("\n\n");
        let before = self.turns.len();

        match record.record_type {
            RecordType::User => {
                if !text.is_empty() {
                    self.turns.push(Turn::new(base_id, record.timestamp, TurnBody::User { text }));
                }
            }
            RecordType::Assistant => {
                if text.is_empty() && tool_uses.is_empty() {
                    // Thinking streamed ahead of its answer waits for it.
                    if let Some(t) = thinking {
                        self.pending_thinking = Some(match self.pending_thinking.take() {
                            Some(prev) => format!("{}\n\n{}", prev, t),
                            None => t,
                        });
                    }
                    return Err(SkipReason::Empty);
                }

                let thinking = match (self.pending_thinking.take(), thinking) {
                    (Some(a), Some(b)) => Some(format!("{}\n\n{}", a, b)),
                    (a, b) => a.or(b),
                };
                if !text.is_empty() || thinking.is_some() {
                    let has_thinking = thinking.is_some();
                    let thinking = thinking
                        .filter(|_| self.options.show_thinking)
                        .map(|t| truncate_chars(&t, THINKING_PREVIEW_CHARS));
                    self.turns.push(Turn::new(
                        base_id.clone(),
                        record.timestamp,
                        TurnBody::Assistant { text, has_thinking, thinking },
                    ));
                }

                for (k, (id, name, input)) in tool_uses.into_iter().enumerate() {
                    let turn_id = if id.is_empty() {
                        format!("{}_tool{}", base_id, k)
                    } else {
                        format!("tool_{}", tool_id_suffix(&id))
                    };
                    let call = ToolCall {
                        input_preview: tool_input_preview(&name, &input),
                        input: sanitize_tool_input(&input, self.options.tool_result_max_length),
                        id: id.clone(),
                        name,
                        result: None,
                        is_error: false,
                    };
                    if !id.is_empty() {
                        self.tool_turns.insert(id, self.turns.len());
                    }
                    self.turns.push(Turn::new(turn_id, record.timestamp, TurnBody::Tool { call }));
                }
            }
        }

        match self.turns.len() - before {
            0 => Err(SkipReason::Empty),
            n => Ok(n),
        }
    }

    fn attach_result(&mut self, tool_use_id: &str, text: &str, is_error: bool) {
        let Some(&idx) = self.tool_turns.get(tool_use_id) else {
            return;
        };
        if let TurnBody::Tool { call } = &mut self.turns[idx].body {
            call.result = Some(truncate_chars(text, self.options.tool_result_max_length));
            call.is_error = is_error;
        }
    }

    fn finish(mut self) -> Vec<Turn> {
        // Thinking left over at end of file belongs to the answer before it.
        if let Some(pending) = self.pending_thinking.take() {
            let last_answer = self.turns.iter_mut().rev().find_map(|t| match &mut t.body {
                TurnBody::Assistant { has_thinking, thinking, .. } => Some((has_thinking, thinking)),
                _ => None,
            });
            match last_answer {
                Some((has_thinking, thinking)) => {
                    *has_thinking = true;
                    if self.options.show_thinking {
                        let joined = match thinking.take() {
                            Some(prev) => format!("{}\n\n{}", prev, pending),
                            None => pending,
                        };
                        *thinking = Some(truncate_chars(&joined, THINKING_PREVIEW_CHARS));
                    }
                }
                None => tracing::debug!(
                    "Dropping {} chars of trailing thinking with no answer",
                    pending.chars().count()
                ),
            }
        }

        // Stable: tool turns keep their place after the assistant turn that issued them.
        self.turns.sort_by_key(|t| t.timestamp);
        self.turns
    }
}

fn turn_id(uuid: &str, line: usize) -> String {
    let short: String = uuid.chars().take(8).collect();
    if short.is_empty() { format!("line_{}", line) } else { format!("msg_{}", short) }
}

fn tool_id_suffix(id: &str) -> &str {
    let start = id.char_indices().rev().nth(11).map(|(i, _)| i).unwrap_or(0);
    &id[start..]
}

/// Parse the contents of one session log.
///
/// Bad lines are skipped and collected as warnings. A final line without a
/// newline that fails to parse is a truncated write and is dropped silently.
/// Returns an error only when no line at all is valid JSON.
pub fn parse_transcript_str(content: &str, options: ParseOptions) -> Result<TranscriptParse> {
    let mut assembler = TurnAssembler::new(options);
    let mut warnings = Vec::new();
    let mut non_empty_lines = 0;
    let mut json_lines = 0;

    let lines: Vec<&str> = content.lines().collect();
    let last_unterminated = !content.is_empty() && !content.ends_with('\n');

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        non_empty_lines += 1;
        let line_num = idx + 1;

        let result = parse_record(line);
        if !matches!(result, Err(SkipReason::InvalidJson(_))) {
            json_lines += 1;
        }

        match result.and_then(|record| assembler.push(record, line_num)) {
            Ok(_) => {}
            Err(SkipReason::InvalidJson(_)) if last_unterminated && idx + 1 == lines.len() => {
                tracing::debug!("Dropping truncated trailing line {}", line_num);
            }
            Err(reason) if reason.is_reportable() => {
                warnings.push(ParseWarning { line: line_num, reason });
            }
            Err(_) => {}
        }
    }

    if non_empty_lines > 0 && json_lines == 0 {
        bail!("Not line-delimited JSON: none of {} lines could be parsed", non_empty_lines);
    }

    Ok(TranscriptParse { turns: assembler.finish(), warnings })
}

/// Parse a session log file (see [`parse_transcript_str`]).
pub fn parse_transcript_file(path: &Path, options: ParseOptions) -> Result<TranscriptParse> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    let content = String::from_utf8_lossy(&bytes);
    let parsed = parse_transcript_str(&content, options)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))?;

    for warning in &parsed.warnings {
        tracing::warn!("Skipped line {} in {}: {}", warning.line, path.display(), warning.reason);
    }
    if !parsed.warnings.is_empty() {
        tracing::warn!(
            "Parsed {}: {} turns ({} lines skipped)",
            path.display(),
            parsed.turns.len(),
            parsed.warnings.len()
        );
    }

    Ok(parsed)
}
