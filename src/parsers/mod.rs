//! JSONL parsers for Claude Code session logs
//!
//! # Error Handling Strategy
//!
//! Session logs are appended to while the assistant runs, so damage is routine:
//!
//! - **Per-line decisions**: [`transcript::parse_record`] returns either a record or a
//!   [`SkipReason`]. Malformed JSON and records missing `type`/`timestamp` become
//!   warnings; bookkeeping records (`summary`, `system`, ...) are skipped silently.
//!
//! - **Truncated writes**: an unterminated final line that fails to parse is dropped
//!   without a warning.
//!
//! - **Whole-file failure**: a file with no valid JSON line at all is an error, which
//!   the session loader reports and skips.

pub mod deserializers;
pub mod text;
pub mod transcript;

pub use transcript::{
    ParseOptions, ParseWarning, SkipReason, TranscriptParse, parse_record, parse_transcript_file,
    parse_transcript_str,
};
