use chrono::DateTime;

use crate::models::{CommitRef, FileChange};

const RECORD_SEP: char = '\x1e';
const FIELD_SEP: char = '\x1f';

/// `git log` format: record separator, then hash, unix time, author, subject.
pub const LOG_FORMAT: &str = "%x1e%H%x1f%ct%x1f%an%x1f%s";

pub const SHORT_HASH_LEN: usize = 7;

/// Parse `git log --name-status --format=LOG_FORMAT` output
///
/// Records with a malformed header (bad hash or timestamp) are dropped.
pub fn parse_log_output(output: &str) -> Vec<CommitRef> {
    output.split(RECORD_SEP).filter_map(parse_record).collect()
}

fn parse_record(record: &str) -> Option<CommitRef> {
    let mut lines = record.lines();
    let header = lines.next()?;

    let mut fields = header.splitn(4, FIELD_SEP);
    let hash = fields.next()?.trim();
    let timestamp = fields.next()?.trim().parse::<i64>().ok()?;
    let author = fields.next().unwrap_or_default().trim();
    let message = fields.next().unwrap_or_default().trim();

    // Validate hash (40 hex chars for SHA-1, 64 for SHA-256 repositories)
    if !matches!(hash.len(), 40 | 64) || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let files_changed = lines
        .filter_map(|line| {
            let (status, path) = line.split_once('\t')?;
            Some(FileChange { status: status.trim().to_string(), path: path.to_string() })
        })
        .collect();

    Some(CommitRef {
        short_hash: hash[..SHORT_HASH_LEN].to_string(),
        hash: hash.to_string(),
        timestamp: DateTime::from_timestamp(timestamp, 0)?,
        message: message.to_string(),
        author: author.to_string(),
        files_changed,
    })
}
