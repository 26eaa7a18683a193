use std::path::PathBuf;

use crate::models::{Session, SessionSource};
use crate::parsers::{ParseOptions, parse_transcript_file};

/// Parsed sessions plus what went wrong on the way.
#[derive(Debug, Default)]
pub struct LoadedSessions {
    pub sessions: Vec<Session>,
    /// Lines skipped with a warning, across all files.
    pub warnings: usize,
    /// Files that could not be parsed at all.
    pub failed: Vec<PathBuf>,
}

/// Parse every discovered session log
///
/// Missing or unparseable files are logged and skipped; sessions without any
/// turns are dropped. Order of `sources` is preserved.
pub fn load_sessions(sources: &[SessionSource], options: ParseOptions) -> LoadedSessions {
    let mut loaded = LoadedSessions::default();

    for source in sources {
        if !source.path.exists() {
            tracing::warn!("Session {} listed but missing: {}", source.id, source.path.display());
            continue;
        }

        tracing::info!("Parsing session {}", short_id(&source.id));
        match parse_transcript_file(&source.path, options) {
            Ok(parsed) => {
                loaded.warnings += parsed.warnings.len();
                if parsed.turns.is_empty() {
                    tracing::debug!("Session {} has no turns", source.id);
                    continue;
                }
                loaded.sessions.push(Session {
                    id: source.id.clone(),
                    source: source.path.clone(),
                    branch: source.branch.clone(),
                    first_prompt: source.first_prompt.clone(),
                    turns: parsed.turns,
                });
            }
            Err(e) => {
                tracing::warn!("Skipping session {}: {:#}", source.id, e);
                loaded.failed.push(source.path.clone());
            }
        }
    }

    loaded
}

fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map(|(i, _)| &id[..i]).unwrap_or(id)
}
