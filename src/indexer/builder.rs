//! Search index builder.
//!
//! Runs over the final pages rather than the raw sessions, so every
//! [`Location`] points at a page file that actually exists.

use std::collections::BTreeMap;

use crate::indexer::tokenize::tokenize;
use crate::models::{DocumentInfo, Location, PagedSession, Role, SearchIndex, Turn};

pub const INDEX_VERSION: &str = "1.0";

/// Length of the preview stored per document.
pub const PREVIEW_CHARS: usize = 50;

/// Build the inverted index for all pages of all sessions
///
/// Each term maps to the set of turns containing it; a term occurring several
/// times in one turn is recorded once. Sessions are numbered in the order
/// given, and the number is what [`Location::session`] refers to.
///
/// # Examples
///
/// ```no_run
/// use hypertransparency::build_search_index;
///
/// let index = build_search_index(&[], 3);
/// assert_eq!(index.documents, 0);
/// ```
pub fn build_search_index(sessions: &[PagedSession], min_term_length: usize) -> SearchIndex {
    let mut index = SearchIndex {
        version: INDEX_VERSION.to_string(),
        sessions: sessions.iter().map(|s| s.manifest.session_id.clone()).collect(),
        documents: 0,
        terms: BTreeMap::new(),
        document_map: BTreeMap::new(),
    };

    for (session_idx, paged) in sessions.iter().enumerate() {
        for page in &paged.pages {
            for (offset, turn) in page.turns.iter().enumerate() {
                let location =
                    Location { session: session_idx, page: page.page, turn: page.start_index + offset };

                for term in tokenize(&turn.searchable_text(), min_term_length) {
                    index.terms.entry(term).or_default().insert(location);
                }

                index.document_map.insert(
                    format!("{}:{}", session_idx, location.turn),
                    DocumentInfo {
                        id: turn.id.clone(),
                        role: role_name(turn),
                        preview: turn.preview(PREVIEW_CHARS),
                    },
                );
                index.documents += 1;
            }
        }
    }

    tracing::debug!("Indexed {} documents, {} terms", index.documents, index.term_count());
    index
}

fn role_name(turn: &Turn) -> String {
    match turn.role() {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
    .to_string()
}
