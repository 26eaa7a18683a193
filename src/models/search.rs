use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Where a term occurs. `session` indexes [`SearchIndex::sessions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub session: usize,
    pub page: usize,
    pub turn: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub id: String,
    pub role: String,
    pub preview: String,
}

/// Inverted index from normalized term to the turns containing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    pub version: String,
    pub sessions: Vec<String>,
    pub documents: usize,
    pub terms: BTreeMap<String, BTreeSet<Location>>,
    /// Keyed by `"<session>:<turn>"`.
    pub document_map: BTreeMap<String, DocumentInfo>,
}

impl SearchIndex {
    pub fn lookup(&self, term: &str) -> Option<&BTreeSet<Location>> {
        self.terms.get(&term.to_lowercase())
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}
