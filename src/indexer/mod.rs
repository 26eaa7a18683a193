//! Full-text search index over paginated sessions
//!
//! # Determinism
//!
//! The index is serialized as-is into `data/index.json`, and rebuilding from
//! the same pages must produce the same bytes. All collections are ordered
//! (`BTreeMap`/`BTreeSet`) and sessions are numbered in input order, so the
//! output never depends on hashing or iteration order.

pub mod builder;
pub mod tokenize;

pub use builder::{INDEX_VERSION, PREVIEW_CHARS, build_search_index};
pub use tokenize::tokenize;
