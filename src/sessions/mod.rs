//! Finding and loading the session logs recorded for a repository.

pub mod discovery;
pub mod loader;

pub use discovery::discover_sessions;
pub use loader::{LoadedSessions, load_sessions};
