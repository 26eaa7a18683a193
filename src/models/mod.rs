//! Data models for transcripts, git history and the generated site.
//!
//! - [`TranscriptRecord`] - raw `user`/`assistant` lines of a session log
//! - [`Session`] / [`Turn`] - parsed, ordered conversation
//! - [`CommitRef`] / [`ImageVersion`] / [`Artifact`] - git correlation output
//! - [`Page`] / [`SessionManifest`] - pagination output
//! - [`SearchIndex`] - inverted index over page contents
//! - [`SessionSource`] - a discovered session log file

pub mod git;
pub mod page;
pub mod project;
pub mod search;
pub mod session;
pub mod transcript;

pub use git::{Artifact, ArtifactKind, CommitRef, CurrentImage, EditPreview, FileChange, ImageVersion};
pub use page::{Page, PageSummary, PagedSession, SessionManifest};
pub use project::SessionSource;
pub use search::{DocumentInfo, Location, SearchIndex};
pub use session::{CommitLink, Role, Session, ToolCall, Turn, TurnBody};
pub use transcript::{ContentBlock, MessageContent, RecordType, TranscriptRecord};
