//! Splitting sessions into fixed-size pages.
//!
//! Pages are the unit the viewer loads lazily, so each one carries everything
//! needed to render it: its turns, the commits those turns were correlated
//! with, and the image versions introduced by those commits.

pub mod paginator;

pub use paginator::{paginate_session, paginate_sessions};
