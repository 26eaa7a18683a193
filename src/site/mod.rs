//! Generating and serving the static site.
//!
//! [`build_site`] runs the pipeline (discovery, parsing, git correlation,
//! pagination, search indexing) and hands the results to the emitter, which
//! owns the output layout. [`serve`] only ever reads a finished tree.

pub mod assets;
pub mod builder;
pub mod emitter;
pub mod serve;

pub use builder::{BuildReport, BuildRequest, build_site};
pub use emitter::{SiteData, SiteStats, write_site};
pub use serve::{DEFAULT_PORT, serve};
