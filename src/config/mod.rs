//! Project configuration (`.hypertransparency.json`).
//!
//! A malformed file or an invalid option aborts the build: silently falling back
//! to defaults would change the generated site without telling anyone.

pub mod settings;

pub use settings::{
    BuildConfig, CONFIG_FILE_NAME, DEFAULT_DESCRIPTION, ProjectConfig, ProjectOverrides, SiteConfig,
};
