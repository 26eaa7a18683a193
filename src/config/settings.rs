use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::utils::validate_relative_path;

/// Default config file name, looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = ".hypertransparency.json";

pub const DEFAULT_DESCRIPTION: &str = "AI-assisted development documentation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: String,
    pub repository: String,
    pub branch: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: DEFAULT_DESCRIPTION.to_string(),
            repository: String::new(),
            branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "BuildConfig::default_messages_per_page")]
    pub messages_per_page: usize,
    #[serde(default = "BuildConfig::default_image_folders")]
    pub image_folders: Vec<String>,
    #[serde(default = "BuildConfig::default_show_thinking_preview")]
    pub show_thinking_preview: bool,
    #[serde(default = "BuildConfig::default_tool_result_max_length")]
    pub tool_result_max_length: usize,
    /// Largest |commit time - turn time| still considered a match.
    #[serde(default = "BuildConfig::default_commit_window_seconds")]
    pub commit_window_seconds: u64,
    #[serde(default = "BuildConfig::default_min_term_length")]
    pub min_term_length: usize,
}

impl BuildConfig {
    fn default_messages_per_page() -> usize {
        100
    }

    fn default_image_folders() -> Vec<String> {
        vec!["explore".to_string(), "outputs".to_string(), "figures".to_string()]
    }

    fn default_show_thinking_preview() -> bool {
        true
    }

    fn default_tool_result_max_length() -> usize {
        500
    }

    fn default_commit_window_seconds() -> u64 {
        3600
    }

    fn default_min_term_length() -> usize {
        3
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            messages_per_page: Self::default_messages_per_page(),
            image_folders: Self::default_image_folders(),
            show_thinking_preview: Self::default_show_thinking_preview(),
            tool_result_max_length: Self::default_tool_result_max_length(),
            commit_window_seconds: Self::default_commit_window_seconds(),
            min_term_length: Self::default_min_term_length(),
        }
    }
}

/// Everything a build needs to know, loaded once and passed down by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ProjectOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
}

impl SiteConfig {
    /// Parse and validate a config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: SiteConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::info!("Loading config from {}", path.display());
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn apply_overrides(&mut self, overrides: ProjectOverrides) {
        if let Some(name) = overrides.name {
            self.project.name = name;
        }
        if let Some(description) = overrides.description {
            self.project.description = description;
        }
        if let Some(repository) = overrides.repository {
            self.project.repository = repository;
        }
        if let Some(branch) = overrides.branch {
            self.project.branch = branch;
        }
    }

    /// Fill in values that depend on the repository location.
    pub fn resolve_for_repo(&mut self, repo_path: &Path) {
        if self.project.name.is_empty() {
            self.project.name = repo_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let build = &self.build;
        if build.messages_per_page == 0 {
            bail!("build.messages_per_page must be at least 1");
        }
        if build.tool_result_max_length == 0 {
            bail!("build.tool_result_max_length must be at least 1");
        }
        if build.min_term_length == 0 {
            bail!("build.min_term_length must be at least 1");
        }
        for folder in &build.image_folders {
            validate_image_folder(folder)?;
        }
        Ok(())
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Image folders are repository-relative and may not escape the repository.
fn validate_image_folder(folder: &str) -> Result<()> {
    if folder.trim().is_empty() {
        bail!("build.image_folders entries cannot be empty");
    }
    validate_relative_path(Path::new(folder))
        .with_context(|| format!("Invalid build.image_folders entry: {}", folder))
}
