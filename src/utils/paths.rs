use std::borrow::Cow;
use std::env;
use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};

/// Encodes a repository path into the name of its Claude project directory
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use hypertransparency::encode_project_path;
///
/// let path = PathBuf::from("/Users/foo/bar");
/// assert_eq!(encode_project_path(&path), "-Users-foo-bar");
/// ```
pub fn encode_project_path(path: &Path) -> String {
    path.to_string_lossy().replace(['/', '\\'], "-")
}

/// Validates that a path stays inside whatever directory it is joined onto
///
/// # Errors
///
/// Returns an error if:
/// - The path is empty
/// - The path is absolute
/// - The path contains '..' components (path traversal)
pub fn validate_relative_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("Path cannot be empty");
    }

    if path.is_absolute() || path.has_root() {
        bail!("Path must be relative: {}", path.display());
    }

    for component in path.components() {
        if component == Component::ParentDir {
            bail!("Path contains '..' component: {}", path.display());
        }
    }

    Ok(())
}

/// Joins an untrusted relative path (e.g. a path from git output) onto `base`
///
/// # Errors
///
/// Returns an error if `relative` fails [`validate_relative_path`].
pub fn join_relative(base: &Path, relative: &str) -> Result<PathBuf> {
    let relative = Path::new(relative);
    validate_relative_path(relative)?;
    Ok(base.join(relative))
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use hypertransparency::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/Documents");
/// // Returns "~/Documents" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_project_path() {
        let path = PathBuf::from("/Users/foo/bar");
        assert_eq!(encode_project_path(&path), "-Users-foo-bar");
    }

    #[test]
    fn test_validate_safe_path() {
        assert!(validate_relative_path(Path::new("figures/plot.png")).is_ok());
    }

    #[test]
    fn test_validate_path_with_parent_dir() {
        let unsafe_path = PathBuf::from("figures/../../etc/passwd");
        assert!(validate_relative_path(&unsafe_path).is_err());
    }

    #[test]
    fn test_validate_absolute_path() {
        assert!(validate_relative_path(Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn test_validate_empty_path() {
        assert!(validate_relative_path(Path::new("")).is_err());
    }

    #[test]
    fn test_join_relative() {
        let joined = join_relative(Path::new("/site/data"), "outputs/a.png").unwrap();
        assert_eq!(joined, PathBuf::from("/site/data/outputs/a.png"));
        assert!(join_relative(Path::new("/site"), "../escape.png").is_err());
    }

    #[test]
    fn test_format_path_with_tilde() {
        let path = PathBuf::from("/Users/testuser/Documents/project");
        let formatted = format_path_with_tilde_internal(&path, Some("/Users/testuser"));
        assert_eq!(formatted, "~/Documents/project");

        // Path not under home
        let path2 = PathBuf::from("/opt/local/bin");
        let formatted2 = format_path_with_tilde_internal(&path2, Some("/Users/testuser"));
        assert_eq!(formatted2, "/opt/local/bin");
    }
}
