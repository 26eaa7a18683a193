pub mod environment;
pub mod paths;

pub use environment::{get_claude_dir, get_sessions_dir};
pub use paths::{encode_project_path, format_path_with_tilde, join_relative, validate_relative_path};
