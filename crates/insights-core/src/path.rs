use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

/// Environment variable overriding the session corpus root
pub const SESSIONS_DIR_ENV: &str = "INSIGHTS_SESSIONS_DIR";

/// Environment variable overriding the output (cache + reports) root
pub const OUTPUT_DIR_ENV: &str = "INSIGHTS_OUTPUT_DIR";

/// Subdirectory of the output root holding one cached facet per session
pub const FACETS_DIR_NAME: &str = "facets";

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Resolve the Claude Code projects directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. INSIGHTS_SESSIONS_DIR environment variable (with tilde expansion)
/// 3. ~/.claude/projects
pub fn resolve_sessions_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    resolve_dir(
        explicit_path,
        std::env::var(SESSIONS_DIR_ENV).ok().as_deref(),
        &[".claude", "projects"],
    )
}

/// Resolve the output directory (facet cache + reports) based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. INSIGHTS_OUTPUT_DIR environment variable (with tilde expansion)
/// 3. ~/.claude/custom-insights
pub fn resolve_output_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    resolve_dir(
        explicit_path,
        std::env::var(OUTPUT_DIR_ENV).ok().as_deref(),
        &[".claude", "custom-insights"],
    )
}

fn resolve_dir(
    explicit_path: Option<&str>,
    env_path: Option<&str>,
    home_relative: &[&str],
) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Ok(expand_tilde(path));
    }

    let home = dirs::home_dir().ok_or_else(|| {
        Error::Config("Could not determine home directory; pass the path explicitly".to_string())
    })?;

    Ok(home_relative
        .iter()
        .fold(home, |acc, segment| acc.join(segment)))
}

/// Facet cache directory under an output root
pub fn facets_dir(output_dir: &Path) -> PathBuf {
    output_dir.join(FACETS_DIR_NAME)
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins_over_env() {
        let path = resolve_dir(Some("/explicit"), Some("/from/env"), &[".claude"]).unwrap();
        assert_eq!(path, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_env_path_used_when_no_explicit() {
        let path = resolve_dir(None, Some("/from/env"), &[".claude"]).unwrap();
        assert_eq!(path, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_empty_env_path_is_ignored() {
        if let Some(home) = dirs::home_dir() {
            let path = resolve_dir(None, Some(""), &[".claude", "projects"]).unwrap();
            assert_eq!(path, home.join(".claude").join("projects"));
        }
    }
}
