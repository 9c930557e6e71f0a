//! Configuration loading.
//!
//! Two sources feed executable discovery and command defaults:
//!
//! 1. `config.toml` in the platform config directory (e.g.
//!    `~/.config/blendctl/config.toml`), parsed with serde.
//! 2. `.env` files in the current and home directories, consulted for
//!    `BLENDER_EXE`. Values never override variables already present in the
//!    process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::constants;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Unreadable {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file exists but is not valid TOML.
    #[error("Malformed config file {}: {source}", .path.display())]
    Malformed {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Persistent configuration read from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Explicit path to the Blender executable.
    pub blender_path: Option<PathBuf>,
    /// Default render engine when `render` is called without `--engine`.
    pub default_engine: Option<String>,
    /// Default worker count when `batch` is called without `--jobs`.
    pub default_jobs: Option<usize>,
}

impl Config {
    /// Load configuration from the platform config directory.
    ///
    /// A missing file yields defaults; a present-but-broken file is an
    /// error, since silently ignoring it would mask typos.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// Location of `config.toml`, if a config directory exists on this platform.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(constants::APP_NAME).join(constants::CONFIG_FILE_NAME))
}

/// Load `.env` files into the process environment.
///
/// Checks the current directory first, then home. Keys already set in the
/// environment are left untouched, so the shell always wins.
pub fn load_dotenv() {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(constants::DOTENV_FILE_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(constants::DOTENV_FILE_NAME));
    }

    for path in candidates {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        debug!(path = %path.display(), "Loading dotenv file");
        for (key, value) in parse_dotenv(&content) {
            if std::env::var_os(&key).is_none() {
                // Single-threaded startup path; no other thread reads the
                // environment concurrently.
                std::env::set_var(&key, &value);
            }
        }
    }
}

/// Parse `KEY=value` lines from dotenv content.
///
/// Blank lines and `#` comments are skipped, surrounding quotes stripped.
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !key.is_empty() && !value.is_empty() {
            vars.insert(key.to_string(), value.to_string());
        }
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_dotenv_basic() {
        let vars = parse_dotenv("BLENDER_EXE=/usr/bin/blender\nFOO=bar\n");
        assert_eq!(
            vars.get("BLENDER_EXE").map(String::as_str),
            Some("/usr/bin/blender")
        );
        assert_eq!(vars.get("FOO").map(String::as_str), Some("bar"));
    }

    #[test]
    fn test_parse_dotenv_skips_comments_and_blanks() {
        let vars = parse_dotenv("# comment\n\nKEY=value\n  # indented comment\n");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("KEY").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_parse_dotenv_strips_quotes() {
        let vars = parse_dotenv("A=\"quoted\"\nB='single'\n");
        assert_eq!(vars.get("A").map(String::as_str), Some("quoted"));
        assert_eq!(vars.get("B").map(String::as_str), Some("single"));
    }

    #[test]
    fn test_parse_dotenv_ignores_empty_values() {
        let vars = parse_dotenv("EMPTY=\n=value\nnot_a_pair\n");
        assert!(vars.is_empty());
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Unreadable { .. })));
    }

    #[test]
    fn test_load_from_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blender_path = \"/opt/blender/blender\"").unwrap();
        writeln!(file, "default_jobs = 4").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(
            config.blender_path,
            Some(PathBuf::from("/opt/blender/blender"))
        );
        assert_eq!(config.default_jobs, Some(4));
        assert!(config.default_engine.is_none());
    }

    #[test]
    fn test_load_from_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blender_path = [not valid").unwrap();

        let result = Config::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_load_from_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blender_exe = \"/usr/bin/blender\"").unwrap();

        // Likely a typo for blender_path; surfaced instead of ignored.
        let result = Config::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));
    }
}
