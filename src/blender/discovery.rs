//! Blender installation discovery.
//!
//! Locates the Blender executable by checking, in order:
//! 1. An explicit `--blender` flag
//! 2. The `BLENDER_EXE` environment variable (including `.env` files loaded
//!    at startup)
//! 3. `blender_path` from `config.toml`
//! 4. Common per-platform installation directories
//! 5. The system `PATH`
//!
//! The first candidate that exists on disk wins. Explicitly named binaries
//! (flag, env var, config) that are missing are an error rather than a
//! silent fallthrough.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants;

/// Errors from executable discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No Blender executable was found anywhere.
    #[error(
        "Could not find a Blender executable. Searched ${var}, config.toml, \
         common install paths, and PATH. Set {var} in your environment or .env file."
    )]
    NotFound {
        /// The environment variable that was consulted.
        var: &'static str,
    },

    /// An explicitly configured executable does not exist.
    #[error(
        "Configured Blender executable does not exist: {} (from {source_name})",
        .path.display()
    )]
    MissingExecutable {
        /// The configured path.
        path: PathBuf,
        /// Where the path came from (flag, env var, config file).
        source_name: &'static str,
    },
}

/// How the Blender executable was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// Explicit `--blender` flag.
    CliFlag,
    /// `BLENDER_EXE` environment variable (shell or `.env`).
    Environment,
    /// `blender_path` in `config.toml`.
    ConfigFile,
    /// Found in a common installation directory.
    CommonPath,
    /// Found via the system `PATH`.
    SystemPath,
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::CliFlag => "--blender flag",
            Self::Environment => "environment",
            Self::ConfigFile => "config.toml",
            Self::CommonPath => "common install path",
            Self::SystemPath => "PATH",
        };
        write!(f, "{name}")
    }
}

/// A located Blender executable.
#[derive(Debug, Clone, Serialize)]
pub struct BlenderInstallation {
    /// Full path to the executable.
    pub path: PathBuf,
    /// How it was discovered.
    pub method: DiscoveryMethod,
}

/// Locate the Blender executable.
pub fn discover(
    explicit: Option<&Path>,
    config: &Config,
) -> Result<BlenderInstallation, DiscoveryError> {
    // 1. Explicit flag: missing file is the user's mistake, not a fallback.
    if let Some(path) = explicit {
        return checked(path, DiscoveryMethod::CliFlag, "--blender");
    }

    // 2. Environment variable (.env files already merged at startup).
    if let Some(path) = std::env::var_os(constants::BLENDER_EXE_VAR) {
        return checked(
            Path::new(&path),
            DiscoveryMethod::Environment,
            constants::BLENDER_EXE_VAR,
        );
    }

    // 3. Config file.
    if let Some(path) = &config.blender_path {
        return checked(path, DiscoveryMethod::ConfigFile, "config.toml");
    }

    // 4. Common installation paths.
    for candidate in expand_common_paths() {
        if candidate.is_file() {
            info!(path = %candidate.display(), "Found Blender in common install path");
            return Ok(BlenderInstallation {
                path: candidate,
                method: DiscoveryMethod::CommonPath,
            });
        }
        debug!(path = %candidate.display(), "Candidate not present");
    }

    // 5. System PATH.
    if let Some(path) = search_path(constants::BLENDER_BINARY_NAME) {
        info!(path = %path.display(), "Found Blender on PATH");
        return Ok(BlenderInstallation {
            path,
            method: DiscoveryMethod::SystemPath,
        });
    }

    Err(DiscoveryError::NotFound {
        var: constants::BLENDER_EXE_VAR,
    })
}

fn checked(
    path: &Path,
    method: DiscoveryMethod,
    source_name: &'static str,
) -> Result<BlenderInstallation, DiscoveryError> {
    if path.is_file() {
        info!(path = %path.display(), %method, "Using configured Blender executable");
        Ok(BlenderInstallation {
            path: path.to_path_buf(),
            method,
        })
    } else {
        Err(DiscoveryError::MissingExecutable {
            path: path.to_path_buf(),
            source_name,
        })
    }
}

/// Expand the common-path table against home and Program Files.
fn expand_common_paths() -> Vec<PathBuf> {
    let home = dirs::home_dir();
    let program_files = std::env::var_os("PROGRAMFILES").map(PathBuf::from);

    constants::COMMON_BLENDER_PATHS
        .iter()
        .filter_map(|entry| {
            if let Some(rest) = entry.strip_prefix("~/") {
                home.as_ref().map(|h| h.join(rest))
            } else if let Some(rest) = entry.strip_prefix("$PROGRAMFILES/") {
                program_files.as_ref().map(|pf| pf.join(rest))
            } else {
                Some(PathBuf::from(entry))
            }
        })
        .collect()
}

/// Search the `PATH` environment variable for an executable by name.
fn search_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}
