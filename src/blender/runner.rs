//! Headless Blender invocation.
//!
//! Builds the Blender argument list, spawns the subprocess, and captures its
//! output. Every invocation runs with `-b` (background mode); the scene
//! file, payload script or expression, and script arguments are appended in
//! the order Blender expects:
//!
//! ```text
//! blender -b [file.blend] [extra args] (--python-expr EXPR | --python script.py) [-- args…]
//! ```

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use super::discovery::BlenderInstallation;

/// Python expression used to probe the Blender version.
const VERSION_EXPR: &str = "import bpy; print(bpy.app.version_string)";

/// Errors from subprocess invocation.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The subprocess could not be spawned.
    #[error("Failed to launch Blender at {}: {source}", .path.display())]
    Spawn {
        /// The executable that failed to launch.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The version probe ran but produced no recognizable version line.
    #[error("Blender at {} did not report a version (exit code {code:?})", .path.display())]
    VersionUnavailable {
        /// The probed executable.
        path: PathBuf,
        /// Exit code of the probe.
        code: Option<i32>,
    },
}

/// Captured output of one Blender run.
#[derive(Debug)]
pub struct RunOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code, if the process exited normally.
    pub status: Option<i32>,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl RunOutput {
    /// Whether the subprocess exited with code zero.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Builder for one headless Blender invocation.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    blend_file: Option<PathBuf>,
    python_script: Option<PathBuf>,
    python_expr: Option<String>,
    script_args: Vec<String>,
    extra_args: Vec<String>,
    factory_startup: bool,
}

impl Invocation {
    /// Start an empty invocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a `.blend` file before running the payload.
    pub fn blend_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.blend_file = Some(path.into());
        self
    }

    /// Run a Python script via `--python`.
    pub fn python_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.python_script = Some(path.into());
        self
    }

    /// Run a Python expression via `--python-expr`.
    pub fn python_expr(mut self, expr: impl Into<String>) -> Self {
        self.python_expr = Some(expr.into());
        self
    }

    /// Arguments passed to the script after `--`.
    pub fn script_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.script_args.extend(args);
        self
    }

    /// Raw Blender arguments inserted before the payload flags.
    pub fn extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Start with factory settings, ignoring user preferences and addons.
    pub fn factory_startup(mut self, enabled: bool) -> Self {
        self.factory_startup = enabled;
        self
    }

    /// Assemble the argument vector (everything after the executable).
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-b".to_string()];

        if self.factory_startup {
            args.push("--factory-startup".to_string());
        }

        if let Some(file) = &self.blend_file {
            args.push(file.to_string_lossy().into_owned());
        }

        args.extend(self.extra_args.iter().cloned());

        if let Some(expr) = &self.python_expr {
            args.push("--python-expr".to_string());
            args.push(expr.clone());
        } else if let Some(script) = &self.python_script {
            args.push("--python".to_string());
            args.push(script.to_string_lossy().into_owned());
        }

        if !self.script_args.is_empty() {
            args.push("--".to_string());
            args.extend(self.script_args.iter().cloned());
        }

        args
    }

    /// Spawn Blender and wait for it to finish, capturing output.
    ///
    /// The exit status is reported, not judged; callers decide what a
    /// non-zero code means for them.
    pub fn run(&self, installation: &BlenderInstallation) -> Result<RunOutput, RunnerError> {
        let args = self.to_args();
        debug!(
            exe = %installation.path.display(),
            ?args,
            "Invoking Blender"
        );

        let start = Instant::now();
        let output = Command::new(&installation.path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunnerError::Spawn {
                path: installation.path.clone(),
                source,
            })?;
        let duration = start.elapsed();

        let result = RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
            duration,
        };

        info!(
            status = ?result.status,
            duration_ms = duration.as_millis() as u64,
            "Blender run finished"
        );
        Ok(result)
    }
}

/// Probe the Blender version by printing `bpy.app.version_string`.
pub fn probe_version(installation: &BlenderInstallation) -> Result<String, RunnerError> {
    let output = Invocation::new()
        .factory_startup(true)
        .python_expr(VERSION_EXPR)
        .run(installation)?;

    extract_version_line(&output.stdout).ok_or(RunnerError::VersionUnavailable {
        path: installation.path.clone(),
        code: output.status,
    })
}

/// Pull the version line out of Blender's chatty startup output.
///
/// The probe prints a bare version string ("4.2.1"); Blender's own banner
/// lines all start with "Blender", so the first line that begins with a
/// digit is ours.
fn extract_version_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| {
            line.chars().next().is_some_and(|c| c.is_ascii_digit()) && line.contains('.')
        })
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blender::discovery::DiscoveryMethod;

    fn fake_installation(path: &str) -> BlenderInstallation {
        BlenderInstallation {
            path: PathBuf::from(path),
            method: DiscoveryMethod::CliFlag,
        }
    }

    #[test]
    fn test_args_minimal_expr() {
        let args = Invocation::new().python_expr("print(1)").to_args();
        assert_eq!(args, vec!["-b", "--python-expr", "print(1)"]);
    }

    #[test]
    fn test_args_full_ordering() {
        let args = Invocation::new()
            .blend_file("scene.blend")
            .extra_args(["--threads".to_string(), "4".to_string()])
            .python_script("payload.py")
            .script_args(["--output".to_string(), "out.glb".to_string()])
            .to_args();
        assert_eq!(
            args,
            vec![
                "-b",
                "scene.blend",
                "--threads",
                "4",
                "--python",
                "payload.py",
                "--",
                "--output",
                "out.glb",
            ]
        );
    }

    #[test]
    fn test_args_expr_takes_precedence_over_script() {
        // The CLI layer rejects this combination; the builder still has a
        // deterministic preference.
        let args = Invocation::new()
            .python_expr("print(1)")
            .python_script("payload.py")
            .to_args();
        assert!(args.contains(&"--python-expr".to_string()));
        assert!(!args.contains(&"--python".to_string()));
    }

    #[test]
    fn test_args_factory_startup_before_file() {
        let args = Invocation::new()
            .factory_startup(true)
            .blend_file("scene.blend")
            .to_args();
        assert_eq!(args, vec!["-b", "--factory-startup", "scene.blend"]);
    }

    #[test]
    fn test_run_missing_executable_is_spawn_error() {
        let result = Invocation::new()
            .python_expr("print(1)")
            .run(&fake_installation("/nonexistent/blender"));
        assert!(matches!(result, Err(RunnerError::Spawn { .. })));
    }

    #[test]
    fn test_extract_version_line() {
        let stdout = "Blender 4.2.1 (hash abc123 built 2024-01-01)\n4.2.1\n\nBlender quit\n";
        assert_eq!(extract_version_line(stdout), Some("4.2.1".to_string()));
    }

    #[test]
    fn test_extract_version_line_absent() {
        assert_eq!(extract_version_line("Blender quit\n"), None);
        assert_eq!(extract_version_line(""), None);
    }
}
