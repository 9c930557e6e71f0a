//! CLI command handlers.
//!
//! Each submodule handles one subcommand: resolve parameters, generate the
//! payload if one is needed, invoke Blender, and format the result.

pub mod api;
pub mod batch;
pub mod convert;
pub mod info;
pub mod modify;
pub mod render;
pub mod run;

use std::process::ExitCode;

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::blender::{self, BlenderInstallation, Invocation, RunOutput, ScriptFile};
use crate::cli::args::{Args, Commands};
use crate::config::Config;

/// Resolve the Blender installation and dispatch to the subcommand handler.
pub fn dispatch(args: &Args) -> Result<ExitCode> {
    let config = Config::load()?;
    let installation = blender::discover(args.blender.as_deref(), &config)?;

    match &args.command {
        Commands::Run(run_args) => run::execute(&installation, run_args),
        Commands::Version => version(&installation),
        Commands::Convert(convert_args) => convert::execute(&installation, convert_args),
        Commands::Render(render_args) => render::execute(&installation, &config, render_args),
        Commands::Info(info_args) => info::execute(&installation, info_args),
        Commands::Modify(modify_args) => modify::execute(&installation, modify_args),
        Commands::Batch(batch_args) => batch::execute(&installation, &config, batch_args),
        Commands::Api(api_args) => api::execute(&installation, api_args),
    }
}

/// Show the resolved executable, how it was found, and its version.
fn version(installation: &BlenderInstallation) -> Result<ExitCode> {
    println!("Blender: {}", installation.path.display());
    println!("Source:  {}", installation.method);
    let version = blender::runner::probe_version(installation)?;
    println!("Version: {version}");
    Ok(ExitCode::SUCCESS)
}

/// Run a payload-bearing invocation and read back the JSON report it wrote.
pub(crate) fn run_for_report(
    installation: &BlenderInstallation,
    script: &ScriptFile,
    invocation: &Invocation,
) -> Result<String> {
    let output = invocation.run(installation)?;
    if !output.success() {
        return Err(subprocess_failure(&output));
    }
    std::fs::read_to_string(script.report_path())
        .wrap_err("Blender exited cleanly but wrote no report; its output may explain why")
}

/// Render a failed subprocess into a readable error.
pub(crate) fn subprocess_failure(output: &RunOutput) -> color_eyre::Report {
    let detail = if output.stderr.trim().is_empty() {
        tail(&output.stdout, 15)
    } else {
        tail(&output.stderr, 15)
    };
    match output.status {
        Some(code) => eyre!("Blender exited with code {code}:\n{detail}"),
        None => eyre!("Blender was terminated by a signal:\n{detail}"),
    }
}

/// Last `n` lines of captured output.
fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tail_truncates() {
        let text = "1\n2\n3\n4\n5";
        assert_eq!(tail(text, 2), "4\n5");
        assert_eq!(tail(text, 10), text);
    }

    #[test]
    fn test_subprocess_failure_prefers_stderr() {
        let output = RunOutput {
            stdout: "noise".to_string(),
            stderr: "Error: cannot open file".to_string(),
            status: Some(1),
            duration: Duration::from_millis(5),
        };
        let report = subprocess_failure(&output);
        let message = format!("{report}");
        assert!(message.contains("code 1"));
        assert!(message.contains("cannot open file"));
        assert!(!message.contains("noise"));
    }
}
