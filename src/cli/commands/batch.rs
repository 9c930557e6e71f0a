//! `batch`: process multiple files in parallel with a script.

use std::process::ExitCode;

use color_eyre::eyre::{bail, Result, WrapErr};

use crate::batch;
use crate::blender::BlenderInstallation;
use crate::cli::args::BatchArgs;
use crate::config::Config;

/// Collect inputs, fan out, summarize.
pub fn execute(
    installation: &BlenderInstallation,
    config: &Config,
    args: &BatchArgs,
) -> Result<ExitCode> {
    if !args.script.is_file() {
        bail!("Script not found: {}", args.script.display());
    }

    let files = batch::collect_files(&args.dir, &args.pattern)
        .wrap_err_with(|| format!("Failed to read directory {}", args.dir.display()))?;
    if files.is_empty() {
        bail!(
            "No files found matching {} in {}",
            args.pattern,
            args.dir.display()
        );
    }
    println!("Found {} files to process", files.len());

    if let Some(output) = &args.output {
        std::fs::create_dir_all(output)
            .wrap_err_with(|| format!("Failed to create output directory {}", output.display()))?;
    }

    let jobs = args.jobs.or(config.default_jobs).unwrap_or(1);
    let report = batch::run(
        installation,
        &args.script,
        &files,
        &args.args,
        args.output.as_deref(),
        &args.pattern,
        jobs,
    );

    println!(
        "\nProcessed: {} files, {} success, {} failed",
        report.total, report.succeeded, report.failed
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .wrap_err_with(|| format!("Failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
