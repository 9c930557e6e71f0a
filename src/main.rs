//! blendctl - drive Blender in headless/batch mode.

mod batch;
mod blender;
mod cli;
mod config;
mod constants;
mod formats;
mod report;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::args::Args;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    // Diagnostics are opt-in via RUST_LOG and go to stderr; stdout belongs
    // to command output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // .env values feed executable discovery; the shell environment wins.
    config::load_dotenv();

    let args = Args::parse();
    cli::commands::dispatch(&args)
}
