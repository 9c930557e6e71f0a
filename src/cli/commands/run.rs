//! `run`: execute an arbitrary script or expression in headless Blender.

use std::io::Write as _;
use std::process::ExitCode;

use color_eyre::eyre::Result;

use crate::blender::{BlenderInstallation, Invocation};
use crate::cli::args::RunArgs;

/// Run the user's script or expression and pass Blender's output and exit
/// code straight through.
pub fn execute(installation: &BlenderInstallation, args: &RunArgs) -> Result<ExitCode> {
    let mut invocation = Invocation::new().extra_args(args.blender_args.iter().cloned());

    if let Some(blend) = &args.blend {
        invocation = invocation.blend_file(blend);
    }
    if let Some(expr) = &args.expr {
        invocation = invocation.python_expr(expr.clone());
    } else if let Some(script) = &args.script {
        invocation = invocation.python_script(script);
    }
    invocation = invocation.script_args(args.args.iter().cloned());

    let output = invocation.run(installation)?;

    // Forward verbatim; this command adds no framing of its own.
    if !output.stdout.is_empty() {
        print!("{}", output.stdout);
    }
    if !output.stderr.is_empty() {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{}", output.stderr);
    }

    Ok(exit_code_from(output.status))
}

/// Map a subprocess exit status onto this process's exit code.
fn exit_code_from(status: Option<i32>) -> ExitCode {
    ExitCode::from(exit_byte(status))
}

/// Exit codes outside 0-255 (or a signal death) collapse to 1.
fn exit_byte(status: Option<i32>) -> u8 {
    status.and_then(|code| u8::try_from(code).ok()).unwrap_or(1)
}
