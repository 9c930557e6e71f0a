//! `convert`: convert between 3D file formats.

use std::process::ExitCode;

use color_eyre::eyre::{Result, WrapErr};

use crate::blender::{BlenderInstallation, Invocation, PyScript, ScriptFile};
use crate::cli::args::ConvertArgs;
use crate::cli::commands::subprocess_failure;
use crate::formats::Format;

/// Import (or open) the source, export by output extension.
pub fn execute(installation: &BlenderInstallation, args: &ConvertArgs) -> Result<ExitCode> {
    // Resolve both formats before spawning anything; an unsupported
    // extension should fail fast, not after a Blender startup.
    let output_format = Format::from_path(&args.output)?;
    let input_format = args.input.as_deref().map(Format::from_path).transpose()?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }

    let mut script = PyScript::new();
    if args.clear {
        script.line("bpy.ops.object.select_all(action='SELECT')");
        script.line("bpy.ops.object.delete()");
    }
    if let (Some(input), Some(format)) = (&args.input, input_format) {
        script.line(&format.import_statement(input));
    }
    script.line(&output_format.export_statement(
        &args.output,
        args.selection_only,
        !args.no_apply_modifiers,
    ));

    let file = ScriptFile::write(&script.source())?;
    let mut invocation = Invocation::new().python_script(file.script_path());
    if let Some(blend) = &args.blend {
        invocation = invocation.blend_file(blend);
    }

    let output = invocation.run(installation)?;
    if !output.success() {
        return Err(subprocess_failure(&output));
    }

    println!("Exported: {}", args.output.display());
    Ok(ExitCode::SUCCESS)
}
