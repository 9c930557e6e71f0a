//! `render`: render frames or animations from a .blend file.

use std::process::ExitCode;

use color_eyre::eyre::{Result, WrapErr};

use crate::blender::payload::py_str;
use crate::blender::{BlenderInstallation, Invocation, PyScript, ScriptFile};
use crate::cli::args::RenderArgs;
use crate::cli::commands::subprocess_failure;
use crate::config::Config;

/// Configure render settings and kick off a still or animation render.
pub fn execute(
    installation: &BlenderInstallation,
    config: &Config,
    args: &RenderArgs,
) -> Result<ExitCode> {
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }

    let engine = args
        .engine
        .map(|e| e.identifier().to_string())
        .or_else(|| config.default_engine.clone());

    let script = build_script(args, engine.as_deref());
    let file = ScriptFile::write(&script.source())?;

    let invocation = Invocation::new()
        .blend_file(&args.blend)
        .python_script(file.script_path());

    let output = invocation.run(installation)?;
    if !output.success() {
        return Err(subprocess_failure(&output));
    }

    if args.start.is_some() || args.end.is_some() {
        println!("Rendered animation to {}", args.output.display());
    } else {
        println!("Rendered frame to {}", args.output.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Generate the render payload.
fn build_script(args: &RenderArgs, engine: Option<&str>) -> PyScript {
    let mut script = PyScript::new();
    script.line("scene = bpy.context.scene");

    if let Some(engine) = engine {
        script.line(&format!("scene.render.engine = {}", py_str(engine)));
    }
    if let Some(samples) = args.samples {
        // Cycles and Eevee keep their sample counts in different places.
        script.line("if scene.render.engine == 'CYCLES':");
        script.line(&format!("    scene.cycles.samples = {samples}"));
        script.line("elif scene.render.engine in ('BLENDER_EEVEE', 'BLENDER_EEVEE_NEXT'):");
        script.line(&format!("    scene.eevee.taa_render_samples = {samples}"));
    }
    if let Some(format) = args.image_format {
        script.line(&format!(
            "scene.render.image_settings.file_format = {}",
            py_str(format.identifier())
        ));
    }
    if let Some(resolution) = &args.resolution {
        script.line(&format!("scene.render.resolution_x = {}", resolution[0]));
        script.line(&format!("scene.render.resolution_y = {}", resolution[1]));
    }
    if let Some(percent) = args.percent {
        script.line(&format!("scene.render.resolution_percentage = {percent}"));
    }

    script.line(&format!(
        "scene.render.filepath = {}",
        py_str(&args.output.to_string_lossy())
    ));

    if let Some(frame) = args.frame {
        script.line(&format!("scene.frame_set({frame})"));
        script.line("bpy.ops.render.render(write_still=True)");
    } else if args.start.is_some() || args.end.is_some() {
        if let Some(start) = args.start {
            script.line(&format!("scene.frame_start = {start}"));
        }
        if let Some(end) = args.end {
            script.line(&format!("scene.frame_end = {end}"));
        }
        script.line("bpy.ops.render.render(animation=True)");
    } else {
        // No frame selection: render whatever frame the file was saved on.
        script.line("bpy.ops.render.render(write_still=True)");
    }

    script
}
