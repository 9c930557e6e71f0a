//! `modify`: apply common scene modifications and save the result.

use std::process::ExitCode;

use color_eyre::eyre::{bail, Result, WrapErr};

use crate::blender::payload::py_str;
use crate::blender::{BlenderInstallation, Invocation, PyScript, ScriptFile};
use crate::cli::args::ModifyArgs;
use crate::cli::commands::subprocess_failure;

/// Apply the selected operations in a fixed order, then save.
pub fn execute(installation: &BlenderInstallation, args: &ModifyArgs) -> Result<ExitCode> {
    if !args.has_operations() {
        bail!("No operations selected; see blendctl modify --help");
    }
    if let Some(ratio) = args.decimate {
        if !(ratio > 0.0 && ratio <= 1.0) {
            bail!("Decimate ratio must be in (0, 1], got {ratio}");
        }
    }
    if let Some(save) = &args.save {
        if let Some(parent) = save.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).wrap_err_with(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
        }
    }

    let script = build_script(args);
    let file = ScriptFile::write(&script.source())?;

    let invocation = Invocation::new()
        .blend_file(&args.blend)
        .python_script(file.script_path());

    let output = invocation.run(installation)?;
    if !output.success() {
        return Err(subprocess_failure(&output));
    }

    // Payload warnings (e.g. unappliable modifiers) come through on stdout.
    for line in output.stdout.lines() {
        if line.starts_with("Warning:") {
            eprintln!("{line}");
        }
    }

    match &args.save {
        Some(save) => println!("Saved modified file to {}", save.display()),
        None => println!("Applied modifications (not saved; use --save)"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Generate the modification payload. Operation order is fixed so that
/// e.g. transforms are applied before origins move and decimation sees
/// triangulated geometry.
fn build_script(args: &ModifyArgs) -> PyScript {
    let mut script = PyScript::new();

    if let Some(factor) = args.scale {
        script.line("for obj in bpy.data.objects:");
        script.line(&format!("    obj.scale *= {factor}"));
    }

    if args.apply_transforms {
        script.line("bpy.ops.object.select_all(action='SELECT')");
        script.line("bpy.ops.object.transform_apply(location=True, rotation=True, scale=True)");
        script.line("bpy.ops.object.select_all(action='DESELECT')");
    }

    if args.center_origins {
        script.line("bpy.ops.object.select_all(action='SELECT')");
        script.line("bpy.ops.object.origin_set(type='ORIGIN_GEOMETRY', center='BOUNDS')");
        script.line("bpy.ops.object.select_all(action='DESELECT')");
    }

    if let Some(mode) = args.set_origin {
        script.line("bpy.ops.object.select_all(action='SELECT')");
        script.line(&format!(
            "bpy.ops.object.origin_set(type={})",
            py_str(mode.identifier())
        ));
        script.line("bpy.ops.object.select_all(action='DESELECT')");
    }

    if args.triangulate {
        script.line("for obj in bpy.data.objects:");
        script.line("    if obj.type == 'MESH':");
        script.line("        bpy.context.view_layer.objects.active = obj");
        script.line("        bpy.ops.object.mode_set(mode='EDIT')");
        script.line("        bpy.ops.mesh.select_all(action='SELECT')");
        script.line("        bpy.ops.mesh.quads_convert_to_tris()");
        script.line("        bpy.ops.object.mode_set(mode='OBJECT')");
    }

    if let Some(ratio) = args.decimate {
        script.line("for obj in bpy.data.objects:");
        script.line("    if obj.type == 'MESH':");
        script.line("        mod = obj.modifiers.new(name='Decimate', type='DECIMATE')");
        script.line(&format!("        mod.ratio = {ratio}"));
        script.line("        bpy.context.view_layer.objects.active = obj");
        script.line("        bpy.ops.object.modifier_apply(modifier=mod.name)");
    }

    if args.apply_modifiers {
        script.line("for obj in bpy.data.objects:");
        script.line("    if obj.type == 'MESH':");
        script.line("        bpy.context.view_layer.objects.active = obj");
        script.line("        for mod in obj.modifiers[:]:");
        script.line("            try:");
        script.line("                bpy.ops.object.modifier_apply(modifier=mod.name)");
        script.line("            except RuntimeError as exc:");
        script.line(
            "                print('Warning: could not apply %s on %s: %s' % (mod.name, obj.name, exc))",
        );
    }

    if args.smooth_shading || args.flat_shading {
        let op = if args.smooth_shading {
            "bpy.ops.object.shade_smooth()"
        } else {
            "bpy.ops.object.shade_flat()"
        };
        script.line("for obj in bpy.data.objects:");
        script.line("    if obj.type == 'MESH':");
        script.line("        bpy.context.view_layer.objects.active = obj");
        script.line("        bpy.ops.object.select_all(action='DESELECT')");
        script.line("        obj.select_set(True)");
        script.line(&format!("        {op}"));
    }

    if args.remove_unused {
        script.line(
            "bpy.ops.outliner.orphans_purge(do_local_ids=True, do_linked_ids=True, do_recursive=True)",
        );
    }

    if let Some(save) = &args.save {
        script.line(&format!(
            "bpy.ops.wm.save_as_mainfile(filepath={})",
            py_str(&save.to_string_lossy())
        ));
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::OriginMode;
    use std::path::PathBuf;

    fn base_args() -> ModifyArgs {
        ModifyArgs {
            blend: PathBuf::from("scene.blend"),
            save: None,
            scale: None,
            apply_transforms: false,
            center_origins: false,
            set_origin: None,
            triangulate: false,
            decimate: None,
            apply_modifiers: false,
            smooth_shading: false,
            flat_shading: false,
            remove_unused: false,
        }
    }

    #[test]
    fn test_scale_loop() {
        let mut args = base_args();
        args.scale = Some(2.5);
        let source = build_script(&args).source();
        assert!(source.contains("obj.scale *= 2.5"));
    }

    #[test]
    fn test_operation_ordering() {
        let mut args = base_args();
        args.apply_transforms = true;
        args.triangulate = true;
        args.decimate = Some(0.5);
        let source = build_script(&args).source();
        let transforms = source.find("transform_apply").unwrap();
        let triangulate = source.find("quads_convert_to_tris").unwrap();
        let decimate = source.find("DECIMATE").unwrap();
        assert!(transforms < triangulate);
        assert!(triangulate < decimate);
    }

    #[test]
    fn test_set_origin_identifier() {
        let mut args = base_args();
        args.set_origin = Some(OriginMode::Cursor);
        let source = build_script(&args).source();
        assert!(source.contains("origin_set(type='ORIGIN_CURSOR')"));
    }

    #[test]
    fn test_save_is_last_line() {
        let mut args = base_args();
        args.remove_unused = true;
        args.save = Some(PathBuf::from("out/modified.blend"));
        let source = build_script(&args).source();
        let purge = source.find("orphans_purge").unwrap();
        let save = source.find("save_as_mainfile").unwrap();
        assert!(purge < save);
        assert!(source.contains("filepath='out/modified.blend'"));
    }

    #[test]
    fn test_no_operations_is_an_error() {
        let installation = BlenderInstallation {
            path: PathBuf::from("/nonexistent/blender"),
            method: crate::blender::DiscoveryMethod::CliFlag,
        };
        let err = execute(&installation, &base_args()).unwrap_err();
        assert!(err.to_string().contains("No operations selected"));
    }

    #[test]
    fn test_decimate_ratio_validated() {
        let installation = BlenderInstallation {
            path: PathBuf::from("/nonexistent/blender"),
            method: crate::blender::DiscoveryMethod::CliFlag,
        };
        let mut args = base_args();
        args.decimate = Some(1.5);
        let err = execute(&installation, &args).unwrap_err();
        assert!(err.to_string().contains("Decimate ratio"));
    }
}
