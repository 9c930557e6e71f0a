//! `info`: extract scene information as JSON.

use std::process::ExitCode;

use color_eyre::eyre::{Result, WrapErr};

use crate::blender::{BlenderInstallation, Invocation, PyScript, PyValue, ScriptFile};
use crate::cli::args::InfoArgs;
use crate::cli::commands::run_for_report;
use crate::report::scene::SceneReport;

/// Static payload body; section toggles and the report path are bound in a
/// generated header. Collection happens entirely inside Blender; this side
/// only parses and re-serializes.
const SCENE_INFO_BODY: &str = r#"
import json


def collect_objects():
    records = []
    for obj in bpy.data.objects:
        record = {
            'name': obj.name,
            'type': obj.type,
            'location': list(obj.location),
            'rotation': list(obj.rotation_euler),
            'scale': list(obj.scale),
            'parent': obj.parent.name if obj.parent else None,
            'visible': obj.visible_get(),
        }
        if obj.type == 'MESH':
            mesh = obj.data
            record['vertices'] = len(mesh.vertices)
            record['edges'] = len(mesh.edges)
            record['faces'] = len(mesh.polygons)
            record['materials'] = [m.name if m else None for m in mesh.materials]
        records.append(record)
    return records


def collect_materials():
    records = []
    for mat in bpy.data.materials:
        record = {
            'name': mat.name,
            'use_nodes': mat.use_nodes,
            'users': mat.users,
        }
        if mat.use_nodes and mat.node_tree:
            record['nodes'] = [node.type for node in mat.node_tree.nodes]
        records.append(record)
    return records


def collect_textures():
    return [
        {
            'name': img.name,
            'filepath': img.filepath,
            'size': list(img.size),
            'channels': img.channels,
            'is_packed': img.packed_file is not None,
            'users': img.users,
        }
        for img in bpy.data.images
    ]


def collect_cameras():
    return [
        {
            'name': cam.name,
            'type': cam.type,
            'lens': cam.lens,
            'sensor_width': cam.sensor_width,
            'clip_start': cam.clip_start,
            'clip_end': cam.clip_end,
        }
        for cam in bpy.data.cameras
    ]


def collect_lights():
    return [
        {
            'name': light.name,
            'type': light.type,
            'energy': light.energy,
            'color': list(light.color),
        }
        for light in bpy.data.lights
    ]


def collect_collections():
    return [
        {
            'name': coll.name,
            'objects': [obj.name for obj in coll.objects],
            'children': [child.name for child in coll.children],
        }
        for coll in bpy.data.collections
    ]


def collect_animation():
    scene = bpy.context.scene
    fps = scene.render.fps / scene.render.fps_base
    frames = scene.frame_end - scene.frame_start + 1
    return {
        'fps': scene.render.fps,
        'fps_base': scene.render.fps_base,
        'frame_start': scene.frame_start,
        'frame_end': scene.frame_end,
        'frame_current': scene.frame_current,
        'duration_frames': frames,
        'duration_seconds': frames / fps,
    }


def collect_render():
    render = bpy.context.scene.render
    return {
        'engine': render.engine,
        'resolution_x': render.resolution_x,
        'resolution_y': render.resolution_y,
        'resolution_percentage': render.resolution_percentage,
        'file_format': render.image_settings.file_format,
        'filepath': render.filepath,
    }


report = {
    'file': bpy.data.filepath,
    'blender_version': bpy.app.version_string,
}
if INCLUDE_OBJECTS:
    report['objects'] = collect_objects()
if INCLUDE_MATERIALS:
    report['materials'] = collect_materials()
if INCLUDE_TEXTURES:
    report['textures'] = collect_textures()
if INCLUDE_CAMERAS:
    report['cameras'] = collect_cameras()
if INCLUDE_LIGHTS:
    report['lights'] = collect_lights()
if INCLUDE_COLLECTIONS:
    report['collections'] = collect_collections()
if INCLUDE_ANIMATION:
    report['animation'] = collect_animation()
if INCLUDE_RENDER:
    report['render'] = collect_render()

with open(REPORT_PATH, 'w') as handle:
    json.dump(report, handle)
"#;

/// Generate the payload, run it, and print or write the typed report.
pub fn execute(installation: &BlenderInstallation, args: &InfoArgs) -> Result<ExitCode> {
    let file = ScriptFile::create()?;
    let source = build_script(args, &file).source();
    file.write_source(&source)?;

    let invocation = Invocation::new()
        .blend_file(&args.blend)
        .python_script(file.script_path());

    let raw = run_for_report(installation, &file, &invocation)?;
    let report: SceneReport =
        serde_json::from_str(&raw).wrap_err("Scene report was not valid JSON")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            println!("Scene info written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn build_script(args: &InfoArgs, file: &ScriptFile) -> PyScript {
    let all = args.wants_all();
    let mut script = PyScript::new();
    script.assign("REPORT_PATH", &PyValue::path(&file.report_path()));
    script.assign("INCLUDE_OBJECTS", &PyValue::Bool(all || args.objects));
    script.assign("INCLUDE_MATERIALS", &PyValue::Bool(all || args.materials));
    script.assign("INCLUDE_TEXTURES", &PyValue::Bool(all || args.textures));
    script.assign("INCLUDE_CAMERAS", &PyValue::Bool(all || args.cameras));
    script.assign("INCLUDE_LIGHTS", &PyValue::Bool(all || args.lights));
    script.assign(
        "INCLUDE_COLLECTIONS",
        &PyValue::Bool(all || args.collections),
    );
    script.assign("INCLUDE_ANIMATION", &PyValue::Bool(all || args.animation));
    script.assign("INCLUDE_RENDER", &PyValue::Bool(all || args.render_settings));
    script.body(SCENE_INFO_BODY);
    script
}
