//! `api`: search Blender's Python API at runtime.
//!
//! Reflection happens inside the live Blender instance, so results always
//! match the installed version instead of a static reference. Each mode
//! produces one JSON document; text rendering happens on this side.

use std::process::ExitCode;

use color_eyre::eyre::{bail, Result, WrapErr};

use crate::blender::{BlenderInstallation, Invocation, PyScript, PyValue, ScriptFile};
use crate::cli::args::ApiArgs;
use crate::cli::commands::run_for_report;
use crate::report::api::{
    ApiSummary, ContextAttribute, DataCollection, MaybeError, ModuleListing, ModuleSummary,
    OperatorDetail, OperatorHit, TypeDetail, TypeHit,
};

const API_BODY: &str = r#"
import json


def truncate(text, limit=100):
    if text and len(text) > limit:
        return text[:limit] + '...'
    return text or ''


def operator_entries():
    for module_name in dir(bpy.ops):
        if module_name.startswith('_'):
            continue
        module = getattr(bpy.ops, module_name)
        for op_name in dir(module):
            if not op_name.startswith('_'):
                yield module_name, module, op_name


def search_operators(query, in_description, limit):
    terms = query.lower().split()
    hits = []
    for module_name, module, op_name in operator_entries():
        try:
            rna = getattr(module, op_name).get_rna_type()
        except Exception:
            continue
        haystack = '%s %s' % (module_name, op_name)
        if in_description:
            haystack = '%s %s' % (haystack, rna.description)
        haystack = haystack.lower()
        if all(term in haystack for term in terms):
            hits.append({
                'path': 'bpy.ops.%s.%s' % (module_name, op_name),
                'name': rna.name,
                'description': truncate(rna.description),
            })
            if len(hits) >= limit:
                return hits
    return hits


def operator_detail(path):
    parts = path.replace('bpy.ops.', '').split('.')
    if len(parts) != 2:
        return {'error': 'Invalid operator path: %s' % path}
    module_name, op_name = parts
    try:
        rna = getattr(getattr(bpy.ops, module_name), op_name).get_rna_type()
    except AttributeError:
        return {'error': 'Operator not found: %s' % path}
    parameters = []
    for prop in rna.properties:
        if prop.identifier == 'rna_type':
            continue
        param = {
            'name': prop.identifier,
            'type': prop.type,
            'description': prop.description,
        }
        if getattr(prop, 'is_array', False) and hasattr(prop, 'default_array'):
            param['default'] = list(prop.default_array)
        elif hasattr(prop, 'default'):
            param['default'] = prop.default
        if prop.type == 'ENUM':
            param['options'] = [
                {'id': item.identifier, 'name': item.name, 'description': item.description}
                for item in prop.enum_items
            ]
        if prop.type in ('INT', 'FLOAT'):
            if hasattr(prop, 'hard_min'):
                param['min'] = prop.hard_min
            if hasattr(prop, 'hard_max'):
                param['max'] = prop.hard_max
        parameters.append(param)
    return {
        'path': path,
        'name': rna.name,
        'description': rna.description,
        'parameters': parameters,
    }


def module_listing(name):
    try:
        module = getattr(bpy.ops, name)
    except AttributeError:
        return {'error': 'Module not found: bpy.ops.%s' % name}
    operators = []
    for op_name in sorted(dir(module)):
        if op_name.startswith('_'):
            continue
        try:
            rna = getattr(module, op_name).get_rna_type()
        except Exception:
            continue
        operators.append({
            'path': 'bpy.ops.%s.%s' % (name, op_name),
            'name': rna.name,
            'description': truncate(rna.description, 80),
        })
    return {
        'module': 'bpy.ops.%s' % name,
        'count': len(operators),
        'operators': operators,
    }


def module_summaries():
    rows = []
    for name in sorted(dir(bpy.ops)):
        if name.startswith('_'):
            continue
        count = len([op for op in dir(getattr(bpy.ops, name)) if not op.startswith('_')])
        if count:
            rows.append({'module': 'bpy.ops.%s' % name, 'count': count})
    return rows


def type_detail(path):
    name = path.replace('bpy.types.', '')
    try:
        type_obj = getattr(bpy.types, name)
    except AttributeError:
        return {'error': 'Type not found: %s' % path}
    properties = []
    if hasattr(type_obj, 'bl_rna'):
        for prop in type_obj.bl_rna.properties:
            if prop.identifier == 'rna_type':
                continue
            properties.append({
                'name': prop.identifier,
                'type': prop.type,
                'description': truncate(prop.description, 80),
            })
    doc = type_obj.__doc__
    return {
        'path': path,
        'name': name,
        'doc': truncate(doc, 500) if doc else None,
        'properties': properties,
    }


def search_types(query, limit):
    needle = query.lower()
    hits = []
    for name in dir(bpy.types):
        if name.startswith('_') or needle not in name.lower():
            continue
        doc = getattr(bpy.types, name).__doc__
        hits.append({
            'path': 'bpy.types.%s' % name,
            'name': name,
            'doc': truncate(doc, 80) if doc else None,
        })
        if len(hits) >= limit:
            break
    return hits


def data_collections():
    rows = []
    for name in sorted(dir(bpy.data)):
        if name.startswith('_'):
            continue
        attr = getattr(bpy.data, name)
        if hasattr(attr, '__iter__') and hasattr(attr, 'new'):
            rows.append({'path': 'bpy.data.%s' % name, 'name': name, 'count': len(attr)})
    return rows


def context_attributes():
    rows = []
    for name in sorted(dir(bpy.context)):
        if name.startswith('_'):
            continue
        try:
            kind = type(getattr(bpy.context, name)).__name__
        except Exception:
            kind = 'unavailable'
        rows.append({'path': 'bpy.context.%s' % name, 'name': name, 'type': kind})
    return rows


def summary():
    modules = module_summaries()
    return {
        'version': bpy.app.version_string,
        'operator_modules': len(modules),
        'total_operators': sum(row['count'] for row in modules),
        'types': len([t for t in dir(bpy.types) if not t.startswith('_')]),
        'data_collections': len(data_collections()),
        'context_attributes': len(context_attributes()),
    }


if MODE == 'search':
    result = search_operators(QUERY, IN_DESCRIPTION, LIMIT)
elif MODE == 'operator':
    result = operator_detail(TARGET)
elif MODE == 'module':
    result = module_listing(TARGET)
elif MODE == 'modules':
    result = module_summaries()
elif MODE == 'type':
    result = type_detail(TARGET)
elif MODE == 'types':
    result = search_types(QUERY, LIMIT)
elif MODE == 'data':
    result = data_collections()
elif MODE == 'context':
    result = context_attributes()
else:
    result = summary()

with open(REPORT_PATH, 'w') as handle:
    json.dump(result, handle, default=str)
"#;

/// Which reflection the payload should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiMode {
    Search,
    Operator,
    Module,
    Modules,
    Type,
    Types,
    Data,
    Context,
    Summary,
}

impl ApiMode {
    /// Pick the mode from the flag combination, most specific first.
    fn from_args(args: &ApiArgs) -> Self {
        if args.operator.is_some() {
            Self::Operator
        } else if args.module.is_some() {
            Self::Module
        } else if args.modules {
            Self::Modules
        } else if args.type_path.is_some() {
            Self::Type
        } else if args.search.is_some() && args.types {
            Self::Types
        } else if args.search.is_some() {
            Self::Search
        } else if args.data {
            Self::Data
        } else if args.context {
            Self::Context
        } else {
            Self::Summary
        }
    }

    fn identifier(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Operator => "operator",
            Self::Module => "module",
            Self::Modules => "modules",
            Self::Type => "type",
            Self::Types => "types",
            Self::Data => "data",
            Self::Context => "context",
            Self::Summary => "summary",
        }
    }
}

/// Run the reflection payload and render its report.
pub fn execute(installation: &BlenderInstallation, args: &ApiArgs) -> Result<ExitCode> {
    let mode = ApiMode::from_args(args);

    let file = ScriptFile::create()?;
    let source = build_script(args, mode, &file).source();
    file.write_source(&source)?;

    let invocation = Invocation::new().python_script(file.script_path());
    let raw = run_for_report(installation, &file, &invocation)?;

    // Failed lookups come back in-band; the payload itself ran fine.
    if let Ok(MaybeError { error: Some(error) }) = serde_json::from_str::<MaybeError>(&raw) {
        bail!("{error}");
    }

    if args.json {
        let value: serde_json::Value =
            serde_json::from_str(&raw).wrap_err("API report was not valid JSON")?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    render_text(mode, args, &raw)?;
    Ok(ExitCode::SUCCESS)
}

fn build_script(args: &ApiArgs, mode: ApiMode, file: &ScriptFile) -> PyScript {
    let query = args.search.clone().map_or(PyValue::None, PyValue::Str);
    let target = match mode {
        ApiMode::Operator => args.operator.clone(),
        ApiMode::Module => args.module.clone(),
        ApiMode::Type => args.type_path.clone(),
        _ => None,
    };

    let mut script = PyScript::new();
    script.assign("REPORT_PATH", &PyValue::path(&file.report_path()));
    script.assign("MODE", &PyValue::Str(mode.identifier().to_string()));
    script.assign("QUERY", &query);
    script.assign("IN_DESCRIPTION", &PyValue::Bool(args.in_description));
    script.assign("TARGET", &target.map_or(PyValue::None, PyValue::Str));
    script.assign("LIMIT", &PyValue::Int(args.limit as i64));
    script.body(API_BODY);
    script
}

/// Render the mode's report as readable text.
fn render_text(mode: ApiMode, args: &ApiArgs, raw: &str) -> Result<()> {
    match mode {
        ApiMode::Search => {
            let hits: Vec<OperatorHit> = serde_json::from_str(raw)?;
            let query = args.search.as_deref().unwrap_or_default();
            println!("Operators matching '{query}': {}\n", hits.len());
            for hit in &hits {
                println!("  {}", hit.path);
                println!("    {}", hit.description);
            }
        }
        ApiMode::Operator => {
            let detail: OperatorDetail = serde_json::from_str(raw)?;
            print_operator_detail(&detail);
        }
        ApiMode::Module => {
            let listing: ModuleListing = serde_json::from_str(raw)?;
            println!("{} ({} operators)\n", listing.module, listing.count);
            for op in &listing.operators {
                println!("  {}", op.path);
                println!("    {}", op.description);
            }
        }
        ApiMode::Modules => {
            let rows: Vec<ModuleSummary> = serde_json::from_str(raw)?;
            println!("Operator modules ({})\n", rows.len());
            let total: usize = rows.iter().map(|row| row.count).sum();
            for row in &rows {
                println!("  {}: {} operators", row.module, row.count);
            }
            println!("\nTotal: {total} operators");
        }
        ApiMode::Type => {
            let detail: TypeDetail = serde_json::from_str(raw)?;
            println!("\n{}", detail.path);
            if let Some(doc) = &detail.doc {
                println!("  Doc: {doc}");
            }
            println!("  Properties ({}):", detail.properties.len());
            for prop in detail.properties.iter().take(30) {
                println!("    - {}: {}", prop.name, prop.property_type);
            }
            if detail.properties.len() > 30 {
                println!("    ... and {} more", detail.properties.len() - 30);
            }
        }
        ApiMode::Types => {
            let hits: Vec<TypeHit> = serde_json::from_str(raw)?;
            let query = args.search.as_deref().unwrap_or_default();
            println!("Types matching '{query}': {}\n", hits.len());
            for hit in &hits {
                println!("  {}", hit.path);
            }
        }
        ApiMode::Data => {
            let rows: Vec<DataCollection> = serde_json::from_str(raw)?;
            println!("bpy.data collections ({})\n", rows.len());
            for row in &rows {
                println!("  {} ({} items)", row.path, row.count);
            }
        }
        ApiMode::Context => {
            let rows: Vec<ContextAttribute> = serde_json::from_str(raw)?;
            println!("bpy.context attributes ({})\n", rows.len());
            for row in &rows {
                println!("  {}: {}", row.path, row.attribute_type);
            }
        }
        ApiMode::Summary => {
            let summary: ApiSummary = serde_json::from_str(raw)?;
            println!("Blender {} API summary:", summary.version);
            println!("  Operator modules:   {}", summary.operator_modules);
            println!("  Total operators:    {}", summary.total_operators);
            println!("  Types:              {}", summary.types);
            println!("  Data collections:   {}", summary.data_collections);
            println!("  Context attributes: {}", summary.context_attributes);
        }
    }
    Ok(())
}

fn print_operator_detail(detail: &OperatorDetail) {
    println!("\n{}", detail.path);
    println!("  Name: {}", detail.name);
    println!("  Description: {}", detail.description);

    if detail.parameters.is_empty() {
        return;
    }
    println!("  Parameters ({}):", detail.parameters.len());
    for param in &detail.parameters {
        let default = param
            .default
            .as_ref()
            .map(|value| format!(" = {value}"))
            .unwrap_or_default();
        println!("    - {}: {}{default}", param.name, param.param_type);
        if !param.description.is_empty() {
            let description: String = param.description.chars().take(70).collect();
            println!("        {description}");
        }
        if let Some(options) = &param.options {
            let shown: Vec<&str> = options.iter().take(5).map(|o| o.id.as_str()).collect();
            let mut line = shown.join(", ");
            if options.len() > shown.len() {
                line.push_str(&format!(", ... (+{} more)", options.len() - shown.len()));
            }
            println!("        Options: {line}");
        }
        if let (Some(min), Some(max)) = (param.min, param.max) {
            println!("        Range: {min} to {max}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> ApiArgs {
        ApiArgs {
            search: None,
            in_description: false,
            operator: None,
            module: None,
            modules: false,
            type_path: None,
            types: false,
            data: false,
            context: false,
            limit: 50,
            json: false,
        }
    }

    #[test]
    fn test_mode_precedence() {
        let mut args = base_args();
        assert_eq!(ApiMode::from_args(&args), ApiMode::Summary);

        args.search = Some("export".to_string());
        assert_eq!(ApiMode::from_args(&args), ApiMode::Search);

        args.types = true;
        assert_eq!(ApiMode::from_args(&args), ApiMode::Types);

        args.operator = Some("bpy.ops.export_scene.gltf".to_string());
        assert_eq!(ApiMode::from_args(&args), ApiMode::Operator);
    }

    #[test]
    fn test_data_and_context_modes() {
        let mut args = base_args();
        args.data = true;
        assert_eq!(ApiMode::from_args(&args), ApiMode::Data);

        args.data = false;
        args.context = true;
        assert_eq!(ApiMode::from_args(&args), ApiMode::Context);
    }

    #[test]
    fn test_script_header_bindings() {
        let mut args = base_args();
        args.search = Some("export gltf".to_string());
        args.limit = 10;
        let mode = ApiMode::from_args(&args);
        let file = ScriptFile::create().unwrap();
        let source = build_script(&args, mode, &file).source();

        assert!(source.contains("MODE = 'search'"));
        assert!(source.contains("QUERY = 'export gltf'"));
        assert!(source.contains("TARGET = None"));
        assert!(source.contains("LIMIT = 10"));
        assert!(source.contains("json.dump(result, handle, default=str)"));
    }

    #[test]
    fn test_script_header_operator_target() {
        let mut args = base_args();
        args.operator = Some("bpy.ops.mesh.primitive_cube_add".to_string());
        let mode = ApiMode::from_args(&args);
        let file = ScriptFile::create().unwrap();
        let source = build_script(&args, mode, &file).source();

        assert!(source.contains("MODE = 'operator'"));
        assert!(source.contains("TARGET = 'bpy.ops.mesh.primitive_cube_add'"));
    }

    #[test]
    fn test_render_text_search() {
        let raw = r#"[{"path": "bpy.ops.export_scene.gltf", "name": "Export glTF", "description": "Export scene"}]"#;
        let mut args = base_args();
        args.search = Some("gltf".to_string());
        render_text(ApiMode::Search, &args, raw).unwrap();
    }

    #[test]
    fn test_render_text_rejects_garbage() {
        let args = base_args();
        assert!(render_text(ApiMode::Summary, &args, "not json").is_err());
    }
}
