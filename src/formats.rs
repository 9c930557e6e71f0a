//! Extension → operator mapping for 3D file formats.
//!
//! Maps file extensions to the `bpy.ops` import/export operators Blender
//! exposes for them, and generates the corresponding payload statements.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blender::payload::py_str;

/// Errors from format resolution.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The extension is not a supported 3D format.
    #[error("Unsupported file format: .{extension}")]
    Unsupported {
        /// The offending extension, lowercased.
        extension: String,
    },

    /// The path has no extension to dispatch on.
    #[error("Cannot determine format of {path}: no file extension")]
    NoExtension {
        /// The offending path.
        path: String,
    },
}

/// Supported 3D file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Native Blender file
    Blend,
    /// Autodesk FBX
    Fbx,
    /// Wavefront OBJ
    Obj,
    /// glTF separate (JSON + binary buffers)
    Gltf,
    /// glTF binary
    Glb,
    /// Universal Scene Description
    Usd,
    /// USD ASCII
    Usda,
    /// USD crate (binary)
    Usdc,
    /// USD zip package
    Usdz,
    /// Alembic
    Abc,
    /// Stereolithography
    Stl,
    /// Polygon File Format
    Ply,
    /// COLLADA
    Dae,
}

impl Format {
    /// Determine the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "blend" => Some(Self::Blend),
            "fbx" => Some(Self::Fbx),
            "obj" => Some(Self::Obj),
            "gltf" => Some(Self::Gltf),
            "glb" => Some(Self::Glb),
            "usd" => Some(Self::Usd),
            "usda" => Some(Self::Usda),
            "usdc" => Some(Self::Usdc),
            "usdz" => Some(Self::Usdz),
            "abc" => Some(Self::Abc),
            "stl" => Some(Self::Stl),
            "ply" => Some(Self::Ply),
            "dae" => Some(Self::Dae),
            _ => None,
        }
    }

    /// Determine the format from a file path.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| FormatError::NoExtension {
                path: path.display().to_string(),
            })?;

        Self::from_extension(ext).ok_or_else(|| FormatError::Unsupported {
            extension: ext.to_lowercase(),
        })
    }

    /// Display name for this format.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Blend => "Blender",
            Self::Fbx => "FBX",
            Self::Obj => "Wavefront OBJ",
            Self::Gltf => "glTF",
            Self::Glb => "glTF Binary",
            Self::Usd => "USD",
            Self::Usda => "USD ASCII",
            Self::Usdc => "USD Crate",
            Self::Usdz => "USD Package",
            Self::Abc => "Alembic",
            Self::Stl => "STL",
            Self::Ply => "PLY",
            Self::Dae => "COLLADA",
        }
    }

    /// Payload statement importing `path` into the current scene.
    ///
    /// `.blend` files replace the whole session via `wm.open_mainfile`; the
    /// rest append into the current scene.
    pub fn import_statement(self, path: &Path) -> String {
        let filepath = py_str(&path.to_string_lossy());
        let operator = match self {
            Self::Blend => "bpy.ops.wm.open_mainfile",
            Self::Fbx => "bpy.ops.import_scene.fbx",
            Self::Obj => "bpy.ops.wm.obj_import",
            Self::Gltf | Self::Glb => "bpy.ops.import_scene.gltf",
            Self::Usd | Self::Usda | Self::Usdc | Self::Usdz => "bpy.ops.wm.usd_import",
            Self::Abc => "bpy.ops.wm.alembic_import",
            Self::Stl => "bpy.ops.wm.stl_import",
            Self::Ply => "bpy.ops.wm.ply_import",
            Self::Dae => "bpy.ops.wm.collada_import",
        };
        format!("{operator}(filepath={filepath})")
    }

    /// Payload statement exporting the scene to `path`.
    ///
    /// Per-format keyword arguments follow what the operators accept: USD,
    /// Alembic, and COLLADA have no modifier-application switch, and glTF
    /// picks binary vs separate output from the target extension.
    pub fn export_statement(self, path: &Path, selection_only: bool, apply_modifiers: bool) -> String {
        let filepath = py_str(&path.to_string_lossy());
        let selection = py_bool(selection_only);
        let modifiers = py_bool(apply_modifiers);

        match self {
            Self::Blend => format!("bpy.ops.wm.save_as_mainfile(filepath={filepath})"),
            Self::Fbx => format!(
                "bpy.ops.export_scene.fbx(filepath={filepath}, use_selection={selection}, \
                 apply_scale_options='FBX_SCALE_ALL', use_mesh_modifiers={modifiers})"
            ),
            Self::Obj => format!(
                "bpy.ops.wm.obj_export(filepath={filepath}, \
                 export_selected_objects={selection}, apply_modifiers={modifiers})"
            ),
            Self::Gltf | Self::Glb => {
                let export_format = if self == Self::Glb { "GLB" } else { "GLTF_SEPARATE" };
                format!(
                    "bpy.ops.export_scene.gltf(filepath={filepath}, \
                     export_format='{export_format}', use_selection={selection}, \
                     export_apply={modifiers})"
                )
            }
            Self::Usd | Self::Usda | Self::Usdc | Self::Usdz => format!(
                "bpy.ops.wm.usd_export(filepath={filepath}, selected_objects_only={selection})"
            ),
            Self::Abc => {
                format!("bpy.ops.wm.alembic_export(filepath={filepath}, selected={selection})")
            }
            Self::Stl => format!(
                "bpy.ops.wm.stl_export(filepath={filepath}, \
                 export_selected_objects={selection}, apply_modifiers={modifiers})"
            ),
            Self::Ply => format!(
                "bpy.ops.wm.ply_export(filepath={filepath}, \
                 export_selected_objects={selection}, apply_modifiers={modifiers})"
            ),
            Self::Dae => {
                format!("bpy.ops.wm.collada_export(filepath={filepath}, selected={selection})")
            }
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_extension_case_insensitive() {
        assert_eq!(Format::from_extension("FBX"), Some(Format::Fbx));
        assert_eq!(Format::from_extension("Blend"), Some(Format::Blend));
        assert_eq!(Format::from_extension("glb"), Some(Format::Glb));
    }

    #[test]
    fn test_from_extension_unknown() {
        assert_eq!(Format::from_extension("max"), None);
        assert_eq!(Format::from_extension(""), None);
    }

    #[test]
    fn test_from_path() {
        let format = Format::from_path(Path::new("/models/robot.gltf")).unwrap();
        assert_eq!(format, Format::Gltf);
    }

    #[test]
    fn test_from_path_no_extension() {
        let err = Format::from_path(Path::new("/models/robot")).unwrap_err();
        assert!(matches!(err, FormatError::NoExtension { .. }));
    }

    #[test]
    fn test_from_path_unsupported() {
        let err = Format::from_path(Path::new("scene.max")).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Unsupported { extension } if extension == "max"
        ));
    }

    #[test]
    fn test_import_statement_blend_opens_mainfile() {
        let stmt = Format::Blend.import_statement(Path::new("scene.blend"));
        assert_eq!(stmt, "bpy.ops.wm.open_mainfile(filepath='scene.blend')");
    }

    #[test]
    fn test_import_statement_escapes_path() {
        let stmt = Format::Fbx.import_statement(&PathBuf::from("it's here.fbx"));
        assert!(stmt.contains("filepath='it\\'s here.fbx'"));
    }

    #[test]
    fn test_export_statement_glb_vs_gltf() {
        let glb = Format::Glb.export_statement(Path::new("out.glb"), false, true);
        assert!(glb.contains("export_format='GLB'"));
        let gltf = Format::Gltf.export_statement(Path::new("out.gltf"), false, true);
        assert!(gltf.contains("export_format='GLTF_SEPARATE'"));
    }

    #[test]
    fn test_export_statement_selection_flag() {
        let stmt = Format::Obj.export_statement(Path::new("out.obj"), true, false);
        assert!(stmt.contains("export_selected_objects=True"));
        assert!(stmt.contains("apply_modifiers=False"));
    }

    #[test]
    fn test_export_statement_usd_has_no_modifier_kwarg() {
        let stmt = Format::Usd.export_statement(Path::new("out.usd"), false, true);
        assert!(!stmt.contains("modifiers"));
        assert!(stmt.contains("selected_objects_only=False"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Format::Dae.to_string(), "COLLADA");
        assert_eq!(Format::Obj.to_string(), "Wavefront OBJ");
    }
}
