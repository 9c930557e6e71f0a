//! Scene introspection report types.
//!
//! Mirrors the JSON document the scene-info payload writes. All sections
//! are optional; only the ones requested on the command line are present.

use serde::{Deserialize, Serialize};

/// Top-level scene report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneReport {
    /// Path of the inspected `.blend` file (empty for unsaved sessions).
    pub file: String,
    /// Version of the Blender instance that produced the report.
    pub blender_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<ObjectInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<MaterialInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textures: Option<Vec<TextureInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cameras: Option<Vec<CameraInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lights: Option<Vec<LightInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<CollectionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderSettingsInfo>,
}

/// One scene object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub name: String,
    /// Object type identifier (MESH, CAMERA, LIGHT, EMPTY, ...).
    #[serde(rename = "type")]
    pub object_type: String,
    pub location: [f64; 3],
    /// Euler rotation in radians.
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    pub parent: Option<String>,
    pub visible: bool,
    /// Mesh-only statistics; absent for non-mesh objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertices: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<u64>,
    /// Material slot names; `None` entries are empty slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<Option<String>>>,
}

/// One material datablock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub name: String,
    pub use_nodes: bool,
    /// Reference count inside the file.
    pub users: u64,
    /// Node type identifiers when the material uses nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<String>>,
}

/// One image/texture datablock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureInfo {
    pub name: String,
    pub filepath: String,
    /// Pixel dimensions (width, height).
    pub size: [u64; 2],
    pub channels: u64,
    pub is_packed: bool,
    pub users: u64,
}

/// One camera datablock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraInfo {
    pub name: String,
    /// Projection type (PERSP, ORTHO, PANO).
    #[serde(rename = "type")]
    pub camera_type: String,
    /// Focal length in millimeters.
    pub lens: f64,
    pub sensor_width: f64,
    pub clip_start: f64,
    pub clip_end: f64,
}

/// One light datablock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightInfo {
    pub name: String,
    /// Light type (POINT, SUN, SPOT, AREA).
    #[serde(rename = "type")]
    pub light_type: String,
    pub energy: f64,
    pub color: [f64; 3],
}

/// One collection and its membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub objects: Vec<String>,
    pub children: Vec<String>,
}

/// Timeline information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationInfo {
    pub fps: f64,
    pub fps_base: f64,
    pub frame_start: i64,
    pub frame_end: i64,
    pub frame_current: i64,
    pub duration_frames: i64,
    pub duration_seconds: f64,
}

/// Render configuration of the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettingsInfo {
    pub engine: String,
    pub resolution_x: u64,
    pub resolution_y: u64,
    pub resolution_percentage: u64,
    pub file_format: String,
    pub filepath: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_report() {
        let json = r#"{
            "file": "/tmp/scene.blend",
            "blender_version": "4.2.1"
        }"#;
        let report: SceneReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.blender_version, "4.2.1");
        assert!(report.objects.is_none());
    }

    #[test]
    fn test_deserialize_mesh_object() {
        let json = r#"{
            "name": "Cube",
            "type": "MESH",
            "location": [0.0, 0.0, 0.0],
            "rotation": [0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0],
            "parent": null,
            "visible": true,
            "vertices": 8,
            "edges": 12,
            "faces": 6,
            "materials": ["Material", null]
        }"#;
        let obj: ObjectInfo = serde_json::from_str(json).unwrap();
        assert_eq!(obj.object_type, "MESH");
        assert_eq!(obj.faces, Some(6));
        assert_eq!(obj.materials.as_ref().unwrap()[1], None);
    }

    #[test]
    fn test_deserialize_non_mesh_object_without_stats() {
        let json = r#"{
            "name": "Camera",
            "type": "CAMERA",
            "location": [7.3, -6.9, 4.9],
            "rotation": [1.1, 0.0, 0.8],
            "scale": [1.0, 1.0, 1.0],
            "parent": "Rig",
            "visible": false
        }"#;
        let obj: ObjectInfo = serde_json::from_str(json).unwrap();
        assert!(obj.vertices.is_none());
        assert_eq!(obj.parent.as_deref(), Some("Rig"));
        assert!(!obj.visible);
    }

    #[test]
    fn test_serialization_skips_absent_sections() {
        let report = SceneReport {
            file: String::new(),
            blender_version: "4.2.1".to_string(),
            objects: None,
            materials: None,
            textures: None,
            cameras: None,
            lights: None,
            collections: None,
            animation: None,
            render: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("objects"));
        assert!(!json.contains("animation"));
    }
}
