//! API reflection report types.
//!
//! Each `api` mode produces its own JSON shape; the payload writes exactly
//! one of these documents per run. A failed lookup (unknown operator,
//! module, or type) is reported in-band through [`MaybeError`] rather than
//! a subprocess failure, since the payload itself ran fine.

use serde::{Deserialize, Serialize};

/// Envelope checked before mode-specific parsing.
#[derive(Debug, Deserialize)]
pub struct MaybeError {
    /// In-band error message from the payload, if the lookup failed.
    pub error: Option<String>,
}

/// One operator in a search or module listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorHit {
    /// Full path, e.g. `bpy.ops.export_scene.gltf`.
    pub path: String,
    /// Human-readable operator name.
    pub name: String,
    /// Description, truncated for listings.
    pub description: String,
}

/// Full details for one operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorDetail {
    pub path: String,
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamInfo>,
}

/// One operator parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    /// RNA property type (STRING, INT, FLOAT, BOOLEAN, ENUM, ...).
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    /// Default value; shape depends on the property type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Choices for ENUM parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnumOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// One choice of an ENUM parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumOption {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Listing of all operators in one `bpy.ops` module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleListing {
    /// Full module path, e.g. `bpy.ops.export_scene`.
    pub module: String,
    pub count: usize,
    pub operators: Vec<OperatorHit>,
}

/// One module row in the `--modules` overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub module: String,
    pub count: usize,
}

/// One RNA type in a type search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeHit {
    pub path: String,
    pub name: String,
    pub doc: Option<String>,
}

/// Full details for one RNA type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDetail {
    pub path: String,
    pub name: String,
    pub doc: Option<String>,
    pub properties: Vec<PropertyInfo>,
}

/// One property of an RNA type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub description: String,
}

/// One `bpy.data` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCollection {
    pub path: String,
    pub name: String,
    pub count: usize,
}

/// One `bpy.context` attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextAttribute {
    pub path: String,
    pub name: String,
    /// Python type name, or "unavailable" when the attribute cannot be
    /// read outside its intended context.
    #[serde(rename = "type")]
    pub attribute_type: String,
}

/// Overview emitted when no mode flag is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSummary {
    pub version: String,
    pub operator_modules: usize,
    pub total_operators: usize,
    pub types: usize,
    pub data_collections: usize,
    pub context_attributes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_error_detects_failures() {
        let envelope: MaybeError =
            serde_json::from_str(r#"{"error": "Operator not found: bpy.ops.x.y"}"#).unwrap();
        assert!(envelope.error.is_some());

        let envelope: MaybeError = serde_json::from_str(r#"{"path": "bpy.ops.a.b"}"#).unwrap();
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_operator_detail_with_enum_param() {
        let json = r#"{
            "path": "bpy.ops.export_scene.gltf",
            "name": "Export glTF 2.0",
            "description": "Export scene as glTF 2.0 file",
            "parameters": [
                {
                    "name": "export_format",
                    "type": "ENUM",
                    "description": "Output format",
                    "default": "GLB",
                    "options": [
                        {"id": "GLB", "name": "glTF Binary", "description": ""},
                        {"id": "GLTF_SEPARATE", "name": "glTF Separate", "description": ""}
                    ]
                },
                {
                    "name": "export_image_quality",
                    "type": "INT",
                    "description": "Quality",
                    "default": 75,
                    "min": 0.0,
                    "max": 100.0
                }
            ]
        }"#;
        let detail: OperatorDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.parameters.len(), 2);
        assert_eq!(
            detail.parameters[0].options.as_ref().unwrap()[0].id,
            "GLB"
        );
        assert_eq!(detail.parameters[1].max, Some(100.0));
    }

    #[test]
    fn test_api_summary_round_trip() {
        let summary = ApiSummary {
            version: "4.2.1".to_string(),
            operator_modules: 80,
            total_operators: 2000,
            types: 1500,
            data_collections: 30,
            context_attributes: 60,
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: ApiSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_operators, 2000);
    }
}
