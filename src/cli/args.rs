//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::constants;

/// blendctl - Drive Blender in headless/batch mode
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the Blender executable (overrides discovery)
    #[arg(long, global = true, value_name = "PATH")]
    pub blender: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a Python script or expression inside headless Blender
    Run(RunArgs),
    /// Show the resolved Blender executable and its version
    Version,
    /// Convert between 3D file formats
    Convert(ConvertArgs),
    /// Render frames or animations from a .blend file
    Render(RenderArgs),
    /// Extract scene information as JSON
    Info(InfoArgs),
    /// Apply common scene modifications
    Modify(ModifyArgs),
    /// Process multiple files in parallel with a script
    Batch(BatchArgs),
    /// Search Blender's Python API at runtime
    Api(ApiArgs),
}

/// Arguments for `run`.
#[derive(ClapArgs, Debug)]
#[command(group = clap::ArgGroup::new("payload").required(true).args(["script", "expr"]))]
pub struct RunArgs {
    /// Python script to execute
    pub script: Option<PathBuf>,

    /// Python expression to execute instead of a script
    #[arg(long, short = 'e')]
    pub expr: Option<String>,

    /// Blend file to open before running
    #[arg(long, short = 'b')]
    pub blend: Option<PathBuf>,

    /// Raw argument forwarded to Blender itself (repeatable)
    #[arg(long = "blender-arg", value_name = "ARG")]
    pub blender_args: Vec<String>,

    /// Arguments passed to the script after --
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for `convert`.
#[derive(ClapArgs, Debug)]
pub struct ConvertArgs {
    /// Input file to import (any supported format)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Output file path; the extension selects the format
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Blend file to open instead of importing via --input
    #[arg(long, short = 'b', conflicts_with = "input")]
    pub blend: Option<PathBuf>,

    /// Export only selected objects
    #[arg(long)]
    pub selection_only: bool,

    /// Do not apply modifiers before export
    #[arg(long)]
    pub no_apply_modifiers: bool,

    /// Clear the default scene before importing
    #[arg(long)]
    pub clear: bool,
}

/// Render engine selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEngine {
    Cycles,
    Eevee,
    EeveeNext,
    Workbench,
}

impl RenderEngine {
    /// The engine identifier Blender expects.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Cycles => "CYCLES",
            Self::Eevee => "BLENDER_EEVEE",
            Self::EeveeNext => "BLENDER_EEVEE_NEXT",
            Self::Workbench => "BLENDER_WORKBENCH",
        }
    }
}

/// Output image format selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    OpenExr,
    OpenExrMultilayer,
    Tiff,
    Bmp,
    Ffmpeg,
}

impl ImageFormat {
    /// The file format identifier Blender expects.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::OpenExr => "OPEN_EXR",
            Self::OpenExrMultilayer => "OPEN_EXR_MULTILAYER",
            Self::Tiff => "TIFF",
            Self::Bmp => "BMP",
            Self::Ffmpeg => "FFMPEG",
        }
    }
}

/// Arguments for `render`.
#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Blend file to render
    #[arg(long, short = 'b')]
    pub blend: PathBuf,

    /// Output path (file for stills, prefix for animations)
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Render a single frame
    #[arg(long, short = 'f', conflicts_with_all = ["start", "end"])]
    pub frame: Option<i64>,

    /// Animation start frame
    #[arg(long, short = 's')]
    pub start: Option<i64>,

    /// Animation end frame
    #[arg(long, short = 'e')]
    pub end: Option<i64>,

    /// Render engine
    #[arg(long, value_enum)]
    pub engine: Option<RenderEngine>,

    /// Number of render samples (Cycles/Eevee)
    #[arg(long)]
    pub samples: Option<u32>,

    /// Output image format
    #[arg(long, value_enum)]
    pub image_format: Option<ImageFormat>,

    /// Output resolution (width height)
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pub resolution: Option<Vec<u32>>,

    /// Resolution percentage (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub percent: Option<u8>,
}

/// Arguments for `info`.
#[derive(ClapArgs, Debug)]
pub struct InfoArgs {
    /// Blend file to inspect
    #[arg(long, short = 'b')]
    pub blend: PathBuf,

    /// Write the JSON report to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// List objects
    #[arg(long)]
    pub objects: bool,

    /// List materials
    #[arg(long)]
    pub materials: bool,

    /// List textures/images
    #[arg(long)]
    pub textures: bool,

    /// List cameras
    #[arg(long)]
    pub cameras: bool,

    /// List lights
    #[arg(long)]
    pub lights: bool,

    /// List collections
    #[arg(long)]
    pub collections: bool,

    /// Show animation info (frame range, fps)
    #[arg(long)]
    pub animation: bool,

    /// Show render settings
    #[arg(long)]
    pub render_settings: bool,

    /// Show all information (default when no section is selected)
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl InfoArgs {
    /// Whether every section should be emitted.
    pub fn wants_all(&self) -> bool {
        self.all
            || !(self.objects
                || self.materials
                || self.textures
                || self.cameras
                || self.lights
                || self.collections
                || self.animation
                || self.render_settings)
    }
}

/// Origin placement modes for `modify --set-origin`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginMode {
    Center,
    Bottom,
    Cursor,
}

impl OriginMode {
    /// The `origin_set` type identifier Blender expects.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Center => "ORIGIN_GEOMETRY",
            Self::Bottom => "ORIGIN_CENTER_OF_VOLUME",
            Self::Cursor => "ORIGIN_CURSOR",
        }
    }
}

/// Arguments for `modify`.
#[derive(ClapArgs, Debug)]
pub struct ModifyArgs {
    /// Blend file to modify
    #[arg(long, short = 'b')]
    pub blend: PathBuf,

    /// Save the modified file to this path
    #[arg(long, short = 'o')]
    pub save: Option<PathBuf>,

    /// Scale all objects by a factor
    #[arg(long)]
    pub scale: Option<f64>,

    /// Apply all object transforms
    #[arg(long)]
    pub apply_transforms: bool,

    /// Center origins to geometry
    #[arg(long)]
    pub center_origins: bool,

    /// Set origin placement for all objects
    #[arg(long, value_enum)]
    pub set_origin: Option<OriginMode>,

    /// Triangulate all meshes
    #[arg(long)]
    pub triangulate: bool,

    /// Decimate meshes to a ratio in (0, 1]
    #[arg(long, value_name = "RATIO")]
    pub decimate: Option<f64>,

    /// Apply all modifiers on mesh objects
    #[arg(long)]
    pub apply_modifiers: bool,

    /// Set smooth shading on all meshes
    #[arg(long, conflicts_with = "flat_shading")]
    pub smooth_shading: bool,

    /// Set flat shading on all meshes
    #[arg(long)]
    pub flat_shading: bool,

    /// Remove unused data blocks
    #[arg(long)]
    pub remove_unused: bool,
}

impl ModifyArgs {
    /// Whether any operation was requested.
    pub fn has_operations(&self) -> bool {
        self.scale.is_some()
            || self.apply_transforms
            || self.center_origins
            || self.set_origin.is_some()
            || self.triangulate
            || self.decimate.is_some()
            || self.apply_modifiers
            || self.smooth_shading
            || self.flat_shading
            || self.remove_unused
    }
}

/// Arguments for `batch`.
#[derive(ClapArgs, Debug)]
pub struct BatchArgs {
    /// Python script to run on each file
    #[arg(long, short = 's')]
    pub script: PathBuf,

    /// Input directory
    #[arg(long, short = 'i', default_value = ".")]
    pub dir: PathBuf,

    /// Glob pattern for input files (* and ? wildcards)
    #[arg(long, short = 'p', default_value = constants::DEFAULT_BATCH_PATTERN)]
    pub pattern: String,

    /// Output directory, substituted into {output} placeholders
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Write the per-file JSON report to a file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Arguments passed to the script after -- ({output} and {stem}
    /// placeholders are substituted per file)
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for `api`.
#[derive(ClapArgs, Debug)]
pub struct ApiArgs {
    /// Search operators (or types with --types) by name
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Also match against operator descriptions
    #[arg(long, short = 'd', requires = "search")]
    pub in_description: bool,

    /// Get details for a specific operator (e.g. bpy.ops.export_scene.gltf)
    #[arg(long, short = 'O', value_name = "PATH")]
    pub operator: Option<String>,

    /// List operators in a module (e.g. export_scene)
    #[arg(long, short = 'm', value_name = "NAME")]
    pub module: Option<String>,

    /// List all operator modules
    #[arg(long)]
    pub modules: bool,

    /// Get details for a specific type (e.g. bpy.types.Mesh)
    #[arg(long = "type", short = 't', value_name = "PATH")]
    pub type_path: Option<String>,

    /// Search types instead of operators
    #[arg(long, requires = "search")]
    pub types: bool,

    /// List bpy.data collections
    #[arg(long)]
    pub data: bool,

    /// List bpy.context attributes
    #[arg(long)]
    pub context: bool,

    /// Maximum number of search results
    #[arg(long, short = 'l', default_value_t = constants::DEFAULT_API_LIMIT)]
    pub limit: usize,

    /// Output raw JSON
    #[arg(long, short = 'j')]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_requires_script_or_expr() {
        assert!(Args::try_parse_from(["blendctl", "run"]).is_err());
        assert!(Args::try_parse_from(["blendctl", "run", "script.py"]).is_ok());
        assert!(Args::try_parse_from(["blendctl", "run", "--expr", "print(1)"]).is_ok());
    }

    #[test]
    fn test_run_rejects_script_and_expr_together() {
        let result = Args::try_parse_from(["blendctl", "run", "script.py", "--expr", "print(1)"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_frame_conflicts_with_range() {
        let result = Args::try_parse_from([
            "blendctl", "render", "-b", "s.blend", "-o", "out.png", "--frame", "1", "--start", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_percent_range() {
        let result = Args::try_parse_from([
            "blendctl", "render", "-b", "s.blend", "-o", "out.png", "--percent", "150",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_engine_identifiers() {
        assert_eq!(RenderEngine::Cycles.identifier(), "CYCLES");
        assert_eq!(RenderEngine::EeveeNext.identifier(), "BLENDER_EEVEE_NEXT");
    }

    #[test]
    fn test_info_wants_all_by_default() {
        let args = Args::try_parse_from(["blendctl", "info", "-b", "s.blend"]).unwrap();
        let Commands::Info(info) = args.command else {
            panic!("expected info");
        };
        assert!(info.wants_all());
    }

    #[test]
    fn test_info_section_selection_disables_all() {
        let args =
            Args::try_parse_from(["blendctl", "info", "-b", "s.blend", "--objects"]).unwrap();
        let Commands::Info(info) = args.command else {
            panic!("expected info");
        };
        assert!(!info.wants_all());
        assert!(info.objects);
    }

    #[test]
    fn test_modify_detects_missing_operations() {
        let args = Args::try_parse_from(["blendctl", "modify", "-b", "s.blend"]).unwrap();
        let Commands::Modify(modify) = args.command else {
            panic!("expected modify");
        };
        assert!(!modify.has_operations());
    }

    #[test]
    fn test_modify_shading_flags_conflict() {
        let result = Args::try_parse_from([
            "blendctl", "modify", "-b", "s.blend", "--smooth-shading", "--flat-shading",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_trailing_args() {
        let args = Args::try_parse_from([
            "blendctl", "batch", "-s", "p.py", "--", "--output", "{output}",
        ])
        .unwrap();
        let Commands::Batch(batch) = args.command else {
            panic!("expected batch");
        };
        assert_eq!(batch.args, vec!["--output", "{output}"]);
        assert_eq!(batch.pattern, "*.blend");
    }

    #[test]
    fn test_api_in_description_requires_search() {
        let result = Args::try_parse_from(["blendctl", "api", "--in-description"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_blender_flag_after_subcommand() {
        let args =
            Args::try_parse_from(["blendctl", "version", "--blender", "/opt/blender"]).unwrap();
        assert_eq!(args.blender, Some(PathBuf::from("/opt/blender")));
    }
}
