//! Application-wide constants and configuration values.
//!
//! This module defines all static configuration values used throughout
//! blendctl, including executable search paths, environment variable names,
//! file extensions, and batch defaults.

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

// === Executable Discovery ===

/// Environment variable naming the Blender executable.
pub const BLENDER_EXE_VAR: &str = "BLENDER_EXE";

/// Name of the dotenv file consulted for `BLENDER_EXE`.
pub const DOTENV_FILE_NAME: &str = ".env";

/// Common Blender installation paths, probed in order.
///
/// Entries starting with `~/` are expanded against the home directory and
/// `$PROGRAMFILES` against the Windows Program Files root.
pub const COMMON_BLENDER_PATHS: [&str; 9] = [
    // macOS
    "/Applications/Blender.app/Contents/MacOS/Blender",
    "~/Applications/Blender.app/Contents/MacOS/Blender",
    // Linux
    "/usr/bin/blender",
    "/usr/local/bin/blender",
    "/snap/bin/blender",
    "~/.local/bin/blender",
    // Windows
    "$PROGRAMFILES/Blender Foundation/Blender/blender.exe",
    "$PROGRAMFILES/Blender Foundation/Blender 4.0/blender.exe",
    "$PROGRAMFILES/Blender Foundation/Blender 5.0/blender.exe",
];

/// Name of the Blender binary when searching the system `PATH`.
pub const BLENDER_BINARY_NAME: &str = "blender";

// === Configuration ===

/// Name of the configuration file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// === Batch Processing ===

/// Default glob pattern for batch input collection.
pub const DEFAULT_BATCH_PATTERN: &str = "*.blend";
/// Placeholder substituted with the per-file output path in batch args.
pub const PLACEHOLDER_OUTPUT: &str = "{output}";
/// Placeholder substituted with the per-file stem in batch args.
pub const PLACEHOLDER_STEM: &str = "{stem}";

// === Payload Protocol ===

/// File name of the generated Python payload inside its temp directory.
pub const PAYLOAD_SCRIPT_NAME: &str = "payload.py";
/// File name of the JSON report the payload writes back.
pub const PAYLOAD_REPORT_NAME: &str = "report.json";

// === API Search ===

/// Default cap on API search results.
pub const DEFAULT_API_LIMIT: usize = 50;
