//! Generated Python payloads.
//!
//! Every non-trivial subcommand drives Blender by generating a small Python
//! program, writing it into a temp directory, and passing it via `--python`.
//! Payloads that produce structured data write a single JSON document to a
//! report file inside the same temp directory; the CLI parses that file
//! after the subprocess exits.
//!
//! Parameters cross into Python as a generated header of `NAME = <literal>`
//! assignments prepended to a static body, so arbitrary user paths are
//! rendered as escaped string literals and can never break out of the
//! generated program.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants;

/// Errors from payload generation.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Temp directory or script file could not be created.
    #[error("Failed to write payload script: {0}")]
    Io(#[from] std::io::Error),
}

/// A value rendered into payload source as a Python literal.
#[derive(Debug, Clone)]
pub enum PyValue {
    /// A string literal, escaped.
    Str(String),
    /// An integer literal.
    Int(i64),
    /// `True` / `False`.
    Bool(bool),
    /// `None`.
    None,
}

impl PyValue {
    /// A string literal from any path.
    pub fn path(path: &Path) -> Self {
        PyValue::Str(path.to_string_lossy().into_owned())
    }

    /// Render this value as Python source.
    pub fn render(&self) -> String {
        match self {
            PyValue::Str(s) => py_str(s),
            PyValue::Int(i) => i.to_string(),
            PyValue::Bool(true) => "True".to_string(),
            PyValue::Bool(false) => "False".to_string(),
            PyValue::None => "None".to_string(),
        }
    }
}

/// Render a Rust string as a quoted Python string literal.
pub fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\x00"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Incremental builder for payload source.
#[derive(Debug, Default)]
pub struct PyScript {
    lines: Vec<String>,
}

impl PyScript {
    /// Start an empty payload importing `bpy`.
    pub fn new() -> Self {
        let mut script = Self::default();
        script.line("import bpy");
        script
    }

    /// Append a line of Python source.
    pub fn line(&mut self, source: &str) -> &mut Self {
        self.lines.push(source.to_string());
        self
    }

    /// Append a `NAME = <literal>` assignment.
    pub fn assign(&mut self, name: &str, value: &PyValue) -> &mut Self {
        self.lines.push(format!("{name} = {}", value.render()));
        self
    }

    /// Append a static body below the generated lines.
    pub fn body(&mut self, body: &str) -> &mut Self {
        self.lines.push(body.trim_end().to_string());
        self
    }

    /// Render the accumulated payload.
    pub fn source(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// A payload's temp directory: the generated script plus its report path.
///
/// The directory lives as long as this value; dropping it removes both the
/// script and any report the payload wrote.
pub struct ScriptFile {
    dir: tempfile::TempDir,
    script_path: PathBuf,
}

impl ScriptFile {
    /// Create a fresh temp directory for one payload run.
    pub fn create() -> Result<Self, PayloadError> {
        let dir = tempfile::TempDir::with_prefix(concat!(env!("CARGO_PKG_NAME"), "-"))?;
        let script_path = dir.path().join(constants::PAYLOAD_SCRIPT_NAME);
        Ok(Self { dir, script_path })
    }

    /// Create the directory and write payload source in one step.
    pub fn write(source: &str) -> Result<Self, PayloadError> {
        let file = Self::create()?;
        file.write_source(source)?;
        Ok(file)
    }

    /// Write (or overwrite) the payload source.
    pub fn write_source(&self, source: &str) -> Result<(), PayloadError> {
        std::fs::write(&self.script_path, source)?;
        Ok(())
    }

    /// Path of the generated script.
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Path the payload should write its JSON report to.
    pub fn report_path(&self) -> PathBuf {
        self.dir.path().join(constants::PAYLOAD_REPORT_NAME)
    }
}
