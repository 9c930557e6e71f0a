//! Blender process plumbing: discovery, invocation, and payload generation.

pub mod discovery;
pub mod payload;
pub mod runner;

pub use discovery::{discover, BlenderInstallation, DiscoveryError, DiscoveryMethod};
pub use payload::{PyScript, PyValue, ScriptFile};
pub use runner::{Invocation, RunOutput, RunnerError};
