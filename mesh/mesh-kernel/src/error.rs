//! Error types for geometry-kernel calls.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for geometry-kernel calls.
pub type KernelResult<T> = Result<T, KernelError>;

/// Errors raised by a geometry kernel or the tools behind it.
#[derive(Debug, Error)]
pub enum KernelError {
    /// An external program could not be started.
    #[error("external tool not available: {tool} ({reason})")]
    ToolMissing {
        /// Program path or name.
        tool: PathBuf,
        /// Why the launch failed.
        reason: String,
    },

    /// An external program ran but reported failure.
    #[error("{operation} failed in {tool}: {message}")]
    ToolFailed {
        /// Program path or name.
        tool: PathBuf,
        /// Kernel operation being run.
        operation: &'static str,
        /// Captured diagnostic output.
        message: String,
    },

    /// The operation produced a mesh that cannot be used.
    #[error("{operation} produced an unusable mesh: {message}")]
    InvalidOutput {
        /// Kernel operation being run.
        operation: &'static str,
        /// What was wrong with the result.
        message: String,
    },

    /// The operation was given an empty mesh.
    #[error("{operation} called on an empty mesh")]
    EmptyInput {
        /// Kernel operation being run.
        operation: &'static str,
    },

    /// No self-intersection check is available.
    #[error("self-intersection check unavailable: tetgen is missing and the heuristic fallback is disabled")]
    NoIntersectionCheck,

    /// Reading or writing a staged mesh failed.
    #[error("mesh staging failed: {0}")]
    MeshIo(#[from] mesh_io::IoError),

    /// Creating or cleaning the staging directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
