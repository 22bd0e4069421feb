//! Mesh file errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result of loading or saving a mesh.
pub type IoResult<T> = Result<T, IoError>;

/// Why a mesh file could not be read or written.
#[derive(Debug, Error)]
pub enum IoError {
    /// Nothing exists at the path.
    #[error("no mesh at {path}")]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The extension is not `.ply`.
    #[error("cannot handle .{extension} meshes, expected .ply")]
    UnknownFormat {
        /// Extension found.
        extension: String,
    },

    /// The PLY header or body is malformed.
    #[error("malformed PLY: {message}")]
    InvalidContent {
        /// What was wrong.
        message: String,
    },

    /// A face refers to a vertex that does not exist.
    #[error("face {face} references vertex {index} but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        /// Face number in file order.
        face: usize,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices in the file.
        vertex_count: usize,
    },

    /// Reading or writing failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Malformed-content error.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
