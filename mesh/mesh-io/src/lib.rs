//! Mesh file I/O.
//!
//! Meshes move between pipeline stages and external tools as PLY files,
//! ASCII or binary little-endian. Coordinates are written as doubles so a
//! saved mesh reloads bit-for-bit.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh};
//!
//! let mesh = load_mesh("neuron_alpha.ply").unwrap();
//! save_mesh(&mesh, "neuron.ply", false).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod ply;

pub use error::{IoError, IoResult};
pub use ply::{load_ply, save_ply};

use std::path::Path;

use mesh_types::IndexedMesh;

fn check_extension(path: &Path) -> IoResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("ply") => Ok(()),
        other => Err(IoError::UnknownFormat {
            extension: other.unwrap_or("(none)").to_string(),
        }),
    }
}

/// Load a mesh, checking the extension first.
///
/// # Errors
///
/// Returns an error if the extension is not `.ply`, the file cannot be
/// read, or its content is not a valid triangle mesh.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    check_extension(path)?;
    load_ply(path)
}

/// Save a mesh, checking the extension first.
///
/// `binary` selects binary little-endian over ASCII encoding.
///
/// # Errors
///
/// Returns an error if the extension is not `.ply` or the file cannot be
/// written.
pub fn save_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> IoResult<()> {
    let path = path.as_ref();
    check_extension(path)?;
    save_ply(mesh, path, binary)
}
