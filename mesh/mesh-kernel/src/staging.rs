//! Private scratch directories for meshes handed to external tools.
//!
//! Each [`StagingArea`] owns a freshly created temporary directory with a
//! unique name. The directory and everything written into it are removed
//! when the area is dropped, on success and on error paths alike.

use std::path::{Path, PathBuf};

use mesh_types::IndexedMesh;
use tempfile::TempDir;
use tracing::debug;

use crate::error::KernelResult;

/// A uniquely named temporary directory removed on drop.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a new area under the system temp directory.
    ///
    /// `label` becomes part of the directory name to ease debugging; the
    /// rest of the name is random, so concurrent pipelines never collide.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(label: &str) -> KernelResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("swc-mesh-{label}-"))
            .tempdir()?;
        debug!(path = %dir.path().display(), "created staging area");
        Ok(Self { dir })
    }

    /// Directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file named `name` inside the area.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `mesh` as binary PLY to `name` and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh cannot be written.
    pub fn stage(&self, mesh: &IndexedMesh, name: &str) -> KernelResult<PathBuf> {
        let path = self.file(name);
        mesh_io::save_ply(mesh, &path, true)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_sphere;

    #[test]
    fn directory_removed_on_drop() {
        let path = {
            let area = StagingArea::new("test").unwrap();
            let staged = area.stage(&unit_sphere(0), "mesh.ply").unwrap();
            assert!(staged.exists());
            area.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn directory_removed_when_work_fails() {
        fn failing_work(area: &StagingArea) -> KernelResult<()> {
            area.stage(&unit_sphere(0), "mesh.ply")?;
            Err(crate::KernelError::EmptyInput {
                operation: "test",
            })
        }

        let area = StagingArea::new("fail").unwrap();
        let path = area.path().to_path_buf();
        assert!(failing_work(&area).is_err());
        drop(area);
        assert!(!path.exists());
    }

    #[test]
    fn areas_do_not_collide() {
        let a = StagingArea::new("same").unwrap();
        let b = StagingArea::new("same").unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().file_name().unwrap().to_string_lossy().starts_with("swc-mesh-same-"));
    }
}
