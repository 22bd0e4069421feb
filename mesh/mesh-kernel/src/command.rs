//! Kernel backend that shells out to a mesh-processing executable.
//!
//! The executable is called once per operation as
//!
//! ```text
//! <program> <operation> <input.ply> <output.ply> [--flag value ...]
//! ```
//!
//! with `operation` one of `alpha-wrap`, `remesh` or `decimate`. Input and
//! output live in a private staging directory that is removed when the
//! call returns. Merging is done in-process by concatenation and
//! watertightness by [`WatertightChecker`].

use std::path::{Path, PathBuf};

use mesh_types::{IndexedMesh, MeshTopology};
use tracing::{debug, info};
use xshell::{Shell, cmd};

use crate::error::{KernelError, KernelResult};
use crate::kernel::GeometryKernel;
use crate::params::{AlphaWrapParams, DecimateParams, RemeshParams};
use crate::staging::StagingArea;
use crate::watertight::WatertightChecker;

/// Geometry kernel backed by an external executable.
#[derive(Debug)]
pub struct CommandKernel {
    program: PathBuf,
    checker: WatertightChecker,
}

impl CommandKernel {
    /// Use `program` for remote operations and the default checker.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            checker: WatertightChecker::new(),
        }
    }

    /// Replace the watertightness checker.
    #[must_use]
    pub fn with_checker(mut self, checker: WatertightChecker) -> Self {
        self.checker = checker;
        self
    }

    /// The executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The watertightness checker.
    #[must_use]
    pub const fn checker(&self) -> &WatertightChecker {
        &self.checker
    }

    fn run(
        &self,
        operation: &'static str,
        mesh: &IndexedMesh,
        flags: &[String],
    ) -> KernelResult<IndexedMesh> {
        if mesh.is_empty() {
            return Err(KernelError::EmptyInput { operation });
        }

        let area = StagingArea::new(operation)?;
        let input = area.stage(mesh, "input.ply")?;
        let output = area.file("output.ply");

        let missing = |reason: String| KernelError::ToolMissing {
            tool: self.program.clone(),
            reason,
        };
        let sh = Shell::new().map_err(|e| missing(e.to_string()))?;
        sh.change_dir(area.path());

        let program = &self.program;
        debug!(operation, ?flags, faces = mesh.face_count(), "calling kernel");
        let result = cmd!(sh, "{program} {operation} {input} {output} {flags...}")
            .quiet()
            .ignore_status()
            .output()
            .map_err(|e| missing(e.to_string()))?;

        if !result.status.success() {
            return Err(KernelError::ToolFailed {
                tool: self.program.clone(),
                operation,
                message: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let out = mesh_io::load_ply(&output)?;
        if out.is_empty() {
            return Err(KernelError::InvalidOutput {
                operation,
                message: "no faces".to_string(),
            });
        }
        if !out.is_finite() {
            return Err(KernelError::InvalidOutput {
                operation,
                message: "non-finite vertex coordinates".to_string(),
            });
        }
        Ok(out)
    }
}

fn switch(flags: &mut Vec<String>, name: &str, on: bool) {
    if on {
        flags.push(format!("--{name}"));
    }
}

fn value(flags: &mut Vec<String>, name: &str, v: impl ToString) {
    flags.push(format!("--{name}"));
    flags.push(v.to_string());
}

impl GeometryKernel for CommandKernel {
    fn alpha_wrap(
        &self,
        mesh: &IndexedMesh,
        params: &AlphaWrapParams,
    ) -> KernelResult<IndexedMesh> {
        let mut flags = Vec::new();
        value(&mut flags, "alpha-fraction", params.alpha_fraction);
        value(&mut flags, "offset-fraction", params.offset_fraction);
        self.run("alpha-wrap", mesh, &flags)
    }

    fn isotropic_remesh(
        &self,
        mesh: &IndexedMesh,
        params: &RemeshParams,
    ) -> KernelResult<IndexedMesh> {
        let mut flags = Vec::new();
        value(&mut flags, "target-edge-fraction", params.target_edge_fraction);
        value(&mut flags, "iterations", params.iterations);
        switch(&mut flags, "adaptive", params.adaptive);
        switch(&mut flags, "check-surface-distance", params.check_surface_distance);
        self.run("remesh", mesh, &flags)
    }

    fn quadric_decimate(
        &self,
        mesh: &IndexedMesh,
        params: &DecimateParams,
    ) -> KernelResult<IndexedMesh> {
        let mut flags = Vec::new();
        value(&mut flags, "target-faces", params.target_faces);
        value(&mut flags, "quality-threshold", params.quality_threshold);
        switch(&mut flags, "preserve-topology", params.preserve_topology);
        switch(&mut flags, "planar-quadric", params.planar_quadric);
        value(&mut flags, "planar-weight", params.planar_weight);
        switch(&mut flags, "quality-weight", params.quality_weight);
        switch(&mut flags, "preserve-normal", params.preserve_normal);
        self.run("decimate", mesh, &flags)
    }

    fn is_watertight(&self, mesh: &IndexedMesh) -> KernelResult<bool> {
        let verdict = self.checker.check(mesh)?;
        info!(
            watertight = verdict.is_watertight(),
            method = ?verdict.method,
            faces = mesh.face_count(),
            "watertightness check"
        );
        Ok(verdict.is_watertight())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_sphere;

    fn kernel() -> CommandKernel {
        CommandKernel::new("/nonexistent/mesh-kernel-for-tests")
            .with_checker(WatertightChecker::new().without_tetgen())
    }

    #[test]
    fn missing_program_is_reported() {
        let result = kernel().alpha_wrap(&unit_sphere(1), &AlphaWrapParams::new(0.01));
        assert!(matches!(result, Err(KernelError::ToolMissing { .. })));
    }

    #[test]
    fn empty_input_is_rejected_before_spawning() {
        let result = kernel().quadric_decimate(
            &IndexedMesh::new(),
            &DecimateParams::with_target_faces(10),
        );
        assert!(matches!(
            result,
            Err(KernelError::EmptyInput {
                operation: "decimate"
            })
        ));
    }

    #[test]
    fn union_merge_concatenates() {
        let parts = [unit_sphere(0), unit_sphere(1)];
        let merged = kernel().union_merge(&parts).unwrap();
        assert_eq!(merged.face_count(), 20 + 80);
    }

    #[test]
    fn watertight_uses_checker() {
        assert!(kernel().is_watertight(&unit_sphere(2)).unwrap());
    }

    #[test]
    fn flag_formatting() {
        let mut flags = Vec::new();
        value(&mut flags, "target-faces", 120_usize);
        switch(&mut flags, "adaptive", true);
        switch(&mut flags, "preserve-normal", false);
        assert_eq!(flags, ["--target-faces", "120", "--adaptive"]);
    }
}
