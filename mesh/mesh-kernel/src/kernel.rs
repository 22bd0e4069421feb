//! The geometry-kernel contract.

use mesh_types::{IndexedMesh, concatenate};

use crate::error::KernelResult;
use crate::params::{AlphaWrapParams, DecimateParams, RemeshParams};

/// Mesh operations the skeleton pipeline delegates.
///
/// Implementations never mutate their inputs: every call returns a new
/// mesh, so callers can keep the input as a checkpoint and simply drop a
/// rejected result.
pub trait GeometryKernel {
    /// Combine meshes into one. Overlaps are left for alpha wrapping.
    ///
    /// The default concatenates without welding.
    ///
    /// # Errors
    ///
    /// Implementations that call out to a tool may fail.
    fn union_merge(&self, meshes: &[IndexedMesh]) -> KernelResult<IndexedMesh> {
        Ok(concatenate(meshes))
    }

    /// Wrap a possibly self-overlapping soup in a watertight surface.
    ///
    /// # Errors
    ///
    /// Fails if the wrapping tool is missing or rejects the input.
    fn alpha_wrap(&self, mesh: &IndexedMesh, params: &AlphaWrapParams)
    -> KernelResult<IndexedMesh>;

    /// Resample a surface towards uniform edge length.
    ///
    /// # Errors
    ///
    /// Fails if the remeshing tool is missing or rejects the input.
    fn isotropic_remesh(
        &self,
        mesh: &IndexedMesh,
        params: &RemeshParams,
    ) -> KernelResult<IndexedMesh>;

    /// Reduce a surface towards `params.target_faces` faces.
    ///
    /// # Errors
    ///
    /// Fails if the decimation tool is missing or rejects the input.
    fn quadric_decimate(
        &self,
        mesh: &IndexedMesh,
        params: &DecimateParams,
    ) -> KernelResult<IndexedMesh>;

    /// Closed, manifold and free of self-intersections.
    ///
    /// # Errors
    ///
    /// Fails only when no self-intersection check can be run at all.
    fn is_watertight(&self, mesh: &IndexedMesh) -> KernelResult<bool>;
}
