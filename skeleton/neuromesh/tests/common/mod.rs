//! Scripted geometry kernel for pipeline tests.

#![allow(dead_code)]

use std::cell::RefCell;

use mesh_kernel::{AlphaWrapParams, DecimateParams, GeometryKernel, KernelResult, RemeshParams};
use mesh_types::{IndexedMesh, MeshTopology, Vector3, Vertex, unit_sphere};

/// One recorded kernel call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Merge(usize),
    Wrap(f64),
    Remesh,
    Decimate { base: usize, target: usize },
    Check(usize),
}

/// A kernel whose results are fixed face-count soups.
///
/// Wrapping returns `wrap_faces` faces, remeshing `remesh_faces`, and
/// decimating exactly the target count. A mesh is watertight when its face
/// count is at least `watertight_from`.
pub struct ScriptedKernel {
    pub wrap_faces: usize,
    pub remesh_faces: usize,
    pub watertight_from: Option<usize>,
    pub coarse_watertight_from: Option<usize>,
    pub stray_component: bool,
    pub calls: RefCell<Vec<Call>>,
}

impl ScriptedKernel {
    pub fn new(wrap_faces: usize, remesh_faces: usize) -> Self {
        Self {
            wrap_faces,
            remesh_faces,
            watertight_from: Some(0),
            coarse_watertight_from: None,
            stray_component: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn watertight_from(mut self, faces: Option<usize>) -> Self {
        self.watertight_from = faces;
        self
    }

    /// Threshold used after the first alpha wrap.
    pub fn coarse_watertight_from(mut self, faces: Option<usize>) -> Self {
        self.coarse_watertight_from = faces;
        self
    }

    pub fn with_stray_component(mut self) -> Self {
        self.stray_component = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn decimations(&self) -> Vec<(usize, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Decimate { base, target } => Some((base, target)),
                _ => None,
            })
            .collect()
    }

    pub fn wraps(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Wrap(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    fn threshold(&self) -> Option<usize> {
        if self.wraps().len() > 1 {
            self.coarse_watertight_from.or(self.watertight_from)
        } else {
            self.watertight_from
        }
    }
}

/// `faces` copies of one triangle.
pub fn soup(faces: usize) -> IndexedMesh {
    IndexedMesh::from_parts(
        vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(10.0, 0.0, 0.0),
            Vertex::from_coords(0.0, 10.0, 0.0),
        ],
        vec![[0, 1, 2]; faces],
    )
}

impl GeometryKernel for ScriptedKernel {
    fn union_merge(&self, meshes: &[IndexedMesh]) -> KernelResult<IndexedMesh> {
        self.calls.borrow_mut().push(Call::Merge(meshes.len()));
        Ok(mesh_types::concatenate(meshes))
    }

    fn alpha_wrap(&self, _: &IndexedMesh, params: &AlphaWrapParams) -> KernelResult<IndexedMesh> {
        self.calls.borrow_mut().push(Call::Wrap(params.alpha_fraction));
        Ok(soup(self.wrap_faces))
    }

    fn isotropic_remesh(&self, _: &IndexedMesh, _: &RemeshParams) -> KernelResult<IndexedMesh> {
        self.calls.borrow_mut().push(Call::Remesh);
        Ok(soup(self.remesh_faces))
    }

    fn quadric_decimate(
        &self,
        mesh: &IndexedMesh,
        params: &DecimateParams,
    ) -> KernelResult<IndexedMesh> {
        self.calls.borrow_mut().push(Call::Decimate {
            base: mesh.face_count(),
            target: params.target_faces,
        });
        let mut out = soup(params.target_faces);
        if self.stray_component {
            out.merge(&unit_sphere(0).placed(0.1, Vector3::new(50.0, 0.0, 0.0)));
        }
        Ok(out)
    }

    fn is_watertight(&self, mesh: &IndexedMesh) -> KernelResult<bool> {
        self.calls.borrow_mut().push(Call::Check(mesh.face_count()));
        Ok(self
            .threshold()
            .is_some_and(|n| mesh.face_count() >= n))
    }
}
