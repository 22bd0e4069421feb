//! Vertex and face buffers.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Triangles over a shared vertex list.
///
/// Soma spheres, branch tubes, the merged soup and every wrapped or
/// decimated surface use this one representation.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, MeshBounds, Vector3, unit_sphere};
///
/// let soma = unit_sphere(1).placed(5.0, Vector3::new(0.0, 0.0, 20.0));
/// let mut cell = IndexedMesh::new();
/// cell.merge(&soma);
///
/// assert_eq!(cell, soma);
/// let top = cell.bounds().max.z;
/// assert!(top > 24.0 && top <= 25.0 + 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Positions.
    pub vertices: Vec<Vertex>,

    /// Corner indices, counter-clockwise seen from outside.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// No vertices, no faces.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Empty mesh with room for `vertices` and `faces`.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self::from_parts(Vec::with_capacity(vertices), Vec::with_capacity(faces))
    }

    /// Assemble from existing buffers.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Move every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.vertices.iter_mut().for_each(|v| v.position += offset);
    }

    /// Uniform scale about the origin.
    pub fn scale(&mut self, factor: f64) {
        self.vertices.iter_mut().for_each(|v| v.position.coords *= factor);
    }

    /// Copy of this mesh scaled about the origin then moved by `offset`.
    ///
    /// This is how template spheres are placed at skeleton nodes.
    #[must_use]
    pub fn placed(&self, factor: f64, offset: Vector3<f64>) -> Self {
        let mut out = self.clone();
        out.scale(factor);
        out.translate(offset);
        out
    }

    /// Signed volume by the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing normals.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let sixfold: f64 = self
            .triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum();
        sixfold / 6.0
    }

    /// True when every vertex coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(Vertex::is_finite)
    }

    /// True when every face index refers to an existing vertex.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .all(|face| face.iter().all(|&i| (i as usize) < n))
    }

    /// Append `other` unwelded, shifting its indices past ours.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(other.faces.iter().map(|f| f.map(|i| i + base)));
    }

    /// Drop vertices that no face references, renumbering faces.
    ///
    /// Returns the number of vertices removed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let mut remap = vec![u32::MAX; self.vertices.len()];
        for face in &self.faces {
            for &i in face {
                remap[i as usize] = 0;
            }
        }

        let mut kept = Vec::with_capacity(self.vertices.len());
        for (old, vertex) in self.vertices.drain(..).enumerate() {
            if remap[old] != u32::MAX {
                remap[old] = kept.len() as u32;
                kept.push(vertex);
            }
        }
        let removed = remap.len() - kept.len();
        self.vertices = kept;

        for face in &mut self.faces {
            for i in face.iter_mut() {
                *i = remap[*i as usize];
            }
        }
        removed
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn faces(&self) -> impl Iterator<Item = [u32; 3]> {
        self.faces.iter().copied()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        let at = |i: u32| self.vertices[i as usize].position;
        self.faces
            .iter()
            .map(move |&[a, b, c]| Triangle::new(at(a), at(b), at(c)))
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// All `meshes` in one buffer, nothing welded.
#[must_use]
pub fn concatenate<'a>(meshes: impl IntoIterator<Item = &'a IndexedMesh>) -> IndexedMesh {
    let mut out = IndexedMesh::new();
    for mesh in meshes {
        out.merge(mesh);
    }
    out
}
