//! Shared read access to mesh-like types.

use crate::{Aabb, Triangle, Vertex};

/// Vertex and face access without committing to a storage layout.
pub trait MeshTopology {
    /// Vertices stored.
    fn vertex_count(&self) -> usize;

    /// Triangles stored.
    fn face_count(&self) -> usize;

    /// Nothing to render or wrap: no vertices or no faces.
    fn is_empty(&self) -> bool {
        self.face_count() == 0 || self.vertex_count() == 0
    }

    /// Vertex `index`, if in range.
    fn vertex(&self, index: usize) -> Option<&Vertex>;

    /// Faces as counter-clockwise index triples.
    fn faces(&self) -> impl Iterator<Item = [u32; 3]>;

    /// Faces with positions looked up.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}

/// Spatial extent.
pub trait MeshBounds {
    /// Box around every vertex.
    fn bounds(&self) -> Aabb;

    /// The length scale used for alpha and remesh fractions.
    fn diagonal(&self) -> f64 {
        self.bounds().diagonal()
    }
}
