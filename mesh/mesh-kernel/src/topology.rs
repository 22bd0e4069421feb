//! Edge adjacency and the closed-manifold half of the watertight test.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, MeshTopology};

/// Edge-to-face incidence for a triangle list.
///
/// Edges are undirected and stored with the smaller index first.
#[derive(Debug, Clone)]
pub struct EdgeAdjacency {
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
}

impl EdgeAdjacency {
    /// Build incidence from a list of faces.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_kernel::EdgeAdjacency;
    ///
    /// let adj = EdgeAdjacency::build(&[[0, 1, 2], [1, 3, 2]]);
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> =
            HashMap::with_capacity(faces.len() * 3 / 2);

        for (face_idx, face) in faces.iter().enumerate() {
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                edge_to_faces
                    .entry(normalize_edge(a, b))
                    .or_default()
                    .push(face_idx);
            }
        }

        Self { edge_to_faces }
    }

    /// Faces incident to an edge, `None` if the edge does not exist.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&normalize_edge(v0, v1))
            .map(Vec::as_slice)
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Edges with exactly one incident face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() == 1).count()
    }

    /// Edges with more than two incident faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() > 2).count()
    }

    /// Every edge has exactly two incident faces.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|f| f.len() == 2)
    }
}

#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}

/// Topological health of a mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Number of distinct edges.
    pub edge_count: usize,
    /// Edges with one incident face.
    pub boundary_edge_count: usize,
    /// Edges with more than two incident faces.
    pub non_manifold_edge_count: usize,
    /// Faces that repeat a vertex index.
    pub collapsed_face_count: usize,
    /// Directed edges used by more than one face (inconsistent winding).
    pub misoriented_edge_count: usize,
}

impl TopologyReport {
    /// Closed, manifold, consistently wound, no collapsed faces.
    #[must_use]
    pub const fn is_closed_manifold(&self) -> bool {
        self.face_count > 0
            && self.boundary_edge_count == 0
            && self.non_manifold_edge_count == 0
            && self.collapsed_face_count == 0
            && self.misoriented_edge_count == 0
    }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vertices, {} faces, {} edges ({} boundary, {} non-manifold, {} misoriented), {} collapsed faces",
            self.vertex_count,
            self.face_count,
            self.edge_count,
            self.boundary_edge_count,
            self.non_manifold_edge_count,
            self.misoriented_edge_count,
            self.collapsed_face_count,
        )
    }
}

/// Inspect the topology of a mesh.
#[must_use]
pub fn inspect_topology(mesh: &IndexedMesh) -> TopologyReport {
    let adjacency = EdgeAdjacency::build(&mesh.faces);

    let collapsed_face_count = mesh
        .faces
        .iter()
        .filter(|f| f[0] == f[1] || f[1] == f[2] || f[2] == f[0])
        .count();

    // A consistently wound closed surface uses each directed edge once.
    let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(mesh.faces.len() * 3);
    for face in &mesh.faces {
        for edge in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
            *directed.entry(edge).or_default() += 1;
        }
    }
    let misoriented_edge_count = directed.values().filter(|&&n| n > 1).count();

    TopologyReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        collapsed_face_count,
        misoriented_edge_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Vertex, unit_sphere};

    fn tetrahedron() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
                Vertex::from_coords(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    #[test]
    fn shared_edge_lookup() {
        let adj = EdgeAdjacency::build(&[[0, 1, 2], [1, 3, 2]]);
        assert_eq!(adj.faces_for_edge(2, 1).map(<[usize]>::len), Some(2));
        assert_eq!(adj.faces_for_edge(0, 1).map(<[usize]>::len), Some(1));
        assert!(adj.faces_for_edge(0, 3).is_none());
    }

    #[test]
    fn non_manifold_fan() {
        let adj = EdgeAdjacency::build(&[[0, 1, 2], [0, 1, 3], [0, 1, 4]]);
        assert_eq!(adj.non_manifold_edge_count(), 1);
        assert!(!adj.is_closed_manifold());
    }

    #[test]
    fn tetrahedron_is_closed() {
        let report = inspect_topology(&tetrahedron());
        assert_eq!(report.edge_count, 6);
        assert!(report.is_closed_manifold(), "{report}");
    }

    #[test]
    fn sphere_is_closed() {
        assert!(inspect_topology(&unit_sphere(2)).is_closed_manifold());
    }

    #[test]
    fn open_mesh_has_boundary() {
        let mut mesh = tetrahedron();
        mesh.faces.pop();
        let report = inspect_topology(&mesh);
        assert_eq!(report.boundary_edge_count, 3);
        assert!(!report.is_closed_manifold());
    }

    #[test]
    fn flipped_face_is_misoriented() {
        let mut mesh = tetrahedron();
        mesh.faces[3].swap(1, 2);
        let report = inspect_topology(&mesh);
        assert_eq!(report.boundary_edge_count, 0);
        assert_eq!(report.misoriented_edge_count, 3);
        assert!(!report.is_closed_manifold());
    }

    #[test]
    fn empty_mesh_is_not_closed() {
        assert!(!inspect_topology(&IndexedMesh::new()).is_closed_manifold());
    }
}
