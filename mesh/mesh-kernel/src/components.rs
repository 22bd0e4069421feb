//! Connected components and small-component cleanup.

use mesh_types::IndexedMesh;
use tracing::debug;

/// Disjoint sets over vertex indices, union by rank with path halving.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}

/// Faces grouped into vertex-connected components.
#[derive(Debug, Clone, Default)]
pub struct ComponentAnalysis {
    /// Face indices of each component, largest component first.
    pub components: Vec<Vec<usize>>,
}

impl ComponentAnalysis {
    /// Number of components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Face count of the largest component.
    #[must_use]
    pub fn largest_face_count(&self) -> usize {
        self.components.first().map_or(0, Vec::len)
    }
}

/// Group faces into components that share at least one vertex.
#[must_use]
pub fn find_connected_components(mesh: &IndexedMesh) -> ComponentAnalysis {
    let mut uf = UnionFind::new(mesh.vertices.len());
    for &[a, b, c] in &mesh.faces {
        uf.union(a as usize, b as usize);
        uf.union(b as usize, c as usize);
    }

    let mut root_to_component: hashbrown::HashMap<usize, usize> = hashbrown::HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        let root = uf.find(face[0] as usize);
        let slot = *root_to_component.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(face_idx);
    }

    // Stable so equal-sized components keep file order.
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    ComponentAnalysis { components }
}

/// Remove components with fewer than `ratio` times the faces of the
/// largest one, then drop vertices left unreferenced.
///
/// Returns the number of components removed.
///
/// # Example
///
/// ```
/// use mesh_kernel::remove_small_components;
/// use mesh_types::{unit_sphere, Vector3};
///
/// let mut mesh = unit_sphere(2);
/// mesh.merge(&unit_sphere(0).placed(0.1, Vector3::new(5.0, 0.0, 0.0)));
///
/// assert_eq!(remove_small_components(&mut mesh, 0.99), 1);
/// assert_eq!(mesh.faces.len(), 320);
/// ```
pub fn remove_small_components(mesh: &mut IndexedMesh, ratio: f64) -> usize {
    let analysis = find_connected_components(mesh);
    if analysis.component_count() <= 1 {
        return 0;
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let threshold = (analysis.largest_face_count() as f64 * ratio).ceil() as usize;

    let mut keep = vec![false; mesh.faces.len()];
    let mut removed = 0;
    for component in &analysis.components {
        if component.len() >= threshold {
            for &f in component {
                keep[f] = true;
            }
        } else {
            removed += 1;
        }
    }

    if removed > 0 {
        let mut idx = 0;
        mesh.faces.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        let dropped_vertices = mesh.remove_unreferenced_vertices();
        debug!(
            removed,
            dropped_vertices,
            remaining_faces = mesh.faces.len(),
            "removed small components"
        );
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Vector3, unit_sphere};

    fn two_spheres(small: u32) -> IndexedMesh {
        let mut mesh = unit_sphere(2);
        mesh.merge(&unit_sphere(small).placed(0.5, Vector3::new(4.0, 0.0, 0.0)));
        mesh
    }

    #[test]
    fn single_sphere_is_one_component() {
        let analysis = find_connected_components(&unit_sphere(1));
        assert_eq!(analysis.component_count(), 1);
        assert_eq!(analysis.largest_face_count(), 80);
    }

    #[test]
    fn components_sorted_largest_first() {
        let analysis = find_connected_components(&two_spheres(1));
        assert_eq!(analysis.component_count(), 2);
        assert_eq!(analysis.components[0].len(), 320);
        assert_eq!(analysis.components[1].len(), 80);
    }

    #[test]
    fn small_component_removed_and_vertices_compacted() {
        let mut mesh = two_spheres(0);
        assert_eq!(remove_small_components(&mut mesh, 0.99), 1);
        assert_eq!(mesh.faces.len(), 320);
        assert_eq!(mesh.vertices.len(), 162);
        assert!(mesh.has_valid_indices());
    }

    #[test]
    fn equal_components_are_kept() {
        let mut mesh = two_spheres(2);
        assert_eq!(remove_small_components(&mut mesh, 0.99), 0);
        assert_eq!(mesh.faces.len(), 640);
    }
}
