//! Unit icosphere template.
//!
//! Soma spheres and tube end caps are scaled, translated copies of one
//! template built here once per pipeline run.

use crate::{IndexedMesh, Triangle, Vertex};
use hashbrown::HashMap;

const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 1, 2],
    [3, 2, 1],
    [3, 4, 5],
    [3, 8, 4],
    [0, 6, 7],
    [0, 9, 6],
    [4, 10, 11],
    [6, 11, 10],
    [2, 5, 9],
    [11, 9, 5],
    [1, 7, 8],
    [10, 8, 7],
    [3, 5, 2],
    [3, 1, 8],
    [0, 2, 9],
    [0, 7, 1],
    [6, 9, 11],
    [6, 10, 7],
    [4, 11, 5],
    [4, 8, 10],
];

/// Build a closed unit sphere centred at the origin.
///
/// Starts from an icosahedron (12 vertices, 20 faces) and splits every
/// face into four `subdivisions` times, projecting new vertices back onto
/// the unit sphere. Faces wind outward.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_sphere, MeshTopology};
///
/// let sphere = unit_sphere(2);
/// assert_eq!(sphere.face_count(), 320);
/// assert_eq!(sphere.vertex_count(), 162);
/// ```
#[must_use]
pub fn unit_sphere(subdivisions: u32) -> IndexedMesh {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let a = 1.0;
    let b = 1.0 / phi;

    let corners = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];

    let vertices = corners
        .iter()
        .map(|&[x, y, z]| {
            let len = z.mul_add(z, x.mul_add(x, y * y)).sqrt();
            Vertex::from_coords(x / len, y / len, z / len)
        })
        .collect();

    let mut mesh = IndexedMesh::from_parts(vertices, ICOSAHEDRON_FACES.to_vec());
    orient_outward(&mut mesh);

    for _ in 0..subdivisions {
        mesh = subdivide(&mesh);
    }
    mesh
}

/// Flip any face whose normal points towards the origin.
fn orient_outward(mesh: &mut IndexedMesh) {
    for face in &mut mesh.faces {
        let tri = Triangle::new(
            mesh.vertices[face[0] as usize].position,
            mesh.vertices[face[1] as usize].position,
            mesh.vertices[face[2] as usize].position,
        );
        if tri.normal_unnormalized().dot(&tri.centroid().coords) < 0.0 {
            face.swap(1, 2);
        }
    }
}

fn subdivide(mesh: &IndexedMesh) -> IndexedMesh {
    let mut out = IndexedMesh::with_capacity(mesh.vertices.len() * 4, mesh.faces.len() * 4);
    out.vertices.clone_from(&mesh.vertices);

    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();

    for &[v0, v1, v2] in &mesh.faces {
        let m01 = midpoint(v0, v1, &mut out.vertices, &mut midpoints);
        let m12 = midpoint(v1, v2, &mut out.vertices, &mut midpoints);
        let m20 = midpoint(v2, v0, &mut out.vertices, &mut midpoints);

        out.faces.push([v0, m01, m20]);
        out.faces.push([v1, m12, m01]);
        out.faces.push([v2, m20, m12]);
        out.faces.push([m01, m12, m20]);
    }

    out
}

#[allow(clippy::cast_possible_truncation)]
fn midpoint(
    a: u32,
    b: u32,
    vertices: &mut Vec<Vertex>,
    cache: &mut HashMap<(u32, u32), u32>,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let mid = nalgebra::center(
        &vertices[a as usize].position,
        &vertices[b as usize].position,
    );
    let idx = vertices.len() as u32;
    vertices.push(Vertex::new(mid.coords.normalize().into()));
    cache.insert(key, idx);
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeshBounds, MeshTopology};
    use approx::assert_relative_eq;

    #[test]
    fn icosahedron_counts() {
        let sphere = unit_sphere(0);
        assert_eq!(sphere.vertex_count(), 12);
        assert_eq!(sphere.face_count(), 20);
    }

    #[test]
    fn subdivision_counts() {
        let sphere = unit_sphere(3);
        assert_eq!(sphere.face_count(), 20 * 64);
        // Euler: V - E + F = 2 with E = 3F/2
        assert_eq!(sphere.vertex_count(), 2 + sphere.face_count() / 2);
    }

    #[test]
    fn vertices_lie_on_unit_sphere() {
        for v in &unit_sphere(2).vertices {
            assert_relative_eq!(v.position.coords.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn faces_wind_outward() {
        let sphere = unit_sphere(2);
        for tri in sphere.triangles() {
            assert!(tri.normal_unnormalized().dot(&tri.centroid().coords) > 0.0);
        }
        let volume = sphere.signed_volume();
        assert!(volume > 0.0 && volume < 4.0 / 3.0 * std::f64::consts::PI);
    }

    #[test]
    fn diagonal_of_unit_sphere() {
        let sphere = unit_sphere(1);
        assert!(sphere.diagonal() <= 2.0 * 3.0_f64.sqrt() + 1e-12);
        assert!(sphere.diagonal() > 2.0);
    }
}
