//! Triangle meshes exchanged by the skeleton meshing crates.
//!
//! Soma spheres, branch tubes, alpha wraps and simplified surfaces are all
//! an [`IndexedMesh`]: a vertex list plus counter-clockwise index triples
//! whose normals point out of the enclosed volume.
//!
//! - [`Vertex`], [`IndexedMesh`] and [`concatenate`] for storage
//! - [`Triangle`] for per-face geometry
//! - [`Aabb`] and [`MeshBounds`] for the diagonal length scale
//! - [`unit_sphere`] for the shared sphere template
//!
//! Coordinates are `f64` in whatever unit the skeleton uses, usually
//! micrometres.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, MeshTopology, Point3, Vertex};
//!
//! let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]];
//! let vertices = corners.iter().map(|&[x, y, z]| Vertex::from_coords(x, y, z)).collect();
//! let mesh = IndexedMesh::from_parts(vertices, vec![[0, 1, 2]]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert_eq!(mesh.vertex(2).map(|v| v.position), Some(Point3::new(0.5, 1.0, 0.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod mesh;
mod sphere;
mod traits;
mod triangle;
mod vertex;

pub use bounds::Aabb;
pub use mesh::{IndexedMesh, concatenate};
pub use sphere::unit_sphere;
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::Vertex;

pub use nalgebra::{Point3, Vector3};
