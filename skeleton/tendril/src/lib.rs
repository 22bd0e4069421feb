//! Spline-swept tube meshes for skeleton branches.
//!
//! A [`Tendril`] fits natural cubic splines to the positions and radii of
//! one branch, parameterized by normalized arclength, and sweeps a polygon
//! ring along them. Both ends are closed with scaled copies of a sphere
//! template so neighbouring pieces overlap at junctions.
//!
//! The result is a closed surface but not a manifold one: the caps
//! intersect the tube. Downstream alpha wrapping turns the union of
//! tendrils and somata into a watertight surface.
//!
//! # Example
//!
//! ```
//! use mesh_types::{MeshTopology, Point3, unit_sphere};
//! use tendril::{Tendril, TendrilConfig};
//!
//! let tendril = Tendril::new(
//!     &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 10.0)],
//!     &[1.0, 0.5],
//! )
//! .unwrap();
//!
//! let config = TendrilConfig::default();
//! let mesh = tendril.mesh(&unit_sphere(1), &config);
//! assert!(mesh.face_count() > 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod rotation;
mod spline;
mod tendril;

pub use error::{TendrilError, TendrilResult};
pub use rotation::rotation_between;
pub use spline::{CubicSpline, SplineCurve};
pub use tendril::{Tendril, TendrilConfig};
