//! Mesh vertices.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex.
///
/// Only positions travel through the pipeline; the geometry kernel
/// recomputes normals itself.
///
/// ```
/// use mesh_types::{Point3, Vertex};
///
/// assert_eq!(Vertex::new(Point3::new(1.0, 2.0, 3.0)), Vertex::from_coords(1.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Vertex at `position`.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Vertex at `(x, y, z)`.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// No coordinate is NaN or infinite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_land_in_order() {
        let v = Vertex::from_coords(1.0, 2.0, 3.0);
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(Vertex::from(Point3::new(1.0, 2.0, 3.0)), v);
    }

    #[test]
    fn nan_vertex_is_not_finite() {
        assert!(Vertex::from_coords(0.0, 1.0, 2.0).is_finite());
        assert!(!Vertex::from_coords(0.0, f64::NAN, 2.0).is_finite());
        assert!(!Vertex::from_coords(f64::INFINITY, 0.0, 0.0).is_finite());
    }
}
