//! Resolved triangle corners.

use nalgebra::{Point3, Vector3};

/// A face with resolved corner positions, counter-clockwise seen from
/// outside.
///
/// Used to check winding: the unnormalized normal of an outward face has a
/// positive dot product with any outward direction.
///
/// ```
/// use mesh_types::{Point3, Triangle, Vector3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
///     Point3::new(0.0, 4.0, 0.0),
/// );
/// assert!(tri.normal_unnormalized().dot(&Vector3::z()) > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Triangle with corners in winding order.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Face normal scaled by twice the area, right-hand rule.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Centroid.
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }
}
