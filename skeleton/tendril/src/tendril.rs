//! Tube mesh swept along one skeleton branch.
//!
//! A ring of `n` vertices is placed perpendicular to the centreline at the
//! start and transported along the spline: unscaled about the previous
//! centre, rotated by the minimal rotation between consecutive tangents,
//! rescaled to the target radius and moved to the next centre. Consecutive
//! rings are joined by two triangles per ring edge and a scaled unit
//! sphere caps each end.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use std::f64::consts::{PI, SQRT_2};

use mesh_types::{IndexedMesh, Point3, Vector3, Vertex};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{TendrilError, TendrilResult};
use crate::rotation::rotation_between;
use crate::spline::{CubicSpline, SplineCurve};

/// Ring and step resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TendrilConfig {
    /// Ring vertices per unit of mean radius. Default: 15
    pub ring_coefficient: f64,
    /// Fewest vertices per ring. Default: 5
    pub min_ring: usize,
    /// Fewest rings along the branch. Default: 3
    pub min_steps: usize,
}

impl Default for TendrilConfig {
    fn default() -> Self {
        Self {
            ring_coefficient: 15.0,
            min_ring: 5,
            min_steps: 3,
        }
    }
}

impl TendrilConfig {
    /// Set the ring coefficient.
    #[must_use]
    pub const fn with_ring_coefficient(mut self, coefficient: f64) -> Self {
        self.ring_coefficient = coefficient;
        self
    }

    /// Set the minimum ring size (at least 3).
    #[must_use]
    pub fn with_min_ring(mut self, min_ring: usize) -> Self {
        self.min_ring = min_ring.max(3);
        self
    }

    /// Set the minimum step count (at least 2).
    #[must_use]
    pub fn with_min_steps(mut self, min_steps: usize) -> Self {
        self.min_steps = min_steps.max(2);
        self
    }
}

/// Position and radius splines of one branch, parameterized by
/// normalized arclength.
#[derive(Debug, Clone)]
pub struct Tendril {
    centreline: SplineCurve,
    radius: CubicSpline,
    length: f64,
    mean_radius: f64,
    min_radius: f64,
    max_radius: f64,
    start_radius: f64,
    end_radius: f64,
}

impl Tendril {
    /// Fit splines through ordered branch samples.
    ///
    /// Samples that repeat the previous position add no arclength and are
    /// dropped before fitting.
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched inputs, non-finite positions,
    /// non-positive radii, or fewer than two distinct positions.
    pub fn new(positions: &[Point3<f64>], radii: &[f64]) -> TendrilResult<Self> {
        if positions.len() != radii.len() {
            return Err(TendrilError::MismatchedLengths {
                points: positions.len(),
                radii: radii.len(),
            });
        }
        for (index, p) in positions.iter().enumerate() {
            if !p.coords.iter().all(|c| c.is_finite()) {
                return Err(TendrilError::NonFinitePosition { index });
            }
        }
        for (index, &radius) in radii.iter().enumerate() {
            if radius <= 0.0 || !radius.is_finite() {
                return Err(TendrilError::InvalidRadius { index, radius });
            }
        }

        let mut knots = Vec::with_capacity(positions.len());
        let mut points = Vec::with_capacity(positions.len());
        let mut samples = Vec::with_capacity(positions.len());
        let mut arclength = 0.0;
        for (i, (p, &r)) in positions.iter().zip(radii).enumerate() {
            if i > 0 {
                let step = (p - positions[i - 1]).norm();
                if step <= 0.0 {
                    continue;
                }
                arclength += step;
            }
            knots.push(arclength);
            points.push(*p);
            samples.push(r);
        }
        if points.len() < 2 {
            return Err(TendrilError::TooFewControlPoints {
                usable: points.len(),
            });
        }

        let length = arclength;
        for t in &mut knots {
            *t /= length;
        }

        let (min_radius, max_radius) = radii
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                (lo.min(r), hi.max(r))
            });

        Ok(Self {
            centreline: SplineCurve::natural(&knots, &points)?,
            radius: CubicSpline::natural(&knots, &samples)?,
            length,
            mean_radius: radii.iter().sum::<f64>() / radii.len() as f64,
            min_radius,
            max_radius,
            start_radius: samples[0],
            end_radius: samples[samples.len() - 1],
        })
    }

    /// Total centreline length of the samples.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Mean sample radius.
    #[must_use]
    pub const fn mean_radius(&self) -> f64 {
        self.mean_radius
    }

    /// Centreline point at `t` in `[0, 1]`.
    #[must_use]
    pub fn point(&self, t: f64) -> Point3<f64> {
        self.centreline.point(t)
    }

    /// Centreline tangent at `t`.
    #[must_use]
    pub fn tangent(&self, t: f64) -> Vector3<f64> {
        self.centreline.tangent(t)
    }

    /// Radius at `t`, clamped to the sample radius range.
    #[must_use]
    pub fn radius_at(&self, t: f64) -> f64 {
        self.radius.eval(t).clamp(self.min_radius, self.max_radius)
    }

    /// Vertices per ring: `max(min_ring, floor(coefficient * mean radius))`.
    #[must_use]
    pub fn ring_size(&self, config: &TendrilConfig) -> usize {
        config
            .min_ring
            .max((config.ring_coefficient * self.mean_radius).floor() as usize)
    }

    /// Rings along the branch, chosen so ring spacing matches the
    /// circumferential spacing `2π r̄ / (√2 n)`.
    #[must_use]
    pub fn step_count(&self, config: &TendrilConfig) -> usize {
        let n = self.ring_size(config) as f64;
        let spacing = 2.0 * PI * self.mean_radius / (SQRT_2 * n);
        config.min_steps.max((self.length / spacing).floor() as usize)
    }

    fn initial_ring(&self, n: usize) -> Vec<Point3<f64>> {
        let centre = self.point(0.0);
        let r = self.start_radius;
        let rotation = rotation_between(&Vector3::z(), &self.tangent(0.0));
        (0..n)
            .map(|k| {
                let theta = 2.0 * PI * k as f64 / n as f64;
                let local = Vector3::new(r * theta.cos(), r * theta.sin(), 0.0);
                centre + rotation * local
            })
            .collect()
    }

    fn transport(&self, t1: f64, t2: f64, ring: &mut [Point3<f64>]) {
        let (p1, p2) = (self.point(t1), self.point(t2));
        let (r1, r2) = (self.radius_at(t1), self.radius_at(t2));
        let rotation = rotation_between(&self.tangent(t1), &self.tangent(t2));
        for v in ring.iter_mut() {
            let unit = (*v - p1) / r1;
            *v = p2 + rotation * unit * r2;
        }
    }

    /// Sweep the tube and cap both ends with `cap`, a unit sphere scaled by
    /// the end radii.
    #[must_use]
    pub fn mesh(&self, cap: &IndexedMesh, config: &TendrilConfig) -> IndexedMesh {
        let n = self.ring_size(config).max(3);
        let steps = self.step_count(config).max(2);

        let ring_vertices = n * steps;
        let mut mesh = IndexedMesh::with_capacity(
            ring_vertices + 2 * cap.vertices.len(),
            2 * n * (steps - 1) + 2 * cap.faces.len(),
        );

        let mut ring = self.initial_ring(n);
        mesh.vertices.extend(ring.iter().map(|&p| Vertex::new(p)));
        for i in 1..steps {
            let t1 = (i - 1) as f64 / (steps - 1) as f64;
            let t2 = i as f64 / (steps - 1) as f64;
            self.transport(t1, t2, &mut ring);
            mesh.vertices.extend(ring.iter().map(|&p| Vertex::new(p)));
            push_ring_faces(&mut mesh.faces, n, i * n);
        }

        mesh.merge(&cap.placed(self.start_radius, self.point(0.0).coords));
        mesh.merge(&cap.placed(self.end_radius, self.point(1.0).coords));

        debug!(
            ring = n,
            steps,
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "swept tendril"
        );
        mesh
    }
}

/// Join the ring starting at `start - n` to the ring starting at `start`.
///
/// Ring edge `k` gets `[old k, new k, new k-1]` and `[new k, old k, old k+1]`,
/// which faces outward for rings wound counter-clockwise about the
/// tangent.
fn push_ring_faces(faces: &mut Vec<[u32; 3]>, n: usize, start: usize) {
    let old = |k: usize| (start - n + k % n) as u32;
    let new = |k: usize| (start + k % n) as u32;
    for k in 0..n {
        faces.push([old(k), new(k), new(k + n - 1)]);
    }
    for k in 0..n {
        faces.push([new(k), old(k), old(k + 1)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{MeshTopology, unit_sphere};

    fn straight(length: f64, radius: f64) -> Tendril {
        Tendril::new(
            &[Point3::origin(), Point3::new(0.0, 0.0, length)],
            &[radius, radius],
        )
        .unwrap()
    }

    #[test]
    fn resolution_formulas() {
        let t = straight(20.0, 1.0);
        let config = TendrilConfig::default();
        assert_eq!(t.ring_size(&config), 15);
        // spacing = 2π / (√2 · 15) ≈ 0.2962, 20 / 0.2962 ≈ 67.5
        assert_eq!(t.step_count(&config), 67);

        let thin = straight(0.1, 0.1);
        assert_eq!(thin.ring_size(&config), 5);
        assert_eq!(thin.step_count(&config), 3);
    }

    #[test]
    fn mesh_counts() {
        let t = straight(20.0, 1.0);
        let cap = unit_sphere(1);
        let mesh = t.mesh(&cap, &TendrilConfig::default());
        assert_eq!(mesh.vertex_count(), 15 * 67 + 2 * cap.vertex_count());
        assert_eq!(mesh.face_count(), 2 * 15 * 66 + 2 * cap.face_count());
        assert!(mesh.is_finite());
        assert!(mesh.has_valid_indices());
    }

    #[test]
    fn straight_tube_rings_stay_on_radius() {
        let t = straight(10.0, 2.0);
        let mesh = t.mesh(&IndexedMesh::new(), &TendrilConfig::default());
        for v in &mesh.vertices {
            let radial = (v.position.x.powi(2) + v.position.y.powi(2)).sqrt();
            assert_relative_eq!(radial, 2.0, epsilon = 1e-9);
            assert!(v.position.z > -1e-9 && v.position.z < 10.0 + 1e-9);
        }
    }

    #[test]
    fn side_faces_point_outward() {
        let t = straight(10.0, 2.0);
        let mesh = t.mesh(&IndexedMesh::new(), &TendrilConfig::default());
        for tri in mesh.triangles() {
            let c = tri.centroid();
            let outward = Vector3::new(c.x, c.y, 0.0);
            assert!(tri.normal_unnormalized().dot(&outward) > 0.0);
        }
    }

    #[test]
    fn curved_branch_follows_samples() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(3.0, 0.0, 9.0),
            Point3::new(8.0, 0.0, 10.0),
        ];
        let t = Tendril::new(&positions, &[1.0, 0.8, 0.6, 0.5]).unwrap();
        let mut s = 0.0;
        for (i, p) in positions.iter().enumerate() {
            if i > 0 {
                s += (p - positions[i - 1]).norm();
            }
            assert_relative_eq!(t.point(s / t.length()), *p, epsilon = 1e-9);
        }
        assert_relative_eq!(t.radius_at(0.0), 1.0, epsilon = 1e-12);
        for k in 0..=20 {
            let r = t.radius_at(f64::from(k) / 20.0);
            assert!((0.5..=1.0).contains(&r));
        }
        let mesh = t.mesh(&unit_sphere(0), &TendrilConfig::default());
        assert!(mesh.is_finite());
    }

    #[test]
    fn repeated_samples_are_dropped() {
        let t = Tendril::new(
            &[Point3::origin(), Point3::origin(), Point3::new(0.0, 0.0, 4.0)],
            &[2.0, 1.0, 1.0],
        )
        .unwrap();
        assert_relative_eq!(t.length(), 4.0);
    }

    #[test]
    fn degenerate_input() {
        assert!(matches!(
            Tendril::new(&[Point3::origin(), Point3::origin()], &[1.0, 1.0]),
            Err(TendrilError::TooFewControlPoints { usable: 1 })
        ));
        assert!(matches!(
            Tendril::new(&[Point3::origin()], &[1.0, 2.0]),
            Err(TendrilError::MismatchedLengths { .. })
        ));
        assert!(matches!(
            Tendril::new(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)], &[1.0, 0.0]),
            Err(TendrilError::InvalidRadius { index: 1, .. })
        ));
        assert!(matches!(
            Tendril::new(&[Point3::new(f64::NAN, 0.0, 0.0), Point3::origin()], &[1.0, 1.0]),
            Err(TendrilError::NonFinitePosition { index: 0 })
        ));
    }
}
