//! Minimal rotations between directions.

use mesh_types::Vector3;
use nalgebra::Matrix3;

/// Below this `|from × to|` the directions count as parallel.
const PARALLEL_SIN: f64 = 1e-7;

/// A unit vector perpendicular to `v`.
fn perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let axis = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    axis.cross(v).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
}

/// Rotation taking direction `from` onto direction `to` about their common
/// normal (Rodrigues' formula).
///
/// Nearly parallel directions give the identity. Nearly opposite ones give
/// a half turn about an axis perpendicular to `from`. A zero direction
/// gives the identity.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>) -> Matrix3<f64> {
    let (Some(a), Some(b)) = (
        from.try_normalize(f64::EPSILON),
        to.try_normalize(f64::EPSILON),
    ) else {
        return Matrix3::identity();
    };

    let u = a.cross(&b);
    let s = u.norm();
    let c = a.dot(&b);

    if s < PARALLEL_SIN {
        if c > 0.0 {
            return Matrix3::identity();
        }
        let k = perpendicular(&a);
        return 2.0 * k * k.transpose() - Matrix3::identity();
    }

    let k = u / s;
    let cross = k.cross_matrix();
    Matrix3::identity() * c + cross * s + k * k.transpose() * (1.0 - c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn maps_z_onto_direction() {
        let to = Vector3::new(1.0, 2.0, -0.5).normalize();
        let r = rotation_between(&Vector3::z(), &to);
        assert_relative_eq!(r * Vector3::z(), to, epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn parallel_is_identity() {
        let r = rotation_between(&Vector3::new(0.0, 0.0, 2.0), &Vector3::z());
        assert_relative_eq!(r, Matrix3::identity());
    }

    #[test]
    fn opposite_is_a_proper_half_turn() {
        for d in [Vector3::z(), Vector3::x(), Vector3::new(0.3, -0.4, 0.5)] {
            let r = rotation_between(&d, &(-d));
            assert_relative_eq!(r * d, -d, epsilon = 1e-12);
            assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_direction_is_identity() {
        let r = rotation_between(&Vector3::zeros(), &Vector3::x());
        assert_relative_eq!(r, Matrix3::identity());
    }
}
