//! Natural cubic splines.
//!
//! Second derivatives vanish at both ends. The tridiagonal system for the
//! interior second derivatives is solved with the Thomas algorithm.

use mesh_types::{Point3, Vector3};

use crate::error::{TendrilError, TendrilResult};

/// Scalar natural cubic spline through `(knots[i], values[i])`.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second: Vec<f64>,
}

fn check_knots(knots: &[f64], values: usize) -> TendrilResult<()> {
    if knots.len() != values {
        return Err(TendrilError::MismatchedLengths {
            points: knots.len(),
            radii: values,
        });
    }
    if knots.len() < 2 {
        return Err(TendrilError::TooFewControlPoints {
            usable: knots.len(),
        });
    }
    for i in 1..knots.len() {
        if knots[i] <= knots[i - 1] || !knots[i].is_finite() {
            return Err(TendrilError::NonIncreasingKnots { index: i });
        }
    }
    Ok(())
}

#[allow(clippy::many_single_char_names)]
fn second_derivatives(t: &[f64], y: &[f64]) -> Vec<f64> {
    let n = t.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }

    let h: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    // Rows 1..n-1: h[i-1] m[i-1] + 2 (h[i-1] + h[i]) m[i] + h[i] m[i+1] = 6 (slope[i] - slope[i-1])
    let size = n - 2;
    let mut c_prime = vec![0.0; size];
    let mut d_prime = vec![0.0; size];
    for k in 0..size {
        let i = k + 1;
        let a = h[i - 1];
        let b = 2.0 * (h[i - 1] + h[i]);
        let c = h[i];
        let d = 6.0 * (slope[i] - slope[i - 1]);
        if k == 0 {
            c_prime[k] = c / b;
            d_prime[k] = d / b;
        } else {
            let denom = b - a * c_prime[k - 1];
            c_prime[k] = c / denom;
            d_prime[k] = (d - a * d_prime[k - 1]) / denom;
        }
    }

    for k in (0..size).rev() {
        let next = if k + 1 < size { m[k + 2] } else { 0.0 };
        m[k + 1] = d_prime[k] - c_prime[k] * next;
    }
    m
}

impl CubicSpline {
    /// Fit a natural spline.
    ///
    /// # Errors
    ///
    /// Fails on fewer than two knots, mismatched lengths, or knots that do
    /// not strictly increase.
    pub fn natural(knots: &[f64], values: &[f64]) -> TendrilResult<Self> {
        check_knots(knots, values.len())?;
        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            second: second_derivatives(knots, values),
        })
    }

    /// Knot parameters.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Interval containing `t`; the end intervals extend outwards.
    fn interval(&self, t: f64) -> usize {
        let last = self.knots.len() - 2;
        self.knots.partition_point(|&k| k <= t).saturating_sub(1).min(last)
    }

    /// Value at `t`.
    #[must_use]
    pub fn eval(&self, t: f64) -> f64 {
        let i = self.interval(t);
        let (t0, t1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second[i], self.second[i + 1]);
        let h = t1 - t0;
        let a = t1 - t;
        let b = t - t0;
        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    /// First derivative at `t`.
    #[must_use]
    pub fn derivative(&self, t: f64) -> f64 {
        let i = self.interval(t);
        let (t0, t1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second[i], self.second[i + 1]);
        let h = t1 - t0;
        let a = t1 - t;
        let b = t - t0;
        -m0 * a * a / (2.0 * h) + m1 * b * b / (2.0 * h) + (y1 - y0) / h - (m1 - m0) * h / 6.0
    }
}

/// Natural cubic spline through 3D points, one scalar spline per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve {
    axes: [CubicSpline; 3],
}

impl SplineCurve {
    /// Fit a natural spline through `points` at parameters `knots`.
    ///
    /// # Errors
    ///
    /// As [`CubicSpline::natural`].
    pub fn natural(knots: &[f64], points: &[Point3<f64>]) -> TendrilResult<Self> {
        let axis = |k: usize| -> TendrilResult<CubicSpline> {
            let values: Vec<f64> = points.iter().map(|p| p[k]).collect();
            CubicSpline::natural(knots, &values)
        };
        Ok(Self {
            axes: [axis(0)?, axis(1)?, axis(2)?],
        })
    }

    /// Point at `t`.
    #[must_use]
    pub fn point(&self, t: f64) -> Point3<f64> {
        Point3::new(self.axes[0].eval(t), self.axes[1].eval(t), self.axes[2].eval(t))
    }

    /// Tangent (unnormalized derivative) at `t`.
    #[must_use]
    pub fn tangent(&self, t: f64) -> Vector3<f64> {
        Vector3::new(
            self.axes[0].derivative(t),
            self.axes[1].derivative(t),
            self.axes[2].derivative(t),
        )
    }
}
