//! Error types for tendril construction.

use thiserror::Error;

/// Result type for tendril operations.
pub type TendrilResult<T> = Result<T, TendrilError>;

/// Degenerate branch input.
#[derive(Debug, Error)]
pub enum TendrilError {
    /// Fewer than two distinct control points.
    #[error("spline needs at least 2 distinct control points, got {usable}")]
    TooFewControlPoints {
        /// Number of distinct control points.
        usable: usize,
    },

    /// Positions and radii differ in length.
    #[error("got {points} points but {radii} radii")]
    MismatchedLengths {
        /// Number of positions.
        points: usize,
        /// Number of radii.
        radii: usize,
    },

    /// Spline knots must strictly increase.
    #[error("spline knot {index} does not increase")]
    NonIncreasingKnots {
        /// Index of the offending knot.
        index: usize,
    },

    /// A radius is zero, negative or not finite.
    #[error("invalid radius {radius} at control point {index}")]
    InvalidRadius {
        /// Control point index.
        index: usize,
        /// Offending radius.
        radius: f64,
    },

    /// A position is not finite.
    #[error("non-finite position at control point {index}")]
    NonFinitePosition {
        /// Control point index.
        index: usize,
    },
}
