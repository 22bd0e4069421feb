//! Parameters for kernel operations.
//!
//! Length parameters are fractions of the input mesh's bounding-box
//! diagonal, so the same values work for skeletons of any size.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Divisor giving the default offset fraction from the alpha fraction.
pub const DEFAULT_OFFSET_DIVISOR: f64 = 30.0;

/// Parameters for alpha wrapping.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlphaWrapParams {
    /// Probe radius as a fraction of the bounding-box diagonal.
    pub alpha_fraction: f64,

    /// Offset from the input surface as a fraction of the diagonal.
    pub offset_fraction: f64,
}

impl AlphaWrapParams {
    /// Wrap with `alpha_fraction` and the default offset `alpha / 30`.
    #[must_use]
    pub fn new(alpha_fraction: f64) -> Self {
        Self {
            alpha_fraction,
            offset_fraction: alpha_fraction / DEFAULT_OFFSET_DIVISOR,
        }
    }

    /// Set the offset fraction.
    #[must_use]
    pub const fn with_offset_fraction(mut self, offset_fraction: f64) -> Self {
        self.offset_fraction = offset_fraction;
        self
    }

    /// Same offset, alpha multiplied by `factor`.
    #[must_use]
    pub fn coarsened(self, factor: f64) -> Self {
        Self {
            alpha_fraction: self.alpha_fraction * factor,
            ..self
        }
    }
}

/// Parameters for isotropic explicit remeshing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemeshParams {
    /// Target edge length as a fraction of the bounding-box diagonal.
    pub target_edge_fraction: f64,

    /// Number of remeshing iterations. Default: 7
    pub iterations: u32,

    /// Let the target length adapt to local curvature. Default: true
    pub adaptive: bool,

    /// Reject changes that move the surface too far. Default: false
    pub check_surface_distance: bool,
}

impl Default for RemeshParams {
    fn default() -> Self {
        Self {
            target_edge_fraction: 0.01,
            iterations: 7,
            adaptive: true,
            check_surface_distance: false,
        }
    }
}

impl RemeshParams {
    /// Target an absolute edge length on a mesh with the given diagonal.
    ///
    /// A non-positive diagonal leaves the default fraction in place.
    #[must_use]
    pub fn with_edge_length(edge_length: f64, diagonal: f64) -> Self {
        let mut params = Self::default();
        if diagonal > 0.0 {
            params.target_edge_fraction = edge_length / diagonal;
        }
        params
    }

    /// Set number of iterations.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Enable or disable curvature adaptivity.
    #[must_use]
    pub const fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }
}

/// Parameters for quadric edge-collapse decimation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct DecimateParams {
    /// Number of faces to stop at.
    pub target_faces: usize,

    /// Forbid collapses that change topology. Default: true
    pub preserve_topology: bool,

    /// Minimum triangle quality a collapse may produce (0..1). Default: 0.3
    pub quality_threshold: f64,

    /// Add planar constraints to the quadrics. Default: true
    pub planar_quadric: bool,

    /// Weight of the planar constraints. Default: 0.002
    pub planar_weight: f64,

    /// Weight quadrics by vertex quality. Default: false
    pub quality_weight: bool,

    /// Forbid collapses that flip face normals. Default: false
    pub preserve_normal: bool,
}

impl Default for DecimateParams {
    fn default() -> Self {
        Self {
            target_faces: 0,
            preserve_topology: true,
            quality_threshold: 0.3,
            planar_quadric: true,
            planar_weight: 0.002,
            quality_weight: false,
            preserve_normal: false,
        }
    }
}

impl DecimateParams {
    /// Create params targeting a specific face count.
    #[must_use]
    pub fn with_target_faces(target_faces: usize) -> Self {
        Self {
            target_faces,
            ..Default::default()
        }
    }

    /// Stricter variant used after remeshing: quality weighting and
    /// normal preservation switched on.
    #[must_use]
    pub const fn refined(mut self) -> Self {
        self.quality_weight = true;
        self.preserve_normal = true;
        self
    }

    /// Set the quality threshold.
    #[must_use]
    pub const fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }

    /// Enable or disable topology preservation.
    #[must_use]
    pub const fn with_preserve_topology(mut self, preserve: bool) -> Self {
        self.preserve_topology = preserve;
        self
    }
}
