//! Pipeline configuration.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use mesh_kernel::DEFAULT_OFFSET_DIVISOR;
use tendril::TendrilConfig;

/// Face-count schedule for decimation.
///
/// Attempt `a` targets `min_faces + (a - 1) * dfaces` faces. Unset values
/// are derived from the total cable length `L`: `dfaces = ceil(8 L)` and
/// `min_faces = dfaces / 2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaceBudget {
    /// Increment between attempts.
    pub dfaces: Option<usize>,
    /// Target of the first attempt.
    pub min_faces: Option<usize>,
}

/// Faces per unit of cable length in the default increment.
pub const FACES_PER_LENGTH: f64 = 8.0;

impl FaceBudget {
    /// Set the increment.
    #[must_use]
    pub const fn with_dfaces(mut self, dfaces: usize) -> Self {
        self.dfaces = Some(dfaces);
        self
    }

    /// Set the first target.
    #[must_use]
    pub const fn with_min_faces(mut self, min_faces: usize) -> Self {
        self.min_faces = Some(min_faces);
        self
    }

    /// Fill unset values for a skeleton of cable length `length`.
    ///
    /// Both values are at least 1 so the schedule always makes progress.
    #[must_use]
    pub fn resolve(&self, length: f64) -> FaceSchedule {
        let dfaces = self
            .dfaces
            .unwrap_or_else(|| (FACES_PER_LENGTH * length.max(0.0)).ceil() as usize)
            .max(1);
        let min_faces = self.min_faces.unwrap_or(dfaces / 2).max(1);
        FaceSchedule { dfaces, min_faces }
    }
}

/// A resolved [`FaceBudget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaceSchedule {
    /// Increment between attempts.
    pub dfaces: usize,
    /// Target of the first attempt.
    pub min_faces: usize,
}

impl FaceSchedule {
    /// Target face count of 1-based `attempt`, saturating at `usize::MAX`.
    #[must_use]
    pub const fn target(&self, attempt: u32) -> usize {
        let steps = (attempt as usize).saturating_sub(1);
        self.min_faces.saturating_add(steps.saturating_mul(self.dfaces))
    }
}

/// Retry limits of the watertight simplifier.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimplifyParams {
    /// Attempts on the remeshed surface. Default: 50
    pub aggressive_attempts: u32,
    /// Attempts on the raw alpha wrap. Default: 15
    pub emergency_attempts: u32,
    /// Emergency targets stop above this share of the wrap's faces. Default: 2/3
    pub emergency_ceiling: f64,
    /// Components smaller than this share of the largest are dropped. Default: 0.99
    pub component_ratio: f64,
    /// Floor for the minimum skeleton radius. Default: 0.05
    pub min_radius_floor: f64,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            aggressive_attempts: 50,
            emergency_attempts: 15,
            emergency_ceiling: 2.0 / 3.0,
            component_ratio: 0.99,
            min_radius_floor: 0.05,
        }
    }
}

impl SimplifyParams {
    /// Set both attempt ceilings.
    #[must_use]
    pub const fn with_attempts(mut self, aggressive: u32, emergency: u32) -> Self {
        self.aggressive_attempts = aggressive;
        self.emergency_attempts = emergency;
        self
    }

    /// Set the emergency ceiling ratio.
    #[must_use]
    pub const fn with_emergency_ceiling(mut self, ratio: f64) -> Self {
        self.emergency_ceiling = ratio;
        self
    }

    /// Set the component cleanup ratio.
    #[must_use]
    pub const fn with_component_ratio(mut self, ratio: f64) -> Self {
        self.component_ratio = ratio;
        self
    }

    /// Set the minimum-radius floor.
    #[must_use]
    pub const fn with_min_radius_floor(mut self, floor: f64) -> Self {
        self.min_radius_floor = floor;
        self
    }
}

/// Settings for one [`crate::MeshPipeline`] run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Alpha fraction; derived from the skeleton when unset.
    pub alpha_fraction: Option<f64>,
    /// Lower bound of the derived alpha fraction. Default: 5e-4
    pub alpha_floor: f64,
    /// Offset is alpha divided by this. Default: 30
    pub offset_divisor: f64,
    /// Alpha multiplier of the retry after exhausted simplification. Default: 5
    pub coarse_retry_factor: f64,
    /// Simplify the alpha wrap. Default: true
    pub simplify: bool,
    /// Save the alpha wrap next to the final mesh. Default: false
    pub save_alpha_mesh: bool,
    /// Output directory; the input's directory when unset.
    pub output_dir: Option<PathBuf>,
    /// Write binary PLY. Default: false
    pub binary: bool,
    /// Subdivision level of the sphere template. Default: 2
    pub sphere_subdivisions: u32,
    /// Leave degenerate branches out instead of failing. Default: true
    pub skip_degenerate_branches: bool,
    /// Decimation face schedule.
    pub faces: FaceBudget,
    /// Simplifier retry limits.
    pub simplifier: SimplifyParams,
    /// Tube resolution.
    pub tendril: TendrilConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alpha_fraction: None,
            alpha_floor: 5e-4,
            offset_divisor: DEFAULT_OFFSET_DIVISOR,
            coarse_retry_factor: 5.0,
            simplify: true,
            save_alpha_mesh: false,
            output_dir: None,
            binary: false,
            sphere_subdivisions: 2,
            skip_degenerate_branches: true,
            faces: FaceBudget::default(),
            simplifier: SimplifyParams::default(),
            tendril: TendrilConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Use a fixed alpha fraction.
    #[must_use]
    pub const fn with_alpha_fraction(mut self, alpha: f64) -> Self {
        self.alpha_fraction = Some(alpha);
        self
    }

    /// Enable or disable simplification.
    #[must_use]
    pub const fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    /// Save the intermediate alpha wrap.
    #[must_use]
    pub const fn with_save_alpha_mesh(mut self, save: bool) -> Self {
        self.save_alpha_mesh = save;
        self
    }

    /// Write outputs into `dir`.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Write binary PLY.
    #[must_use]
    pub const fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// Set the decimation face schedule.
    #[must_use]
    pub const fn with_faces(mut self, faces: FaceBudget) -> Self {
        self.faces = faces;
        self
    }

    /// Set the simplifier limits.
    #[must_use]
    pub const fn with_simplifier(mut self, params: SimplifyParams) -> Self {
        self.simplifier = params;
        self
    }

    /// Set the tube resolution.
    #[must_use]
    pub const fn with_tendril(mut self, config: TendrilConfig) -> Self {
        self.tendril = config;
        self
    }

    /// Fail on degenerate branches instead of skipping them.
    #[must_use]
    pub const fn with_skip_degenerate_branches(mut self, skip: bool) -> Self {
        self.skip_degenerate_branches = skip;
        self
    }

    /// Alpha fraction for a skeleton: the override if set, else
    /// `max(2 r_min / diagonal, alpha_floor)`.
    #[must_use]
    pub fn alpha_for(&self, min_radius: f64, diagonal: f64) -> f64 {
        self.alpha_fraction
            .unwrap_or_else(|| (2.0 * min_radius / diagonal).max(self.alpha_floor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn budget_defaults_follow_length() {
        let s = FaceBudget::default().resolve(20.0);
        assert_eq!(s, FaceSchedule { dfaces: 160, min_faces: 80 });
        assert_eq!(s.target(1), 80);
        assert_eq!(s.target(3), 400);
    }

    #[test]
    fn targets_saturate_instead_of_wrapping() {
        let s = FaceSchedule {
            dfaces: usize::MAX,
            min_faces: 1,
        };
        assert_eq!(s.target(1), 1);
        assert_eq!(s.target(2), usize::MAX);
        assert_eq!(s.target(50), usize::MAX);
    }

    #[test]
    fn budget_overrides_win() {
        let s = FaceBudget::default().with_dfaces(10).resolve(1000.0);
        assert_eq!(s, FaceSchedule { dfaces: 10, min_faces: 5 });
        let s = FaceBudget::default().with_min_faces(7).resolve(0.0);
        assert_eq!(s, FaceSchedule { dfaces: 1, min_faces: 7 });
    }

    #[test]
    fn fractional_length_rounds_up() {
        let s = FaceBudget::default().resolve(0.3);
        assert_eq!(s.dfaces, 3);
        assert_eq!(s.min_faces, 1);
    }

    #[test]
    fn derived_alpha_is_floored() {
        let config = PipelineConfig::default();
        assert_relative_eq!(config.alpha_for(2.0, 100.0), 0.04);
        assert_relative_eq!(config.alpha_for(0.01, 1000.0), 5e-4);
        let fixed = config.with_alpha_fraction(0.2);
        assert_relative_eq!(fixed.alpha_for(2.0, 100.0), 0.2);
    }

    #[test]
    fn simplifier_defaults() {
        let p = SimplifyParams::default();
        assert_eq!((p.aggressive_attempts, p.emergency_attempts), (50, 15));
        assert_relative_eq!(p.emergency_ceiling, 2.0 / 3.0);
    }
}
