//! Parsing and processing options.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SwcError, SwcResult};

/// What to do with a root whose type is not soma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RootTypePolicy {
    /// Retag as [`NodeType::SyntheticRoot`](crate::NodeType::SyntheticRoot).
    #[default]
    SyntheticRoot,
    /// Retag as [`NodeType::Soma`](crate::NodeType::Soma).
    Soma,
}

/// What to do with radii below [`ParseOptions::radius_epsilon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RadiusPolicy {
    /// Use the nearest ancestor's radius. Fails for roots.
    #[default]
    InheritParent,
    /// Flip negative radii, then inherit if still too small.
    FlipSign,
    /// Fail on any radius below the threshold.
    Reject,
}

/// Options for [`parse_swc`](crate::parse_swc).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseOptions {
    /// Require the first node line to be a root. Default: true
    pub strict_first_root: bool,

    /// Handling of non-soma roots.
    pub root_policy: RootTypePolicy,

    /// Handling of tiny or negative radii.
    pub radius_policy: RadiusPolicy,

    /// Radii below this are repaired or rejected. Default: 1e-4
    pub radius_epsilon: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_first_root: true,
            root_policy: RootTypePolicy::default(),
            radius_policy: RadiusPolicy::default(),
            radius_epsilon: 1e-4,
        }
    }
}

impl ParseOptions {
    /// Enable or disable the first-node-is-root check.
    #[must_use]
    pub const fn with_strict_first_root(mut self, strict: bool) -> Self {
        self.strict_first_root = strict;
        self
    }

    /// Set the root type policy.
    #[must_use]
    pub const fn with_root_policy(mut self, policy: RootTypePolicy) -> Self {
        self.root_policy = policy;
        self
    }

    /// Set the radius policy.
    #[must_use]
    pub const fn with_radius_policy(mut self, policy: RadiusPolicy) -> Self {
        self.radius_policy = policy;
        self
    }
}

/// Options for [`Skeleton::process`](crate::Skeleton::process).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcessParams {
    /// Smoothing distance Δ. Default: 2.0
    pub delta_smooth: f64,

    /// Interpolation distance δ. Default: 1.0
    pub delta_interp: f64,

    /// Reorder when parents do not precede children. Default: true
    pub reorder: bool,

    /// Smooth and interpolate. Default: true
    pub process: bool,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self::with_delta(2.0)
    }
}

impl ProcessParams {
    /// Smoothing distance `delta` and interpolation distance `delta / 2`.
    #[must_use]
    pub fn with_delta(delta: f64) -> Self {
        Self {
            delta_smooth: delta,
            delta_interp: delta / 2.0,
            reorder: true,
            process: true,
        }
    }

    /// Set the interpolation distance.
    #[must_use]
    pub const fn with_interp_delta(mut self, delta: f64) -> Self {
        self.delta_interp = delta;
        self
    }

    /// Enable or disable reordering.
    #[must_use]
    pub const fn with_reorder(mut self, reorder: bool) -> Self {
        self.reorder = reorder;
        self
    }

    /// Enable or disable smoothing and interpolation.
    #[must_use]
    pub const fn with_process(mut self, process: bool) -> Self {
        self.process = process;
        self
    }

    /// Check that both distances are positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`SwcError::InvalidDistance`] naming the first bad distance.
    pub fn validate(&self) -> SwcResult<()> {
        for (name, value) in [
            ("delta_smooth", self.delta_smooth),
            ("delta_interp", self.delta_interp),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SwcError::InvalidDistance { name, value });
            }
        }
        Ok(())
    }

    /// Reorder only.
    #[must_use]
    pub const fn raw() -> Self {
        Self {
            delta_smooth: 2.0,
            delta_interp: 1.0,
            reorder: true,
            process: false,
        }
    }
}
