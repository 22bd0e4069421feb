//! Watertight simplification of an alpha wrap.
//!
//! The simplifier walks a small state machine:
//!
//! ```text
//! RemeshIsotropic -> Aggressive(1..) -> Done
//!                         |
//!                         v
//!                    Emergency(1..) -> Done | Exhausted
//! ```
//!
//! Every decimation starts from an immutable checkpoint (the remeshed
//! surface, or the alpha wrap itself in the emergency loop). A rejected
//! candidate is dropped, never patched up.

use mesh_kernel::{DecimateParams, GeometryKernel, RemeshParams, remove_small_components};
use mesh_types::{IndexedMesh, MeshBounds, MeshTopology};
use tracing::{debug, info, warn};

use crate::config::{FaceSchedule, SimplifyParams};
use crate::error::{PipelineError, PipelineResult};

/// How a simplification ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyStatus {
    /// A decimation of the remeshed surface was watertight.
    Aggressive {
        /// 1-based attempt that succeeded.
        attempt: u32,
    },
    /// A decimation of the raw alpha wrap was watertight.
    Emergency {
        /// 1-based attempt that succeeded.
        attempt: u32,
    },
    /// No attempt was watertight; the mesh is a best effort.
    Exhausted,
}

impl SimplifyStatus {
    /// Whether the returned mesh passed the watertight check.
    #[must_use]
    pub const fn is_watertight(self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

/// Result of [`WatertightSimplifier::simplify`].
#[derive(Debug, Clone)]
pub struct SimplifyOutcome {
    /// Simplified mesh, single component.
    pub mesh: IndexedMesh,
    /// How the search ended.
    pub status: SimplifyStatus,
    /// Decimations tried across both loops.
    pub attempts: u32,
    /// Small components dropped by the final cleanup.
    pub removed_components: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    RemeshIsotropic,
    Aggressive(u32),
    Emergency(u32),
    Done(SimplifyStatus),
}

/// Reduces an alpha-wrapped mesh while keeping it watertight.
#[derive(Debug)]
pub struct WatertightSimplifier<'k, K: ?Sized> {
    kernel: &'k K,
    params: SimplifyParams,
}

impl<'k, K: GeometryKernel + ?Sized> WatertightSimplifier<'k, K> {
    /// Simplifier calling into `kernel`.
    #[must_use]
    pub const fn new(kernel: &'k K, params: SimplifyParams) -> Self {
        Self { kernel, params }
    }

    /// Retry limits in use.
    #[must_use]
    pub const fn params(&self) -> &SimplifyParams {
        &self.params
    }

    /// Simplify `alpha`, the watertight wrap of a skeleton whose smallest
    /// radius is `min_radius`.
    ///
    /// The first watertight candidate wins; targets only grow, so it is
    /// also the smallest found. When nothing passes, the last candidate is
    /// returned with [`SimplifyStatus::Exhausted`].
    ///
    /// # Errors
    ///
    /// Returns kernel errors, or [`PipelineError::EmptyMesh`] for an empty
    /// input.
    pub fn simplify(
        &self,
        alpha: &IndexedMesh,
        min_radius: f64,
        schedule: FaceSchedule,
    ) -> PipelineResult<SimplifyOutcome> {
        if alpha.is_empty() {
            return Err(PipelineError::EmptyMesh { stage: "simplify_mesh" });
        }

        let r_min = min_radius.max(self.params.min_radius_floor);
        let original_faces = alpha.face_count();
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let emergency_ceiling = (original_faces as f64 * self.params.emergency_ceiling) as usize;

        let mut remeshed: Option<IndexedMesh> = None;
        let mut last: Option<IndexedMesh> = None;
        let mut attempts = 0;
        let mut state = State::RemeshIsotropic;

        let status = loop {
            state = match state {
                State::RemeshIsotropic => {
                    let params = RemeshParams::with_edge_length(r_min, alpha.diagonal());
                    let mesh = self.kernel.isotropic_remesh(alpha, &params)?;
                    debug!(
                        before = original_faces,
                        after = mesh.face_count(),
                        "isotropic remesh"
                    );
                    remeshed = Some(mesh);
                    State::Aggressive(1)
                }
                State::Aggressive(attempt) => {
                    let base = remeshed.as_ref().unwrap_or(alpha);
                    let target = schedule.target(attempt);
                    if attempt > self.params.aggressive_attempts || target > base.face_count() {
                        debug!(attempt, target, "aggressive decimation gave up");
                        State::Emergency(1)
                    } else {
                        let params = DecimateParams::with_target_faces(target).refined();
                        attempts += 1;
                        let (candidate, ok) = self.try_decimate(base, &params)?;
                        last = Some(candidate);
                        if ok {
                            State::Done(SimplifyStatus::Aggressive { attempt })
                        } else {
                            State::Aggressive(attempt + 1)
                        }
                    }
                }
                State::Emergency(attempt) => {
                    let target = schedule.target(attempt);
                    if attempt > self.params.emergency_attempts || target > emergency_ceiling {
                        State::Done(SimplifyStatus::Exhausted)
                    } else {
                        let params = DecimateParams::with_target_faces(target);
                        attempts += 1;
                        let (candidate, ok) = self.try_decimate(alpha, &params)?;
                        last = Some(candidate);
                        if ok {
                            State::Done(SimplifyStatus::Emergency { attempt })
                        } else {
                            State::Emergency(attempt + 1)
                        }
                    }
                }
                State::Done(status) => break status,
            };
        };

        let mut mesh = last.unwrap_or_else(|| alpha.clone());
        let removed_components = remove_small_components(&mut mesh, self.params.component_ratio);

        if status.is_watertight() {
            info!(?status, faces = mesh.face_count(), attempts, "simplified mesh");
        } else {
            warn!(attempts, faces = mesh.face_count(), "no watertight simplification found");
        }

        Ok(SimplifyOutcome {
            mesh,
            status,
            attempts,
            removed_components,
        })
    }

    fn try_decimate(
        &self,
        base: &IndexedMesh,
        params: &DecimateParams,
    ) -> PipelineResult<(IndexedMesh, bool)> {
        let candidate = self.kernel.quadric_decimate(base, params)?;
        let watertight = !candidate.is_empty() && self.kernel.is_watertight(&candidate)?;
        debug!(
            target = params.target_faces,
            faces = candidate.face_count(),
            watertight,
            "decimation attempt"
        );
        Ok((candidate, watertight))
    }
}
