//! Initial, non-watertight mesh of a skeleton.

use std::time::Instant;

use mesh_kernel::GeometryKernel;
use mesh_types::{IndexedMesh, MeshTopology, unit_sphere};
use swc::{NodeType, Skeleton};
use tendril::{Tendril, TendrilConfig};
use tracing::{info, warn};

use crate::context::{BuildContext, PipelineWarning};
use crate::error::{PipelineError, PipelineResult};

/// Places a sphere at every soma node and sweeps a tendril along every
/// branch.
#[derive(Debug, Clone)]
pub struct InitialMeshBuilder {
    template: IndexedMesh,
    tendril: TendrilConfig,
    skip_degenerate: bool,
}

impl Default for InitialMeshBuilder {
    fn default() -> Self {
        Self::new(2)
    }
}

impl InitialMeshBuilder {
    /// Builder using an icosphere of `subdivisions` levels as the soma and
    /// cap template.
    #[must_use]
    pub fn new(subdivisions: u32) -> Self {
        Self {
            template: unit_sphere(subdivisions),
            tendril: TendrilConfig::default(),
            skip_degenerate: true,
        }
    }

    /// Set the tube resolution.
    #[must_use]
    pub const fn with_tendril(mut self, config: TendrilConfig) -> Self {
        self.tendril = config;
        self
    }

    /// Skip degenerate branches with a warning instead of failing.
    #[must_use]
    pub const fn with_skip_degenerate(mut self, skip: bool) -> Self {
        self.skip_degenerate = skip;
        self
    }

    /// The unit sphere template.
    #[must_use]
    pub const fn template(&self) -> &IndexedMesh {
        &self.template
    }

    /// Soma spheres followed by one tendril per branch, in branch order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Branch`] for a degenerate branch unless
    /// degenerate branches are skipped.
    pub fn pieces(
        &self,
        skeleton: &Skeleton,
        ctx: &mut BuildContext,
    ) -> PipelineResult<Vec<IndexedMesh>> {
        let start = Instant::now();
        let record = skeleton.record();
        let branches = skeleton.branches();

        let mut pieces: Vec<IndexedMesh> = record
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Soma)
            .map(|n| self.template.placed(n.radius, n.position.coords))
            .collect();
        let somata = pieces.len();

        for id in branches.ids() {
            let Some(nodes) = branches.extended_members(id, record) else {
                continue;
            };
            let positions: Vec<_> = nodes.iter().map(|&i| record.nodes[i].position).collect();
            let radii: Vec<f64> = nodes.iter().map(|&i| record.nodes[i].radius).collect();

            match Tendril::new(&positions, &radii) {
                Ok(tendril) => pieces.push(tendril.mesh(&self.template, &self.tendril)),
                Err(source) if self.skip_degenerate => {
                    warn!(branch = id, error = %source, "skipping degenerate branch");
                    ctx.warn(PipelineWarning::SkippedBranch {
                        branch: id,
                        reason: source.to_string(),
                    });
                }
                Err(source) => return Err(PipelineError::Branch { branch: id, source }),
            }
        }

        ctx.record("initialising_individual_meshes", start.elapsed());
        info!(
            somata,
            tendrils = pieces.len() - somata,
            "built individual meshes"
        );
        Ok(pieces)
    }

    /// Build every piece and merge them with `kernel`.
    ///
    /// # Errors
    ///
    /// Returns branch and kernel errors, or [`PipelineError::EmptyMesh`]
    /// when the skeleton yields no geometry.
    pub fn build<K: GeometryKernel + ?Sized>(
        &self,
        skeleton: &Skeleton,
        kernel: &K,
        ctx: &mut BuildContext,
    ) -> PipelineResult<IndexedMesh> {
        let pieces = self.pieces(skeleton, ctx)?;
        let stage = "merging_individual_meshes";
        if pieces.is_empty() {
            return Err(PipelineError::EmptyMesh { stage });
        }

        info!(pieces = pieces.len(), "merging individual meshes");
        let merged = ctx.time(stage, || kernel.union_merge(&pieces))?;
        if merged.is_empty() {
            return Err(PipelineError::EmptyMesh { stage });
        }
        Ok(merged)
    }
}
