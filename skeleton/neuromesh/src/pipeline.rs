//! Skeleton-to-surface orchestration.

use std::fs;
use std::path::{Path, PathBuf};

use mesh_io::save_mesh;
use mesh_kernel::{AlphaWrapParams, GeometryKernel};
use mesh_types::{IndexedMesh, MeshBounds, MeshTopology};
use swc::{ParseOptions, ProcessParams, Skeleton};
use tracing::{info, warn};

use crate::builder::InitialMeshBuilder;
use crate::config::PipelineConfig;
use crate::context::{BuildContext, PipelineWarning};
use crate::error::{PipelineError, PipelineResult};
use crate::simplify::{SimplifyOutcome, SimplifyStatus, WatertightSimplifier};

/// Meshes of one skeleton.
#[derive(Debug, Clone)]
pub struct MeshOutcome {
    /// Final surface.
    pub mesh: IndexedMesh,
    /// Alpha wrap the final surface was simplified from.
    pub alpha_mesh: IndexedMesh,
    /// Alpha fraction of [`Self::alpha_mesh`].
    pub alpha_fraction: f64,
    /// Simplification result, `None` when simplification is off.
    pub status: Option<SimplifyStatus>,
    /// Whether a coarse retry happened, which forces saving the alpha wrap.
    pub coarse_retry: bool,
}

/// Files written by [`MeshPipeline::run`].
#[derive(Debug)]
pub struct PipelineOutput {
    /// The processed skeleton.
    pub skeleton: Skeleton,
    /// The meshes.
    pub outcome: MeshOutcome,
    /// Timings and warnings.
    pub context: BuildContext,
    /// Path of the final mesh.
    pub mesh_path: PathBuf,
    /// Path of the alpha wrap, when saved.
    pub alpha_path: Option<PathBuf>,
}

/// Builds, wraps, simplifies and saves skeleton surfaces.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use mesh_kernel::CommandKernel;
/// use neuromesh::{MeshPipeline, PipelineConfig};
///
/// let pipeline = MeshPipeline::new(
///     CommandKernel::new("mesh-kernel-cli"),
///     PipelineConfig::default().with_output_dir("out"),
/// );
/// assert_eq!(pipeline.output_path(Path::new("cells/a.swc")), Path::new("out/a.ply"));
/// ```
#[derive(Debug)]
pub struct MeshPipeline<K> {
    kernel: K,
    config: PipelineConfig,
    builder: InitialMeshBuilder,
}

impl<K: GeometryKernel> MeshPipeline<K> {
    /// Pipeline calling into `kernel`.
    #[must_use]
    pub fn new(kernel: K, config: PipelineConfig) -> Self {
        let builder = InitialMeshBuilder::new(config.sphere_subdivisions)
            .with_tendril(config.tendril)
            .with_skip_degenerate(config.skip_degenerate_branches);
        Self {
            kernel,
            config,
            builder,
        }
    }

    /// The geometry kernel.
    #[must_use]
    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// `<output dir>/<stem>.ply`, the output directory defaulting to the
    /// input's own.
    #[must_use]
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let dir = self
            .config
            .output_dir
            .as_deref()
            .or_else(|| input.parent())
            .unwrap_or_else(|| Path::new(""));
        let stem = input.file_stem().unwrap_or(input.as_os_str()).to_string_lossy();
        dir.join(format!("{stem}.ply"))
    }

    /// Read, process, mesh and save the skeleton at `input`.
    ///
    /// Nothing is written unless every stage succeeds.
    ///
    /// # Errors
    ///
    /// Returns skeleton, branch, kernel and output errors.
    pub fn run(
        &self,
        input: &Path,
        parse: &ParseOptions,
        process: &ProcessParams,
    ) -> PipelineResult<PipelineOutput> {
        let (skeleton, report) = Skeleton::load(input, parse, process)?;
        let mut context = BuildContext::from_report(&report, &skeleton.record().warnings);
        let outcome = self.mesh_skeleton(&skeleton, &mut context)?;

        let mesh_path = self.output_path(input);
        if let Some(dir) = mesh_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let alpha_path = if self.config.save_alpha_mesh || outcome.coarse_retry {
            let path = alpha_path(&mesh_path);
            save_mesh(&outcome.alpha_mesh, &path, self.config.binary)?;
            Some(path)
        } else {
            None
        };
        save_mesh(&outcome.mesh, &mesh_path, self.config.binary)?;

        info!(
            input = %input.display(),
            output = %mesh_path.display(),
            faces = outcome.mesh.face_count(),
            "saved mesh"
        );
        Ok(PipelineOutput {
            skeleton,
            outcome,
            context,
            mesh_path,
            alpha_path,
        })
    }

    /// Mesh a processed skeleton without touching the filesystem.
    ///
    /// When simplification is exhausted the wrap is redone once at a
    /// coarser alpha fraction and simplified again; the coarser result is
    /// kept whether or not it is watertight.
    ///
    /// # Errors
    ///
    /// Returns branch and kernel errors, a degenerate-extent error for a
    /// skeleton with no spatial extent, or [`PipelineError::EmptyMesh`].
    pub fn mesh_skeleton(
        &self,
        skeleton: &Skeleton,
        ctx: &mut BuildContext,
    ) -> PipelineResult<MeshOutcome> {
        let record = skeleton.record();
        let initial = self.builder.build(skeleton, &self.kernel, ctx)?;

        let min_radius = record.min_radius().unwrap_or_default();
        let diagonal = match record.diagonal() {
            Ok(d) => d,
            Err(e) if initial.diagonal() > 0.0 => {
                warn!(error = %e, "using the initial mesh extent");
                initial.diagonal()
            }
            Err(e) => return Err(e.into()),
        };

        let alpha_fraction = self.config.alpha_for(min_radius, diagonal);
        let params = AlphaWrapParams::new(alpha_fraction)
            .with_offset_fraction(alpha_fraction / self.config.offset_divisor);
        let alpha_mesh = self.wrap(&initial, &params, ctx)?;

        if !self.config.simplify {
            return Ok(MeshOutcome {
                mesh: alpha_mesh.clone(),
                alpha_mesh,
                alpha_fraction,
                status: None,
                coarse_retry: false,
            });
        }

        let length = record.total_length();
        let outcome = self.simplify(&alpha_mesh, min_radius, length, ctx)?;
        if outcome.status.is_watertight() {
            return Ok(MeshOutcome {
                mesh: outcome.mesh,
                alpha_mesh,
                alpha_fraction,
                status: Some(outcome.status),
                coarse_retry: false,
            });
        }

        ctx.warn(PipelineWarning::SimplificationExhausted { alpha_fraction });
        let coarse = params.coarsened(self.config.coarse_retry_factor);
        warn!(
            alpha_fraction = coarse.alpha_fraction,
            "simplification exhausted, retrying with a coarser alpha wrap"
        );
        ctx.warn(PipelineWarning::CoarseRetry {
            alpha_fraction: coarse.alpha_fraction,
        });

        let alpha_mesh = self.wrap(&initial, &coarse, ctx)?;
        let outcome = self.simplify(&alpha_mesh, min_radius, length, ctx)?;
        if !outcome.status.is_watertight() {
            ctx.warn(PipelineWarning::SimplificationExhausted {
                alpha_fraction: coarse.alpha_fraction,
            });
        }
        Ok(MeshOutcome {
            mesh: outcome.mesh,
            alpha_mesh,
            alpha_fraction: coarse.alpha_fraction,
            status: Some(outcome.status),
            coarse_retry: true,
        })
    }

    fn wrap(
        &self,
        mesh: &IndexedMesh,
        params: &AlphaWrapParams,
        ctx: &mut BuildContext,
    ) -> PipelineResult<IndexedMesh> {
        info!(
            alpha_fraction = params.alpha_fraction,
            offset_fraction = params.offset_fraction,
            "applying alpha wrap"
        );
        let wrapped = ctx.time("alpha_wrap", || self.kernel.alpha_wrap(mesh, params))?;
        if wrapped.is_empty() {
            return Err(PipelineError::EmptyMesh { stage: "alpha_wrap" });
        }
        Ok(wrapped)
    }

    fn simplify(
        &self,
        alpha: &IndexedMesh,
        min_radius: f64,
        length: f64,
        ctx: &mut BuildContext,
    ) -> PipelineResult<SimplifyOutcome> {
        let schedule = self.config.faces.resolve(length);
        info!(
            min_faces = schedule.min_faces,
            dfaces = schedule.dfaces,
            "simplifying mesh"
        );
        let simplifier = WatertightSimplifier::new(&self.kernel, self.config.simplifier);
        ctx.time("simplify_mesh", || simplifier.simplify(alpha, min_radius, schedule))
    }
}

/// `<stem>_alpha.ply` beside `mesh_path`.
#[must_use]
pub fn alpha_path(mesh_path: &Path) -> PathBuf {
    let stem = mesh_path
        .file_stem()
        .unwrap_or(mesh_path.as_os_str())
        .to_string_lossy();
    mesh_path.with_file_name(format!("{stem}_alpha.ply"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_kernel::CommandKernel;

    #[test]
    fn output_names() {
        let pipeline = MeshPipeline::new(CommandKernel::new("kernel"), PipelineConfig::default());
        let out = pipeline.output_path(Path::new("data/cell.swc"));
        assert_eq!(out, Path::new("data/cell.ply"));
        assert_eq!(alpha_path(&out), Path::new("data/cell_alpha.ply"));
        assert_eq!(pipeline.output_path(Path::new("cell.swc")), Path::new("cell.ply"));
    }
}
