//! Per-file meshing with failure isolation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mesh_kernel::{CommandKernel, GeometryKernel, WatertightChecker, run_tetgen};
use neuromesh::{FaceBudget, MeshPipeline, PipelineConfig};
use swc::{ParseOptions, ProcessParams, RootTypePolicy, clean_path, save_swc};
use tracing::{debug, error, info};

use crate::Cli;

/// Inputs as given, with directories replaced by their `*.swc` files in
/// name order.
pub(crate) fn expand_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("reading {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "swc"))
                .collect();
            found.sort();
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }
    Ok(inputs)
}

/// Settings shared by every input of one invocation.
pub(crate) struct Batch<K> {
    pipeline: MeshPipeline<K>,
    parse: ParseOptions,
    process: ProcessParams,
    tetgen: PathBuf,
    tetgen_args: Option<String>,
    save_clean_swc: bool,
}

impl Batch<CommandKernel> {
    pub(crate) fn from_cli(cli: &Cli) -> Self {
        let checker = WatertightChecker::new()
            .with_tetgen(&cli.tetgen)
            .with_heuristic_fallback(!cli.require_tetgen);
        let kernel = CommandKernel::new(&cli.kernel).with_checker(checker);
        Self::new(kernel, cli)
    }
}

impl<K: GeometryKernel> Batch<K> {
    pub(crate) fn new(kernel: K, cli: &Cli) -> Self {
        let mut faces = FaceBudget::default();
        faces.dfaces = cli.dfaces;
        faces.min_faces = cli.min_faces;

        let mut config = PipelineConfig::default()
            .with_simplify(cli.simplify == 1)
            .with_save_alpha_mesh(cli.save_alpha_mesh == 1)
            .with_binary(cli.binary)
            .with_faces(faces);
        config.alpha_fraction = cli.alpha;
        config.output_dir.clone_from(&cli.output_dir);

        let root_policy = if cli.soma_roots {
            RootTypePolicy::Soma
        } else {
            RootTypePolicy::SyntheticRoot
        };

        Self {
            pipeline: MeshPipeline::new(kernel, config),
            parse: ParseOptions::default().with_root_policy(root_policy),
            process: ProcessParams::with_delta(cli.delta),
            tetgen: cli.tetgen.clone(),
            tetgen_args: cli.tetgen_args.clone(),
            save_clean_swc: cli.save_clean_swc,
        }
    }

    /// Mesh every input, logging failures. Returns the number of failures.
    pub(crate) fn run(&self, inputs: &[PathBuf]) -> usize {
        let mut failed = 0;
        for input in inputs {
            if let Err(e) = self.mesh_one(input) {
                error!(input = %input.display(), "{e:#}");
                failed += 1;
            }
        }
        info!(meshed = inputs.len() - failed, failed, "batch finished");
        failed
    }

    fn mesh_one(&self, input: &Path) -> Result<()> {
        let output = self
            .pipeline
            .run(input, &self.parse, &self.process)
            .with_context(|| format!("meshing {}", input.display()))?;
        let mut context = output.context;

        if self.save_clean_swc {
            let path = clean_path(input);
            save_swc(output.skeleton.record(), &path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "saved processed skeleton");
        }

        if let Some(args) = &self.tetgen_args {
            let report = context
                .time("tetgen", || run_tetgen(&self.tetgen, &output.mesh_path, args))
                .with_context(|| format!("tetgen on {}", output.mesh_path.display()))?;
            debug!(lines = report.lines().count(), "tetgen finished");
        }

        for warning in context.warnings() {
            debug!(%warning, "recorded warning");
        }
        for (stage, elapsed) in context.timings() {
            debug!(stage, seconds = elapsed.as_secs_f64(), "timing");
        }
        info!(output = %output.mesh_path.display(), "completed");
        Ok(())
    }

    #[cfg(test)]
    fn pipeline(&self) -> &MeshPipeline<K> {
        &self.pipeline
    }
}
