//! SWC skeletons in, watertight PLY surfaces out.
//!
//! # Usage
//!
//! ```text
//! swc-mesh cell.swc
//! swc-mesh cells/ --output_dir meshes --Delta 1.5 --simplify 0
//! swc-mesh cell.swc --tetgen_args "-pq1.2 -a" --save_alpha_mesh 1
//! ```
//!
//! Each input is meshed independently. A failure is logged and the batch
//! moves on; the exit status is non-zero if any input failed.

mod batch;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::batch::{Batch, expand_inputs};

/// Reads SWC skeletons and produces coarse watertight surface meshes.
#[derive(Parser, Debug)]
#[command(name = "swc-mesh")]
#[command(about = "Watertight surface meshes from SWC neuron skeletons", long_about = None)]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Cli {
    /// SWC files, or directories searched for `*.swc`
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory for meshes (defaults to each input's directory)
    #[arg(long = "output_dir")]
    output_dir: Option<PathBuf>,

    /// Alpha fraction for the alpha wrap (derived from the skeleton if unset)
    #[arg(long)]
    alpha: Option<f64>,

    /// Smoothing distance for the skeleton; interpolation uses half of it
    #[arg(long = "Delta", default_value_t = 2.0, value_parser = positive_distance)]
    delta: f64,

    /// Simplify the alpha wrap (1) or keep it as is (0)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
    simplify: u8,

    /// Target face count of the first decimation attempt
    #[arg(long = "min_faces")]
    min_faces: Option<usize>,

    /// Increase of the target face count between attempts
    #[arg(long)]
    dfaces: Option<usize>,

    /// Run tetgen on each final mesh with these arguments
    #[arg(long = "tetgen_args", allow_hyphen_values = true)]
    tetgen_args: Option<String>,

    /// Save the alpha wrap as `<stem>_alpha.ply` (1) or not (0)
    #[arg(long = "save_alpha_mesh", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    save_alpha_mesh: u8,

    /// Save the processed skeleton as `<stem>_clean.swc`
    #[arg(long = "save_clean_swc")]
    save_clean_swc: bool,

    /// Write binary PLY instead of ASCII
    #[arg(long)]
    binary: bool,

    /// Geometry-kernel program that merges, wraps, remeshes and decimates
    #[arg(long, default_value = "swc-mesh-kernel")]
    kernel: PathBuf,

    /// tetgen executable, used for self-intersection checks
    #[arg(long, default_value = "tetgen")]
    tetgen: PathBuf,

    /// Fail instead of falling back to the connectivity heuristic when
    /// tetgen cannot be run
    #[arg(long = "require_tetgen")]
    require_tetgen: bool,

    /// Coerce non-soma roots to soma instead of marking them synthetic
    #[arg(long = "soma_roots")]
    soma_roots: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

/// Smallest accepted `--Delta`.
const MIN_DELTA: f64 = 1e-3;

fn positive_distance(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value >= MIN_DELTA {
        Ok(value)
    } else {
        Err(format!("must be a finite distance of at least {MIN_DELTA}"))
    }
}

fn init_logging(level: &str) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let inputs = expand_inputs(&cli.files)?;
    let batch = Batch::from_cli(&cli);
    let failed = batch.run(&inputs);

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
