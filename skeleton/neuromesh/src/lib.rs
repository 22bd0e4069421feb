//! Watertight surface meshes from SWC neuron skeletons.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`InitialMeshBuilder`] places a sphere at every soma node and sweeps
//!    a tendril along every branch, then merges the pieces.
//! 2. The merged soup is alpha wrapped into a watertight surface.
//! 3. [`WatertightSimplifier`] remeshes and decimates the wrap, keeping the
//!    first candidate that stays watertight.
//! 4. [`MeshPipeline`] saves the result as PLY.
//!
//! Surface operations go through a [`mesh_kernel::GeometryKernel`]. Every
//! stage's wall-clock time lands in a [`BuildContext`] returned to the
//! caller.
//!
//! # Example
//!
//! ```
//! use neuromesh::{FaceBudget, PipelineConfig};
//!
//! let config = PipelineConfig::default()
//!     .with_simplify(true)
//!     .with_faces(FaceBudget::default().with_dfaces(400));
//!
//! let schedule = config.faces.resolve(120.0);
//! assert_eq!(schedule.min_faces, 200);
//! assert_eq!(schedule.target(2), 600);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod builder;
mod config;
mod context;
mod error;
mod pipeline;
mod simplify;

pub use builder::InitialMeshBuilder;
pub use config::{FACES_PER_LENGTH, FaceBudget, FaceSchedule, PipelineConfig, SimplifyParams};
pub use context::{BuildContext, PipelineWarning};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{MeshOutcome, MeshPipeline, PipelineOutput, alpha_path};
pub use simplify::{SimplifyOutcome, SimplifyStatus, WatertightSimplifier};
