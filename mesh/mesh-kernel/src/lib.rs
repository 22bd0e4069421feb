//! Geometry-kernel contract and backends.
//!
//! The skeleton pipeline never implements surface reconstruction itself.
//! It delegates merging, alpha wrapping, remeshing, decimation and the
//! watertightness predicate to a [`GeometryKernel`]:
//!
//! - [`CommandKernel`] - shells out to an external mesh-processing program
//! - [`WatertightChecker`] - closed-manifold test plus `tetgen -d`
//! - [`inspect_topology`] / [`find_connected_components`] - in-process
//!   diagnostics used by the checker and by the pipeline
//!
//! Kernel calls never mutate their input mesh.
//!
//! # Example
//!
//! ```
//! use mesh_kernel::{WatertightChecker, inspect_topology};
//! use mesh_types::unit_sphere;
//!
//! let sphere = unit_sphere(2);
//! assert!(inspect_topology(&sphere).is_closed_manifold());
//!
//! let checker = WatertightChecker::new().without_tetgen();
//! assert!(checker.check(&sphere).unwrap().is_watertight());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod command;
mod components;
mod error;
mod kernel;
mod params;
mod staging;
mod tetgen;
mod topology;
mod watertight;

pub use command::CommandKernel;
pub use components::{ComponentAnalysis, find_connected_components, remove_small_components};
pub use error::{KernelError, KernelResult};
pub use kernel::GeometryKernel;
pub use params::{AlphaWrapParams, DEFAULT_OFFSET_DIVISOR, DecimateParams, RemeshParams};
pub use staging::StagingArea;
pub use tetgen::{reports_no_intersections, run_tetgen};
pub use topology::{EdgeAdjacency, TopologyReport, inspect_topology};
pub use watertight::{IntersectionCheck, WatertightChecker, WatertightVerdict};
