//! SWC neuron skeletons.
//!
//! Reads the SWC text format into a [`SkeletonRecord`], repairs what can be
//! repaired, and prepares the tree for meshing:
//!
//! - [`parse_swc`] / [`load_swc`] - reading with configurable repair policies
//! - [`reorder`] - parents before children, iteratively
//! - [`smooth`] / [`interpolate`] - node merging and resampling
//! - [`BranchMap`] - decomposition into single-child chains between junctions
//! - [`write_swc`] / [`save_swc`] - writing, preamble preserved
//! - [`Skeleton`] - the whole sequence with per-stage timings
//!
//! # Storage
//!
//! Nodes are stored 0-based in a `Vec`; parent links are storage indices.
//! Files use 1-based ids with `-1` for roots.
//!
//! # Example
//!
//! ```
//! use swc::{ParseOptions, ProcessParams, Skeleton, parse_swc};
//!
//! let text = "\
//! ## a soma and one axon
//! 1 1 0 0 0 5 -1
//! 2 2 0 0 20 2 1
//! ";
//! let record = parse_swc(text, &ParseOptions::default()).unwrap();
//! assert_eq!(record.preamble, vec!["# a soma and one axon"]);
//!
//! let (skeleton, _) = Skeleton::process(record, &ProcessParams::default()).unwrap();
//! assert!(skeleton.record().is_ordered());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod arena;
mod branches;
mod error;
mod node;
mod options;
mod parse;
mod reorder;
mod skeleton;
mod smooth;
mod stats;
mod write;

pub use branches::{BranchLabel, BranchMap};
pub use error::{ErrorKind, SwcError, SwcResult};
pub use node::{NodeType, SkeletonNode, SkeletonRecord, SwcWarning};
pub use options::{ParseOptions, ProcessParams, RadiusPolicy, RootTypePolicy};
pub use parse::{load_swc, parse_swc, read_swc};
pub use reorder::{depth_first_order, reorder};
pub use skeleton::{ProcessReport, Skeleton};
pub use smooth::{SmoothReport, interpolate, smooth};
pub use write::{clean_path, save_swc, write_swc};
