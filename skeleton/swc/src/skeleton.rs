//! Parse-and-process driver.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::branches::BranchMap;
use crate::error::SwcResult;
use crate::node::{SkeletonRecord, SwcWarning};
use crate::options::{ParseOptions, ProcessParams};
use crate::parse::load_swc;
use crate::reorder::reorder;
use crate::smooth::{SmoothReport, interpolate, smooth};

/// What processing did to a skeleton.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReport {
    /// Wall-clock duration of each stage, in execution order.
    pub timings: Vec<(&'static str, Duration)>,
    /// Whether the node order changed.
    pub reordered: bool,
    /// Smoothing pass accounting.
    pub smoothing: SmoothReport,
    /// Interpolation pass accounting.
    pub interpolation: SmoothReport,
}

impl ProcessReport {
    fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.timings.push((stage, start.elapsed()));
        out
    }
}

/// A processed skeleton with its branch decomposition.
///
/// Nodes are frozen once a `Skeleton` exists; the branch map always
/// matches them.
#[derive(Debug, Clone)]
pub struct Skeleton {
    source: Option<PathBuf>,
    record: SkeletonRecord,
    branches: BranchMap,
}

impl Skeleton {
    /// Read and process the SWC file at `path`.
    ///
    /// # Errors
    ///
    /// Returns parse, structural, parameter and I/O errors.
    pub fn load<P: AsRef<Path>>(
        path: P,
        options: &ParseOptions,
        params: &ProcessParams,
    ) -> SwcResult<(Self, ProcessReport)> {
        let path = path.as_ref();
        let start = Instant::now();
        let record = load_swc(path, options)?;
        let read = start.elapsed();

        let (mut skeleton, mut report) = Self::process(record, params)?;
        report.timings.insert(0, ("extract_swc", read));
        skeleton.source = Some(path.to_path_buf());
        Ok((skeleton, report))
    }

    /// Reorder, smooth, interpolate and decompose `record`.
    ///
    /// Smoothing needs parents before children, so processing without
    /// reordering reorders anyway and records [`SwcWarning::ForcedReorder`].
    ///
    /// # Errors
    ///
    /// Returns structural errors from reordering, and
    /// [`SwcError::InvalidDistance`](crate::SwcError::InvalidDistance) when
    /// processing with a distance that is not positive.
    ///
    /// # Example
    ///
    /// ```
    /// use swc::{ParseOptions, ProcessParams, Skeleton, parse_swc};
    ///
    /// let text = "1 1 0 0 0 5 -1\n2 2 0 0 20 2 1\n";
    /// let record = parse_swc(text, &ParseOptions::default()).unwrap();
    /// let (skeleton, report) = Skeleton::process(record, &ProcessParams::default()).unwrap();
    ///
    /// assert_eq!(skeleton.branches().branch_count(), 1);
    /// assert!(skeleton.record().len() > 2);
    /// assert_eq!(report.timings.len(), 3);
    /// ```
    pub fn process(
        mut record: SkeletonRecord,
        params: &ProcessParams,
    ) -> SwcResult<(Self, ProcessReport)> {
        if params.process {
            params.validate()?;
        }
        let mut report = ProcessReport::default();

        let must_reorder = params.reorder || params.process;
        if params.process && !params.reorder && !record.is_ordered() {
            let warning = SwcWarning::ForcedReorder;
            warn!(%warning, "skeleton repaired");
            record.warnings.push(warning);
        }
        if must_reorder {
            report.reordered = report.time("reorder_swc", || reorder(&mut record))?;
        }

        if params.process {
            let initial = record.len();
            let (smoothing, interpolation) = report.time("process_swc", || {
                let s = smooth(&mut record, params.delta_smooth);
                let i = interpolate(&mut record, params.delta_interp);
                (s, i)
            });
            report.smoothing = smoothing;
            report.interpolation = interpolation;
            info!(
                before = initial,
                after = record.len(),
                merged = smoothing.merged,
                inserted = smoothing.inserted + interpolation.inserted,
                "processed skeleton"
            );
        }

        let branches = report.time("initialise_branches", || BranchMap::build(&record));
        Ok((
            Self {
                source: None,
                record,
                branches,
            },
            report,
        ))
    }

    /// Skeleton file this was read from.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Processed nodes and preamble.
    #[must_use]
    pub const fn record(&self) -> &SkeletonRecord {
        &self.record
    }

    /// Branch decomposition of [`Self::record`].
    #[must_use]
    pub const fn branches(&self) -> &BranchMap {
        &self.branches
    }

    /// Give back the processed record.
    #[must_use]
    pub fn into_record(self) -> SkeletonRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_swc;

    fn record(text: &str) -> SkeletonRecord {
        parse_swc(text, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn stages_are_timed_in_order() {
        let (_, report) = Skeleton::process(
            record("1 1 0 0 0 5 -1\n2 2 0 0 20 2 1\n"),
            &ProcessParams::default(),
        )
        .unwrap();
        let stages: Vec<&str> = report.timings.iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, vec!["reorder_swc", "process_swc", "initialise_branches"]);
        assert!(!report.reordered);
    }

    #[test]
    fn raw_processing_keeps_nodes() {
        let (skeleton, report) = Skeleton::process(
            record("1 1 0 0 0 5 -1\n2 2 0 0 20 2 1\n"),
            &ProcessParams::raw(),
        )
        .unwrap();
        assert_eq!(skeleton.record().len(), 2);
        assert_eq!(report.smoothing, SmoothReport::default());
    }

    #[test]
    fn processing_without_reorder_is_forced() {
        let text = "2 2 0 0 1 1 1\n1 1 0 0 0 1 -1\n";
        let parsed = parse_swc(text, &ParseOptions::default().with_strict_first_root(false)).unwrap();
        let params = ProcessParams::default().with_reorder(false);
        let (skeleton, report) = Skeleton::process(parsed, &params).unwrap();
        assert!(report.reordered);
        assert!(skeleton.record().is_ordered());
        assert_eq!(skeleton.record().warnings, vec![SwcWarning::ForcedReorder]);
    }

    #[test]
    fn zero_interpolation_distance_is_rejected() {
        let params = ProcessParams::default().with_interp_delta(0.0);
        let err = Skeleton::process(record("1 1 0 0 0 5 -1\n2 2 0 0 20 2 1\n"), &params)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);

        let skipped = ProcessParams::raw().with_interp_delta(0.0);
        assert!(Skeleton::process(record("1 1 0 0 0 5 -1\n"), &skipped).is_ok());
    }

    #[test]
    fn load_records_source_and_read_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.swc");
        std::fs::write(&path, "1 1 0 0 0 5 -1\n2 2 0 0 20 2 1\n").unwrap();

        let (skeleton, report) =
            Skeleton::load(&path, &ParseOptions::default(), &ProcessParams::default()).unwrap();
        assert_eq!(skeleton.source(), Some(path.as_path()));
        assert_eq!(report.timings[0].0, "extract_swc");

        let nodes = skeleton.into_record().nodes;
        assert!(nodes.len() >= 2);
        assert!(nodes[0].is_root());
    }
}
