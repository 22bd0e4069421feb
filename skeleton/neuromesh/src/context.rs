//! Per-run build context.
//!
//! Stage timings and recoverable warnings are threaded through the
//! pipeline in a [`BuildContext`] value and handed back to the caller,
//! rather than accumulated on a long-lived object.

use std::fmt;
use std::time::{Duration, Instant};

use swc::{ProcessReport, SwcWarning};
use tracing::debug;

/// A recoverable problem met while meshing.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineWarning {
    /// The skeleton was repaired while loading.
    Skeleton(SwcWarning),
    /// A degenerate branch was left out of the initial mesh.
    SkippedBranch {
        /// Branch id.
        branch: usize,
        /// Why it could not be swept.
        reason: String,
    },
    /// No watertight simplification was found at the requested alpha.
    SimplificationExhausted {
        /// Alpha fraction of the wrap that was simplified.
        alpha_fraction: f64,
    },
    /// The alpha wrap was redone at a coarser fraction.
    CoarseRetry {
        /// The coarser alpha fraction.
        alpha_fraction: f64,
    },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skeleton(w) => write!(f, "{w}"),
            Self::SkippedBranch { branch, reason } => {
                write!(f, "skipped degenerate branch {branch}: {reason}")
            }
            Self::SimplificationExhausted { alpha_fraction } => write!(
                f,
                "no watertight simplification found at alpha fraction {alpha_fraction}"
            ),
            Self::CoarseRetry { alpha_fraction } => {
                write!(f, "retrying alpha wrap at fraction {alpha_fraction}")
            }
        }
    }
}

/// Timings and warnings of one meshing run.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    timings: Vec<(&'static str, Duration)>,
    warnings: Vec<PipelineWarning>,
}

impl BuildContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a context from skeleton processing, taking over its timings
    /// and the skeleton's repair warnings.
    #[must_use]
    pub fn from_report(report: &ProcessReport, warnings: &[SwcWarning]) -> Self {
        Self {
            timings: report.timings.clone(),
            warnings: warnings.iter().cloned().map(PipelineWarning::Skeleton).collect(),
        }
    }

    /// Run `f` and record its duration under `stage`.
    pub fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(stage, start.elapsed());
        out
    }

    /// Record a duration. A repeated stage accumulates.
    pub fn record(&mut self, stage: &'static str, elapsed: Duration) {
        debug!(stage, seconds = elapsed.as_secs_f64(), "stage finished");
        if let Some((_, total)) = self.timings.iter_mut().find(|(s, _)| *s == stage) {
            *total += elapsed;
        } else {
            self.timings.push((stage, elapsed));
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, warning: PipelineWarning) {
        self.warnings.push(warning);
    }

    /// Stage durations in first-run order.
    #[must_use]
    pub fn timings(&self) -> &[(&'static str, Duration)] {
        &self.timings
    }

    /// Duration of `stage`, if it ran.
    #[must_use]
    pub fn timing(&self, stage: &str) -> Option<Duration> {
        self.timings
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, d)| *d)
    }

    /// Names of the stages that ran, in order.
    pub fn stages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.timings.iter().map(|(s, _)| *s)
    }

    /// Recorded warnings.
    #[must_use]
    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_stages_accumulate() {
        let mut ctx = BuildContext::new();
        ctx.record("alpha_wrap", Duration::from_millis(5));
        ctx.record("simplify_mesh", Duration::from_millis(1));
        ctx.record("alpha_wrap", Duration::from_millis(7));

        assert_eq!(ctx.timing("alpha_wrap"), Some(Duration::from_millis(12)));
        assert_eq!(ctx.stages().collect::<Vec<_>>(), vec!["alpha_wrap", "simplify_mesh"]);
        assert_eq!(ctx.timing("tetgen"), None);
    }

    #[test]
    fn time_returns_the_value() {
        let mut ctx = BuildContext::new();
        let v = ctx.time("stage", || 41 + 1);
        assert_eq!(v, 42);
        assert!(ctx.timing("stage").is_some());
    }

    #[test]
    fn report_seeds_timings_and_warnings() {
        let report = ProcessReport {
            timings: vec![("extract_swc", Duration::from_millis(3))],
            ..ProcessReport::default()
        };
        let ctx = BuildContext::from_report(&report, &[SwcWarning::ForcedReorder]);
        assert_eq!(ctx.timing("extract_swc"), Some(Duration::from_millis(3)));
        assert_eq!(ctx.warnings(), &[PipelineWarning::Skeleton(SwcWarning::ForcedReorder)]);
    }
}
