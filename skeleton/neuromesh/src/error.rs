//! Error types for the meshing pipeline.

use mesh_kernel::KernelError;
use swc::SwcError;
use tendril::TendrilError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort meshing of one skeleton.
///
/// An exhausted simplification is not an error; it is reported on
/// [`crate::SimplifyOutcome`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The skeleton could not be read or processed.
    #[error("skeleton: {0}")]
    Skeleton(#[from] SwcError),

    /// A branch could not be swept.
    #[error("branch {branch}: {source}")]
    Branch {
        /// Branch id.
        branch: usize,
        /// Why the sweep failed.
        #[source]
        source: TendrilError,
    },

    /// A geometry-kernel call failed.
    #[error("geometry kernel: {0}")]
    Kernel(#[from] KernelError),

    /// Saving a mesh failed.
    #[error("mesh output: {0}")]
    MeshIo(#[from] mesh_io::IoError),

    /// Creating an output directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage produced no geometry.
    #[error("{stage} produced an empty mesh")]
    EmptyMesh {
        /// Stage name.
        stage: &'static str,
    },
}

impl PipelineError {
    /// The underlying skeleton error, if any.
    #[must_use]
    pub const fn as_skeleton(&self) -> Option<&SwcError> {
        match self {
            Self::Skeleton(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_stage() {
        let e = PipelineError::EmptyMesh { stage: "alpha_wrap" };
        assert_eq!(e.to_string(), "alpha_wrap produced an empty mesh");

        let e = PipelineError::Branch {
            branch: 3,
            source: TendrilError::TooFewControlPoints { usable: 1 },
        };
        assert!(e.to_string().starts_with("branch 3:"));
        assert!(e.as_skeleton().is_none());
    }

    #[test]
    fn skeleton_errors_convert() {
        let e: PipelineError = SwcError::NoRoot.into();
        assert!(matches!(e.as_skeleton(), Some(SwcError::NoRoot)));
    }
}
