//! Error types for skeleton parsing and processing.

use thiserror::Error;

/// Result type for skeleton operations.
pub type SwcResult<T> = Result<T, SwcError>;

/// Broad class of a [`SwcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed SWC syntax.
    Parse,
    /// Violated tree invariant.
    Structural,
    /// Degenerate geometry.
    Geometry,
    /// Reading or writing failed.
    Io,
    /// Processing parameters are unusable.
    Config,
}

/// Errors raised while reading or processing a skeleton.
#[derive(Debug, Error)]
pub enum SwcError {
    /// A node line does not have exactly seven fields.
    #[error("line {line}: expected 7 fields, found {found}")]
    FieldCount {
        /// 1-based line number.
        line: usize,
        /// Number of whitespace-separated fields on the line.
        found: usize,
    },

    /// A node field could not be parsed.
    #[error("line {line}: invalid {field} '{value}'")]
    InvalidField {
        /// 1-based line number.
        line: usize,
        /// Field name.
        field: &'static str,
        /// Raw text of the field.
        value: String,
    },

    /// A `scale` directive does not carry three numbers.
    #[error("line {line}: scale directive needs three numbers")]
    InvalidScale {
        /// 1-based line number.
        line: usize,
    },

    /// Node ids are 1-based.
    #[error("line {line}: node id {id} is not positive")]
    InvalidId {
        /// 1-based line number.
        line: usize,
        /// Offending id.
        id: i64,
    },

    /// Two node lines share an id.
    #[error("node id {id} appears more than once")]
    DuplicateId {
        /// Repeated id.
        id: i64,
    },

    /// A node refers to a parent id that is never defined.
    #[error("node {id} refers to missing parent {parent}")]
    MissingParent {
        /// Node id.
        id: i64,
        /// Referenced parent id.
        parent: i64,
    },

    /// Strict mode requires the first node to be a root.
    #[error("line {line}: first node must be a root, found parent {parent}")]
    FirstNodeNotRoot {
        /// 1-based line number.
        line: usize,
        /// Parent id found on the first node.
        parent: i64,
    },

    /// The skeleton has no root node.
    #[error("skeleton has no root node")]
    NoRoot,

    /// Parent links form a cycle not reachable from any root.
    #[error("node {index} is on a parent cycle")]
    Cycle {
        /// 0-based storage index of a node on the cycle.
        index: usize,
    },

    /// A radius was rejected by the radius policy.
    #[error("node {id}: invalid radius {radius}")]
    InvalidRadius {
        /// Node id.
        id: i64,
        /// Radius read from the file.
        radius: f64,
    },

    /// A radius is too small and no ancestor has a usable one.
    #[error("node {id}: radius {radius} is too small and cannot be repaired from a parent")]
    UnrepairableRadius {
        /// Node id.
        id: i64,
        /// Radius read from the file.
        radius: f64,
    },

    /// All node positions coincide.
    #[error("skeleton needs at least two distinct points")]
    DegenerateExtent,

    /// A smoothing or interpolation distance is not a positive number.
    #[error("{name} must be positive and finite, got {value}")]
    InvalidDistance {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Reading or writing failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwcError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FieldCount { .. }
            | Self::InvalidField { .. }
            | Self::InvalidScale { .. }
            | Self::InvalidId { .. } => ErrorKind::Parse,
            Self::DuplicateId { .. }
            | Self::MissingParent { .. }
            | Self::FirstNodeNotRoot { .. }
            | Self::NoRoot
            | Self::Cycle { .. }
            | Self::InvalidRadius { .. }
            | Self::UnrepairableRadius { .. } => ErrorKind::Structural,
            Self::DegenerateExtent => ErrorKind::Geometry,
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidDistance { .. } => ErrorKind::Config,
        }
    }
}
