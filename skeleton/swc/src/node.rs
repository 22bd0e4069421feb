//! Skeleton data model.

use std::fmt;

use mesh_types::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SWC structure identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeType {
    /// Root that was not tagged as soma in the file (code -1).
    SyntheticRoot,
    /// Code 0.
    Undefined,
    /// Cell body (code 1).
    Soma,
    /// Code 2.
    Axon,
    /// Code 3.
    BasalDendrite,
    /// Code 4.
    ApicalDendrite,
    /// Code 5.
    Custom,
    /// Code 6.
    Unspecified,
    /// Code 7.
    Glia,
    /// Any other code, kept as read.
    Unknown(i32),
}

impl NodeType {
    /// Map an SWC type code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::SyntheticRoot,
            0 => Self::Undefined,
            1 => Self::Soma,
            2 => Self::Axon,
            3 => Self::BasalDendrite,
            4 => Self::ApicalDendrite,
            5 => Self::Custom,
            6 => Self::Unspecified,
            7 => Self::Glia,
            other => Self::Unknown(other),
        }
    }

    /// SWC type code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::SyntheticRoot => -1,
            Self::Undefined => 0,
            Self::Soma => 1,
            Self::Axon => 2,
            Self::BasalDendrite => 3,
            Self::ApicalDendrite => 4,
            Self::Custom => 5,
            Self::Unspecified => 6,
            Self::Glia => 7,
            Self::Unknown(code) => code,
        }
    }

    /// Soma or synthetic root. Such nodes always bound branches.
    #[must_use]
    pub const fn is_root_like(self) -> bool {
        matches!(self, Self::Soma | Self::SyntheticRoot)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One skeleton sample.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkeletonNode {
    /// Centreline position.
    pub position: Point3<f64>,
    /// Cross-sectional radius.
    pub radius: f64,
    /// Structure identifier.
    pub node_type: NodeType,
    /// Storage index of the parent, `None` for roots.
    pub parent: Option<usize>,
}

impl SkeletonNode {
    /// Create a node.
    #[must_use]
    pub const fn new(
        position: Point3<f64>,
        radius: f64,
        node_type: NodeType,
        parent: Option<usize>,
    ) -> Self {
        Self {
            position,
            radius,
            node_type,
            parent,
        }
    }

    /// True for nodes without a parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Recoverable problem found while reading or processing a skeleton.
#[derive(Debug, Clone, PartialEq)]
pub enum SwcWarning {
    /// A non-soma root was retagged as a synthetic root.
    SyntheticRoot {
        /// Node id in the file.
        id: i64,
        /// Type code read from the file.
        original: i32,
    },
    /// A non-soma root was retagged as soma.
    RootCoercedToSoma {
        /// Node id in the file.
        id: i64,
        /// Type code read from the file.
        original: i32,
    },
    /// A radius below the repair threshold was replaced by an ancestor's.
    RadiusInherited {
        /// Node id in the file.
        id: i64,
        /// Radius read from the file.
        original: f64,
        /// Radius used instead.
        repaired: f64,
    },
    /// A negative radius had its sign flipped.
    RadiusSignFlipped {
        /// Node id in the file.
        id: i64,
        /// Radius read from the file.
        original: f64,
    },
    /// A type code outside the known range.
    UnknownType {
        /// Node id in the file.
        id: i64,
        /// Type code read from the file.
        code: i32,
    },
    /// Processing was requested without reordering, so reordering was forced.
    ForcedReorder,
}

impl fmt::Display for SwcWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyntheticRoot { id, original } => {
                write!(f, "node {id}: root of type {original} is not a soma, using a synthetic root")
            }
            Self::RootCoercedToSoma { id, original } => {
                write!(f, "node {id}: root of type {original} retagged as soma")
            }
            Self::RadiusInherited {
                id,
                original,
                repaired,
            } => write!(f, "node {id}: radius {original} too small, using {repaired}"),
            Self::RadiusSignFlipped { id, original } => {
                write!(f, "node {id}: negative radius {original}")
            }
            Self::UnknownType { id, code } => write!(f, "node {id}: unknown type {code}"),
            Self::ForcedReorder => write!(f, "processing requires reordering, reordered anyway"),
        }
    }
}

/// Parsed skeleton: nodes in storage order plus the opaque preamble.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonRecord {
    /// Nodes in storage order.
    pub nodes: Vec<SkeletonNode>,
    /// Non-node lines in file order, without line terminators.
    pub preamble: Vec<String>,
    /// Recoverable problems found so far.
    pub warnings: Vec<SwcWarning>,
}

impl SkeletonRecord {
    /// Create a record from nodes with no preamble.
    #[must_use]
    pub const fn from_nodes(nodes: Vec<SkeletonNode>) -> Self {
        Self {
            nodes,
            preamble: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if there are no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Storage indices of root nodes, in storage order.
    #[must_use]
    pub fn roots(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_root())
            .map(|(i, _)| i)
            .collect()
    }

    /// Children of every node, each list in ascending storage order.
    #[must_use]
    pub fn children(&self) -> Vec<Vec<usize>> {
        let mut children = vec![Vec::new(); self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(p) = node.parent {
                if let Some(list) = children.get_mut(p) {
                    list.push(i);
                }
            }
        }
        children
    }

    /// Number of children of every node.
    #[must_use]
    pub fn child_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for node in &self.nodes {
            if let Some(p) = node.parent {
                if let Some(c) = counts.get_mut(p) {
                    *c += 1;
                }
            }
        }
        counts
    }

    /// First node is a root and every parent precedes its child.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.nodes.first().is_some_and(SkeletonNode::is_root)
            && self
                .nodes
                .iter()
                .enumerate()
                .all(|(i, n)| n.parent.is_none_or(|p| p < i))
    }

    /// Node positions in storage order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Node radii in storage order.
    #[must_use]
    pub fn radii(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.radius).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SkeletonRecord {
        SkeletonRecord::from_nodes(vec![
            SkeletonNode::new(Point3::origin(), 1.0, NodeType::Soma, None),
            SkeletonNode::new(Point3::new(1.0, 0.0, 0.0), 0.5, NodeType::Axon, Some(0)),
            SkeletonNode::new(Point3::new(0.0, 1.0, 0.0), 0.5, NodeType::Axon, Some(0)),
            SkeletonNode::new(Point3::new(2.0, 0.0, 0.0), 0.5, NodeType::Axon, Some(1)),
        ])
    }

    #[test]
    fn type_codes_round_trip() {
        for code in -3..10 {
            assert_eq!(NodeType::from_code(code).code(), code);
        }
        assert!(NodeType::Soma.is_root_like());
        assert!(NodeType::SyntheticRoot.is_root_like());
        assert!(!NodeType::Axon.is_root_like());
    }

    #[test]
    fn children_and_roots() {
        let record = chain();
        assert_eq!(record.roots(), vec![0]);
        assert_eq!(record.children()[0], vec![1, 2]);
        assert_eq!(record.child_counts(), vec![2, 1, 0, 0]);
        assert!(record.is_ordered());
    }

    #[test]
    fn out_of_order_detected() {
        let mut record = chain();
        record.nodes.swap(1, 3);
        record.nodes[1].parent = Some(3);
        record.nodes[3].parent = Some(0);
        assert!(!record.is_ordered());
    }
}
