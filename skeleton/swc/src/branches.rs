//! Branch decomposition.

use crate::node::SkeletonRecord;

/// Branch membership of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchLabel {
    /// Soma, synthetic root, or a node with more than one child.
    Junction,
    /// Member of the branch with this id (ids start at 1).
    Branch(usize),
}

impl BranchLabel {
    /// Signed form: branch id, or -1 for junctions.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn signed(self) -> i64 {
        match self {
            Self::Junction => -1,
            Self::Branch(id) => id as i64,
        }
    }
}

/// Classification of every node into branches and junctions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchMap {
    labels: Vec<BranchLabel>,
    branches: Vec<Vec<usize>>,
    // first child of each branch's last member
    tails: Vec<Option<usize>>,
}

impl BranchMap {
    /// Decompose `record` into maximal single-child chains between
    /// junctions.
    ///
    /// Nodes are visited in storage order; each unlabelled non-junction
    /// node starts a new branch that follows the only-child chain until it
    /// reaches a leaf or a junction.
    #[must_use]
    pub fn build(record: &SkeletonRecord) -> Self {
        let children = record.children();
        let junction: Vec<bool> = record
            .nodes
            .iter()
            .zip(&children)
            .map(|(n, c)| n.node_type.is_root_like() || c.len() > 1)
            .collect();

        let mut labels: Vec<Option<BranchLabel>> = vec![None; record.len()];
        let mut branches = Vec::new();
        let mut tails = Vec::new();
        for i in 0..record.len() {
            if junction[i] {
                labels[i] = Some(BranchLabel::Junction);
                continue;
            }
            if labels[i].is_some() {
                continue;
            }

            let id = branches.len() + 1;
            let mut members = Vec::new();
            let mut j = i;
            loop {
                labels[j] = Some(BranchLabel::Branch(id));
                members.push(j);
                match children[j].as_slice() {
                    [next] if !junction[*next] && labels[*next].is_none() => j = *next,
                    _ => break,
                }
            }
            tails.push(children[j].first().copied());
            branches.push(members);
        }

        Self {
            labels: labels
                .into_iter()
                .map(|l| l.unwrap_or(BranchLabel::Junction))
                .collect(),
            branches,
            tails,
        }
    }

    /// Label of every node.
    #[must_use]
    pub fn labels(&self) -> &[BranchLabel] {
        &self.labels
    }

    /// Label of node `i`.
    #[must_use]
    pub fn label(&self, i: usize) -> Option<BranchLabel> {
        self.labels.get(i).copied()
    }

    /// Number of branches.
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Branch ids, `1..=branch_count`.
    pub fn ids(&self) -> impl Iterator<Item = usize> {
        1..=self.branches.len()
    }

    /// Members of branch `id` along the chain, parent side first.
    #[must_use]
    pub fn members(&self, id: usize) -> Option<&[usize]> {
        id.checked_sub(1)
            .and_then(|k| self.branches.get(k))
            .map(Vec::as_slice)
    }

    /// Members of branch `id` with spline context: the parent of the first
    /// member in front and the first child of the last member behind,
    /// when they exist.
    #[must_use]
    pub fn extended_members(&self, id: usize, record: &SkeletonRecord) -> Option<Vec<usize>> {
        let members = self.members(id)?;
        let first = *members.first()?;
        let tail = self.tails.get(id - 1).copied().flatten();

        let mut nodes = Vec::with_capacity(members.len() + 2);
        nodes.extend(record.nodes.get(first).and_then(|n| n.parent));
        nodes.extend_from_slice(members);
        nodes.extend(tail);
        Some(nodes)
    }
}
