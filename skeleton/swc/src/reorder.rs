//! Parent-before-child reordering.

use tracing::info;

use crate::error::{SwcError, SwcResult};
use crate::node::SkeletonRecord;

/// Depth-first storage order: every root in storage order, each followed
/// by its subtree with children visited in ascending index order.
///
/// Returns `order` with `order[new] = old`.
///
/// # Errors
///
/// Returns [`SwcError::NoRoot`] for an empty or rootless skeleton and
/// [`SwcError::Cycle`] when some nodes are unreachable from every root.
pub fn depth_first_order(record: &SkeletonRecord) -> SwcResult<Vec<usize>> {
    let roots = record.roots();
    if roots.is_empty() {
        return Err(SwcError::NoRoot);
    }

    let children = record.children();
    let mut order = Vec::with_capacity(record.len());
    let mut visited = vec![false; record.len()];
    let mut stack = Vec::new();

    for root in roots {
        stack.push(root);
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            order.push(node);
            stack.extend(children[node].iter().rev().copied());
        }
    }

    if let Some(index) = visited.iter().position(|v| !v) {
        return Err(SwcError::Cycle { index });
    }
    Ok(order)
}

/// Reorder `record` so that parents precede children.
///
/// Already-ordered records are left untouched. Returns whether the order
/// changed.
///
/// # Errors
///
/// As [`depth_first_order`].
pub fn reorder(record: &mut SkeletonRecord) -> SwcResult<bool> {
    if record.is_ordered() {
        return Ok(false);
    }

    info!(nodes = record.len(), "reordering skeleton");
    let order = depth_first_order(record)?;
    let mut new_index = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        new_index[old] = new;
    }

    let mut nodes = Vec::with_capacity(order.len());
    for &old in &order {
        let mut node = record.nodes[old].clone();
        node.parent = node.parent.map(|p| new_index[p]);
        nodes.push(node);
    }
    record.nodes = nodes;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeType, SkeletonNode};
    use mesh_types::Point3;

    fn node(z: f64, parent: Option<usize>) -> SkeletonNode {
        let ty = if parent.is_none() {
            NodeType::Soma
        } else {
            NodeType::Axon
        };
        SkeletonNode::new(Point3::new(0.0, 0.0, z), 1.0, ty, parent)
    }

    #[test]
    fn ordered_record_is_untouched() {
        let mut record =
            SkeletonRecord::from_nodes(vec![node(0.0, None), node(1.0, Some(0))]);
        let before = record.clone();
        assert!(!reorder(&mut record).unwrap());
        assert_eq!(record, before);
    }

    #[test]
    fn children_follow_parents() {
        // 0: child of 2, 1: root, 2: child of 1, 3: root, 4: child of 3
        let mut record = SkeletonRecord::from_nodes(vec![
            node(2.0, Some(2)),
            node(0.0, None),
            node(1.0, Some(1)),
            node(10.0, None),
            node(11.0, Some(3)),
        ]);
        assert!(reorder(&mut record).unwrap());
        assert!(record.is_ordered());

        let z: Vec<f64> = record.nodes.iter().map(|n| n.position.z).collect();
        assert_eq!(z, vec![0.0, 1.0, 2.0, 10.0, 11.0]);
        assert_eq!(record.nodes[2].parent, Some(1));
        assert_eq!(record.nodes[4].parent, Some(3));
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 200_000;
        let mut nodes: Vec<SkeletonNode> = (0..n)
            .map(|i| node(f64::from(i), Some(i as usize + 1)))
            .collect();
        nodes[n as usize - 1].parent = None;
        nodes[n as usize - 1].node_type = NodeType::Soma;
        let mut record = SkeletonRecord::from_nodes(nodes);

        assert!(reorder(&mut record).unwrap());
        assert!(record.is_ordered());
        assert_eq!(record.nodes[1].parent, Some(0));
    }

    #[test]
    fn rootless_and_cyclic() {
        let mut rootless =
            SkeletonRecord::from_nodes(vec![node(0.0, Some(1)), node(1.0, Some(0))]);
        assert!(matches!(reorder(&mut rootless), Err(SwcError::NoRoot)));

        let mut cyclic = SkeletonRecord::from_nodes(vec![
            node(0.0, Some(2)),
            node(1.0, None),
            node(2.0, Some(0)),
        ]);
        assert!(matches!(
            reorder(&mut cyclic),
            Err(SwcError::Cycle { index: 0 })
        ));
        assert!(matches!(
            reorder(&mut SkeletonRecord::default()),
            Err(SwcError::NoRoot)
        ));
    }
}
