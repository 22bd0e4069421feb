//! Node arena with stable handles for structural edits.
//!
//! Nodes never move once placed in the arena. Storage order is a singly
//! linked list threaded through the slots, so splicing nodes in or out at
//! a cursor is constant time. [`NodeArena::into_nodes`] compacts the live
//! nodes and remaps every parent link in one pass.

use crate::node::SkeletonNode;

/// Stable node handle.
pub(crate) type Handle = usize;

#[derive(Debug)]
struct Slot {
    node: SkeletonNode,
    children: Vec<Handle>,
    next: Option<Handle>,
    live: bool,
}

#[derive(Debug)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    head: Option<Handle>,
}

impl NodeArena {
    /// Arena holding `nodes` in their current storage order.
    pub(crate) fn new(nodes: &[SkeletonNode]) -> Self {
        let n = nodes.len();
        let mut slots: Vec<Slot> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| Slot {
                node: node.clone(),
                children: Vec::new(),
                next: (i + 1 < n).then_some(i + 1),
                live: true,
            })
            .collect();
        for (i, node) in nodes.iter().enumerate() {
            if let Some(p) = node.parent {
                slots[p].children.push(i);
            }
        }
        Self {
            slots,
            head: (n > 0).then_some(0),
        }
    }

    pub(crate) const fn head(&self) -> Option<Handle> {
        self.head
    }

    pub(crate) fn next(&self, h: Handle) -> Option<Handle> {
        self.slots[h].next
    }

    pub(crate) fn node(&self, h: Handle) -> &SkeletonNode {
        &self.slots[h].node
    }

    pub(crate) fn node_mut(&mut self, h: Handle) -> &mut SkeletonNode {
        &mut self.slots[h].node
    }

    pub(crate) fn child_count(&self, h: Handle) -> usize {
        self.slots[h].children.len()
    }

    fn link_after(&mut self, prev: Option<Handle>, h: Option<Handle>) {
        match prev {
            Some(p) => self.slots[p].next = h,
            None => self.head = h,
        }
    }

    /// Put `chain` on the edge between `child` and its parent, in order
    /// from the parent side. The new nodes go right before `child` in
    /// storage order; `prev` is the handle currently linked before it.
    pub(crate) fn insert_before(
        &mut self,
        prev: Option<Handle>,
        child: Handle,
        chain: Vec<SkeletonNode>,
    ) {
        if chain.is_empty() {
            return;
        }
        let mut parent = self.slots[child].node.parent;
        let first = self.slots.len();
        let last = first + chain.len() - 1;

        if let Some(p) = parent {
            for c in &mut self.slots[p].children {
                if *c == child {
                    *c = first;
                }
            }
        }
        for (offset, mut node) in chain.into_iter().enumerate() {
            let h = first + offset;
            node.parent = parent;
            let child_of_new = if h == last { child } else { h + 1 };
            self.slots.push(Slot {
                node,
                children: vec![child_of_new],
                next: Some(child_of_new),
                live: true,
            });
            parent = Some(h);
        }
        self.slots[child].node.parent = Some(last);
        self.link_after(prev, Some(first));
    }

    /// Remove `h`, handing its children to its parent. Returns the handle
    /// that followed `h` in storage order.
    pub(crate) fn remove_into_parent(&mut self, prev: Option<Handle>, h: Handle) -> Option<Handle> {
        let next = self.slots[h].next;
        let parent = self.slots[h].node.parent;
        let children = std::mem::take(&mut self.slots[h].children);

        for &c in &children {
            self.slots[c].node.parent = parent;
        }
        if let Some(p) = parent {
            let siblings = &mut self.slots[p].children;
            siblings.retain(|&c| c != h);
            siblings.extend(children);
        }

        let slot = &mut self.slots[h];
        slot.live = false;
        slot.next = None;
        self.link_after(prev, next);
        next
    }

    /// Live nodes in storage order with parent links remapped.
    pub(crate) fn into_nodes(self) -> Vec<SkeletonNode> {
        let mut index = vec![usize::MAX; self.slots.len()];
        let mut order = Vec::new();
        let mut cursor = self.head;
        while let Some(h) = cursor {
            index[h] = order.len();
            order.push(h);
            cursor = self.slots[h].next;
        }

        let mut slots: Vec<Option<Slot>> = self.slots.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|h| slots[h].take())
            .filter(|slot| slot.live)
            .map(|slot| {
                let mut node = slot.node;
                node.parent = node.parent.map(|p| index[p]);
                node
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;
    use mesh_types::Point3;

    fn line(n: usize) -> Vec<SkeletonNode> {
        (0..n)
            .map(|i| {
                SkeletonNode::new(
                    Point3::new(0.0, 0.0, i as f64),
                    1.0,
                    if i == 0 { NodeType::Soma } else { NodeType::Axon },
                    i.checked_sub(1),
                )
            })
            .collect()
    }

    fn at(z: f64) -> SkeletonNode {
        SkeletonNode::new(Point3::new(0.0, 0.0, z), 1.0, NodeType::Axon, None)
    }

    #[test]
    fn untouched_round_trip() {
        let nodes = line(4);
        assert_eq!(NodeArena::new(&nodes).into_nodes(), nodes);
    }

    #[test]
    fn insert_relinks_parents() {
        let mut arena = NodeArena::new(&line(3));
        arena.insert_before(Some(1), 2, vec![at(1.25), at(1.5), at(1.75)]);
        assert_eq!(arena.child_count(1), 1);

        let nodes = arena.into_nodes();
        let z: Vec<f64> = nodes.iter().map(|n| n.position.z).collect();
        assert_eq!(z, vec![0.0, 1.0, 1.25, 1.5, 1.75, 2.0]);
        let parents: Vec<Option<usize>> = nodes.iter().map(|n| n.parent).collect();
        assert_eq!(
            parents,
            vec![None, Some(0), Some(1), Some(2), Some(3), Some(4)]
        );
    }

    #[test]
    fn remove_hands_children_to_parent() {
        let mut nodes = line(3);
        nodes.push(SkeletonNode::new(
            Point3::new(1.0, 0.0, 1.0),
            1.0,
            NodeType::Axon,
            Some(1),
        ));
        let mut arena = NodeArena::new(&nodes);
        let next = arena.remove_into_parent(Some(0), 1);
        assert_eq!(next, Some(2));
        assert_eq!(arena.child_count(0), 2);

        let nodes = arena.into_nodes();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].parent, Some(0));
        assert_eq!(nodes[2].parent, Some(0));
    }

    #[test]
    fn remove_head() {
        let mut arena = NodeArena::new(&line(2));
        arena.remove_into_parent(None, 0);
        assert_eq!(arena.head(), Some(1));
        let nodes = arena.into_nodes();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].parent.is_none());
    }
}
