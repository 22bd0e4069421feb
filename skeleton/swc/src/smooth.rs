//! Skeleton smoothing and interpolation.
//!
//! Both passes walk the nodes once in storage order with a cursor into a
//! [`NodeArena`], merging nodes into their parents or inserting nodes on
//! the edge to the parent. Inserted nodes are spaced linearly in position
//! and geometrically in radius. Soma nodes are never touched.
//!
//! Both passes expect a record whose parents precede their children.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use mesh_types::Point3;
use tracing::{debug, warn};

use crate::arena::{Handle, NodeArena};
use crate::node::{NodeType, SkeletonNode, SkeletonRecord};

/// Largest number of nodes the smoother inserts on one edge.
const MAX_SMOOTH_INSERT: usize = 3;

/// Largest number of nodes the interpolator inserts on one edge.
const MAX_INTERP_INSERT: usize = 10_000;

/// Parent-child distance below which nodes are always merged.
const COINCIDENT: f64 = 1e-5;

/// Radius ratio above which an edge counts as a sharp transition.
const RADIUS_RATIO: f64 = 2.0;

/// Node accounting for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothReport {
    /// Nodes merged into their parents.
    pub merged: usize,
    /// Nodes inserted.
    pub inserted: usize,
}

impl SmoothReport {
    /// Node count after a pass that started with `initial` nodes.
    #[must_use]
    pub const fn final_count(&self, initial: usize) -> usize {
        initial + self.inserted - self.merged
    }
}

enum Edit {
    Advance,
    Merge,
    Insert(usize),
}

/// `count` nodes evenly spaced from `parent` towards `child`.
fn interpolated(parent: &SkeletonNode, child: &SkeletonNode, count: usize) -> Vec<SkeletonNode> {
    let (q, p) = (parent.position.coords, child.position.coords);
    let (big_r, r) = (parent.radius, child.radius);
    (0..count)
        .map(|j| {
            let l = (j + 1) as f64 / (count + 1) as f64;
            SkeletonNode::new(
                Point3::from(q * (1.0 - l) + p * l),
                big_r.powf(1.0 - l) * r.powf(l),
                child.node_type,
                None,
            )
        })
        .collect()
}

/// `floor(x)` as a count in `0..=cap`; NaN counts as zero.
fn clamped_count(x: f64, cap: usize) -> usize {
    if x >= cap as f64 {
        cap
    } else if x >= 0.0 {
        x.floor() as usize
    } else {
        0
    }
}

fn usable(delta: f64) -> bool {
    delta.is_finite() && delta > 0.0
}

fn radius_ratio(a: f64, b: f64) -> f64 {
    (a / b).max(b / a)
}

fn smoothing_edit(arena: &NodeArena, h: Handle, delta: f64) -> Edit {
    let node = arena.node(h);
    let Some(p) = node.parent else {
        return Edit::Advance;
    };
    let parent = arena.node(p);
    if node.node_type == NodeType::Soma || parent.node_type == NodeType::Soma {
        return Edit::Advance;
    }

    let d = (node.position - parent.position).norm();
    let ratio = radius_ratio(node.radius, parent.radius);
    let sharp = ratio > RADIUS_RATIO;
    let only_child = arena.child_count(p) == 1;

    if d < delta && arena.child_count(h) == 1 && only_child && !sharp {
        Edit::Merge
    } else if sharp {
        Edit::Insert(clamped_count(ratio, MAX_SMOOTH_INSERT))
    } else if d > 2.0 * delta {
        Edit::Insert(clamped_count(d / delta - 1.0, MAX_SMOOTH_INSERT))
    } else if d < COINCIDENT {
        Edit::Merge
    } else {
        Edit::Advance
    }
}

fn interpolation_edit(arena: &NodeArena, h: Handle, delta: f64) -> Edit {
    let node = arena.node(h);
    let Some(p) = node.parent else {
        return Edit::Advance;
    };
    if node.node_type == NodeType::Soma {
        return Edit::Advance;
    }
    let parent = arena.node(p);

    let d = (node.position - parent.position).norm();
    let junctions = arena.child_count(h) > 1 && arena.child_count(p) > 1;
    if d >= delta || (junctions && d > 0.0) {
        Edit::Insert(clamped_count(d / delta - 1.0, MAX_INTERP_INSERT).max(1))
    } else {
        Edit::Advance
    }
}

/// Drive one pass, applying `decide` at each cursor position.
fn run_pass<F>(record: &mut SkeletonRecord, decide: F) -> SmoothReport
where
    F: Fn(&NodeArena, Handle) -> Edit,
{
    let mut arena = NodeArena::new(&record.nodes);
    let mut report = SmoothReport::default();
    let mut prev = None;
    let mut cursor = arena.head();

    while let Some(h) = cursor {
        match decide(&arena, h) {
            Edit::Advance => {
                prev = Some(h);
                cursor = arena.next(h);
            }
            Edit::Merge => {
                let Some(p) = arena.node(h).parent else {
                    prev = Some(h);
                    cursor = arena.next(h);
                    continue;
                };
                let (position, radius) = {
                    let (node, parent) = (arena.node(h), arena.node(p));
                    (
                        nalgebra::center(&node.position, &parent.position),
                        (node.radius * parent.radius).sqrt(),
                    )
                };
                let parent = arena.node_mut(p);
                parent.position = position;
                parent.radius = radius;
                cursor = arena.remove_into_parent(prev, h);
                report.merged += 1;
            }
            Edit::Insert(count) => {
                if let Some(p) = arena.node(h).parent {
                    let chain = interpolated(arena.node(p), arena.node(h), count);
                    arena.insert_before(prev, h, chain);
                    report.inserted += count;
                }
                prev = Some(h);
                cursor = arena.next(h);
            }
        }
    }

    record.nodes = arena.into_nodes();
    report
}

/// Merge closely spaced nodes and split long or sharply tapering edges.
///
/// With `delta` the smoothing distance Δ, a non-soma node whose parent is
/// not a soma is:
///
/// - merged into its parent (midpoint position, geometric-mean radius)
///   when closer than Δ, an only child with a single child, and within a
///   2:1 radius ratio;
/// - separated from its parent by up to 3 inserted nodes when the radius
///   ratio exceeds 2:1 or the distance exceeds 2Δ;
/// - merged when it nearly coincides with its parent.
///
/// A `delta` that is not positive and finite leaves the record untouched.
pub fn smooth(record: &mut SkeletonRecord, delta: f64) -> SmoothReport {
    if !usable(delta) {
        warn!(delta, "smoothing skipped, distance must be positive");
        return SmoothReport::default();
    }
    let report = run_pass(record, |arena, h| smoothing_edit(arena, h, delta));
    debug!(
        merged = report.merged,
        inserted = report.inserted,
        nodes = record.len(),
        "smoothed skeleton"
    );
    report
}

/// Insert nodes so that no non-soma edge is longer than `delta`.
///
/// An edge between two nodes that both have several children always gets
/// at least one node, so their junction spheres stay separate. At most
/// 10 000 nodes go on any one edge. A `delta` that is not positive and
/// finite leaves the record untouched.
pub fn interpolate(record: &mut SkeletonRecord, delta: f64) -> SmoothReport {
    if !usable(delta) {
        warn!(delta, "interpolation skipped, distance must be positive");
        return SmoothReport::default();
    }
    let report = run_pass(record, |arena, h| interpolation_edit(arena, h, delta));
    debug!(
        inserted = report.inserted,
        nodes = record.len(),
        "interpolated skeleton"
    );
    report
}
