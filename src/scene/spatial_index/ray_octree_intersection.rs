use std::cmp::Reverse;

use arrayvec::ArrayVec;
use assert2::debug_assert;
use index_vec::IndexSlice;
use ordered_float::OrderedFloat;

use super::{NodeContent, NodeIdx, OCTANTS, SpatialIndex};
use crate::{
    geometry::{FloatType, Ray, RayIntersectionExt as _, TOLERANCE},
    scene::{Intersection, Object, TriangleIdx},
};

/// Traversal stack, kept by each worker between queries to avoid reallocations.
#[derive(Clone, Debug, Default)]
#[repr(transparent)]
pub struct StackCache {
    stack: Vec<(NodeIdx, FloatType)>,
}

impl SpatialIndex {
    /// Finds the nearest item hit by the ray, ignoring `exclude`.
    ///
    /// Cells are visited front to back: children of a branch are pushed in
    /// decreasing order of their entry distance, and any cell entered further
    /// away than the best hit found so far is skipped.
    pub fn intersection<O: Object>(
        &self,
        items: &IndexSlice<TriangleIdx, [O]>,
        ray: &Ray,
        exclude: Option<TriangleIdx>,
        stack: &mut StackCache,
    ) -> Option<Intersection> {
        debug_assert!(stack.stack.is_empty());

        if let Some(t1) = cell_entry(self, self.root, ray, FloatType::INFINITY) {
            stack.stack.push((self.root, t1));
        }

        let mut best: Option<(TriangleIdx, FloatType)> = None;
        let mut best_t = FloatType::INFINITY;

        while let Some((node_index, node_t1)) = stack.stack.pop() {
            if node_t1 > best_t {
                // The cell starts further away than the best hit found so far,
                // it can't do any good any more.
                continue;
            }

            match self.nodes[node_index].content {
                NodeContent::Branch { children } => {
                    let mut entered: ArrayVec<(FloatType, NodeIdx), OCTANTS> = children
                        .iter()
                        .flatten()
                        .filter_map(|&child| {
                            cell_entry(self, child, ray, best_t).map(|t1| (t1, child))
                        })
                        .collect();
                    // Nearest child ends up on top of the stack
                    entered.sort_unstable_by_key(|(t1, _)| Reverse(OrderedFloat(*t1)));
                    stack
                        .stack
                        .extend(entered.into_iter().map(|(t1, child)| (child, t1)));
                }
                NodeContent::Leaf { first, count } => {
                    for &item_index in self.leaf_items(first, count) {
                        if Some(item_index) == exclude {
                            continue;
                        }
                        if let Some(t) = items[item_index].intersect(ray) {
                            if t < best_t {
                                best_t = t;
                                best = Some((item_index, t));
                            }
                        }
                    }
                }
            }
        }

        best.map(|(triangle, distance)| Intersection {
            triangle,
            distance,
            location: ray.point_at(distance),
        })
    }
}

/// Distance along the ray where it enters the cell, clamped to start at the ray origin.
/// None if the ray misses the cell, or enters it beyond `max_t`.
/// Cells are padded by TOLERANCE so that hits on shared faces are not lost to round-off.
fn cell_entry(
    index: &SpatialIndex,
    node_index: NodeIdx,
    ray: &Ray,
    max_t: FloatType,
) -> Option<FloatType> {
    let (t1, t2) = index.nodes[node_index]
        .bound
        .padded(TOLERANCE)
        .intersect(ray);
    let t1 = t1.max(0.0);
    let t2 = t2.min(max_t);

    if t1 <= t2 { Some(t1) } else { None }
}
