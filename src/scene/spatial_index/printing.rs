use crate::util::Stats;

use super::{NodeContent, NodeIdx, SpatialIndex};

/// Shape of a built spatial index.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexStatistics {
    /// Depth of leaves, the root has depth 1
    pub depth: Stats,
    /// Item references per leaf
    pub leaf_fill: Stats,
    /// Non-empty octants per branch
    pub branch_children: Stats,
}

impl SpatialIndex {
    pub fn statistics(&self) -> IndexStatistics {
        let mut stats = IndexStatistics {
            depth: Stats::default(),
            leaf_fill: Stats::default(),
            branch_children: Stats::default(),
        };
        self.statistics_recursive(self.root, 1, &mut stats);
        stats
    }

    pub fn log_statistics(&self) {
        let stats = self.statistics();
        log::info!("Spatial index nodes: {}", self.nodes.len());
        log::info!("Leaf depth: {}", stats.depth);
        log::info!("Leaf fill: {}", stats.leaf_fill);
        log::info!("Branch child count: {}", stats.branch_children);
    }

    /// Dumps the tree structure to the trace log.
    pub fn print_tree(&self) {
        self.print_recursive(0, self.root);
    }

    fn statistics_recursive(&self, node: NodeIdx, depth: usize, stats: &mut IndexStatistics) {
        match self.nodes[node].content {
            NodeContent::Branch { children } => {
                let children = children.iter().flatten();
                stats.branch_children.add_sample(children.clone().count());
                for child in children {
                    self.statistics_recursive(*child, depth + 1, stats);
                }
            }
            NodeContent::Leaf { count, .. } => {
                stats.depth.add_sample(depth);
                stats.leaf_fill.add_sample(count);
            }
        }
    }

    fn print_recursive(&self, indent: usize, node: NodeIdx) {
        let Self { nodes, .. } = self;
        let bound = &nodes[node].bound;

        match nodes[node].content {
            NodeContent::Branch { children } => {
                log::trace!(
                    "{}- B{}: {:?}-{:?}",
                    "  ".repeat(indent),
                    node.index(),
                    bound.min,
                    bound.max
                );
                for child in children.iter().flatten() {
                    self.print_recursive(indent + 1, *child);
                }
            }
            NodeContent::Leaf { first, count } => {
                log::trace!(
                    "{}- L{}: {:?}-{:?}, items {:?}",
                    "  ".repeat(indent),
                    node.index(),
                    bound.min,
                    bound.max,
                    self.leaf_items(first, count)
                );
            }
        }
    }
}
