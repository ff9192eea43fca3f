use index_vec::{IndexSlice, IndexVec};

use crate::{
    geometry::{TOLERANCE, WorldBox, WorldPoint},
    scene::{Object, TriangleIdx},
};

use super::{
    MAX_ITEMS, MAX_LEVELS, MAX_REFERENCES_PER_ITEM, Node, NodeContent, NodeIdx, OCTANTS,
    SpatialIndex,
};

impl SpatialIndex {
    /// Builds the octree over all items.
    /// The root cell is a cube that also contains the eye position, so that
    /// camera rays always start inside it.
    pub fn build<O: Object>(
        eye_position: &WorldPoint,
        items: &IndexSlice<TriangleIdx, [O]>,
    ) -> SpatialIndex {
        let item_bounds: Vec<(TriangleIdx, WorldBox)> = items
            .iter_enumerated()
            .map(|(i, item)| (i, item.get_bounding_box()))
            .collect();

        let bound = item_bounds
            .iter()
            .fold(WorldBox::new(*eye_position, *eye_position), |acc, (_, b)| {
                acc.union(b)
            })
            .to_cube();

        let mut index = SpatialIndex {
            root: NodeIdx::new(0),
            nodes: IndexVec::new(),
            leaf_items: Vec::new(),
        };
        let budget = reference_budget(items.len());
        index.root = index.build_recursive(bound, &item_bounds, 0, budget);

        log::debug!(
            "Built spatial index with {} nodes, {} leaf item references for {} items",
            index.nodes.len(),
            index.leaf_items.len(),
            items.len()
        );

        index
    }

    fn build_recursive(
        &mut self,
        bound: WorldBox,
        items: &[(TriangleIdx, WorldBox)],
        level: usize,
        budget: usize,
    ) -> NodeIdx {
        let within_budget = self.nodes.len() + self.leaf_items.len() < budget;
        if items.len() > MAX_ITEMS && level < MAX_LEVELS - 1 && within_budget {
            self.build_branch(bound, items, level, budget)
        } else {
            self.build_leaf(bound, items)
        }
    }

    fn build_branch(
        &mut self,
        bound: WorldBox,
        items: &[(TriangleIdx, WorldBox)],
        level: usize,
        budget: usize,
    ) -> NodeIdx {
        // Create placeholder node that will be overwriten later
        let node_index = self.nodes.push(Node {
            bound: bound.clone(),
            content: NodeContent::Branch {
                children: [None; OCTANTS],
            },
        });

        let mut children = [None; OCTANTS];
        let mut full_copies = 0;
        for (octant, child) in children.iter_mut().enumerate() {
            let child_bound = bound.octant(octant);
            let child_items: Vec<_> = items
                .iter()
                .filter(|(_, item_bound)| item_bound.overlaps(&child_bound))
                .cloned()
                .collect();

            if child_items.is_empty() {
                continue;
            }

            // Curtail degenerate subdivision: two or more octants copying the whole
            // parent, or cells below the resolution, end in a leaf right away
            if child_items.len() == items.len() {
                full_copies += 1;
            }
            let too_small = child_bound.size().x < TOLERANCE * 4.0;
            let child_level = if full_copies > 1 || too_small {
                MAX_LEVELS
            } else {
                level + 1
            };

            *child = Some(self.build_recursive(child_bound, &child_items, child_level, budget));
        }

        self.nodes[node_index].content = NodeContent::Branch { children };
        node_index
    }

    fn build_leaf(&mut self, bound: WorldBox, items: &[(TriangleIdx, WorldBox)]) -> NodeIdx {
        let first = self.leaf_items.len();
        self.leaf_items.extend(items.iter().map(|(i, _)| *i));

        self.nodes.push(Node {
            bound,
            content: NodeContent::Leaf {
                first,
                count: items.len(),
            },
        })
    }
}

/// Limit of nodes plus leaf item references, above which no more branches are split.
fn reference_budget(item_count: usize) -> usize {
    MAX_REFERENCES_PER_ITEM * item_count.max(MAX_ITEMS)
}
