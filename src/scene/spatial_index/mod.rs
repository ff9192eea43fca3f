//! Octree over scene triangles.
//!
//! Axis aligned and cubical, the root contains the bounds of all items and the eye position.
//! Octants are numbered by bits: bit 0 set means the upper half along x,
//! bit 1 upper half along y, bit 2 upper half along z.
//! ```text
//!       110---111
//!      /|    /|
//!    010---011 |
//!    | 100-|-101
//!    |/    | /
//!    000---001
//! ```
//! Items are copied into every octant their (padded) bound overlaps, so
//! one triangle may sit in several leaves.

mod building;
mod printing;
mod ray_octree_intersection;

use index_vec::IndexVec;

use crate::geometry::WorldBox;

use super::TriangleIdx;

pub use printing::IndexStatistics;
pub use ray_octree_intersection::StackCache;

/// Maximum depth of the tree, enough for a scene including the sun and earth, down to cm cells.
pub const MAX_LEVELS: usize = 44;

/// Nodes with more items than this get subdivided.
pub const MAX_ITEMS: usize = 8;

/// Average number of leaf references plus nodes per item the tree may grow to.
pub const MAX_REFERENCES_PER_ITEM: usize = 64;

const OCTANTS: usize = 8;

#[derive(Clone, Debug)]
pub struct SpatialIndex {
    root: NodeIdx,
    nodes: IndexVec<NodeIdx, Node>,
    /// Item lists of all leaves, referenced by `NodeContent::Leaf`
    leaf_items: Vec<TriangleIdx>,
}

#[derive(Clone, Debug)]
struct Node {
    bound: WorldBox,
    content: NodeContent,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum NodeContent {
    /// Empty octants have no child node.
    Branch { children: [Option<NodeIdx>; OCTANTS] },
    Leaf { first: usize, count: usize },
}

index_vec::define_index_type! {
    struct NodeIdx = u32;
}

impl SpatialIndex {
    /// Bound of the root cell.
    pub fn bound(&self) -> &WorldBox {
        &self.nodes[self.root].bound
    }

    fn leaf_items(&self, first: usize, count: usize) -> &[TriangleIdx] {
        &self.leaf_items[first..first + count]
    }
}
