use std::ops::Sub;

use nalgebra::{Point2, Scalar};

use super::{FloatType, WorldBox, WorldPoint};

/// Axis aligned box, `min` is inclusive.
/// World boxes are closed on both ends, screen boxes exclude `max`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl<T: Scalar + Copy + Sub> AABB<Point2<T>> {
    pub fn width(&self) -> T::Output {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> T::Output {
        self.max[1] - self.min[1]
    }
}

impl WorldBox {
    pub fn union(&self, other: &WorldBox) -> WorldBox {
        WorldBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns true if the two closed boxes share at least one point.
    pub fn overlaps(&self, other: &WorldBox) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    /// Returns true if the point is inside the box, allowing `tolerance` outside of each face.
    pub fn contains_point(&self, point: &WorldPoint, tolerance: FloatType) -> bool {
        (0..3).all(|i| self.min[i] - point[i] <= tolerance && point[i] - self.max[i] <= tolerance)
    }

    /// Grows the box by `amount` in every direction.
    pub fn padded(&self, amount: FloatType) -> WorldBox {
        let padding = super::WorldVector::repeat(amount);
        WorldBox {
            min: self.min - padding,
            max: self.max + padding,
        }
    }

    pub fn center(&self) -> WorldPoint {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extends the max corner so that all three edges are as long as the longest one.
    pub fn to_cube(&self) -> WorldBox {
        let edge = self.size().max();
        WorldBox {
            min: self.min,
            max: self.max.sup(&(self.min + super::WorldVector::repeat(edge))),
        }
    }

    /// One of the eight boxes that split this box at its center.
    /// Bit `i` of `octant` selects the upper half along axis `i`.
    pub fn octant(&self, octant: usize) -> WorldBox {
        debug_assert!(octant < 8);
        let center = self.center();
        let mut ret = self.clone();
        for axis in 0..3 {
            if (octant >> axis) & 1 != 0 {
                ret.min[axis] = center[axis];
            } else {
                ret.max[axis] = center[axis];
            }
        }
        ret
    }
}
