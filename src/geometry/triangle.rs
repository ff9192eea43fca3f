use std::ops::Index;

use rand::Rng;

use super::{EPSILON, FloatType, TOLERANCE, WorldBox, WorldPoint, WorldVector};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item = &'a Point> {
        self.0.iter()
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Triangle<WorldPoint> {
    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [WorldVector; 2] {
        [self[1] - self[0], self[2] - self[0]]
    }

    /// Returns a normal vector of the triangle, not normalized.
    /// Its length is twice the triangle area.
    pub fn normal_unnormalized(&self) -> WorldVector {
        (self[1] - self[0]).cross(&(self[2] - self[1]))
    }

    /// Unit normal, zero for degenerate triangles.
    pub fn normal(&self) -> WorldVector {
        self.normal_unnormalized()
            .try_normalize(0.0)
            .unwrap_or_else(WorldVector::zeros)
    }

    /// Unit vector along the first edge, zero if the edge is degenerate.
    pub fn tangent(&self) -> WorldVector {
        (self[1] - self[0])
            .try_normalize(0.0)
            .unwrap_or_else(WorldVector::zeros)
    }

    pub fn area(&self) -> FloatType {
        0.5 * self.normal_unnormalized().norm()
    }

    /// Axis aligned bounds of the vertices, padded outwards so that
    /// single precision round-off cannot drop axis aligned triangles
    /// out of the spatial index cells.
    pub fn bound(&self) -> WorldBox {
        let padding = |x: FloatType| (x.abs() * EPSILON).max(0.0) + TOLERANCE;

        let mut ret = WorldBox::new(
            WorldPoint::from(WorldVector::repeat(FloatType::INFINITY)),
            WorldPoint::from(WorldVector::repeat(FloatType::NEG_INFINITY)),
        );
        for vertex in self.iter() {
            for axis in 0..3 {
                let x = vertex[axis];
                ret.min[axis] = ret.min[axis].min(x - padding(x));
                ret.max[axis] = ret.max[axis].max(x + padding(x));
            }
        }
        ret
    }

    /// Uniformly distributed random point on the triangle.
    pub fn sample_point(&self, rng: &mut impl Rng) -> WorldPoint {
        let sqrt_r1 = rng.random::<FloatType>().sqrt();
        let r2 = rng.random::<FloatType>();

        let c0 = 1.0 - sqrt_r1;
        let c1 = (1.0 - r2) * sqrt_r1;

        let [e1, e2] = self.edges();
        self[0] + e1 * c0 + e2 * c1
    }
}
