mod aabb;
mod ray_box_intersection;
mod ray_triangle_intersection;
mod triangle;

pub use aabb::AABB;
pub use ray_box_intersection::RayIntersectionExt;
pub use triangle::Triangle;

use nalgebra::{Point2, Point3, Vector2, Vector3};

pub type FloatType = f32;

/// Fixed padding of bounding boxes, sized for 1 unit = 1 m with 1 mm resolution.
pub const TOLERANCE: FloatType = 1.0 / 1024.0;

/// Relative padding of bounding boxes, also the parallel ray threshold of triangle intersection.
pub const EPSILON: FloatType = 1.0 / 1048576.0;

pub type ScreenPoint = Point2<u32>;
pub type ScreenSize = Vector2<u32>;
pub type ScreenBlock = AABB<ScreenPoint>;

pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

/// Linear RGB triple used for radiance, reflectivity and emissivity.
pub type Colour = Vector3<FloatType>;

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: WorldVector,

    /// Componentwise inverse of the ray direction
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    pub inv_direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        let direction = direction.normalize();
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ray {
            origin,
            direction,
            inv_direction,
        }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use proptest::prelude::*;

    /// Helper macro that creates a wrapper arnound a type that implemetns Deref and Arbitary
    macro_rules! arbitrary_wrapper {
        ( $wrapper_name:ident ( $type:ty ) -> $block:block ) => {
            #[derive(Copy, Clone, Debug)]
            pub struct $wrapper_name(pub $type);

            impl std::ops::Deref for $wrapper_name {
                type Target = $type;
                fn deref(&self) -> &$type {
                    &self.0
                }
            }

            impl Arbitrary for $wrapper_name {
                type Parameters = ();
                type Strategy = proptest::strategy::BoxedStrategy<Self>;
                fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
                    $block.prop_map(|x| $wrapper_name(x)).boxed()
                }
            }
        };
    }

    /// Coordinates within a 20 m cube around the origin, quantized to 0.1 mm.
    fn scene_float() -> BoxedStrategy<FloatType> {
        (-100_000i32..=100_000i32)
            .prop_map(|n| n as FloatType * 1e-4)
            .boxed()
    }

    fn world_point() -> BoxedStrategy<WorldPoint> {
        (scene_float(), scene_float(), scene_float())
            .prop_map(|(x, y, z)| WorldPoint::new(x, y, z))
            .boxed()
    }

    fn nonzero_world_vector() -> BoxedStrategy<WorldVector> {
        (scene_float(), scene_float(), scene_float())
            .prop_filter_map("vector is zero", |coords| {
                let vector = WorldVector::new(coords.0, coords.1, coords.2);
                if vector.norm() < 1e-3 {
                    None
                } else {
                    Some(vector)
                }
            })
            .boxed()
    }

    arbitrary_wrapper! {
        NonzeroWorldVectorWrapper(WorldVector) -> {
            nonzero_world_vector()
        }
    }

    arbitrary_wrapper! {
        WorldPointWrapper(WorldPoint) -> {
            world_point()
        }
    }

    arbitrary_wrapper! {
        RayWrapper(Ray) -> {
            (world_point(), nonzero_world_vector())
                .prop_map(|(origin, direction)| Ray::new(origin, direction))
        }
    }

    arbitrary_wrapper! {
        TriangleWrapper(Triangle<WorldPoint>) -> {
            // A corner anywhere in the scene, other two vertices within 2 m of it
            let offset = || {
                (-20_000i32..=20_000i32, -20_000i32..=20_000i32, -20_000i32..=20_000i32)
                    .prop_map(|(x, y, z)| WorldVector::new(x as FloatType, y as FloatType, z as FloatType) * 1e-4)
            };
            (world_point(), offset(), offset())
                .prop_filter_map("triangle is degenerate", |(a, ab, ac)| {
                    let triangle = Triangle::new(a, a + ab, a + ac);
                    if triangle.area() < 1e-4 {
                        None
                    } else {
                        Some(triangle)
                    }
                })
        }
    }
}
