use crate::geometry::{FloatType, Ray, WorldBox};

pub trait RayIntersectionExt {
    /// Calculate first and last ray intersection with the box
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType);
}

impl RayIntersectionExt for WorldBox {
    /// Calculates ray intersection with the box using the slab test.
    /// Returns minimum and maximum distance along the ray, ray intersects if min <= max.
    /// Distances may be negative when the ray starts inside the box.
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType) {
        // Componentwise distances along the ray to the box's min and max corners
        // The multiplication is NAN if the ray is starting inside the slab bounding plane
        // and is parallel to it. In this case we blend to +-infinity, so that the range becomes infinite
        let to_box_min = (self.min - ray.origin)
            .component_mul(&ray.inv_direction)
            .map(|x| if x.is_nan() { FloatType::NEG_INFINITY } else { x });
        let to_box_max = (self.max - ray.origin)
            .component_mul(&ray.inv_direction)
            .map(|x| if x.is_nan() { FloatType::INFINITY } else { x });

        // Correctly ordered (min_t <= max_t)
        let componentwise_min_t = to_box_min.inf(&to_box_max);
        let componentwise_max_t = to_box_min.sup(&to_box_max);

        (componentwise_min_t.max(), componentwise_max_t.min())
    }
}

#[cfg(test)]
pub mod test {
    use assert2::assert;
    use test_case::{test_case, test_matrix};

    use super::*;

    use crate::geometry::{Ray, WorldBox, WorldPoint, WorldVector};

    /// Checks cases when the ray hits the box, including some corner cases.
    #[test_matrix(
        [5.0, 7.0, 10.0],
        [5.0, 7.0, 10.0],
        [5.0, 7.0, 10.0],
        [-1.0, 0.0, 2.0],
        [-1.0, 0.0, 2.0],
        [-1.0, 0.0, 2.0],
        [-10.0, -1.0, 0.0, 2.0, 5.0, 20.0]
    )]
    fn hit(px: f32, py: f32, pz: f32, dx: f32, dy: f32, dz: f32, origin_pos: f32) {
        if dx == 0.0 && dy == 0.0 && dz == 0.0 {
            return;
        }

        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());

        let p = WorldPoint::new(px, py, pz);
        let d = WorldVector::new(dx, dy, dz);
        let temp_r = Ray::new(p, d);
        let origin = temp_r.point_at(origin_pos);
        let r = Ray::new(origin, d);

        let (t1, t2) = checked_result(b.intersect(&r))
            .expect("The ray passes through a point of the box, we should always have an intersection");

        let p1 = r.point_at(t1);
        let p2 = r.point_at(t2);

        assert!(point_is_on_box_surface(&p1, &b), "{p1:?} must be in {b:?}");
        assert!(point_is_on_box_surface(&p2, &b), "{p2:?} must be in {b:?}");
    }

    /// Returns the intersection if one was found, merging nearly touching ranges
    fn checked_result(result: (FloatType, FloatType)) -> Option<(f32, f32)> {
        const TOLERANCE: f32 = 1e-3;

        let (t1, t2) = result;
        if t1 <= t2 {
            Some((t1, t2))
        } else if t1 <= t2 + TOLERANCE {
            let t = (t1 + t2) / 2.0;
            Some((t, t))
        } else {
            None
        }
    }

    /// Just a manual example of ray grazing along an edge.
    #[test]
    fn hit_along_edge() {
        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());

        let r = Ray::new(
            WorldPoint::new(5.0, 5.0, 0.0),
            WorldVector::new(0.0, 0.0, 1.0),
        );

        let result = checked_result(b.intersect(&r));

        assert!(result == Some((5.0, 10.0)))
    }

    /// Ray starting inside the box has negative entry distance.
    #[test]
    fn origin_inside() {
        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());
        let r = Ray::new(
            WorldPoint::new(7.0, 7.0, 7.0),
            WorldVector::new(1.0, 0.0, 0.0),
        );

        let (t1, t2) = b.intersect(&r);
        assert!(t1 == -2.0);
        assert!(t2 == 3.0);
    }

    /// Rays that lie parallel to one axis and start outside the corresponding slab
    /// must miss, even if they move toward the box on other axes or remain unchanged.
    #[test_case( 0.0,  7.0,  7.0,   0.0, 1.0, 0.0,   0.0 ; "low_x_parallel_miss")]
    #[test_case(12.0,  7.0,  7.0,   0.0, 1.0, 0.0,   0.0 ; "high_x_parallel_miss")]
    #[test_case( 7.0,  0.0,  7.0,   1.0, 0.0, 0.0,   0.0 ; "low_y_parallel_miss")]
    #[test_case( 7.0, 12.0,  7.0,   1.0, 0.0, 0.0,   0.0 ; "high_y_parallel_miss")]
    #[test_case( 7.0,  7.0,  0.0,   1.0, 0.0, 0.0,   0.0 ; "low_z_parallel_miss")]
    #[test_case( 7.0,  7.0, 12.0,   1.0, 0.0, 0.0,   0.0 ; "high_z_parallel_miss")]
    #[test_case( 0.0,  5.0,  7.0,   1.0, 0.0, 1.0,   0.0 ; "corner_miss")]
    #[test_case( 0.0,  0.0,  0.0,  -1.0, 1.0, 1.0,   0.0 ; "corner_miss2")]
    fn only_misses(px: f32, py: f32, pz: f32, dx: f32, dy: f32, dz: f32, origin_pos: f32) {
        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());

        let p = WorldPoint::new(px, py, pz);
        let d = WorldVector::new(dx, dy, dz);
        let temp_r = Ray::new(p, d);
        let origin = temp_r.point_at(origin_pos);
        let r = Ray::new(origin, d);

        let result = checked_result(b.intersect(&r));

        assert!(result == None);
    }

    fn point_is_on_box_surface(p: &WorldPoint, b: &WorldBox) -> bool {
        const TOLERANCE: f32 = 1e-3;

        if !b.contains_point(p, TOLERANCE) {
            return false; // outside the box entirely
        }

        // Check if the point lies on any of the six faces (within tolerance)
        (0..3).any(|i| {
            (p[i] - b.min[i]).abs() <= TOLERANCE || (p[i] - b.max[i]).abs() <= TOLERANCE
        })
    }
}
