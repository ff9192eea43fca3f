use super::{EPSILON, FloatType, Ray, Triangle, WorldPoint};

impl Triangle<WorldPoint> {
    /// Calculates ray intersection with the (two sided) triangle.
    /// Returns distance along the ray, None if the ray misses, is parallel
    /// to the triangle's plane, or the triangle is behind the ray origin.
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm#Rust_implementation
    pub fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        let [e1, e2] = self.edges();

        let p = ray.direction.cross(&e2);
        let det = e1.dot(&p);

        if -EPSILON < det && det < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin - self[0];
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&e1);
        let v = ray.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(&q) * inv_det;
        if t < 0.0 { None } else { Some(t) }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{
        WorldVector,
        test::{RayWrapper, TriangleWrapper, WorldPointWrapper},
    };

    use assert2::{assert, let_assert};
    use proptest::prop_assume;
    use test_case::test_case;
    use test_strategy::proptest;

    fn triangle() -> Triangle<WorldPoint> {
        Triangle::new(
            WorldPoint::new(-1.0, 0.0, -1.0),
            WorldPoint::new(1.0, 0.0, -1.0),
            WorldPoint::new(0.0, 0.0, 1.0),
        )
    }

    #[test_case([0.0, 5.0, 0.0], [0.0, -1.0, 0.0], 5.0 ; "straight down")]
    #[test_case([0.0, -2.0, 0.0], [0.0, 1.0, 0.0], 2.0 ; "straight up from below")]
    #[test_case([3.0, 4.0, 0.0], [-3.0, -4.0, 0.0], 5.0 ; "oblique")]
    #[test_case([0.5, 1.0, -0.5], [0.0, -1.0, 0.0], 1.0 ; "off center")]
    fn hit(origin: [FloatType; 3], direction: [FloatType; 3], expected: FloatType) {
        let ray = Ray::new(origin.into(), WorldVector::from(direction));
        let_assert!(Some(t) = triangle().intersect(&ray));
        assert!((t - expected).abs() <= 1e-4 * expected);
        assert!(ray.point_at(t).y.abs() < 1e-5);
    }

    #[test_case([2.0, 5.0, 0.0], [0.0, -1.0, 0.0] ; "beside")]
    #[test_case([0.0, 5.0, 0.0], [0.0, 1.0, 0.0] ; "behind origin")]
    #[test_case([0.0, 1.0, 0.0], [1.0, 0.0, 0.0] ; "parallel above")]
    #[test_case([-2.0, 0.0, 0.0], [1.0, 0.0, 0.0] ; "parallel in plane")]
    #[test_case([0.9, 5.0, 0.9], [0.0, -1.0, 0.0] ; "past the slanted edge")]
    fn miss(origin: [FloatType; 3], direction: [FloatType; 3]) {
        let ray = Ray::new(origin.into(), WorldVector::from(direction));
        assert!(triangle().intersect(&ray).is_none());
    }

    #[test]
    fn triangle_behind_origin_is_missed() {
        // Both faces, the triangle is 1 m behind the ray
        for y in [1.0, -1.0] {
            let ray = Ray::new(WorldPoint::new(0.0, y, 0.0), WorldVector::new(0.0, y, 0.0));
            assert!(triangle().intersect(&ray).is_none());
        }
    }

    /// Smallest altitude of the triangle, small for slivers.
    fn min_altitude(t: &Triangle<WorldPoint>) -> FloatType {
        let longest_edge = [t[1] - t[0], t[2] - t[1], t[0] - t[2]]
            .iter()
            .map(|e| e.norm())
            .fold(0.0, FloatType::max);
        2.0 * t.area() / longest_edge
    }

    #[proptest]
    fn hit_is_on_triangle_in_front_of_origin(t: TriangleWrapper, ray: RayWrapper) {
        // Grazing rays are too close to the parallel threshold for a tight check
        prop_assume!(ray.direction.dot(&t.normal()).abs() > 0.1);

        if let Some(distance) = t.intersect(&ray) {
            assert!(distance >= 0.0);
            let hit = ray.point_at(distance);
            assert!(t.bound().contains_point(&hit, 1e-3));
            let plane_distance = (hit - t[0]).dot(&t.normal());
            assert!(plane_distance.abs() < 1e-2);
        }
    }

    #[proptest]
    fn ray_through_centroid_hits_at_its_distance(t: TriangleWrapper, origin: WorldPointWrapper) {
        let centroid = WorldPoint::from((t[0].coords + t[1].coords + t[2].coords) / 3.0);
        let to_centroid = centroid - *origin;
        let distance = to_centroid.norm();
        prop_assume!(distance > 0.1);
        prop_assume!(to_centroid.dot(&t.normal()).abs() > 0.1 * distance);
        prop_assume!(min_altitude(&t) > 1e-2);

        let ray = Ray::new(*origin, to_centroid);
        let_assert!(Some(t_hit) = t.intersect(&ray));
        assert!((t_hit - distance).abs() < 1e-3 * distance.max(1.0));

        let away = Ray::new(*origin, -to_centroid);
        assert!(t.intersect(&away).is_none());
    }

    #[test]
    fn nearly_parallel_is_rejected() {
        let ray = Ray::new(
            WorldPoint::new(-5.0, 1e-8, 0.0),
            WorldVector::new(1.0, -1e-9, 0.0),
        );
        assert!(triangle().intersect(&ray).is_none());
    }
}
