use assert2::assert;
use bon::bon;

use crate::geometry::{FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector};

/// Pinhole camera, the eye of the scene.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    position: WorldPoint,
    resolution: ScreenSize,

    /// View frame, all unit length
    direction: WorldVector,
    right: WorldVector,
    up: WorldVector,

    /// Half of the horizontal view angle, in radians
    half_angle: FloatType,
}

#[bon]
impl Camera {
    /// Builds the camera.
    /// `view_angle` is the horizontal field of view in degrees, clamped to [10, 160].
    /// Zero view direction falls back to +Z.
    #[builder]
    pub fn new(
        position: WorldPoint,
        direction: WorldVector,
        view_angle: FloatType,
        resolution: ScreenSize,
    ) -> Self {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);

        let direction = direction
            .try_normalize(0.0)
            .unwrap_or_else(WorldVector::z);
        let (right, up) = view_frame(&direction);

        Camera {
            position,
            resolution,
            direction,
            right,
            up,
            half_angle: view_angle.clamp(10.0, 160.0).to_radians() * 0.5,
        }
    }
}

impl Camera {
    pub fn get_resolution(&self) -> ScreenSize {
        self.resolution
    }

    pub fn position(&self) -> &WorldPoint {
        &self.position
    }

    pub fn direction(&self) -> &WorldVector {
        &self.direction
    }

    pub fn right(&self) -> &WorldVector {
        &self.right
    }

    pub fn up(&self) -> &WorldVector {
        &self.up
    }

    /// Samples a new ray from the camera for the given image pixel, jittered within the pixel.
    /// Row 0 is at the top of the image.
    pub fn sample_ray(&self, point: &ScreenPoint, rng: &mut impl rand::Rng) -> Ray {
        let width = self.resolution.x as FloatType;
        let height = self.resolution.y as FloatType;

        let x = ((point.x as FloatType + rng.random::<FloatType>()) * 2.0 / width) - 1.0;
        let y = 1.0 - ((point.y as FloatType + rng.random::<FloatType>()) * 2.0 / height);

        let offset = self.right * x + self.up * (y * (height / width));
        let direction = self.direction + offset * self.half_angle.tan();

        Ray::new(self.position, direction)
    }
}

/// Right and up vectors for a view direction, assuming Y is up.
/// Directions colinear with Y use Z as up instead.
fn view_frame(direction: &WorldVector) -> (WorldVector, WorldVector) {
    match WorldVector::y().cross(direction).try_normalize(0.0) {
        Some(right) => {
            let up = direction.cross(&right).normalize();
            (right, up)
        }
        None => {
            let up = WorldVector::new(0.0, 0.0, if direction.z != 0.0 { 1.0 } else { -1.0 });
            let right = up.cross(direction).normalize();
            (right, up)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;
    use rand::{SeedableRng, rngs::SmallRng};
    use test_case::test_case;

    fn camera(direction: WorldVector, view_angle: FloatType) -> Camera {
        Camera::builder()
            .position(WorldPoint::new(0.0, 0.0, 0.0))
            .direction(direction)
            .view_angle(view_angle)
            .resolution(ScreenSize::new(800, 600))
            .build()
    }

    #[test]
    fn left_right_up_down() {
        // X goes right, Y goes up, Z goes away
        let camera = camera(WorldVector::new(0.0, 0.0, 1.0), 90.0);
        let mut rng = SmallRng::seed_from_u64(0);

        let ray_center = camera.sample_ray(&ScreenPoint::new(400, 300), &mut rng);
        let ray_left = camera.sample_ray(&ScreenPoint::new(0, 300), &mut rng);
        let ray_right = camera.sample_ray(&ScreenPoint::new(799, 300), &mut rng);
        let ray_up = camera.sample_ray(&ScreenPoint::new(400, 0), &mut rng);
        let ray_down = camera.sample_ray(&ScreenPoint::new(400, 599), &mut rng);

        assert!(ray_center.direction.x.abs() < 1e-2);
        assert!(ray_center.direction.y.abs() < 1e-2);
        assert!(ray_left.direction.x < ray_center.direction.x);
        assert!(ray_right.direction.x > ray_center.direction.x);
        assert!(ray_up.direction.y > ray_center.direction.y);
        assert!(ray_down.direction.y < ray_center.direction.y);
        assert!(ray_center.origin == WorldPoint::origin());
    }

    #[test]
    fn horizontal_field_of_view() {
        let camera = camera(WorldVector::new(0.0, 0.0, 1.0), 90.0);
        let mut rng = SmallRng::seed_from_u64(1);

        // Rays through the left and right edges are 45 degrees off axis
        for _ in 0..100 {
            let left = camera.sample_ray(&ScreenPoint::new(0, 300), &mut rng);
            let right = camera.sample_ray(&ScreenPoint::new(799, 300), &mut rng);
            let slope_left = left.direction.x / left.direction.z;
            let slope_right = right.direction.x / right.direction.z;
            assert!(slope_left >= -1.0 - 1e-4 && slope_left < -1.0 + 2.0 / 800.0 + 1e-4);
            assert!(slope_right > 1.0 - 2.0 / 800.0 - 1e-4 && slope_right <= 1.0 + 1e-4);
        }
    }

    #[test_case(1.0, 10.0 ; "below range")]
    #[test_case(170.0, 160.0 ; "above range")]
    #[test_case(60.0, 60.0 ; "in range")]
    fn view_angle_is_clamped(angle: FloatType, expected: FloatType) {
        let camera = camera(WorldVector::new(0.0, 0.0, 1.0), angle);
        assert!((camera.half_angle - expected.to_radians() * 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_direction_defaults_to_z() {
        let camera = camera(WorldVector::zeros(), 45.0);
        assert!(camera.direction() == &WorldVector::z());
        assert!(camera.right() == &WorldVector::x());
        assert!(camera.up() == &WorldVector::y());
    }

    #[test_case(WorldVector::new(0.0, -1.0, 0.0) ; "looking down")]
    #[test_case(WorldVector::new(0.0, 3.0, 0.0) ; "looking up")]
    #[test_case(WorldVector::new(1.0, 2.0, -3.0) ; "oblique")]
    fn frame_is_orthonormal(direction: WorldVector) {
        let camera = camera(direction, 45.0);
        let (d, r, u) = (camera.direction(), camera.right(), camera.up());

        for v in [d, r, u] {
            assert!((v.norm() - 1.0).abs() < 1e-5);
        }
        assert!(d.dot(r).abs() < 1e-5);
        assert!(d.dot(u).abs() < 1e-5);
        assert!(r.dot(u).abs() < 1e-5);
        // Right handed, image right x image up points into the view
        assert!((r.cross(u) - d).norm() < 1e-5);
    }
}
