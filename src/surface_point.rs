use std::f32::consts::PI;

use rand::Rng;

use crate::{
    geometry::{Colour, FloatType, WorldPoint, WorldVector},
    scene::{SceneTriangle, TriangleIdx},
};

/// Lower limit of the distance term of emission, avoids the singularity next to an emitter.
const MIN_DISTANCE2: FloatType = 1e-6;

/// A point on a scene triangle, with its diffuse shading model.
#[derive(Copy, Clone, Debug)]
pub struct SurfacePoint<'a> {
    triangle_index: TriangleIdx,
    triangle: &'a SceneTriangle,
    position: WorldPoint,
}

impl<'a> SurfacePoint<'a> {
    pub fn new(triangle_index: TriangleIdx, triangle: &'a SceneTriangle, position: WorldPoint) -> Self {
        SurfacePoint {
            triangle_index,
            triangle,
            position,
        }
    }

    pub fn triangle_index(&self) -> TriangleIdx {
        self.triangle_index
    }

    pub fn position(&self) -> &WorldPoint {
        &self.position
    }

    /// Radiance emitted from this point in `out_direction`, as seen from `to_position`.
    /// Only the front face emits.
    ///
    /// With `is_solid_angle` the result is scaled by the solid angle the whole triangle
    /// covers from `to_position`, for use in emitter sampling.
    pub fn emission(
        &self,
        to_position: &WorldPoint,
        out_direction: &WorldVector,
        is_solid_angle: bool,
    ) -> Colour {
        let ray = to_position - self.position;
        let normal = self.triangle.geometry.normal();
        // Projected onto the normal, not the true squared distance
        let distance2 = ray.dot(&normal);
        let cos_out = out_direction.dot(&normal);

        if cos_out <= 0.0 {
            return Colour::zeros();
        }

        let solid_angle = if is_solid_angle {
            (cos_out * self.triangle.geometry.area()) / distance2.max(MIN_DISTANCE2)
        } else {
            1.0
        };

        self.triangle.emissivity * solid_angle
    }

    /// Radiance reflected in `out_direction` from `in_radiance` arriving from `in_direction`.
    /// Ideal Lambertian, zero if the directions are on different sides of the surface.
    pub fn reflection(
        &self,
        in_direction: &WorldVector,
        in_radiance: &Colour,
        out_direction: &WorldVector,
    ) -> Colour {
        let normal = self.triangle.geometry.normal();
        let in_dot = in_direction.dot(&normal);
        let out_dot = out_direction.dot(&normal);

        if (in_dot < 0.0) != (out_dot < 0.0) {
            return Colour::zeros();
        }

        self.triangle
            .reflectivity
            .component_mul(in_radiance)
            * (in_dot.abs() / PI)
    }

    /// Samples the direction of the next bounce, cosine weighted, on the same side as `in_direction`.
    ///
    /// Returns the direction and the colour to multiply the path throughput with,
    /// or None if the path is terminated by russian roulette.
    pub fn next_direction(
        &self,
        rng: &mut impl Rng,
        in_direction: &WorldVector,
    ) -> Option<(WorldVector, Colour)> {
        let reflectivity_mean = self.triangle.reflectivity.mean();

        if rng.random::<FloatType>() >= reflectivity_mean {
            return None;
        }

        let azimuth = 2.0 * PI * rng.random::<FloatType>();
        let s2 = rng.random::<FloatType>();
        let r = s2.sqrt();
        let x = azimuth.cos() * r;
        let y = azimuth.sin() * r;
        let z = (1.0 - s2).sqrt();

        let tangent = self.triangle.geometry.tangent();
        let mut normal = self.triangle.geometry.normal();
        if normal.dot(in_direction) < 0.0 {
            normal = -normal;
        }
        let bitangent = normal.cross(&tangent);

        let direction = tangent * x + bitangent * y + normal * z;
        if direction == WorldVector::zeros() {
            return None;
        }

        Some((direction, self.triangle.reflectivity / reflectivity_mean))
    }
}
