use std::num::NonZeroU32;

use rand::Rng;

use crate::{
    geometry::{Colour, FloatType, Ray, WorldVector},
    scene::{Scene, StackCache},
    surface_point::SurfacePoint,
};

/// Bounce limit used when nothing else is configured.
pub const DEFAULT_MAX_BOUNCES: NonZeroU32 = NonZeroU32::new(128).unwrap();

/// Radiance estimator: path tracing with emitter sampling and russian roulette.
#[derive(Copy, Clone, Debug)]
pub struct RayTracer<'a> {
    scene: &'a Scene,
    max_bounces: NonZeroU32,
}

impl<'a> RayTracer<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self::with_max_bounces(scene, DEFAULT_MAX_BOUNCES)
    }

    /// Paths are cut after `max_bounces` surface hits, even if russian roulette didn't end them.
    pub fn with_max_bounces(scene: &'a Scene, max_bounces: NonZeroU32) -> Self {
        RayTracer { scene, max_bounces }
    }

    /// Returns a single sample of radiance coming back along the ray.
    pub fn radiance(&self, ray: &Ray, rng: &mut impl Rng, stack: &mut StackCache) -> Colour {
        let mut ray = *ray;
        let mut last_hit = None;
        let mut throughput = Colour::repeat(1.0);
        let mut radiance = Colour::zeros();

        for bounce in 0..self.max_bounces.get() {
            let back_direction = -ray.direction;

            let Some(hit) = self.scene.intersection(&ray, last_hit, stack) else {
                radiance += throughput.component_mul(&self.scene.default_emission(&back_direction));
                break;
            };

            let surface_point =
                SurfacePoint::new(hit.triangle, self.scene.triangle(hit.triangle), hit.location);

            // Emitters hit later in the path are already counted by emitter sampling
            if bounce == 0 {
                radiance += throughput.component_mul(&surface_point.emission(
                    &ray.origin,
                    &back_direction,
                    false,
                ));
            }

            radiance += throughput.component_mul(&self.sample_emitters(
                &back_direction,
                &surface_point,
                rng,
                stack,
            ));

            let Some((direction, colour)) = surface_point.next_direction(rng, &back_direction)
            else {
                break;
            };

            throughput.component_mul_assign(&colour);
            ray = Ray::new(hit.location, direction);
            last_hit = Some(hit.triangle);
        }

        radiance
    }

    /// Direct light reflected towards `out_direction` from one randomly picked emitter.
    fn sample_emitters(
        &self,
        out_direction: &WorldVector,
        surface_point: &SurfacePoint,
        rng: &mut impl Rng,
        stack: &mut StackCache,
    ) -> Colour {
        let Some(emitter_index) = self.scene.emitter(rng) else {
            return Colour::zeros();
        };
        let emitter = self.scene.triangle(emitter_index);
        let emit_position = emitter.geometry.sample_point(rng);

        let to_emitter = emit_position - surface_point.position();
        let emit_distance = to_emitter.norm();
        let Some(emit_direction) = to_emitter.try_normalize(0.0) else {
            return Colour::zeros();
        };

        let shadow_ray = Ray::new(*surface_point.position(), emit_direction);
        let unoccluded = match self.scene.intersection(
            &shadow_ray,
            Some(surface_point.triangle_index()),
            stack,
        ) {
            None => true,
            Some(hit) => hit.triangle == emitter_index || hit.distance >= emit_distance,
        };
        if !unoccluded {
            return Colour::zeros();
        }

        let emission = SurfacePoint::new(emitter_index, emitter, emit_position).emission(
            surface_point.position(),
            &-emit_direction,
            true,
        );

        // Compensates for picking just one of the emitters
        let emission = emission * self.scene.emitters_count() as FloatType;

        surface_point.reflection(&emit_direction, &emission, out_direction)
    }
}
