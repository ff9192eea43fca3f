use image::{Rgb, Rgb32FImage};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    camera::Camera,
    geometry::ScreenBlock,
    ray_tracer::RayTracer,
    renderer::RenderSettings,
    scene::{Scene, StackCache},
    screen_block::ScreenBlockExt,
};

pub struct Worker {
    worker_id: usize,
    stack_cache: StackCache,
}

impl Worker {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            stack_cache: Default::default(),
        }
    }

    pub fn id(&self) -> usize {
        self.worker_id
    }

    /// Renders one sample per pixel of the tile into the top left corner of the buffer.
    pub fn render_tile(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        settings: &RenderSettings,
        tile: &ScreenBlock,
        rng: &mut impl Rng,
        buffer: &mut Rgb32FImage,
    ) {
        let tracer = RayTracer::with_max_bounces(scene, settings.max_bounces);

        for point in tile.internal_points() {
            let ray = camera.sample_ray(&point, rng);
            let radiance = tracer.radiance(&ray, rng, &mut self.stack_cache);

            let buffer_position = point - tile.min;
            buffer.put_pixel(buffer_position.x, buffer_position.y, Rgb(radiance.into()));
        }
    }
}

/// Random number generator for a single work item.
/// Depends only on the seed and the work item, never on the worker that picked it up.
pub fn work_item_rng(seed: u64, work_item: usize) -> SmallRng {
    const GOLDEN_GAMMA: u64 = 0x9e3779b97f4a7c15;
    SmallRng::seed_from_u64(seed ^ (work_item as u64).wrapping_mul(GOLDEN_GAMMA))
}
