mod machinery;
mod tone_mapping;
mod worker;

use std::num::NonZeroU32;

use crate::ray_tracer::DEFAULT_MAX_BOUNCES;

pub use crate::renderer::{
    machinery::{RenderProgress, render},
    tone_mapping::{luminance, tone_map},
};

pub const DEFAULT_TILE_SIZE: NonZeroU32 = NonZeroU32::new(32).unwrap();

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    /// Edge length of the square tiles the image is split into
    pub tile_size: NonZeroU32,
    /// Number of passes over the whole image, one sample per pixel each
    pub iterations: NonZeroU32,
    /// Seed of all random numbers used in the render
    pub seed: u64,
    pub max_bounces: NonZeroU32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            tile_size: DEFAULT_TILE_SIZE,
            iterations: NonZeroU32::MIN,
            seed: 0,
            max_bounces: DEFAULT_MAX_BOUNCES,
        }
    }
}

/// Number of finished and total work items, each work item is one tile in one pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub finished: usize,
    pub total: usize,
}
