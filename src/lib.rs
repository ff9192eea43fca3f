mod camera;
pub mod geometry;
mod ray_tracer;
mod renderer;
pub mod scene;
mod screen_block;
mod surface_point;
pub mod util;

pub use crate::renderer::{
    DEFAULT_TILE_SIZE, Progress, RenderProgress, RenderSettings, luminance, render, tone_map,
};
pub use camera::Camera;
pub use ray_tracer::{DEFAULT_MAX_BOUNCES, RayTracer};
pub use scene::{Scene, SceneDescription, SceneLoadError, SceneTriangle};
pub use surface_point::SurfacePoint;
