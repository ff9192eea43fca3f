pub mod loading;
pub mod spatial_index;

use index_vec::{IndexSlice, IndexVec};
use rand::Rng;

use crate::geometry::{Colour, FloatType, Ray, Triangle, WorldBox, WorldPoint, WorldVector};

pub use loading::{SceneDescription, SceneLoadError};
pub use spatial_index::{SpatialIndex, StackCache};

/// Anything the spatial index can hold.
pub trait Object {
    /// Distance along the ray to the nearest intersection, if any.
    fn intersect(&self, ray: &Ray) -> Option<FloatType>;
    fn get_bounding_box(&self) -> WorldBox;
}

impl Object for Triangle<WorldPoint> {
    fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        Triangle::intersect(self, ray)
    }

    fn get_bounding_box(&self) -> WorldBox {
        self.bound()
    }
}

index_vec::define_index_type! {
    pub struct TriangleIdx = u32;
}

/// Triangle of the scene with its surface quality.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneTriangle {
    pub geometry: Triangle<WorldPoint>,
    /// Diffuse reflectivity, within [0, 1] per channel.
    pub reflectivity: Colour,
    /// Emitted radiance, non-negative.
    pub emissivity: Colour,
}

impl SceneTriangle {
    /// Creates a new triangle, clamping the reflectivity and emissivity into their valid ranges.
    pub fn new(geometry: Triangle<WorldPoint>, reflectivity: Colour, emissivity: Colour) -> Self {
        SceneTriangle {
            geometry,
            reflectivity: clamp_unit(&reflectivity),
            emissivity: clamp_non_negative(&emissivity),
        }
    }

    /// Triangles with non-zero emissivity and area are used for direct light sampling.
    pub fn is_emitter(&self) -> bool {
        self.emissivity != Colour::zeros() && self.geometry.area() > 0.0
    }
}

impl Object for SceneTriangle {
    fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        self.geometry.intersect(ray)
    }

    fn get_bounding_box(&self) -> WorldBox {
        self.geometry.bound()
    }
}

/// Nearest hit of a ray with the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub triangle: TriangleIdx,
    pub distance: FloatType,
    pub location: WorldPoint,
}

/// Triangles with their surface qualities, emitters, spatial index and background.
/// Immutable once built, so it can be shared between render workers.
#[derive(Clone, Debug)]
pub struct Scene {
    triangles: IndexVec<TriangleIdx, SceneTriangle>,
    emitters: Vec<TriangleIdx>,
    index: SpatialIndex,

    sky_emission: Colour,
    ground_reflection: Colour,
}

impl Scene {
    /// Builds the scene.
    /// The eye position is included in the spatial index bounds.
    pub fn new(
        triangles: Vec<SceneTriangle>,
        sky_emission: Colour,
        ground_reflection: Colour,
        eye_position: &WorldPoint,
    ) -> Scene {
        let triangles = IndexVec::from_vec(triangles);
        let emitters = triangles
            .iter_enumerated()
            .filter(|(_, t)| t.is_emitter())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        let index = SpatialIndex::build(eye_position, &triangles);

        log::info!(
            "Scene has {} triangles, {} of them are emitters",
            triangles.len(),
            emitters.len()
        );

        Scene {
            triangles,
            emitters,
            index,
            sky_emission: clamp_non_negative(&sky_emission),
            ground_reflection: clamp_unit(&ground_reflection),
        }
    }

    pub fn triangles(&self) -> &IndexSlice<TriangleIdx, [SceneTriangle]> {
        &self.triangles
    }

    pub fn triangle(&self, index: TriangleIdx) -> &SceneTriangle {
        &self.triangles[index]
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Finds the nearest triangle hit by the ray, ignoring `last_hit`
    /// (the triangle the ray is leaving from).
    pub fn intersection(
        &self,
        ray: &Ray,
        last_hit: Option<TriangleIdx>,
        stack: &mut StackCache,
    ) -> Option<Intersection> {
        self.index
            .intersection(&self.triangles, ray, last_hit, stack)
    }

    /// Picks an emitter uniformly at random, None if the scene has no emitters.
    pub fn emitter(&self, rng: &mut impl Rng) -> Option<TriangleIdx> {
        if self.emitters.is_empty() {
            None
        } else {
            Some(self.emitters[rng.random_range(0..self.emitters.len())])
        }
    }

    pub fn emitters_count(&self) -> usize {
        self.emitters.len()
    }

    /// Background radiance coming from the opposite of `back_direction`:
    /// sky for downward rays, sky reflected by the ground for upward rays.
    pub fn default_emission(&self, back_direction: &WorldVector) -> Colour {
        if back_direction.y < 0.0 {
            self.sky_emission
        } else {
            self.sky_emission.component_mul(&self.ground_reflection)
        }
    }
}

fn clamp_non_negative(c: &Colour) -> Colour {
    c.map(|x| x.max(0.0))
}

fn clamp_unit(c: &Colour) -> Colour {
    c.map(|x| x.clamp(0.0, 1.0))
}
