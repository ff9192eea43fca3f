use std::{fs, num::NonZeroU32, path::Path};

use thiserror::Error;

use crate::{
    camera::Camera,
    geometry::{FloatType, ScreenSize, Triangle, WorldPoint, WorldVector},
    scene::{Scene, SceneTriangle},
};

const HEADER: &str = "#MiniLight";

/// Upper limit of the number of triangles in a scene file.
pub const MAX_TRIANGLES: usize = 1 << 24;

/// Upper limit of image width and height.
pub const MAX_IMAGE_DIMENSION: u32 = 10000;

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Missing `{}` header", HEADER)]
    MissingHeader,

    #[error("Unexpected end of file while reading {0}")]
    UnexpectedEnd(&'static str),

    #[error("Invalid number {token:?} in {what}")]
    InvalidNumber { token: String, what: &'static str },

    #[error("Too many triangles, at most {} are supported", MAX_TRIANGLES)]
    TooManyTriangles,
}

/// Everything a MiniLight scene file describes.
#[derive(Clone, Debug)]
pub struct SceneDescription {
    pub iterations: NonZeroU32,
    pub camera: Camera,
    pub scene: Scene,
}

impl SceneDescription {
    pub fn with_file(p: impl AsRef<Path>) -> Result<SceneDescription, SceneLoadError> {
        let content = fs::read_to_string(p)?;
        Self::parse(&content)
    }

    /// Parses the MiniLight text format:
    /// ```text
    /// #MiniLight
    /// iterations
    /// width height
    /// (eye position) (view direction) view_angle
    /// (sky emission) (ground reflection)
    /// (vertex 0) (vertex 1) (vertex 2) (reflectivity) (emissivity)
    /// ...
    /// ```
    /// Parentheses only delimit tokens, triangles continue until the end of input.
    pub fn parse(content: &str) -> Result<SceneDescription, SceneLoadError> {
        let content = content
            .trim_start()
            .strip_prefix(HEADER)
            .ok_or(SceneLoadError::MissingHeader)?;
        let mut tokens = Tokens::new(content);

        let iterations = tokens.integer("iterations")?.clamp(1, u32::MAX.into()) as u32;
        let width = tokens.integer("image width")?;
        let height = tokens.integer("image height")?;
        let resolution = ScreenSize::new(clamp_dimension(width), clamp_dimension(height));

        let eye_position = WorldPoint::from(tokens.vector("eye position")?);
        let view_direction = tokens.vector("view direction")?;
        let view_angle = tokens.float("view angle")?;

        let sky_emission = tokens.vector("sky emission")?;
        let ground_reflection = tokens.vector("ground reflection")?;

        let mut triangles = Vec::new();
        while !tokens.is_at_end() {
            if triangles.len() >= MAX_TRIANGLES {
                return Err(SceneLoadError::TooManyTriangles);
            }
            let geometry = Triangle::new(
                WorldPoint::from(tokens.vector("triangle vertex")?),
                WorldPoint::from(tokens.vector("triangle vertex")?),
                WorldPoint::from(tokens.vector("triangle vertex")?),
            );
            let reflectivity = tokens.vector("triangle reflectivity")?;
            let emissivity = tokens.vector("triangle emissivity")?;
            triangles.push(SceneTriangle::new(geometry, reflectivity, emissivity));
        }

        log::info!(
            "Loaded scene: {}x{} pixels, {} iterations, {} triangles",
            resolution.x,
            resolution.y,
            iterations,
            triangles.len()
        );

        let camera = Camera::builder()
            .position(eye_position)
            .direction(view_direction)
            .view_angle(view_angle)
            .resolution(resolution)
            .build();
        let scene = Scene::new(triangles, sky_emission, ground_reflection, &eye_position);

        Ok(SceneDescription {
            iterations: NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN),
            camera,
            scene,
        })
    }
}

fn clamp_dimension(value: i64) -> u32 {
    value.clamp(1, MAX_IMAGE_DIMENSION.into()) as u32
}

struct Tokens<'a> {
    tokens: std::iter::Peekable<std::str::Split<'a, fn(char) -> bool>>,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        let is_separator: fn(char) -> bool = |c| c.is_whitespace() || c == '(' || c == ')';
        Tokens {
            tokens: content.split(is_separator).peekable(),
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.skip_empty();
        self.tokens.peek().is_none()
    }

    fn skip_empty(&mut self) {
        while self.tokens.next_if(|token| token.is_empty()).is_some() {}
    }

    fn next(&mut self, what: &'static str) -> Result<&'a str, SceneLoadError> {
        self.skip_empty();
        self.tokens.next().ok_or(SceneLoadError::UnexpectedEnd(what))
    }

    fn integer(&mut self, what: &'static str) -> Result<i64, SceneLoadError> {
        parse(self.next(what)?, what)
    }

    fn float(&mut self, what: &'static str) -> Result<FloatType, SceneLoadError> {
        parse(self.next(what)?, what)
    }

    fn vector(&mut self, what: &'static str) -> Result<WorldVector, SceneLoadError> {
        let x = self.float(what)?;
        let y = self.float(what)?;
        let z = self.float(what)?;
        Ok(WorldVector::new(x, y, z))
    }
}

fn parse<T: std::str::FromStr>(token: &str, what: &'static str) -> Result<T, SceneLoadError> {
    token.parse().map_err(|_| SceneLoadError::InvalidNumber {
        token: token.to_owned(),
        what,
    })
}
