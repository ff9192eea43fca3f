use std::{num::NonZeroU32, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use minilight::{DEFAULT_MAX_BOUNCES, DEFAULT_TILE_SIZE, RenderSettings, SceneDescription, render};

/// Renders a MiniLight scene file into an image.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The scene file to render
    scene: PathBuf,

    /// Output image, the format is selected by the extension
    #[clap(short = 'o', long, default_value = "image.png")]
    output: PathBuf,

    /// Number of passes over the image, overrides the value in the scene file
    #[clap(short = 'i', long)]
    iterations: Option<NonZeroU32>,

    /// Seed of the random number generators
    #[clap(short = 's', long, default_value_t = 0)]
    seed: u64,

    /// Edge length of the rendered tiles in pixels
    #[clap(short = 't', long, default_value_t = DEFAULT_TILE_SIZE)]
    tile_size: NonZeroU32,

    /// Maximum number of surface hits of a single path
    #[clap(long, default_value_t = DEFAULT_MAX_BOUNCES)]
    max_bounces: NonZeroU32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let description = SceneDescription::with_file(&args.scene)
        .with_context(|| format!("Loading scene {}", args.scene.display()))?;
    description.scene.spatial_index().log_statistics();
    if log::log_enabled!(log::Level::Trace) {
        description.scene.spatial_index().print_tree();
    }

    let settings = RenderSettings {
        tile_size: args.tile_size,
        iterations: args.iterations.unwrap_or(description.iterations),
        seed: args.seed,
        max_bounces: args.max_bounces,
    };

    let bar = ProgressBar::no_length();
    bar.set_style(
        ProgressStyle::with_template("{elapsed_precise} [{wide_bar}] {percent}% eta {eta}")?,
    );
    let mut render_progress = render(description.scene, description.camera, settings, |_| {}, {
        let bar = bar.clone();
        move |_, progress| {
            bar.update(|ps| {
                ps.set_len(progress.total as u64);
                ps.set_pos(progress.finished as u64)
            })
        }
    })?;
    bar.set_length(render_progress.progress().total as u64);

    render_progress.wait()?;
    bar.finish();

    log::info!("Writing {}", args.output.display());
    render_progress
        .snapshot()
        .save(&args.output)
        .with_context(|| format!("Saving image {}", args.output.display()))?;

    Ok(())
}
