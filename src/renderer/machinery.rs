use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use anyhow::anyhow;
use image::{Rgb, Rgb32FImage, RgbImage};

use crate::{
    camera::Camera,
    geometry::ScreenBlock,
    renderer::{
        Progress, RenderSettings, tone_map,
        worker::{Worker, work_item_rng},
    },
    scene::Scene,
    screen_block::ScreenBlockExt,
};

/// Starts rendering the scene in background threads, one per CPU core.
///
/// The image is rendered in `settings.iterations` passes, each adding one sample to every pixel.
/// `started_tile_callback` and `finished_tile_callback` get called from the worker threads.
pub fn render<
    F1: Fn(&ScreenBlock) + Send + Sync + 'static,
    F2: Fn(&ScreenBlock, Progress) + Send + Sync + 'static,
>(
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    started_tile_callback: F1,
    finished_tile_callback: F2,
) -> anyhow::Result<RenderProgress> {
    let resolution = camera.get_resolution();
    let tile_ordering = ScreenBlock::from_size(resolution).tile_ordering(settings.tile_size);
    let work_item_count = tile_ordering.len() * settings.iterations.get() as usize;

    let state = Arc::new(RenderState {
        scene,
        camera,
        settings,

        accumulator: Mutex::new(Accumulator {
            radiance: Rgb32FImage::new(resolution.x, resolution.y),
            tile_samples: vec![0; tile_ordering.len()],
            pass_finished_tiles: vec![0; settings.iterations.get() as usize],
        }),

        tile_ordering,
        work_item_count,
        next_work_item: AtomicUsize::new(0),
        finished_work_items: AtomicUsize::new(0),
    });
    let started_tile_callback = Arc::new(started_tile_callback);
    let finished_tile_callback = Arc::new(finished_tile_callback);

    let cores: Vec<Option<core_affinity::CoreId>> = match core_affinity::get_core_ids() {
        Some(cores) if !cores.is_empty() => cores.into_iter().map(Some).collect(),
        _ => {
            log::warn!("Could not get the CPU list, worker threads will not be pinned");
            vec![None; num_cpus::get().max(1)]
        }
    };

    log::info!(
        "Rendering {}x{} pixels in {} passes of {} tiles with {} workers",
        resolution.x,
        resolution.y,
        settings.iterations,
        state.tile_ordering.len(),
        cores.len()
    );

    let threads = cores
        .into_iter()
        .enumerate()
        .map(|(worker_id, core)| {
            let state = Arc::clone(&state);
            let started_tile_callback = Arc::clone(&started_tile_callback);
            let finished_tile_callback = Arc::clone(&finished_tile_callback);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }

                    let mut worker = Worker::new(worker_id);
                    let tile_size = settings.tile_size.get();
                    let mut buffer = Rgb32FImage::new(tile_size, tile_size);
                    log::debug!("Worker {} started", worker.id());

                    while let Some(item) = state.get_next_work_item() {
                        (started_tile_callback)(item.tile);

                        let mut rng = work_item_rng(state.settings.seed, item.index);
                        worker.render_tile(
                            &state.scene,
                            &state.camera,
                            &state.settings,
                            item.tile,
                            &mut rng,
                            &mut buffer,
                        );
                        let progress = state.accumulate(&item, &buffer);

                        (finished_tile_callback)(item.tile, progress);
                    }

                    log::debug!("Worker {} finished", worker.id());
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RenderProgress {
        render_state: state,
        threads,
    })
}

pub struct RenderProgress {
    render_state: Arc<RenderState>,
    threads: Vec<JoinHandle<()>>,
}

impl RenderProgress {
    /// Return number of finished and total work items.
    pub fn progress(&self) -> Progress {
        self.render_state.progress()
    }

    pub fn progress_percent(&self) -> f32 {
        let Progress { finished, total } = self.progress();
        if total == 0 {
            100.0
        } else {
            100.0 * (finished as f32) / (total as f32)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Signal the workers to abort.
    /// Any running workers will still finish their tiles, but no new ones will be started.
    pub fn abort(&self) {
        self.render_state
            .next_work_item
            .store(self.render_state.work_item_count, Ordering::Release);
    }

    /// Wait for the workers to finish.
    pub fn wait(&mut self) -> anyhow::Result<()> {
        for handle in self.threads.drain(..) {
            handle
                .join()
                .map_err(|_| anyhow!("A render worker panicked"))?;
        }
        Ok(())
    }

    /// Number of passes that finished on every tile.
    pub fn completed_passes(&self) -> u32 {
        let accumulator = self.render_state.accumulator.lock().expect("Poisoned lock!");
        accumulator.tile_samples.iter().copied().min().unwrap_or(0)
    }

    /// Mean radiance of every pixel rendered so far.
    pub fn radiance(&self) -> Rgb32FImage {
        let accumulator = self.render_state.accumulator.lock().expect("Poisoned lock!");
        let (width, height) = accumulator.radiance.dimensions();
        let mut mean = Rgb32FImage::new(width, height);

        for (tile, &samples) in self
            .render_state
            .tile_ordering
            .iter()
            .zip(accumulator.tile_samples.iter())
        {
            if samples == 0 {
                continue;
            }
            let divider = 1.0 / samples as f32;
            for point in tile.internal_points() {
                let Rgb(sum) = *accumulator.radiance.get_pixel(point.x, point.y);
                mean.put_pixel(point.x, point.y, Rgb(sum.map(|c| c * divider)));
            }
        }

        mean
    }

    /// Tone mapped image of the current state of the render.
    pub fn snapshot(&self) -> RgbImage {
        tone_map(&self.radiance())
    }
}

struct RenderState {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,

    accumulator: Mutex<Accumulator>,

    tile_ordering: Vec<ScreenBlock>,
    work_item_count: usize,
    next_work_item: AtomicUsize,
    finished_work_items: AtomicUsize,
}

/// Sums of radiance samples, shared between workers.
struct Accumulator {
    radiance: Rgb32FImage,
    /// Number of samples per pixel in each tile, indexed like `tile_ordering`
    tile_samples: Vec<u32>,
    /// Number of tiles finished in each pass
    pass_finished_tiles: Vec<usize>,
}

/// One tile in one pass.
struct WorkItem<'a> {
    index: usize,
    pass: usize,
    tile_index: usize,
    tile: &'a ScreenBlock,
}

impl RenderState {
    fn get_next_work_item(&self) -> Option<WorkItem<'_>> {
        let index = self.next_work_item.fetch_add(1, Ordering::AcqRel);
        if index >= self.work_item_count {
            return None;
        }
        let tile_count = self.tile_ordering.len();
        let tile_index = index % tile_count;
        Some(WorkItem {
            index,
            pass: index / tile_count,
            tile_index,
            tile: &self.tile_ordering[tile_index],
        })
    }

    /// Adds a rendered tile to the image sums.
    fn accumulate(&self, item: &WorkItem, buffer: &Rgb32FImage) -> Progress {
        {
            let mut accumulator = self.accumulator.lock().expect("Poisoned lock!");
            for point in item.tile.internal_points() {
                let sample = buffer.get_pixel(point.x - item.tile.min.x, point.y - item.tile.min.y);
                let sum = accumulator.radiance.get_pixel_mut(point.x, point.y);
                for (s, c) in sum.0.iter_mut().zip(sample.0) {
                    *s += c;
                }
            }
            accumulator.tile_samples[item.tile_index] += 1;

            accumulator.pass_finished_tiles[item.pass] += 1;
            if accumulator.pass_finished_tiles[item.pass] == self.tile_ordering.len() {
                log::info!(
                    "Pass {}/{} finished",
                    item.pass + 1,
                    self.settings.iterations
                );
            }
        }

        let finished = self.finished_work_items.fetch_add(1, Ordering::AcqRel) + 1;
        Progress {
            finished,
            total: self.work_item_count,
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            finished: self.finished_work_items.load(Ordering::Acquire),
            total: self.work_item_count,
        }
    }
}
