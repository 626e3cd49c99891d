//! Fixed-step render thread.
//!
//! One thread owns the [`Renderer`] and the [`Scene`]. Each tick it advances
//! the scene, redraws the frame and publishes it through a shared
//! [`Presenter`]; any other thread only ever reads published frames.

use crate::core::color::Color;
use crate::error::{RenderError, Result};
use crate::pipeline::presenter::Presenter;
use crate::pipeline::renderer::{Renderer, validate_dimensions};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest the loop sleeps at once, so a stop request is noticed promptly.
const MAX_IDLE: Duration = Duration::from_millis(2);

/// Scene logic driven by the render loop. The loop is the single writer of
/// camera, lights and mesh transforms between frames.
pub trait Scene {
    /// Advances simulation time by `dt` seconds.
    fn update(&mut self, renderer: &mut Renderer, dt: f32);

    /// Submits this frame's meshes. Called after `clear`.
    fn draw(&mut self, renderer: &mut Renderer);

    fn background(&self) -> Color;
}

/// Runs one update + clear + draw cycle on the calling thread.
pub fn step_frame<S: Scene + ?Sized>(renderer: &mut Renderer, scene: &mut S, dt: f32) {
    scene.update(renderer, dt);
    renderer.clear(scene.background());
    scene.draw(renderer);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    /// Simulation ticks per second; each tick renders one frame.
    pub tick_rate: f32,
    /// Stop on its own after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_frames: None,
        }
    }
}

impl LoopConfig {
    /// Seconds of simulation per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1.0)
    }
}

pub struct RenderLoop;

impl RenderLoop {
    /// Moves `renderer` and `scene` onto a new thread and starts ticking.
    pub fn spawn<S>(renderer: Renderer, scene: S, config: LoopConfig) -> Result<RenderLoopHandle>
    where
        S: Scene + Send + 'static,
    {
        let presenter = Arc::new(Presenter::new());
        let stop = Arc::new(AtomicBool::new(false));
        let frames = Arc::new(AtomicU64::new(0));
        let (resize_tx, resize_rx) = mpsc::channel();

        let worker = Worker {
            renderer,
            presenter: Arc::clone(&presenter),
            stop: Arc::clone(&stop),
            frames: Arc::clone(&frames),
            resizes: resize_rx,
            config,
        };
        let thread = thread::Builder::new()
            .name("render-loop".into())
            .spawn(move || worker.run(scene))?;

        info!(
            "Render loop started at {:.1} Hz{}",
            config.tick_rate,
            config
                .max_frames
                .map(|n| format!(", {} frames", n))
                .unwrap_or_default()
        );

        Ok(RenderLoopHandle {
            presenter,
            stop,
            frames,
            resize_tx,
            thread,
        })
    }
}

struct Worker {
    renderer: Renderer,
    presenter: Arc<Presenter>,
    stop: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
    resizes: Receiver<(usize, usize)>,
    config: LoopConfig,
}

impl Worker {
    fn run<S: Scene>(mut self, mut scene: S) -> Renderer {
        let dt = self.config.dt();
        let period = Duration::from_secs_f32(dt);
        let mut next_tick = Instant::now();

        while !self.stop.load(Ordering::Acquire) {
            if let Some(limit) = self.config.max_frames
                && self.frames.load(Ordering::Acquire) >= limit
            {
                break;
            }

            let now = Instant::now();
            if now < next_tick {
                thread::sleep((next_tick - now).min(MAX_IDLE));
                continue;
            }

            // Resizes land between frames only.
            self.apply_resizes();

            step_frame(&mut self.renderer, &mut scene, dt);
            self.presenter.publish(self.renderer.buffer());
            let count = self.frames.fetch_add(1, Ordering::AcqRel) + 1;
            debug!("Frame {}: {:?}", count, self.renderer.stats());

            next_tick += period;
            // Too far behind: drop the backlog instead of racing to catch up.
            if Instant::now() > next_tick + period * 4 {
                next_tick = Instant::now();
            }
        }

        info!(
            "Render loop stopped after {} frames",
            self.frames.load(Ordering::Acquire)
        );
        self.renderer
    }

    fn apply_resizes(&mut self) {
        // Only the newest request matters.
        if let Some((width, height)) = self.resizes.try_iter().last()
            && let Err(e) = self.renderer.resize(width, height)
        {
            warn!("Ignoring resize request: {}", e);
        }
    }
}

/// Control side of a running [`RenderLoop`].
pub struct RenderLoopHandle {
    presenter: Arc<Presenter>,
    stop: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
    resize_tx: Sender<(usize, usize)>,
    thread: JoinHandle<Renderer>,
}

impl RenderLoopHandle {
    /// Where completed frames appear.
    pub fn presenter(&self) -> Arc<Presenter> {
        Arc::clone(&self.presenter)
    }

    /// Queues a resize for the start of the next frame. Invalid sizes are
    /// rejected here and never reach the render thread.
    pub fn request_resize(&self, width: usize, height: usize) -> Result<()> {
        validate_dimensions(width, height)?;
        if self.resize_tx.send((width, height)).is_err() {
            warn!("Resize to {}x{} dropped: render loop has exited", width, height);
        }
        Ok(())
    }

    /// Frames rendered and published so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Waits for the loop to end on its own (see [`LoopConfig::max_frames`])
    /// and hands the renderer back.
    pub fn join(self) -> Result<Renderer> {
        self.thread.join().map_err(|_| RenderError::LoopPanicked)
    }

    /// Asks the loop to stop before its next frame, then joins it.
    pub fn stop(self) -> Result<Renderer> {
        self.stop.store(true, Ordering::Release);
        self.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::Mesh;

    struct SpinningCube {
        cube: Mesh,
        elapsed: f32,
        updates: usize,
    }

    impl SpinningCube {
        fn new() -> Self {
            Self {
                cube: Mesh::create_cube(2.0).with_color(Color::new(200, 60, 60)),
                elapsed: 0.0,
                updates: 0,
            }
        }
    }

    impl Scene for SpinningCube {
        fn update(&mut self, _renderer: &mut Renderer, dt: f32) {
            self.elapsed += dt;
            self.updates += 1;
            self.cube.transform.rotation.y = self.elapsed;
        }

        fn draw(&mut self, renderer: &mut Renderer) {
            renderer.render(&self.cube);
        }

        fn background(&self) -> Color {
            Color::new(5, 5, 15)
        }
    }

    fn fast(max_frames: Option<u64>) -> LoopConfig {
        LoopConfig {
            tick_rate: 500.0,
            max_frames,
        }
    }

    #[test]
    fn step_frame_clears_to_background() {
        let mut renderer = Renderer::new(16, 16).unwrap();
        let mut scene = SpinningCube::new();
        scene.cube.transform.position.z = -100.0;
        step_frame(&mut renderer, &mut scene, 0.1);
        assert_eq!(scene.updates, 1);
        assert_eq!(renderer.buffer().count_differing(Color::new(5, 5, 15)), 0);
    }

    #[test]
    fn runs_exactly_max_frames() {
        let handle =
            RenderLoop::spawn(Renderer::new(32, 24).unwrap(), SpinningCube::new(), fast(Some(5)))
                .unwrap();
        let presenter = handle.presenter();
        let renderer = handle.join().unwrap();

        assert_eq!(presenter.published_count(), 5);
        let frame = presenter.latest().unwrap();
        assert_eq!(frame.sequence(), 5);
        assert_eq!((frame.width(), frame.height()), (32, 24));
        assert_eq!(renderer.width(), 32);
    }

    #[test]
    fn stop_is_cooperative_and_returns_renderer() {
        let handle =
            RenderLoop::spawn(Renderer::new(8, 8).unwrap(), SpinningCube::new(), fast(None))
                .unwrap();
        while handle.frames() < 2 {
            thread::sleep(Duration::from_millis(1));
        }
        let presenter = handle.presenter();
        let renderer = handle.stop().unwrap();
        assert!(presenter.published_count() >= 2);
        assert_eq!(renderer.height(), 8);
    }

    #[test]
    fn resize_applies_between_frames() {
        let handle =
            RenderLoop::spawn(Renderer::new(8, 8).unwrap(), SpinningCube::new(), fast(None))
                .unwrap();
        let presenter = handle.presenter();
        handle.request_resize(20, 10).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut resized = None;
        while Instant::now() < deadline {
            if let Some(frame) = presenter.latest()
                && frame.width() == 20
            {
                resized = Some(frame);
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        let renderer = handle.stop().unwrap();

        let frame = resized.expect("resized frame was never published");
        assert_eq!(frame.height(), 10);
        assert_eq!(frame.pixels().len(), 200);
        assert_eq!((renderer.width(), renderer.height()), (20, 10));
    }

    #[test]
    fn invalid_resize_is_rejected_at_call_site() {
        let handle =
            RenderLoop::spawn(Renderer::new(8, 8).unwrap(), SpinningCube::new(), fast(Some(1)))
                .unwrap();
        assert!(matches!(
            handle.request_resize(0, 4),
            Err(RenderError::InvalidDimensions { width: 0, height: 4 })
        ));
        let renderer = handle.join().unwrap();
        assert_eq!(renderer.width(), 8);
    }
}
