use clap::Parser;
use log::{error, info, warn};
use softrender::Result;
use softrender::core::rasterizer::CullMode;
use softrender::io::config::Config;
use softrender::io::image::save_frame;
use softrender::pipeline::presenter::Frame;
use softrender::pipeline::render_loop::{LoopConfig, RenderLoop, step_frame};
use softrender::pipeline::renderer::{DepthMode, Renderer};
use softrender::scene::showcase::{SceneMode, Showcase};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "softrender", version)]
#[command(about = "Software-rasterized animated showcase scenes, rendered to an image")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scene to render
    #[arg(short, long, value_enum)]
    mode: Option<SceneMode>,

    /// Fixed ticks to simulate before saving (offline mode)
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Output image path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Stroke triangle edges instead of filling
    #[arg(long)]
    wireframe: bool,

    /// Sort whole triangles back to front instead of depth-testing pixels
    #[arg(long)]
    painter: bool,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Run the threaded render loop for this many seconds and save the
    /// last published frame
    #[arg(long, value_name = "SECS")]
    realtime: Option<f32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    let mut renderer = build_renderer(&config)?;
    Showcase::install_lighting(&mut renderer);
    let scene = Showcase::new(config.scene.mode, config.scene.seed)
        .with_camera_orbit(config.scene.camera_height, config.scene.camera_distance)
        .with_background(config.render.background());

    let start = Instant::now();
    let frame = match cli.realtime {
        Some(secs) => render_realtime(renderer, scene, &config, secs)?,
        None => render_offline(&mut renderer, scene, &config),
    };
    info!("Rendering finished in {:.2?}", start.elapsed());

    save_frame(&frame, &config.output.path)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.scene.mode = mode;
    }
    if let Some(frames) = cli.frames {
        config.output.frames = frames;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(width) = cli.width {
        config.render.width = width;
    }
    if let Some(height) = cli.height {
        config.render.height = height;
    }
    if cli.wireframe {
        config.render.wireframe = true;
    }
    if cli.painter {
        config.render.depth_mode = "painter".to_string();
    }
}

fn build_renderer(config: &Config) -> Result<Renderer> {
    let render = &config.render;
    let mut renderer = Renderer::new(render.width, render.height)?;
    let camera = renderer.camera().with_fov(render.fov.to_radians());
    renderer.set_camera(camera);
    renderer.set_wireframe_mode(render.wireframe);
    renderer.set_cull_mode(render.cull_mode());
    renderer.set_depth_mode(render.depth_mode());

    info!(
        "Renderer {}x{}, fov {:.0}°, {}, {}{}",
        render.width,
        render.height,
        render.fov,
        match render.depth_mode() {
            DepthMode::ZBuffer => "z-buffer",
            DepthMode::Painter => "painter's algorithm",
        },
        match render.cull_mode() {
            CullMode::Back => "back-face culling",
            CullMode::None => "no culling",
        },
        if render.wireframe { ", wireframe" } else { "" }
    );
    Ok(renderer)
}

/// Steps the scene on this thread at the configured tick rate.
fn render_offline(renderer: &mut Renderer, mut scene: Showcase, config: &Config) -> Arc<Frame> {
    let frames = config.output.frames.max(1);
    let dt = 1.0 / config.output.tick_rate.max(1.0);
    info!("Simulating {} ticks of '{}'", frames, scene.mode());

    for _ in 0..frames {
        step_frame(renderer, &mut scene, dt);
    }
    let frame = Frame::capture(renderer.buffer(), frames);
    let stats = renderer.stats();
    info!(
        "Last frame: {} meshes, {} triangles submitted, {} culled, {} rasterized",
        stats.meshes, stats.submitted, stats.culled, stats.rasterized
    );
    Arc::new(frame)
}

fn render_realtime(
    renderer: Renderer,
    scene: Showcase,
    config: &Config,
    secs: f32,
) -> Result<Arc<Frame>> {
    let loop_config = LoopConfig {
        tick_rate: config.output.tick_rate,
        max_frames: None,
    };
    let handle = RenderLoop::spawn(renderer, scene, loop_config)?;
    let presenter = handle.presenter();

    thread::sleep(Duration::from_secs_f32(secs.max(0.0)));

    let frames = handle.frames();
    let mut renderer = handle.stop()?;
    info!(
        "Render loop produced {} frames ({:.1} fps)",
        frames,
        frames as f32 / secs.max(f32::EPSILON)
    );

    match presenter.latest() {
        Some(frame) => Ok(frame),
        None => {
            warn!("No frame was published; saving the renderer's current buffer");
            Ok(Arc::new(Frame::capture(renderer.buffer(), 0)))
        }
    }
}
