mod audio;
#[cfg(feature = "camera")]
mod camera;
#[cfg(feature = "camera")]
mod detector;
mod frame;
mod input;
mod music_file;
mod render;

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use pinch_core::{GameConfig, GameSession};
use winit::dpi::LogicalSize;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use crate::frame::FrameContext;
use crate::input::KeyAction;
use crate::render::GpuState;

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(err) = run() {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = GameConfig::default();
    let timbre = config.timbre;
    let session = GameSession::new(config).context("invalid game configuration")?;

    #[cfg(feature = "camera")]
    let tracker = detector::HandTracker::open(Path::new(detector::MODEL_PATH))?;
    #[cfg(not(feature = "camera"))]
    log::info!("[input] built without camera support, use D F J K to play");

    let music = music_file::discover(Path::new("."));
    let audio = audio::AudioOutput::start(music, timbre);

    let layout = session.layout().clone();
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(frame::WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(layout.width, layout.height))
        .build(&event_loop)
        .context("could not create window")?;

    let mut gpu = pollster::block_on(GpuState::new(&window, &layout))?;
    let mut ctx = FrameContext::new(
        session,
        audio,
        #[cfg(feature = "camera")]
        tracker,
    );
    let start = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => gpu.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::Focused(false),
            ..
        } => ctx.keys.clear(),
        Event::WindowEvent {
            event: WindowEvent::KeyboardInput { event, .. },
            ..
        } => {
            if event.repeat {
                return;
            }
            if let Some(KeyAction::Quit) = ctx.keys.handle(&event) {
                elwt.exit();
            }
        }
        Event::AboutToWait => {
            ctx.frame();
            if let Some(title) = ctx.take_title_update() {
                gpu.window.set_title(title);
            }
            match gpu.render(&ctx.instances(), start.elapsed().as_secs_f32()) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        Event::LoopExiting => {
            let s = ctx.session.state();
            log::info!(
                "final score {} | max combo {} | hits {} | misses {} | accuracy {:.0}%",
                s.score,
                s.max_combo,
                s.hits,
                s.misses,
                s.accuracy() * 100.0
            );
        }
        _ => {}
    })?;
    Ok(())
}
