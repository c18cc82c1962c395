use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use orbit_scene::{
    AnimationLoop, Cli, FpsCounter, GpuRenderer, HeadlessBackend, PointerInput, SceneConfig,
    SceneRuntime, StopHandle, Viewport,
};

const FPS_UPDATE_INTERVAL: f32 = 1.0;

// === Application ===

struct App {
    config: SceneConfig,
    initial_size: (u32, u32),
    window: Option<Arc<Window>>,
    runtime: Option<SceneRuntime<GpuRenderer>>,
    input: PointerInput,
    animation: AnimationLoop,
    stop: StopHandle,
    fps: FpsCounter,
}

impl App {
    fn new(config: SceneConfig, initial_size: (u32, u32), animation: AnimationLoop) -> Self {
        let stop = animation.stop_handle();
        Self {
            config,
            initial_size,
            window: None,
            runtime: None,
            input: PointerInput::new(),
            animation,
            stop,
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = self.initial_size;
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Orbit Scene")
                    .with_inner_size(winit::dpi::LogicalSize::new(width, height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;
        let runtime = SceneRuntime::new(&self.config, Viewport::from(window.inner_size()), renderer)?;

        self.window = Some(window);
        self.runtime = Some(runtime);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("Failed to start scene: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.input.process_event(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.stop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(runtime) = &mut self.runtime {
                    runtime.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(frame) = self.animation.next_frame() else {
                    event_loop.exit();
                    return;
                };
                if let Some(fps) = self.fps.record(frame.delta) {
                    log::info!("FPS: {:.1}", fps);
                }

                if let Some(runtime) = &mut self.runtime {
                    let height = runtime.viewport().height;
                    let (controls, camera) = runtime.controls_mut();
                    self.input.apply(controls, camera, height);
                    runtime.tick();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.animation.is_finished() {
            event_loop.exit();
        } else if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run_headless(config: &SceneConfig, cli: &Cli) -> Result<()> {
    let mut runtime = SceneRuntime::new(
        config,
        Viewport::new(cli.width, cli.height),
        HeadlessBackend::new(),
    )?;
    let mut animation = AnimationLoop::new().with_frame_limit(cli.frames.unwrap_or(600));

    let ticks = animation.run(&mut runtime);
    log::info!(
        "Headless run finished: {} frames drawn, environment {:?}",
        ticks,
        runtime.environment_status()
    );
    for (i, object) in runtime.objects().iter().enumerate() {
        log::info!(
            "  object {} ({}): rotation ({:.3}, {:.3})",
            i,
            object.material.kind.name(),
            object.transform.rotation.x,
            object.transform.rotation.y
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.scene_config().context("Invalid scene configuration")?;

    if cli.headless {
        return run_headless(&config, &cli);
    }

    let event_loop = EventLoop::new()?;
    let animation = match cli.frames {
        Some(limit) => AnimationLoop::new().with_frame_limit(limit),
        None => AnimationLoop::new(),
    };
    let mut app = App::new(config, (cli.width, cli.height), animation);

    log::info!("Orbit Scene - drag to orbit, right-drag to pan, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
