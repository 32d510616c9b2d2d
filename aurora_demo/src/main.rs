//! Aurora demo - clears a window every frame with a runtime-selected backend
//!
//! Usage: `aurora_demo [vulkan|dx11|dx12]` (Vulkan when omitted)

use std::process::ExitCode;
use std::time::{Duration, Instant};

use aurora_rhi::aurora::rhi::{BackendRegistry, RenderApi, WindowTarget};
use aurora_rhi::aurora::{Error, Renderer, RendererConfig, Result};
use aurora_rhi::glam::Vec4;
use aurora_rhi::{engine_error, engine_info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const SOURCE: &str = "aurora::demo";
const FPS_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Window, renderer and frame pacing
///
/// The renderer is declared before the window so it is dropped first.
struct DemoApp {
    registry: BackendRegistry,
    config: RendererConfig,
    renderer: Option<Renderer>,
    window: Option<Window>,
    next_frame: Instant,
    report_start: Instant,
    report_frames: u64,
    fatal: Option<Error>,
}

impl DemoApp {
    fn new(config: RendererConfig) -> Self {
        let mut registry = BackendRegistry::new();
        aurora_rhi_vulkan::register(&mut registry);
        aurora_rhi_d3d::register(&mut registry);

        let now = Instant::now();
        Self {
            registry,
            config,
            renderer: None,
            window: None,
            next_frame: now,
            report_start: now,
            report_frames: 0,
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(format!("Aurora - {}", self.config.render_api))
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| Error::InitializationFailed(format!("window creation failed: {}", e)))?;

        let target = WindowTarget::from_winit(&window)?;
        let renderer = Renderer::new(&self.registry, self.config.clone(), &target)?;
        match renderer.fps_limit() {
            Some(limit) => engine_info!(SOURCE, "Frame rate limited to {} Hz", limit),
            None => engine_info!(SOURCE, "Frame rate unlimited"),
        }

        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    /// Log the error, remember it for the exit code and stop the loop
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        engine_error!(SOURCE, "Fatal: {}", error);
        self.fatal = Some(error);
        self.renderer = None;
        event_loop.exit();
    }

    fn frame(&mut self) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let now = Instant::now();
        let t = renderer.frame_count() as f32 / 120.0;
        renderer.set_clear_color(Vec4::new(
            0.5 + 0.4 * t.sin(),
            0.5 + 0.4 * (t + 2.1).sin(),
            0.5 + 0.4 * (t + 4.2).sin(),
            1.0,
        ));
        renderer.render_frame()?;

        if let Some(limit) = renderer.fps_limit() {
            self.next_frame = now + Duration::from_secs_f64(1.0 / limit as f64);
        }

        self.report_frames += 1;
        let elapsed = now.duration_since(self.report_start);
        if elapsed >= FPS_REPORT_INTERVAL {
            engine_info!(SOURCE, "{:.1} FPS", self.report_frames as f64 / elapsed.as_secs_f64());
            self.report_start = now;
            self.report_frames = 0;
        }
        Ok(())
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    if let Err(e) = renderer.resize(size.width, size.height) {
                        self.fail(event_loop, e);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let limited = self.renderer.as_ref().and_then(Renderer::fps_limit).is_some();
        if !limited {
            event_loop.set_control_flow(ControlFlow::Poll);
            window.request_redraw();
        } else if Instant::now() >= self.next_frame {
            window.request_redraw();
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.take() {
            engine_info!(SOURCE, "Exiting after {} frames", renderer.frame_count());
        }
    }
}

fn parse_render_api() -> Result<RenderApi> {
    match std::env::args().nth(1) {
        Some(arg) => arg.parse(),
        None => Ok(RenderApi::default()),
    }
}

fn main() -> ExitCode {
    let render_api = match parse_render_api() {
        Ok(api) => api,
        Err(e) => {
            engine_error!(SOURCE, "{}", e);
            eprintln!("usage: aurora_demo [vulkan|dx11|dx12]");
            return ExitCode::from(2);
        }
    };

    let mut config = RendererConfig { render_api, ..Default::default() };
    config.device.app_name = "Aurora Demo".to_string();
    config.device.enable_debug_layer = cfg!(debug_assertions);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!(SOURCE, "Event loop creation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut app = DemoApp::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!(SOURCE, "Event loop error: {}", e);
        return ExitCode::FAILURE;
    }

    match app.fatal {
        Some(_) => ExitCode::FAILURE,
        None => ExitCode::SUCCESS,
    }
}
