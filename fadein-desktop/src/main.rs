//! fadein desktop: shows the text reveal animation in a window.
//!
//! Uses `winit` 0.30 for windowing and input and `fadein-render` to
//! present the widget's pixmap through wgpu.
//!
//! ```text
//! fadein-desktop [CONFIG.json] [TEXT]
//! ```
//!
//! `R` restarts the reveal, `Space` pauses/resumes, `Escape` closes.
//! Set `RUST_LOG=debug` (or `trace`) for animation logs.

mod host;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use fadein_core::RevealConfig;
use fadein_render::{GpuContext, RenderError};
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use state::{AppState, DEMO_TEXT};

/// Winit 0.30 application handler.
struct App {
    config: RevealConfig,
    text: String,
    window: Option<Arc<Window>>,
    state: Option<AppState>,
    frame_count: u64,
}

impl App {
    fn new(config: RevealConfig, text: String) -> Self {
        Self {
            config,
            text,
            window: None,
            state: None,
            frame_count: 0,
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.scene.detach();
        }
        info!("window closed after {} frame(s)", self.frame_count);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("fadein")
            .with_inner_size(LogicalSize::new(640, 360))
            .with_min_inner_size(LogicalSize::new(160, 90));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("Failed to create window"),
        );
        let size = window.inner_size();

        let gpu = pollster::block_on(GpuContext::new_with_surface(
            window.clone(),
            size.width.max(1),
            size.height.max(1),
        ))
        .expect("Failed to initialize GPU");

        let state = AppState::new(gpu, window.clone(), &self.config, &self.text);
        info!(
            "fadein desktop initialized: {}x{}, GPU: {}",
            size.width,
            size.height,
            state.gpu.adapter_name
        );

        window.request_redraw();
        self.state = Some(state);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(window), Some(state)) = (self.window.as_ref(), self.state.as_mut()) else {
            return;
        };

        match event {
            // ── Close ───────────────────────────────────────────
            WindowEvent::CloseRequested => self.close(event_loop),

            // ── Keys ────────────────────────────────────────────
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key.as_ref() {
                    Key::Named(NamedKey::Escape) => self.close(event_loop),
                    Key::Named(NamedKey::Space) => {
                        state.scene.toggle_animation();
                    }
                    Key::Character(c) if c.eq_ignore_ascii_case("r") => state.scene.restart(),
                    _ => {}
                }
            }

            // ── Resize ──────────────────────────────────────────
            WindowEvent::Resized(new_size) => {
                state.resize(new_size.width, new_size.height);
                window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                info!("scale factor changed to {scale_factor}");
            }

            // ── Redraw ──────────────────────────────────────────
            WindowEvent::RedrawRequested => match state.render_frame() {
                Ok(stats) => {
                    self.frame_count += 1;
                    if self.frame_count % 300 == 0 {
                        info!(
                            "frame {}: {} byte(s) uploaded, {} draw call(s)",
                            self.frame_count, stats.bytes_uploaded, stats.draw_calls
                        );
                    }
                }
                Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                    state.gpu.reconfigure();
                    window.request_redraw();
                }
                Err(e) => error!("render error: {e}"),
            },

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        match state.pump() {
            Some(wake) => event_loop.set_control_flow(ControlFlow::WaitUntil(wake)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next().map(PathBuf::from) {
        Some(path) => match RevealConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                std::process::exit(2);
            }
        },
        None => RevealConfig::default(),
    };
    let text = args.next().unwrap_or_else(|| DEMO_TEXT.to_owned());

    info!("starting fadein desktop...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, text);
    event_loop.run_app(&mut app).expect("Event loop error");
}
