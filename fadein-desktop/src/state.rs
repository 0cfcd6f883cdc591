//! Application state: owns the widget, its message queue and the
//! canvas → GPU presentation path.
//!
//! [`RevealScene`] is everything that runs without a GPU (widget, queue,
//! host, pixmap) so it can be exercised headless; [`AppState`] adds the
//! `GpuContext` and `Renderer` for the window.

use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fadein_core::{
    Color, DisplayMetrics, MeasureSpec, MessageQueue, RevealConfig, RevealTextWidget,
    SharedWidget,
};
use fadein_render::{FrameStats, GpuContext, PixmapCanvas, RenderError, Renderer};
use fadein_text::TextEngine;
use log::{debug, info};
use winit::window::Window;

use crate::host::WindowHost;

/// Shown when no text is given on the command line.
pub const DEMO_TEXT: &str = "Text fades in one line at a time. A clip edge sweeps \
    across each line from left to right, and once it reaches the far side the \
    next line begins. Press R to start over or Space to pause and resume.";

/// Widget, queue and pixmap for one window.
pub struct RevealScene {
    pub widget: SharedWidget<TextEngine>,
    pub queue: MessageQueue,
    pub host: Rc<WindowHost>,
    pub canvas: PixmapCanvas,
    background: Color,
}

impl RevealScene {
    /// Build a widget sized to `metrics`, apply `config` and start
    /// revealing `text`.
    pub fn new(
        host: Rc<WindowHost>,
        metrics: DisplayMetrics,
        config: &RevealConfig,
        text: &str,
    ) -> Self {
        let queue = MessageQueue::new();
        let widget = RevealTextWidget::new(
            TextEngine::new(),
            Rc::new(queue.clone()),
            host.clone(),
            metrics,
        );
        {
            let mut w = widget.borrow_mut();
            w.apply_config(config);
            w.on_size_changed(metrics.width_pixels as f32, metrics.height_pixels as f32);
            w.set_text(text);
        }

        Self {
            widget,
            queue,
            host,
            canvas: PixmapCanvas::new(metrics.width_pixels, metrics.height_pixels),
            background: Color::WHITE,
        }
    }

    /// Run every tick due at `now` (time since start).
    pub fn run_due(&self, now: Duration) -> usize {
        let ran = self.queue.run_until(now);
        if self.host.take_layout_request() {
            let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
            let measured = self
                .widget
                .borrow()
                .measure(MeasureSpec::Exactly(w), MeasureSpec::AtMost(h));
            debug!("measured {}x{} in {w}x{h}", measured.width, measured.height);
        }
        ran
    }

    /// When the next tick is due, relative to start.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
        self.widget
            .borrow_mut()
            .on_size_changed(width as f32, height as f32);
    }

    /// Paint the background and the widget into the pixmap.
    pub fn draw(&mut self) {
        self.host.take_redraw();
        self.canvas.clear(self.background);
        self.widget.borrow_mut().draw(&mut self.canvas);
    }

    /// Reveal the current text again from the first line.
    pub fn restart(&self) {
        let text = self.widget.borrow().text().map(str::to_owned);
        if let Some(text) = text {
            info!("restarting reveal");
            self.widget.borrow_mut().set_text(text);
        }
    }

    /// Pause a running reveal or resume a paused one. Returns whether the
    /// animation is running afterwards.
    pub fn toggle_animation(&self) -> bool {
        let mut widget = self.widget.borrow_mut();
        if widget.is_animating() {
            widget.stop_animation();
        } else {
            widget.start_animation();
        }
        debug!("animation {}", if widget.is_animating() { "resumed" } else { "paused" });
        widget.is_animating()
    }

    /// Tear down before the window closes.
    pub fn detach(&self) {
        self.widget.borrow_mut().on_detach();
        self.host.release_window();
    }
}

/// Owns the whole application pipeline for one window.
pub struct AppState {
    pub gpu: GpuContext,
    pub renderer: Renderer,
    pub scene: RevealScene,
    started: Instant,
}

impl AppState {
    pub fn new(gpu: GpuContext, window: Arc<Window>, config: &RevealConfig, text: &str) -> Self {
        let size = window.inner_size();
        let scale = window.scale_factor() as f32;
        let metrics = DisplayMetrics {
            density: scale,
            scaled_density: scale,
            width_pixels: size.width.max(1),
            height_pixels: size.height.max(1),
        };

        let renderer = Renderer::new(&gpu);
        let host = Rc::new(WindowHost::new(window));
        let scene = RevealScene::new(host, metrics, config, text);
        info!(
            "scene ready: {} line(s) at {}x{}, scale {scale}",
            scene.widget.borrow().line_count(),
            metrics.width_pixels,
            metrics.height_pixels
        );

        Self {
            gpu,
            renderer,
            scene,
            started: Instant::now(),
        }
    }

    /// Run due ticks and return when the event loop should wake next.
    pub fn pump(&self) -> Option<Instant> {
        let ran = self.scene.run_due(self.started.elapsed());
        if ran > 0 {
            log::trace!("ran {ran} task(s)");
        }
        self.scene.next_deadline().map(|deadline| self.started + deadline)
    }

    /// Draw the widget and present it.
    pub fn render_frame(&mut self) -> Result<FrameStats, RenderError> {
        self.scene.draw();
        self.renderer.present(&self.gpu, &self.scene.canvas)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.scene.resize(width, height);
    }
}

// ===================================================================
// Tests
// ===================================================================
