//! The reveal text widget.
//!
//! A [`RevealTextWidget`] lays its text out once per `set_text`, then a
//! recurring tick moves a sweep edge across the current line. Each draw
//! clips the laid-out text to the rows already revealed plus the swept
//! part of the current row, then runs the post-draw transition that
//! advances to the next line (or stops) once the edge hits the right side.
//!
//! ## Tick ownership
//!
//! The widget lives in an `Rc<RefCell<_>>`. Ticks are posted to the host
//! [`Scheduler`] holding only a `Weak` handle, so a stale tick can never
//! keep a dropped widget alive and never touches a detached one. At most
//! one tick is pending per widget: posting a new one cancels the previous.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::config::{RevealConfig, DEFAULT_SWEEP_DISTANCE, DEFAULT_TICK_INTERVAL_MS};
use crate::geometry::{Rect, Size};
use crate::host::{Canvas, LineBreaker, TextLayout, ViewHost};
use crate::paint::{Color, DisplayMetrics, Paint, DEFAULT_FONT_SIZE_SP};
use crate::scheduler::{Scheduler, TaskId};
use crate::state::{Phase, RevealState, Transition};

/// Shared handle to a widget, as handed out by [`RevealTextWidget::new`].
pub type SharedWidget<B> = Rc<RefCell<RevealTextWidget<B>>>;

/// Size constraint passed down by the host's measure pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeasureSpec {
    /// The parent dictates the size.
    Exactly(f32),
    /// The widget may be at most this large.
    AtMost(f32),
    /// No constraint.
    Unspecified,
}

impl MeasureSpec {
    /// Resolve a dimension that fills whatever space it is offered.
    fn resolve_fill(self, content: f32) -> f32 {
        match self {
            MeasureSpec::Exactly(size) | MeasureSpec::AtMost(size) => size,
            MeasureSpec::Unspecified => content,
        }
    }

    /// Resolve a dimension that wraps its content.
    fn resolve_wrap(self, content: f32) -> f32 {
        match self {
            MeasureSpec::Exactly(size) => size,
            MeasureSpec::AtMost(size) => content.min(size),
            MeasureSpec::Unspecified => content,
        }
    }
}

pub struct RevealTextWidget<B: LineBreaker> {
    line_breaker: B,
    scheduler: Rc<dyn Scheduler>,
    host: Rc<dyn ViewHost>,
    metrics: DisplayMetrics,
    self_ref: Weak<RefCell<RevealTextWidget<B>>>,

    text: Option<String>,
    layout: Option<B::Layout>,
    state: RevealState,

    paint: Paint,
    font_size_sp: f32,
    sweep_distance: f32,
    tick_interval: Duration,

    size: Size,
    /// Shared with the posted tick so a retried tick can record its id.
    pending_tick: TickSlot,
    attached: bool,
}

impl<B: LineBreaker + 'static> RevealTextWidget<B> {
    /// Create an attached widget with the default style: anti-aliased red
    /// text at 18sp, sweeping 36px every 18ms.
    pub fn new(
        line_breaker: B,
        scheduler: Rc<dyn Scheduler>,
        host: Rc<dyn ViewHost>,
        metrics: DisplayMetrics,
    ) -> SharedWidget<B> {
        Rc::new_cyclic(|self_ref| {
            RefCell::new(Self {
                line_breaker,
                scheduler,
                host,
                metrics,
                self_ref: self_ref.clone(),
                text: None,
                layout: None,
                state: RevealState::default(),
                paint: Paint {
                    color: Color::RED,
                    text_size: metrics.scale_font_size(DEFAULT_FONT_SIZE_SP),
                    anti_alias: true,
                },
                font_size_sp: DEFAULT_FONT_SIZE_SP,
                sweep_distance: DEFAULT_SWEEP_DISTANCE,
                tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
                size: Size::default(),
                pending_tick: Rc::new(Cell::new(None)),
                attached: true,
            })
        })
    }

    // ---------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------

    /// Replace the text and restart the reveal from the first line.
    ///
    /// Empty text is ignored and leaves the current content on screen.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            debug!("set_text: empty text ignored, keeping current content");
            return;
        }

        let max_width = self.layout_width();
        let layout = self.line_breaker.layout(&text, &self.paint, max_width);
        self.state = RevealState::new(layout.line_count(), layout.height());
        debug!(
            "set_text: {} line(s) at width {max_width}, line height {}",
            self.state.line_count(),
            self.state.line_height()
        );

        self.layout = Some(layout);
        self.text = Some(text);
        self.host.request_layout();

        if self.state.line_count() > 0 {
            self.schedule_tick();
        }
    }

    // ---------------------------------------------------------------
    // Style / timing
    // ---------------------------------------------------------------

    pub fn set_text_color(&mut self, color: Color) {
        self.paint.color = color;
    }

    /// Set the font size in scale-independent units. The line metrics of
    /// the current text are refreshed at the next `set_text` or resize.
    pub fn set_font_size(&mut self, sp: f32) {
        self.font_size_sp = sp;
        self.paint.text_size = self.metrics.scale_font_size(sp);
    }

    /// Pixels the sweep edge moves per tick.
    pub fn set_sweep_distance(&mut self, px: f32) {
        self.sweep_distance = px;
    }

    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
    }

    pub fn apply_config(&mut self, config: &RevealConfig) {
        self.set_text_color(config.text_color);
        self.set_font_size(config.font_size_sp);
        self.set_sweep_distance(config.sweep_distance);
        self.set_tick_interval(config.tick_interval());
    }

    /// New display metrics (e.g. the window moved to another monitor).
    pub fn set_display_metrics(&mut self, metrics: DisplayMetrics) {
        self.metrics = metrics;
        self.paint.text_size = metrics.scale_font_size(self.font_size_sp);
    }

    // ---------------------------------------------------------------
    // Animation
    // ---------------------------------------------------------------

    /// Advance the sweep by one step, request a redraw and schedule the
    /// next tick. Also the recurring tick handler.
    pub fn start_animation(&mut self) {
        if self.text.is_none() {
            self.stop_animation();
            return;
        }

        self.state.sweep(self.sweep_distance);
        trace!(
            "tick: line {}/{} clip_x {}",
            self.state.current_line(),
            self.state.line_count(),
            self.state.clip_x()
        );
        self.host.invalidate();
        self.schedule_tick();
    }

    /// Cancel the pending tick, if any. Progress is kept, so a later
    /// `start_animation` resumes where this left off.
    pub fn stop_animation(&mut self) {
        if let Some(id) = self.pending_tick.take() {
            self.scheduler.cancel(id);
            debug!("animation stopped at line {}", self.state.current_line());
        }
    }

    fn schedule_tick(&mut self) {
        if let Some(id) = self.pending_tick.take() {
            self.scheduler.cancel(id);
        }
        let id = post_tick(
            &self.scheduler,
            self.tick_interval,
            self.self_ref.clone(),
            self.pending_tick.clone(),
        );
        self.pending_tick.set(Some(id));
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    pub fn on_attach(&mut self) {
        self.attached = true;
    }

    /// Detach from the surface. Cancels the pending tick; any tick that
    /// still fires afterwards is ignored.
    pub fn on_detach(&mut self) {
        self.attached = false;
        self.stop_animation();
    }

    /// Measure pass: fill the offered width, wrap the laid-out height.
    pub fn measure(&self, width_spec: MeasureSpec, height_spec: MeasureSpec) -> Size {
        let content = self
            .layout
            .as_ref()
            .map(|layout| Size::new(layout.width(), layout.height()))
            .unwrap_or_default();
        Size::new(
            width_spec.resolve_fill(content.width),
            height_spec.resolve_wrap(content.height),
        )
    }

    /// New bounds from the host. A width change re-wraps the current text
    /// without losing reveal progress.
    pub fn on_size_changed(&mut self, width: f32, height: f32) {
        let width_changed = width != self.size.width;
        self.size = Size::new(width, height);
        if !width_changed {
            return;
        }

        if let Some(text) = self.text.as_deref() {
            let layout = self.line_breaker.layout(text, &self.paint, width);
            self.state.relayout(layout.line_count(), layout.height());
            debug!(
                "relayout at width {width}: {} line(s), at line {}",
                self.state.line_count(),
                self.state.current_line()
            );
            self.layout = Some(layout);
        }
    }

    /// Draw the text through the reveal clip, then run the post-draw
    /// transition.
    pub fn draw<C>(&mut self, canvas: &mut C)
    where
        C: Canvas<B::Layout> + ?Sized,
    {
        let width = self.size.width;
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        if width <= 0.0 {
            return;
        }

        self.state.clamp_sweep(width);
        let region = self.state.clip_region(Rect::from_size(self.size));

        canvas.save();
        canvas.clip_region(&region);
        canvas.draw_text_layout(layout, &self.paint);
        canvas.restore();

        self.finish_frame(width);
    }

    fn finish_frame(&mut self, width: f32) {
        let transition = self.state.advance(width);
        match transition {
            Transition::None => {}
            Transition::NextLine { next } => {
                trace!("line {} revealed, sweeping line {next}", next - 1);
            }
            Transition::Completed => {
                info!("reveal complete: {} line(s)", self.state.line_count());
            }
            Transition::Settled => {}
        }
        if transition.stops_animation() {
            self.stop_animation();
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn layout(&self) -> Option<&B::Layout> {
        self.layout.as_ref()
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn current_line(&self) -> usize {
        self.state.current_line()
    }

    pub fn clip_x(&self) -> f32 {
        self.state.clip_x()
    }

    pub fn line_count(&self) -> usize {
        self.state.line_count()
    }

    pub fn line_height(&self) -> f32 {
        self.state.line_height()
    }

    pub fn phase(&self) -> Phase {
        if self.text.is_none() || self.state.line_count() == 0 {
            Phase::Idle
        } else if self.state.is_complete() {
            Phase::Complete
        } else {
            Phase::Revealing
        }
    }

    /// Whether a tick is pending.
    pub fn is_animating(&self) -> bool {
        self.pending_tick.get().is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size)
    }

    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    pub fn font_size_sp(&self) -> f32 {
        self.font_size_sp
    }

    pub fn sweep_distance(&self) -> f32 {
        self.sweep_distance
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn line_breaker_mut(&mut self) -> &mut B {
        &mut self.line_breaker
    }

    /// Width used for line breaking. Before the first size change this
    /// falls back to the display width.
    fn layout_width(&self) -> f32 {
        if self.size.width > 0.0 {
            self.size.width
        } else if self.metrics.width_pixels > 0 {
            self.metrics.width_pixels as f32
        } else {
            f32::INFINITY
        }
    }
}

type TickSlot = Rc<Cell<Option<TaskId>>>;

fn post_tick<B: LineBreaker + 'static>(
    scheduler: &Rc<dyn Scheduler>,
    delay: Duration,
    target: Weak<RefCell<RevealTextWidget<B>>>,
    slot: TickSlot,
) -> TaskId {
    let retry_with = scheduler.clone();
    scheduler.post_delayed(
        delay,
        Box::new(move || run_tick(&target, &slot, &retry_with, delay)),
    )
}

/// Body of a scheduled tick.
///
/// A tick that finds the widget borrowed is posted again after the same
/// delay, so the pending id in `slot` always names a task that will run.
fn run_tick<B: LineBreaker + 'static>(
    target: &Weak<RefCell<RevealTextWidget<B>>>,
    slot: &TickSlot,
    scheduler: &Rc<dyn Scheduler>,
    delay: Duration,
) {
    let Some(widget) = target.upgrade() else {
        trace!("tick for a dropped widget ignored");
        return;
    };
    let Ok(mut widget) = widget.try_borrow_mut() else {
        warn!("tick skipped: widget is borrowed, retrying in {delay:?}");
        let id = post_tick(scheduler, delay, target.clone(), slot.clone());
        slot.set(Some(id));
        return;
    };
    slot.set(None);
    if !widget.attached {
        debug!("tick for a detached widget ignored");
        return;
    }
    widget.start_animation();
}

// ===================================================================
// Tests
// ===================================================================
