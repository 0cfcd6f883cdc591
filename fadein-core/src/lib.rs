//! # fadein-core
//!
//! A text widget that reveals its content with an animated clip: a sweep
//! edge crosses each line left to right, then moves down to the next line,
//! until the whole text is visible.
//!
//! ## Architecture
//!
//! ```text
//!  set_text ──► LineBreaker::layout ──► RevealState (line metrics)
//!                                            │
//!  Scheduler tick ──► start_animation ───────┤ clip_x += sweep
//!        ▲                 │                 │
//!        └── post_delayed ─┘                 ▼
//!                               draw: clip_region ──► Canvas
//!                                     advance      ──► next line / stop
//! ```
//!
//! - **`widget`**: [`RevealTextWidget`], the public API and lifecycle hooks.
//! - **`state`**: the reveal state machine and clip geometry.
//! - **`host`**: traits for services the host toolkit provides.
//! - **`scheduler`**: [`MessageQueue`], a UI-thread deferred-callback queue.
//! - **`config`**: JSON-loadable style/timing knobs.

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod paint;
pub mod scheduler;
pub mod state;
pub mod widget;

// Re-exports for ergonomic use.
pub use config::RevealConfig;
pub use error::ConfigError;
pub use geometry::{ClipRegion, Rect, Size};
pub use host::{Canvas, LineBreaker, TextLayout, ViewHost};
pub use paint::{Color, DisplayMetrics, Paint};
pub use scheduler::{MessageQueue, Scheduler, Task, TaskId};
pub use state::{Phase, RevealState, Transition};
pub use widget::{MeasureSpec, RevealTextWidget, SharedWidget};
