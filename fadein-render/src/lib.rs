//! # fadein-render
//!
//! Drawing backend for the reveal widget.
//!
//! ```text
//!  RevealTextWidget::draw
//!       │  save / clip_region / draw_text_layout / restore
//!       ▼
//!  PixmapCanvas (CPU, RGBA8)          ◀─── clip stack, glyph blending
//!       │
//!       ▼
//!  Renderer.present(&gpu, &canvas)    ◀─── texture upload + one quad
//! ```
//!
//! ## Crate modules
//!
//! - [`canvas`]: software canvas implementing [`fadein_core::Canvas`]
//! - [`context`]: GPU device/queue/surface initialisation
//! - [`vertex`]: quad vertex type
//! - [`pipelines`]: wgpu present pipeline
//! - [`renderer`]: per-frame upload and presentation

pub mod canvas;
pub mod context;
pub mod pipelines;
pub mod renderer;
pub mod vertex;

pub use canvas::PixmapCanvas;
pub use context::{GpuContext, GpuError};
pub use renderer::{FrameStats, RenderError, Renderer};
