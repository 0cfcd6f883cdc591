//! Frame presenter: uploads the software pixmap and draws it to the
//! window surface (or an off-screen texture).

use thiserror::Error;
use wgpu::{
    Color, CommandEncoderDescriptor, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureViewDescriptor,
};

use crate::canvas::PixmapCanvas;
use crate::context::GpuContext;
use crate::pipelines::PresentPipeline;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("No surface configured (headless mode)")]
    NoSurface,
}

/// Frame statistics returned after each present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Pixmap bytes copied to the GPU.
    pub bytes_uploaded: usize,
    /// Number of draw calls.
    pub draw_calls: u32,
}

/// Presents a [`PixmapCanvas`] each frame.
///
/// ```ignore
/// let mut renderer = Renderer::new(&gpu);
/// widget.borrow_mut().draw(&mut canvas);
/// let stats = renderer.present(&gpu, &canvas)?;
/// ```
pub struct Renderer {
    present_pipeline: PresentPipeline,
    clear_color: Color,
    quad_uploaded: bool,
}

impl Renderer {
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            present_pipeline: PresentPipeline::new(&gpu.device, gpu.surface_format),
            clear_color: Color::WHITE,
            quad_uploaded: false,
        }
    }

    /// Color shown where no pixmap has been uploaded yet.
    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = Color { r, g, b, a };
    }

    fn prepare(&mut self, gpu: &GpuContext, pixmap: &PixmapCanvas) -> usize {
        if !self.quad_uploaded {
            self.present_pipeline.upload_quad(&gpu.queue);
            self.quad_uploaded = true;
        }
        self.present_pipeline.upload_pixmap(&gpu.device, &gpu.queue, pixmap)
    }

    fn encode(&self, gpu: &GpuContext, target: &wgpu::TextureView) -> u32 {
        let mut encoder = gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("fadein_frame_encoder"),
        });

        let drew = {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("fadein_present_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.present_pipeline.draw(&mut pass)
        };

        gpu.queue.submit(std::iter::once(encoder.finish()));
        u32::from(drew)
    }

    /// Upload `pixmap` and draw it to the window surface.
    pub fn present(&mut self, gpu: &GpuContext, pixmap: &PixmapCanvas) -> Result<FrameStats, RenderError> {
        let surface = gpu.surface.as_ref().ok_or(RenderError::NoSurface)?;
        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());

        let bytes_uploaded = self.prepare(gpu, pixmap);
        let draw_calls = self.encode(gpu, &view);
        output.present();

        Ok(FrameStats {
            bytes_uploaded,
            draw_calls,
        })
    }

    /// Upload `pixmap` and draw it into `target_view` (headless mode).
    pub fn render_to_texture(
        &mut self,
        gpu: &GpuContext,
        pixmap: &PixmapCanvas,
        target_view: &wgpu::TextureView,
    ) -> FrameStats {
        let bytes_uploaded = self.prepare(gpu, pixmap);
        FrameStats {
            bytes_uploaded,
            draw_calls: self.encode(gpu, target_view),
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
