//! Present pipeline: uploads the software pixmap to a texture and draws
//! it as one full-surface quad.

use log::debug;
use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, Buffer,
    BufferDescriptor, BufferUsages, ColorTargetState, ColorWrites, Device, Extent3d, FilterMode,
    FragmentState, FrontFace, IndexFormat, MultisampleState, PipelineCompilationOptions,
    PipelineLayoutDescriptor, PolygonMode, PrimitiveState, PrimitiveTopology, Queue, RenderPass,
    RenderPipeline, RenderPipelineDescriptor, Sampler, SamplerBindingType, SamplerDescriptor,
    ShaderModuleDescriptor, ShaderStages, Texture, TextureDescriptor, TextureDimension,
    TextureFormat, TextureSampleType, TextureUsages, TextureViewDimension, VertexState,
};

use crate::canvas::PixmapCanvas;
use crate::vertex::QuadVertex;

/// Owns the pipeline, quad buffers and the pixmap texture.
pub struct PresentPipeline {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    texture_bgl: BindGroupLayout,
    sampler: Sampler,
    /// Created on first upload, recreated when the pixmap size changes.
    texture: Option<(Texture, BindGroup)>,
    texture_size: (u32, u32),
}

impl PresentPipeline {
    pub fn new(device: &Device, surface_format: TextureFormat) -> Self {
        // ── Shader ──────────────────────────────────────────────
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("present_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/present.wgsl").into()),
        });

        // ── Texture bind group layout (group 0) ─────────────────
        let texture_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("present_texture_bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("present_pipeline_layout"),
            bind_group_layouts: &[&texture_bgl],
            push_constant_ranges: &[],
        });

        // ── Render pipeline ─────────────────────────────────────
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("present_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ── Quad buffers ────────────────────────────────────────
        let vertex_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("present_quad_vb"),
            size: std::mem::size_of::<[QuadVertex; 4]>() as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("present_quad_ib"),
            size: std::mem::size_of::<[u16; 6]>() as u64,
            usage: BufferUsages::INDEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Pixmap pixels map 1:1 to surface pixels; nearest keeps glyph
        // edges crisp.
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("present_sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            texture_bgl,
            sampler,
            texture: None,
            texture_size: (0, 0),
        }
    }

    // ───────────────────── Upload ─────────────────────────────────

    /// Upload the static quad geometry. Call once after creation.
    pub fn upload_quad(&self, queue: &Queue) {
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&QuadVertex::VERTICES));
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&QuadVertex::INDICES));
    }

    /// Copy the pixmap into the texture, (re)creating it on a size change.
    ///
    /// Returns the number of bytes written; zero for an empty pixmap.
    pub fn upload_pixmap(&mut self, device: &Device, queue: &Queue, pixmap: &PixmapCanvas) -> usize {
        let (width, height) = (pixmap.width(), pixmap.height());
        if width == 0 || height == 0 {
            return 0;
        }

        if self.texture.is_none() || self.texture_size != (width, height) {
            self.texture = Some(self.create_texture(device, width, height));
            self.texture_size = (width, height);
            debug!("present texture recreated at {width}x{height}");
        }
        let Some((texture, _)) = &self.texture else {
            return 0;
        };

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixmap.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4), // RGBA = 4 bytes per pixel
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        pixmap.data().len()
    }

    fn create_texture(&self, device: &Device, width: u32, height: u32) -> (Texture, BindGroup) {
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("present_pixmap"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("present_texture_bg"),
            layout: &self.texture_bgl,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        (texture, bind_group)
    }

    // ───────────────────── Draw ───────────────────────────────────

    /// Record the quad draw. Returns `false` when nothing was uploaded yet.
    pub fn draw<'a>(&'a self, pass: &mut RenderPass<'a>) -> bool {
        let Some((_, bind_group)) = &self.texture else {
            return false;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), IndexFormat::Uint16);
        pass.draw_indexed(0..QuadVertex::INDICES.len() as u32, 0, 0..1);
        true
    }

    /// Size of the current texture, `(0, 0)` before the first upload.
    pub fn texture_size(&self) -> (u32, u32) {
        self.texture_size
    }
}
