//! Vertex data for the present pass.
//!
//! Derives `bytemuck::Pod` + `Zeroable` for zero-copy upload.

use bytemuck::{Pod, Zeroable};
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// A corner of the full-surface quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    /// Clip-space position, (-1, 1) is top-left.
    pub position: [f32; 2],
    /// Texture coordinate, (0, 0) is the pixmap's top-left pixel.
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub const VERTICES: [QuadVertex; 4] = [
        QuadVertex { position: [-1.0, 1.0], uv: [0.0, 0.0] },  // top-left
        QuadVertex { position: [1.0, 1.0], uv: [1.0, 0.0] },   // top-right
        QuadVertex { position: [-1.0, -1.0], uv: [0.0, 1.0] }, // bottom-left
        QuadVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },  // bottom-right
    ];

    /// Two counter-clockwise triangles.
    pub const INDICES: [u16; 6] = [0, 2, 1, 1, 2, 3];

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(0) = position
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            },
            // location(1) = uv
            VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}
