//! # Vertex Buffer Layouts
//!
//! Mesh data is uploaded as separate, tightly packed attribute streams rather
//! than interleaved vertices: one buffer of positions and one of normals, both
//! indexed by the same index buffer.

use std::mem;

/// Size in bytes of one `[f32; 3]` attribute
pub const VEC3_STRIDE: wgpu::BufferAddress = mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// Position stream bound at shader location 0
pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VEC3_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    }
}

/// Normal stream bound at shader location 1
pub fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VEC3_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &NORMAL_ATTRIBUTES,
    }
}

/// Layouts for the lit mesh: slot 0 positions, slot 1 normals
pub fn mesh_layouts() -> Vec<wgpu::VertexBufferLayout<'static>> {
    vec![position_layout(), normal_layout()]
}

/// Layouts for position-only geometry such as the light marker
pub fn position_only_layouts() -> Vec<wgpu::VertexBufferLayout<'static>> {
    vec![position_layout()]
}
