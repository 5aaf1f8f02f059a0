//! GPU-resident copies of the scene geometry
//!
//! Both meshes are uploaded once at startup and never modified. Their buffers
//! are released when the owning [`RenderEngine`](crate::gfx::RenderEngine) is
//! dropped at exit.

use wgpu::util::DeviceExt;

use super::{
    light_marker::{CUBE_VERTEX_COUNT, CUBE_VERTICES},
    mesh::Mesh,
};

/// Indexed triangle mesh with separate position and normal streams
pub struct GpuMesh {
    position_buffer: wgpu::Buffer,
    normal_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Position Buffer"),
            contents: bytemuck::cast_slice(mesh.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Normal Buffer"),
            contents: bytemuck::cast_slice(mesh.normals()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            position_buffer,
            normal_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        }
    }
}

/// Position-only, non-indexed cube used to mark the light
pub struct MarkerMesh {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl MarkerMesh {
    pub fn cube(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Marker Vertex Buffer"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            vertex_buffer,
            vertex_count: CUBE_VERTEX_COUNT,
        }
    }
}

/// Draw helpers for the scene geometry on a render pass
pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &GpuMesh);
    fn draw_marker(&mut self, marker: &MarkerMesh);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &GpuMesh) {
        // Empty buffers cannot be sliced
        if mesh.index_count == 0 {
            return;
        }
        self.set_vertex_buffer(0, mesh.position_buffer.slice(..));
        self.set_vertex_buffer(1, mesh.normal_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_marker(&mut self, marker: &MarkerMesh) {
        self.set_vertex_buffer(0, marker.vertex_buffer.slice(..));
        self.draw(0..marker.vertex_count, 0..1);
    }
}
