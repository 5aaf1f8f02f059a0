//! WGPU-based rendering engine for the viewer
//!
//! Owns the surface, device and every GPU resource the scene needs. All of
//! them are created once in [`RenderEngine::new`] and released when the engine
//! is dropped.

use std::path::Path;

use anyhow::Context;
use wgpu::TextureFormat;

use crate::gfx::{
    camera::FlyCamera,
    resources::{TextureResource, TextureUnits},
    scene::{
        controls::SceneControls,
        gpu_mesh::{DrawMesh, GpuMesh, MarkerMesh},
        mesh::Mesh,
        vertex,
    },
    shader::{ProgramDescriptor, ShaderProgram},
};

use super::pipeline::PipelineConfig;

/// Background color of the scene pass
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.4,
    g: 0.2,
    b: 0.3,
    a: 1.0,
};

/// Files the engine loads at startup
pub struct SceneAssets<'a> {
    pub mesh: &'a Mesh,
    pub texture: Option<&'a Path>,
    pub shader_dir: &'a Path,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    texture_units: TextureUnits,
    mesh_program: ShaderProgram,
    light_program: ShaderProgram,
    mesh: GpuMesh,
    marker: MarkerMesh,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Fails when no adapter or device is available or the surface cannot be
    /// created. Shader and texture problems are logged and do not fail.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
        assets: SceneAssets<'_>,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create a rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a GPU adapter")?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        // Window and texture sizes are bounded by the adapter, not the downlevel 2048
        let required_limits =
            wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits,
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create a GPU device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // Non-sRGB target so shader output and the clear color are written as-is
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Surface format {:?}", format);

        let (width, height) =
            surface_extent(width, height, device.limits().max_texture_dimension_2d);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let white = TextureResource::white(&device, &queue);
        let mut texture_units = TextureUnits::new(&device, &white);
        let texture = TextureResource::load_or_white(&device, &queue, assets.texture);
        texture_units.bind(&device, &texture);

        let mesh_program = ShaderProgram::from_files(
            &device,
            ProgramDescriptor {
                label: "Mesh Program",
                pipeline: PipelineConfig::default()
                    .with_label("Mesh Pipeline")
                    .with_vertex_layouts(vertex::mesh_layouts())
                    .with_depth_format(TextureResource::DEPTH_FORMAT)
                    .with_color_format(format),
                texture_units: &texture_units,
            },
            &assets.shader_dir.join("mesh.vert.wgsl"),
            &assets.shader_dir.join("mesh.frag.wgsl"),
        );
        let light_program = ShaderProgram::from_files(
            &device,
            ProgramDescriptor {
                label: "Light Program",
                pipeline: PipelineConfig::default()
                    .with_label("Light Pipeline")
                    .with_vertex_layouts(vertex::position_only_layouts())
                    .with_depth_format(TextureResource::DEPTH_FORMAT)
                    .with_color_format(format),
                texture_units: &texture_units,
            },
            &assets.shader_dir.join("light.vert.wgsl"),
            &assets.shader_dir.join("light.frag.wgsl"),
        );

        let mesh = GpuMesh::upload(&device, assets.mesh);
        let marker = MarkerMesh::cube(&device);

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            texture_units,
            mesh_program,
            light_program,
            mesh,
            marker,
        })
    }

    /// Renders the scene, then lets `ui_callback` record its overlay pass
    ///
    /// Returns the surface error when no frame could be acquired; the caller
    /// decides whether to reconfigure or give up.
    pub fn render_frame<F>(
        &mut self,
        camera: &FlyCamera,
        controls: &SceneControls,
        ui_callback: F,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.apply_uniforms(camera, controls);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if self.mesh_program.bind(&mut render_pass, &self.texture_units) {
                render_pass.draw_mesh(&self.mesh);
            }
            if self.light_program.bind(&mut render_pass, &self.texture_units) {
                render_pass.draw_marker(&self.marker);
            }
        }

        ui_callback(
            &self.device,
            &self.queue,
            &mut encoder,
            &surface_texture_view,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Stages and uploads this frame's uniforms for both programs
    fn apply_uniforms(&mut self, camera: &FlyCamera, controls: &SceneControls) {
        let projection = camera.projection_matrix();
        let view = camera.view_matrix();

        let mut mesh = self.mesh_program.use_program();
        mesh.set_int("texture1", 0);
        mesh.set_vec3("lightColor", controls.effective_light_color());
        mesh.set_vec3("lightPos", controls.light_position());
        mesh.set_vec3("viewPos", camera.position);
        mesh.set_float("strength", controls.specular_strength);
        mesh.set_int("shinyness", controls.shininess);
        mesh.set_mat4("projection", projection);
        mesh.set_mat4("view", view);
        mesh.set_mat4("model", controls.model_matrix());
        self.mesh_program.upload(&self.queue);

        let mut light = self.light_program.use_program();
        light.set_mat4("projection", projection);
        light.set_mat4("view", view);
        light.set_mat4("model", controls.light_marker_matrix());
        self.light_program.upload(&self.queue);
    }

    /// Resizes the surface and depth buffer; zero sizes are ignored
    ///
    /// Sides beyond the device's texture limit are clamped and the presented
    /// image is stretched to the window.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let max_dimension = self.device.limits().max_texture_dimension_2d;
        let (width, height) = surface_extent(width, height, max_dimension);
        log::debug!("Surface resized to {}x{}", width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reconfigures the surface at its current size, after it was lost or outdated
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Surface size for a window, each side within `1..=max_dimension`
fn surface_extent(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    (width.clamp(1, max_dimension), height.clamp(1, max_dimension))
}
