//! Render pipeline configuration
//!
//! Collects the fixed-function state for a shader program's pipeline and
//! builds it from separately compiled vertex and fragment modules.

use wgpu::*;

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub vertex_layouts: Vec<VertexBufferLayout<'static>>,
    pub primitive_topology: PrimitiveTopology,
    pub depth_format: Option<TextureFormat>,
    pub color_format: TextureFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            vertex_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            depth_format: None,
            color_format: TextureFormat::Bgra8Unorm,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    /// Sets the vertex buffer layouts, one per bound vertex buffer slot
    pub fn with_vertex_layouts(mut self, layouts: Vec<VertexBufferLayout<'static>>) -> Self {
        self.vertex_layouts = layouts;
        self
    }

    /// Enables depth testing (less, with writes) against a target of `format`
    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    /// Builds the pipeline; `vs_main` and `fs_main` are the entry points
    pub fn build(
        &self,
        device: &Device,
        bind_group_layouts: &[&BindGroupLayout],
        vertex: &ShaderModule,
        fragment: &ShaderModule,
    ) -> RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", self.label)),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let depth_stencil = self.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&self.label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: vertex,
                entry_point: Some("vs_main"),
                buffers: &self.vertex_layouts,
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: fragment,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: self.color_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: self.primitive_topology,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                // Both faces; OBJ winding is not normalized
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
