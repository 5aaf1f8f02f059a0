//! Shader programs built from a separate vertex and fragment WGSL unit
//!
//! Compiling a unit parses and validates it with `naga`. Linking merges the
//! reflected uniform layouts of both units and builds the wgpu pipeline. A
//! failure at any stage is logged and leaves the program alive but
//! non-functional: its draws are skipped.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use naga::{
    valid::{Capabilities, ValidationFlags, Validator},
    Module, ShaderStage,
};
use thiserror::Error;

use crate::{
    gfx::{rendering::pipeline::PipelineConfig, resources::TextureUnits},
    wgpu_utils::{binding_types, UniformBuffer},
};

use super::uniforms::{
    LinkError, UniformBlock, UniformLayout, UniformWriter, TEXTURE_GROUP, UNIFORM_GROUP,
};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{stage:?} shader failed to compile:\n{diagnostic}")]
    Compile {
        stage: ShaderStage,
        diagnostic: String,
    },
    #[error("{stage:?} shader has no `{entry}` entry point")]
    MissingEntryPoint {
        stage: ShaderStage,
        entry: &'static str,
    },
    #[error("a shader unit did not compile")]
    Unlinked,
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
}

/// Reads one shader unit from disk
pub fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses and validates one shader unit
pub fn compile_unit(stage: ShaderStage, source: &str) -> Result<Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| ShaderError::Compile {
        stage,
        diagnostic: err.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| ShaderError::Compile {
            stage,
            diagnostic: err.emit_to_string(source),
        })?;

    let entry = match stage {
        ShaderStage::Vertex => VERTEX_ENTRY,
        _ => FRAGMENT_ENTRY,
    };
    let has_entry = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == entry);
    if !has_entry {
        return Err(ShaderError::MissingEntryPoint { stage, entry });
    }

    Ok(module)
}

/// Everything a program needs besides its sources
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub pipeline: PipelineConfig,
    pub texture_units: &'a TextureUnits,
}

pub struct ShaderProgram {
    uniforms: UniformBlock,
    uniform_buffer: UniformBuffer,
    uniform_bind_group: wgpu::BindGroup,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl ShaderProgram {
    /// Reads both units from disk and compiles them
    ///
    /// An unreadable file is logged and compiled as an empty unit, which then
    /// fails to link.
    pub fn from_files(
        device: &wgpu::Device,
        desc: ProgramDescriptor<'_>,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Self {
        let read_or_empty = |path: &Path| {
            read_source(path).unwrap_or_else(|err| {
                log::error!("{}: {}", desc.label, err);
                String::new()
            })
        };
        let vertex_source = read_or_empty(vertex_path);
        let fragment_source = read_or_empty(fragment_path);

        Self::compile(device, desc, &vertex_source, &fragment_source)
    }

    pub fn compile(
        device: &wgpu::Device,
        desc: ProgramDescriptor<'_>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Self {
        let vertex = compile_unit(ShaderStage::Vertex, vertex_source);
        if let Err(err) = &vertex {
            log::error!("{}: {}", desc.label, err);
        }
        let fragment = compile_unit(ShaderStage::Fragment, fragment_source);
        if let Err(err) = &fragment {
            log::error!("{}: {}", desc.label, err);
        }

        let uniform_layout = create_uniform_layout(device, desc.label);

        let linked = match (&vertex, &fragment) {
            (Ok(vertex), Ok(fragment)) => link_layouts(vertex, fragment).and_then(|layout| {
                let pipeline = create_pipeline(
                    device,
                    &desc,
                    &layout,
                    &uniform_layout,
                    vertex_source,
                    fragment_source,
                )?;
                Ok((layout, pipeline))
            }),
            _ => Err(ShaderError::Unlinked),
        };

        let (layout, pipeline) = match linked {
            Ok((layout, pipeline)) => (layout, Some(pipeline)),
            Err(err) => {
                log::error!("{}: link failed: {}", desc.label, err);
                (UniformLayout::default(), None)
            }
        };

        if pipeline.is_some() {
            log::info!("{}: linked ({} uniform bytes)", desc.label, layout.size());
        }

        let uniform_buffer = UniformBuffer::new(device, desc.label, u64::from(layout.size()));
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Uniforms", desc.label)),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.binding_resource(),
            }],
        });

        Self {
            uniforms: UniformBlock::new(layout),
            uniform_buffer,
            uniform_bind_group,
            pipeline,
        }
    }

    /// Makes this the program uniform writes go to
    pub fn use_program(&mut self) -> UniformWriter<'_> {
        self.uniforms.writer()
    }

    /// Copies the staged uniform values to the GPU
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        self.uniform_buffer.update_content(queue, self.uniforms.bytes());
    }

    /// Sets the pipeline and bind groups on `pass`; false when nothing can be drawn
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, textures: &TextureUnits) -> bool {
        let Some(pipeline) = &self.pipeline else {
            return false;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(UNIFORM_GROUP, &self.uniform_bind_group, &[]);
        if self.uniforms.layout().uses_texture() {
            pass.set_bind_group(TEXTURE_GROUP, textures.get(self.uniforms.texture_unit()), &[]);
        }
        true
    }
}

fn link_layouts(vertex: &Module, fragment: &Module) -> Result<UniformLayout, ShaderError> {
    let vertex = UniformLayout::reflect(vertex)?;
    let fragment = UniformLayout::reflect(fragment)?;
    Ok(UniformLayout::link(&vertex, &fragment)?)
}

fn create_uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{} Uniform Layout", label)),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: binding_types::uniform(),
            count: None,
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    desc: &ProgramDescriptor<'_>,
    layout: &UniformLayout,
    uniform_layout: &wgpu::BindGroupLayout,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} Vertex", desc.label)),
        source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
    });
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} Fragment", desc.label)),
        source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
    });

    let mut bind_group_layouts = vec![uniform_layout];
    if layout.uses_texture() {
        bind_group_layouts.push(desc.texture_units.layout());
    }
    let pipeline = desc
        .pipeline
        .build(device, &bind_group_layouts, &vertex, &fragment);

    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(ShaderError::Pipeline(err.to_string())),
        None => Ok(pipeline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::shader::uniforms::UniformLocation;

    const MESH_VERTEX: &str = include_str!("../../../shaders/mesh.vert.wgsl");
    const MESH_FRAGMENT: &str = include_str!("../../../shaders/mesh.frag.wgsl");
    const LIGHT_VERTEX: &str = include_str!("../../../shaders/light.vert.wgsl");
    const LIGHT_FRAGMENT: &str = include_str!("../../../shaders/light.frag.wgsl");

    fn linked(vertex: &str, fragment: &str) -> UniformLayout {
        let vertex = compile_unit(ShaderStage::Vertex, vertex).unwrap();
        let fragment = compile_unit(ShaderStage::Fragment, fragment).unwrap();
        link_layouts(&vertex, &fragment).unwrap()
    }

    #[test]
    fn test_mesh_program_exposes_its_uniforms() {
        let layout = linked(MESH_VERTEX, MESH_FRAGMENT);
        for name in [
            "lightColor",
            "lightPos",
            "viewPos",
            "strength",
            "shinyness",
            "projection",
            "view",
            "model",
        ] {
            assert!(
                matches!(layout.location(name), Some(UniformLocation::Field(_))),
                "missing uniform {}",
                name
            );
        }
        assert_eq!(layout.location("texture1"), Some(UniformLocation::Texture));
    }

    #[test]
    fn test_light_program_exposes_its_uniforms() {
        let layout = linked(LIGHT_VERTEX, LIGHT_FRAGMENT);
        for name in ["projection", "view", "model"] {
            assert!(matches!(layout.location(name), Some(UniformLocation::Field(_))));
        }
        assert!(!layout.uses_texture());
        assert_eq!(layout.location("lightColor"), None);
    }

    #[test]
    fn test_syntax_error_reports_diagnostic() {
        let err = compile_unit(ShaderStage::Vertex, "fn broken( {").unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Vertex, .. }));
    }

    #[test]
    fn test_empty_unit_has_no_entry_point() {
        let err = compile_unit(ShaderStage::Fragment, "").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingEntryPoint { entry: FRAGMENT_ENTRY, .. }
        ));
    }

    #[test]
    fn test_stage_must_match_entry_point() {
        let err = compile_unit(ShaderStage::Fragment, LIGHT_VERTEX).unwrap_err();
        assert!(matches!(err, ShaderError::MissingEntryPoint { .. }));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("absent.wgsl")).unwrap_err();
        assert!(matches!(err, ShaderError::Read { .. }));
    }
}
