//! Uniform reflection and staging for shader programs
//!
//! Every program keeps its loose uniforms in one WGSL struct bound as
//! `var<uniform>` at `@group(0) @binding(0)`. The layout of that struct is read
//! from the compiled `naga` module, so setters can resolve a uniform by its
//! member name the same way a GL program resolves a uniform location. Names
//! that do not resolve are silently ignored.
//!
//! A program may also sample one texture declared at `@group(1) @binding(0)`
//! with its sampler at `@group(1) @binding(1)`. Setting an integer on the
//! texture's name selects the texture unit it samples from.

use std::collections::HashMap;

use cgmath::{Matrix4, Vector3};
use naga::{AddressSpace, Module, ResourceBinding, Scalar, ScalarKind, TypeInner, VectorSize};
use thiserror::Error;

use crate::gfx::camera::camera_utils::convert_matrix4_to_array;

/// Bind group holding the uniform struct
pub const UNIFORM_GROUP: u32 = 0;
/// Bind group holding the sampled texture and its sampler
pub const TEXTURE_GROUP: u32 = 1;

/// Host-visible type of a uniform struct member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Uint,
    Vec3,
    Mat4,
    /// Any other member type; never written by the setters
    Unsupported,
}

/// One member of the uniform struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub offset: u32,
    /// Bytes the member occupies, excluding trailing struct padding
    pub size: u32,
    pub kind: UniformKind,
}

impl UniformField {
    fn end(&self) -> u32 {
        self.offset + self.size
    }
}

/// Result of resolving a uniform name inside a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformLocation {
    Field(UniformField),
    Texture,
}

#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    #[error("uniform `{name}` is declared differently in the vertex and fragment stages")]
    MismatchedUniform { name: String },
    #[error("texture `{name}` must be declared at @group(1) @binding(0)")]
    UnsupportedTexture { name: String },
    #[error("the vertex and fragment stages sample different textures (`{0}` and `{1}`)")]
    MismatchedTexture(String, String),
    #[error("uniforms `{0}` and `{1}` share bytes of the uniform buffer")]
    OverlappingUniforms(String, String),
}

/// Reflected layout of a program's uniforms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    fields: HashMap<String, UniformField>,
    texture: Option<String>,
    size: u32,
}

impl UniformLayout {
    /// Reads the uniform struct and texture binding declared by one shader unit
    pub fn reflect(module: &Module) -> Result<Self, LinkError> {
        let mut layout = Self::default();

        for (_, global) in module.global_variables.iter() {
            let name = global.name.clone().unwrap_or_default();
            match (global.space, global.binding) {
                (
                    AddressSpace::Uniform,
                    Some(ResourceBinding {
                        group: UNIFORM_GROUP,
                        binding: 0,
                    }),
                ) => {
                    if let TypeInner::Struct { members, span } = &module.types[global.ty].inner {
                        layout.size = *span;
                        for member in members {
                            let Some(member_name) = &member.name else {
                                continue;
                            };
                            let inner = &module.types[member.ty].inner;
                            layout.fields.insert(
                                member_name.clone(),
                                UniformField {
                                    offset: member.offset,
                                    size: inner.size(module.to_ctx()),
                                    kind: uniform_kind(inner),
                                },
                            );
                        }
                    }
                }
                (AddressSpace::Handle, binding) => {
                    if !matches!(module.types[global.ty].inner, TypeInner::Image { .. }) {
                        continue;
                    }
                    let expected = ResourceBinding {
                        group: TEXTURE_GROUP,
                        binding: 0,
                    };
                    if binding != Some(expected) || layout.texture.is_some() {
                        return Err(LinkError::UnsupportedTexture { name });
                    }
                    layout.texture = Some(name);
                }
                _ => {}
            }
        }

        Ok(layout)
    }

    /// Merges the layouts of the vertex and fragment units of one program
    ///
    /// Both units share one uniform buffer, so a name must have the same
    /// declaration in each and no two names may cover the same bytes.
    pub fn link(vertex: &Self, fragment: &Self) -> Result<Self, LinkError> {
        let mut fields = vertex.fields.clone();
        for (name, field) in &fragment.fields {
            match fields.get(name) {
                Some(existing) if existing != field => {
                    return Err(LinkError::MismatchedUniform { name: name.clone() });
                }
                _ => {
                    fields.insert(name.clone(), *field);
                }
            }
        }

        let texture = match (&vertex.texture, &fragment.texture) {
            (Some(a), Some(b)) if a != b => {
                return Err(LinkError::MismatchedTexture(a.clone(), b.clone()));
            }
            (a, b) => a.clone().or_else(|| b.clone()),
        };

        let mut ranges: Vec<_> = fields.iter().collect();
        ranges.sort_by(|(a_name, a), (b_name, b)| (a.offset, a_name).cmp(&(b.offset, b_name)));
        for pair in ranges.windows(2) {
            let [(first, a), (second, b)] = pair else {
                continue;
            };
            if a.end() > b.offset {
                return Err(LinkError::OverlappingUniforms(
                    first.to_string(),
                    second.to_string(),
                ));
            }
        }

        Ok(Self {
            fields,
            texture,
            size: vertex.size.max(fragment.size),
        })
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        if self.texture.as_deref() == Some(name) {
            return Some(UniformLocation::Texture);
        }
        self.fields.get(name).copied().map(UniformLocation::Field)
    }

    /// Size in bytes of the uniform struct, 0 when the program declares none
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn uses_texture(&self) -> bool {
        self.texture.is_some()
    }
}

fn uniform_kind(inner: &TypeInner) -> UniformKind {
    const F32: Scalar = Scalar {
        kind: ScalarKind::Float,
        width: 4,
    };
    match *inner {
        TypeInner::Scalar(Scalar {
            kind: ScalarKind::Float,
            width: 4,
        }) => UniformKind::Float,
        TypeInner::Scalar(Scalar {
            kind: ScalarKind::Sint,
            width: 4,
        }) => UniformKind::Int,
        TypeInner::Scalar(Scalar {
            kind: ScalarKind::Uint,
            width: 4,
        }) => UniformKind::Uint,
        TypeInner::Vector {
            size: VectorSize::Tri,
            scalar,
        } if scalar == F32 => UniformKind::Vec3,
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if scalar == F32 => UniformKind::Mat4,
        _ => UniformKind::Unsupported,
    }
}

/// CPU copy of a program's uniform values, uploaded before drawing
#[derive(Debug, Clone, Default)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
    texture_unit: u32,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        Self {
            data: vec![0; layout.size as usize],
            layout,
            texture_unit: 0,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Texture unit the program's texture binding samples from
    pub fn texture_unit(&self) -> u32 {
        self.texture_unit
    }

    /// Setter access; only reachable through a bound program
    pub fn writer(&mut self) -> UniformWriter<'_> {
        UniformWriter { block: self }
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) {
        match self.layout.location(name) {
            Some(UniformLocation::Field(field)) if field.kind == kind => {
                let start = field.offset as usize;
                self.data[start..start + bytes.len()].copy_from_slice(bytes);
            }
            _ => log::trace!("Discarding write to unresolved uniform `{}`", name),
        }
    }
}

/// Uniform setters for the currently bound program
///
/// Each call resolves `name` in the program's reflected layout. Writes to
/// names the program does not declare, or with a type that does not match the
/// declaration, are discarded.
pub struct UniformWriter<'a> {
    block: &'a mut UniformBlock,
}

impl UniformWriter<'_> {
    pub fn set_bool(&mut self, name: &str, value: bool) {
        match self.block.layout.location(name) {
            Some(UniformLocation::Field(UniformField {
                kind: UniformKind::Uint,
                ..
            })) => self.set_uint(name, value as u32),
            _ => self.set_int(name, value as i32),
        }
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        if self.block.layout.location(name) == Some(UniformLocation::Texture) {
            if let Ok(unit) = u32::try_from(value) {
                self.block.texture_unit = unit;
            }
            return;
        }
        self.block
            .write(name, UniformKind::Int, bytemuck::bytes_of(&value));
    }

    pub fn set_uint(&mut self, name: &str, value: u32) {
        self.block
            .write(name, UniformKind::Uint, bytemuck::bytes_of(&value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.block
            .write(name, UniformKind::Float, bytemuck::bytes_of(&value));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        let components: [f32; 3] = value.into();
        self.block
            .write(name, UniformKind::Vec3, bytemuck::cast_slice(&components));
    }

    pub fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        let columns = convert_matrix4_to_array(value);
        self.block
            .write(name, UniformKind::Mat4, bytemuck::cast_slice(&columns));
    }
}
