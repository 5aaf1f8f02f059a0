//! WGSL shader programs and their name-addressed uniforms

pub mod program;
pub mod uniforms;

pub use program::{read_source, ProgramDescriptor, ShaderError, ShaderProgram};
pub use uniforms::{UniformKind, UniformLayout, UniformLocation, UniformWriter};
