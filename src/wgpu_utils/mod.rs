// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Small wrappers for buffers and binding types shared by the shader programs.

pub mod binding_types;
pub mod uniform_buffer;

pub use binding_types::*;
pub use uniform_buffer::UniformBuffer;
