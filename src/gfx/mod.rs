//! # Graphics Module
//!
//! Everything between the loaded assets and the frame on screen.
//!
//! - **Camera** ([`camera`]) - Free-fly camera and its keyboard/mouse controller
//! - **Rendering** ([`rendering`]) - Surface, pipelines and the per-frame pass
//! - **Resources** ([`resources`]) - Depth buffer, image textures, texture units
//! - **Scene** ([`scene`]) - Mesh loading, vertex layouts and scene controls
//! - **Shaders** ([`shader`]) - WGSL programs with name-addressed uniforms

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod shader;

pub use camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
