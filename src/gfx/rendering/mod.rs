// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, GPU resource management, and frame rendering.

pub mod pipeline;
pub mod render_engine;

pub use pipeline::PipelineConfig;
pub use render_engine::{RenderEngine, SceneAssets};
