// src/lib.rs
//! Phong Viewer
//!
//! A small real-time viewer built on wgpu and winit: one OBJ mesh lit by a
//! Phong shader, a cube marking the light, a free-fly camera and an ImGui
//! panel for the scene parameters.

pub mod app;
pub mod config;
pub mod gfx;
pub mod performance;
pub mod ui;
pub mod wgpu_utils;

pub use app::run;
pub use config::Args;
