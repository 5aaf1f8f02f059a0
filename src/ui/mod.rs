//! # User Interface Module
//!
//! Dear ImGui overlay for the viewer. [`UiManager`] wires ImGui to winit and
//! wgpu; [`panel`] holds the scene controls window, which is shown only while
//! the cursor is free.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::scene_controls_panel;
