//! # Scene Module
//!
//! The single mesh, the light marker cube and the parameters the debug panel
//! edits.
//!
//! - [`Mesh`] - OBJ loading and flat normal derivation
//! - [`GpuMesh`] / [`MarkerMesh`] - Their GPU buffers
//! - [`SceneControls`] - Light, material and model rotation settings
//! - [`vertex`] - Vertex buffer layouts shared by the pipelines

pub mod controls;
pub mod gpu_mesh;
pub mod light_marker;
pub mod mesh;
pub mod vertex;

pub use controls::SceneControls;
pub use gpu_mesh::{DrawMesh, GpuMesh, MarkerMesh};
pub use mesh::{Mesh, MeshError};
