// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures and the texture units programs sample from.

pub mod texture_resource;
pub mod texture_units;

pub use texture_resource::{TextureError, TextureResource};
pub use texture_units::TextureUnits;
