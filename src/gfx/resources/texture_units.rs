//! Texture units sampled by shader programs
//!
//! A unit is a bind group at `@group(1)` holding a texture view and its
//! sampler. Programs pick a unit by index; an index with nothing bound samples
//! the white fallback.

use crate::wgpu_utils::binding_types;

use super::texture_resource::TextureResource;

pub struct TextureUnits {
    layout: wgpu::BindGroupLayout,
    units: Vec<wgpu::BindGroup>,
    fallback: wgpu::BindGroup,
}

impl TextureUnits {
    pub fn new(device: &wgpu::Device, fallback: &TextureResource) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Unit Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::texture_2d(),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let fallback = Self::create_bind_group(device, &layout, fallback, "Fallback Texture Unit");

        Self {
            layout,
            units: Vec::new(),
            fallback,
        }
    }

    /// Binds `texture` to the next free unit and returns its index
    pub fn bind(&mut self, device: &wgpu::Device, texture: &TextureResource) -> u32 {
        let index = self.units.len() as u32;
        let label = format!("Texture Unit {}", index);
        let group = Self::create_bind_group(device, &self.layout, texture, &label);
        self.units.push(group);
        index
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn get(&self, unit: u32) -> &wgpu::BindGroup {
        self.units.get(unit as usize).unwrap_or(&self.fallback)
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &TextureResource,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }
}
