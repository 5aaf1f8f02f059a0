//! Texture resource management for wgpu
//!
//! Provides utilities for creating GPU textures, views, and samplers: the depth
//! buffer used by the scene pass and sampled image textures with a full mip
//! chain.

use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {path} has zero size")]
    Empty { path: PathBuf },
}

/// GPU texture resource containing texture, view, and sampler
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the renderer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Format of sampled image textures
    pub const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Decodes an image file and uploads it with a generated mip chain
    ///
    /// Images larger than the device's texture limit are scaled down to fit,
    /// keeping their aspect ratio.
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, TextureError> {
        let mut image = image::open(path)
            .map_err(|source| TextureError::Load {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty {
                path: path.to_path_buf(),
            });
        }

        log::info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );

        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = fit_within(image.width(), image.height(), max_dimension);
        if (width, height) != image.dimensions() {
            log::warn!(
                "Texture {} exceeds the device limit of {} px; scaling to {}x{}",
                path.display(),
                max_dimension,
                width,
                height
            );
            image = imageops::resize(&image, width, height, imageops::FilterType::Triangle);
        }
        Ok(Self::from_rgba_image(
            device,
            queue,
            &image,
            &path.display().to_string(),
        ))
    }

    /// Loads `path` if given, falling back to a 1x1 white texture on any failure
    pub fn load_or_white(device: &wgpu::Device, queue: &wgpu::Queue, path: Option<&Path>) -> Self {
        match path.map(|path| Self::from_path(device, queue, path)) {
            Some(Ok(texture)) => texture,
            Some(Err(err)) => {
                log::warn!("{}; using a white texture instead", err);
                Self::white(device, queue)
            }
            None => Self::white(device, queue),
        }
    }

    /// 1x1 opaque white texture
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let pixel = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self::from_rgba_image(device, queue, &pixel, "White Texture")
    }

    /// Uploads an RGBA8 image and every level of its mip chain
    pub fn from_rgba_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let levels = build_mip_chain(image);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::IMAGE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            let (width, height) = level.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Largest size with the same aspect ratio whose sides are at most `max_dimension`
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    let max_dimension = max_dimension.max(1);
    if longest <= max_dimension {
        return (width, height);
    }
    let scale = |side: u32| {
        let scaled = (side as u64 * max_dimension as u64 + longest as u64 / 2) / longest as u64;
        (scaled as u32).clamp(1, max_dimension)
    };
    (scale(width), scale(height))
}

/// Number of levels in a full mip chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Level 0 is `image` itself; each further level halves both sides (min 1)
pub fn build_mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let count = mip_level_count(image.width(), image.height());
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(image.clone());

    for _ in 1..count {
        let Some(previous) = levels.last() else {
            break;
        };
        let width = (previous.width() / 2).max(1);
        let height = (previous.height() / 2).max(1);
        let next = imageops::resize(previous, width, height, imageops::FilterType::Triangle);
        levels.push(next);
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(1000, 750), 10);
        assert_eq!(mip_level_count(1, 1024), 11);
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        assert_eq!(fit_within(1024, 512, 2048), (1024, 512));
        assert_eq!(fit_within(2048, 2048, 2048), (2048, 2048));
    }

    #[test]
    fn test_fit_within_scales_oversize_images_by_longest_side() {
        assert_eq!(fit_within(4096, 2048, 2048), (2048, 1024));
        assert_eq!(fit_within(1000, 8192, 4096), (500, 4096));
        assert_eq!(fit_within(10000, 1, 2048), (2048, 1));
    }

    #[test]
    fn test_mip_chain_halves_to_one_pixel() {
        let image = RgbaImage::from_pixel(12, 5, image::Rgba([10, 20, 30, 255]));
        let dims: Vec<_> = build_mip_chain(&image).iter().map(|l| l.dimensions()).collect();
        assert_eq!(dims, vec![(12, 5), (6, 2), (3, 1), (1, 1)]);
    }

    #[test]
    fn test_mip_chain_preserves_flat_color() {
        let image = RgbaImage::from_pixel(8, 8, image::Rgba([200, 100, 50, 255]));
        let levels = build_mip_chain(&image);
        let last = levels.last().unwrap();
        assert_eq!(last.dimensions(), (1, 1));
        assert_eq!(last.get_pixel(0, 0), &image::Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_single_pixel_has_one_level() {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba([255; 4]));
        assert_eq!(build_mip_chain(&image).len(), 1);
    }
}
