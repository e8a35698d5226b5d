//! Texture loading and upload.

use std::path::Path;
use tracing::{debug, warn};

/// A GPU texture with its view and the sampler it is drawn with.
pub struct SceneTexture {
    /// The underlying texture.
    pub texture: wgpu::Texture,
    /// Default view over the whole texture.
    pub view: wgpu::TextureView,
    /// Sampler matching the texture's intended filtering and wrapping.
    pub sampler: wgpu::Sampler,
}

/// Texels of the in-RAM 2x2 gray/white checkerboard (RGBA, row major:
/// gray, white / white, gray).
pub fn checkerboard_texels() -> [u8; 16] {
    const G: u8 = 128;
    #[rustfmt::skip]
    let texels = [
        G, G, G, 255,       255, 255, 255, 255,
        255, 255, 255, 255, G, G, G, 255,
    ];
    texels
}

impl SceneTexture {
    /// Loads a color texture from an image file: linear filtering,
    /// mirror-repeated, sRGB. A file that fails to load falls back to a
    /// single white pixel.
    pub fn color_map(device: &wgpu::Device, queue: &wgpu::Queue, path: impl AsRef<Path>) -> Self {
        Self::from_file(
            device,
            queue,
            path.as_ref(),
            wgpu::TextureFormat::Rgba8UnormSrgb,
            [255, 255, 255, 255],
        )
    }

    /// Loads a tangent-space normal map: linear filtering, mirror-repeated,
    /// non-sRGB. A file that fails to load falls back to a single
    /// flat-normal pixel, leaving the lighting undisturbed.
    pub fn normal_map(device: &wgpu::Device, queue: &wgpu::Queue, path: impl AsRef<Path>) -> Self {
        Self::from_file(
            device,
            queue,
            path.as_ref(),
            wgpu::TextureFormat::Rgba8Unorm,
            [128, 128, 255, 255],
        )
    }

    /// The 2x2 gray/white checkerboard generated in RAM, sampled with
    /// nearest-neighbor filtering so the texels stay crisp.
    pub fn checkerboard(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_texels(
            device,
            queue,
            "Checkerboard Texture",
            2,
            2,
            &checkerboard_texels(),
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::FilterMode::Nearest,
            wgpu::AddressMode::Repeat,
        )
    }

    /// A single solid sRGB pixel. Stands in for the color slot of
    /// materials that do not sample a texture.
    pub fn solid_color(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4]) -> Self {
        Self::from_texels(
            device,
            queue,
            "Solid Color Texture",
            1,
            1,
            &rgba,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::FilterMode::Nearest,
            wgpu::AddressMode::Repeat,
        )
    }

    /// A single flat-normal pixel for materials without a normal map.
    pub fn flat_normal(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_texels(
            device,
            queue,
            "Flat Normal Texture",
            1,
            1,
            &[128, 128, 255, 255],
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::FilterMode::Nearest,
            wgpu::AddressMode::Repeat,
        )
    }

    fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        format: wgpu::TextureFormat,
        fallback: [u8; 4],
    ) -> Self {
        let label = path.to_string_lossy().to_string();
        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                debug!("Loaded texture {:?} ({}x{})", path, width, height);
                Self::from_texels(
                    device,
                    queue,
                    &label,
                    width,
                    height,
                    rgba.as_raw(),
                    format,
                    wgpu::FilterMode::Linear,
                    wgpu::AddressMode::MirrorRepeat,
                )
            }
            Err(e) => {
                warn!("Failed to load texture {:?}: {}, using fallback pixel", path, e);
                Self::from_texels(
                    device,
                    queue,
                    &label,
                    1,
                    1,
                    &fallback,
                    format,
                    wgpu::FilterMode::Linear,
                    wgpu::AddressMode::MirrorRepeat,
                )
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn from_texels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        texels: &[u8],
        format: wgpu::TextureFormat,
        filter: wgpu::FilterMode,
        address_mode: wgpu::AddressMode,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texels,
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

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_texels() {
        let texels = checkerboard_texels();
        // Diagonal gray, anti-diagonal white, fully opaque.
        assert_eq!(&texels[0..4], &[128, 128, 128, 255]);
        assert_eq!(&texels[4..8], &[255, 255, 255, 255]);
        assert_eq!(&texels[8..12], &[255, 255, 255, 255]);
        assert_eq!(&texels[12..16], &[128, 128, 128, 255]);
    }
}
