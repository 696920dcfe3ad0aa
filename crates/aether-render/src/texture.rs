//! Sampled 2D textures: decoding from disk, procedural stand-ins, and upload.
//!
//! Loading is fallible and cheap to retry; callers that can live without the
//! file (cloud noise, water normals) log the error and use one of the
//! procedural generators instead.

use std::f64::consts::TAU;
use std::path::Path;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: pixels.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode a PNG or JPEG file. Rows are kept in file order (no vertical flip).
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let rgba = image::open(path)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, rgba.into_raw())
    }

    /// Seamlessly tiling grey-scale fractal noise, used when the cloud noise file is missing.
    pub fn tiling_noise(size: u32, seed: u32) -> Self {
        let size = size.max(1);
        let fbm = Fbm::<Perlin>::new(seed).set_octaves(5);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let value = torus_sample(&fbm, x, y, size, 2.0);
                let byte = ((value * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8;
                pixels.extend_from_slice(&[byte, byte, byte, 255]);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Seamlessly tiling tangent-space normal map (+Z up in blue), used when
    /// the water normal file is missing.
    pub fn tiling_normal_map(size: u32, seed: u32) -> Self {
        let size = size.max(1);
        let fbm = Fbm::<Perlin>::new(seed).set_octaves(4);
        let heights: Vec<f64> = (0..size * size)
            .map(|i| torus_sample(&fbm, i % size, i / size, size, 4.0))
            .collect();
        let height_at = |x: i64, y: i64| {
            let n = size as i64;
            heights[(y.rem_euclid(n) * n + x.rem_euclid(n)) as usize]
        };

        let strength = size as f64 / 64.0;
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size as i64 {
            for x in 0..size as i64 {
                let dx = (height_at(x + 1, y) - height_at(x - 1, y)) * strength;
                let dy = (height_at(x, y + 1) - height_at(x, y - 1)) * strength;
                let n = glam::DVec3::new(-dx, -dy, 1.0).normalize();
                let encode = |c: f64| ((c * 0.5 + 0.5) * 255.0).round() as u8;
                pixels.extend_from_slice(&[encode(n.x), encode(n.y), encode(n.z), 255]);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }
}

/// Sample `noise` on a 4D torus so the result wraps at `size` in both axes.
fn torus_sample(noise: &impl NoiseFn<f64, 4>, x: u32, y: u32, size: u32, frequency: f64) -> f64 {
    let s = x as f64 / size as f64 * TAU;
    let t = y as f64 / size as f64 * TAU;
    let r = frequency / TAU;
    noise.get([r * s.cos(), r * s.sin(), r * t.cos(), r * t.sin()])
}

/// How a texture is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    pub address_mode: wgpu::AddressMode,
    pub filter: wgpu::FilterMode,
    pub anisotropy: u16,
}

impl SamplerSettings {
    /// Wrapped in both axes, linear, no mip chain, 16x anisotropy.
    pub const TILING: Self = Self {
        address_mode: wgpu::AddressMode::Repeat,
        filter: wgpu::FilterMode::Linear,
        anisotropy: 16,
    };

    pub fn descriptor(&self, label: &'static str) -> wgpu::SamplerDescriptor<'static> {
        // Anisotropic filtering requires every filter to be linear.
        let anisotropy = if self.filter == wgpu::FilterMode::Linear {
            self.anisotropy.max(1)
        } else {
            1
        };
        wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: self.address_mode,
            address_mode_v: self.address_mode,
            address_mode_w: self.address_mode,
            mag_filter: self.filter,
            min_filter: self.filter,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            anisotropy_clamp: anisotropy,
            ..Default::default()
        }
    }
}

/// An uploaded single-level texture with its view and sampler.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload `image` as linear `Rgba8Unorm` data without a mip chain.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &'static str,
        image: &TextureImage,
        sampler: &SamplerSettings,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
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
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler.descriptor(label));
        log::info!("Uploaded texture '{label}' ({}x{})", image.width, image.height);

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
    fn test_new_rejects_zero_dimensions() {
        assert!(matches!(
            TextureImage::new(0, 4, vec![]),
            Err(TextureError::ZeroDimensions { .. })
        ));
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(matches!(
            TextureImage::new(2, 2, vec![0; 15]),
            Err(TextureError::DataSizeMismatch { expected: 16, .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TextureImage::load(&dir.path().join("perlin256.png")).is_err());
    }

    #[test]
    fn test_load_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let loaded = TextureImage::load(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(&loaded.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_tiling_noise_is_grey_and_varied() {
        let image = TextureImage::tiling_noise(32, 7);
        assert_eq!(image.pixels.len(), 32 * 32 * 4);
        let mut distinct = std::collections::BTreeSet::new();
        for px in image.pixels.chunks(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
            distinct.insert(px[0]);
        }
        assert!(distinct.len() > 8);
    }

    #[test]
    fn test_tiling_noise_is_deterministic() {
        assert_eq!(
            TextureImage::tiling_noise(16, 3),
            TextureImage::tiling_noise(16, 3)
        );
    }

    #[test]
    fn test_normal_map_points_up() {
        let image = TextureImage::tiling_normal_map(32, 1);
        for px in image.pixels.chunks(4) {
            // Blue encodes +Z and must stay in the upper hemisphere.
            assert!(px[2] >= 128, "normal points downwards: {px:?}");
        }
    }

    #[test]
    fn test_tiling_sampler_settings() {
        let desc = SamplerSettings::TILING.descriptor("noise");
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::Repeat);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.anisotropy_clamp, 16);
    }

    #[test]
    fn test_nearest_sampler_drops_anisotropy() {
        let settings = SamplerSettings {
            filter: wgpu::FilterMode::Nearest,
            ..SamplerSettings::TILING
        };
        assert_eq!(settings.descriptor("n").anisotropy_clamp, 1);
    }
}
