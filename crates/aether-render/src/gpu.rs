//! Device, queue and window surface.
//!
//! [`GpuContext`] is created once per window. Besides presenting, the device
//! must be able to render into and compute-write `Rgba16Float` cube faces for
//! the environment bake; adapters that cannot are rejected up front rather
//! than failing at the first bake.

use std::sync::Arc;

use winit::window::Window;

/// Format the environment bake renders, filters and stores.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[derive(Debug, thiserror::Error)]
pub enum GpuContextError {
    #[error("no GPU adapter can present to this window")]
    NoAdapter,

    #[error("adapter {adapter} cannot {missing} {format:?} textures")]
    MissingFormatSupport {
        adapter: String,
        format: wgpu::TextureFormat,
        missing: &'static str,
    },

    #[error("device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("window surface creation failed: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
}

/// Why a frame could not be acquired.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Still unusable after reconfiguring once.
    #[error("surface lost")]
    Lost,

    #[error("out of memory")]
    OutOfMemory,

    /// Skip the frame.
    #[error("timeout")]
    Timeout,
}

pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl GpuContext {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, GpuContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuContextError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );
        check_hdr_support(&info.name, adapter.get_texture_format_features(HDR_FORMAT))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("aether-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_config = surface_configuration(
            &surface.get_capabilities(&adapter),
            size.width,
            size.height,
            vsync,
        );
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface {}x{} {:?}, {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format,
            surface_config.present_mode
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_format: surface_config.format,
            surface_config,
        })
    }

    /// Reconfigure for a new window size. A minimized window keeps a 1x1 surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// The next frame's texture. A lost or outdated surface is reconfigured and retried once.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => Err(SurfaceError::Timeout),
            Err(wgpu::SurfaceError::Other) => {
                log::error!("Unrecognized surface error");
                Err(SurfaceError::Lost)
            }
        }
    }
}

/// Blocks on [`GpuContext::new`] with `pollster`.
pub fn init_gpu_context_blocking(
    window: Arc<Window>,
    vsync: bool,
) -> Result<GpuContext, GpuContextError> {
    pollster::block_on(GpuContext::new(window, vsync))
}

fn check_hdr_support(
    adapter: &str,
    features: wgpu::TextureFormatFeatures,
) -> Result<(), GpuContextError> {
    let missing = |missing| GpuContextError::MissingFormatSupport {
        adapter: adapter.to_string(),
        format: HDR_FORMAT,
        missing,
    };
    let usages = features.allowed_usages;
    if !usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
        return Err(missing("render to"));
    }
    if !usages.contains(wgpu::TextureUsages::STORAGE_BINDING) {
        return Err(missing("store to"));
    }
    if !features
        .flags
        .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE)
    {
        return Err(missing("filter"));
    }
    Ok(())
}

/// The surface setup for a `width` x `height` window.
///
/// The sky shader writes linear color, so an sRGB format is preferred
/// (Bgra8, then Rgba8, then any). Without vsync the lowest-latency present
/// mode wins; Fifo is always available.
fn surface_configuration(
    caps: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
    vsync: bool,
) -> wgpu::SurfaceConfiguration {
    let srgb_preference = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    let format = srgb_preference
        .into_iter()
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| caps.formats.first().copied())
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

    let low_latency = [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate];
    let present_mode = low_latency
        .into_iter()
        .find(|m| !vsync && caps.present_modes.contains(m))
        .unwrap_or(wgpu::PresentMode::Fifo);

    let alpha_mode = if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        wgpu::CompositeAlphaMode::Opaque
    } else {
        caps.alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    };

    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(
        formats: &[wgpu::TextureFormat],
        present_modes: &[wgpu::PresentMode],
    ) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            present_modes: present_modes.to_vec(),
            alpha_modes: vec![
                wgpu::CompositeAlphaMode::PreMultiplied,
                wgpu::CompositeAlphaMode::Opaque,
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_minimized_window_gets_one_pixel_surface() {
        let config = surface_configuration(
            &caps(&[wgpu::TextureFormat::Bgra8UnormSrgb], &[wgpu::PresentMode::Fifo]),
            0,
            0,
            true,
        );
        assert_eq!((config.width, config.height), (1, 1));
    }

    #[test]
    fn test_srgb_formats_are_preferred() {
        let pick = |formats: &[wgpu::TextureFormat]| {
            surface_configuration(&caps(formats, &[wgpu::PresentMode::Fifo]), 8, 8, true).format
        };
        assert_eq!(
            pick(&[
                wgpu::TextureFormat::Rgba8UnormSrgb,
                wgpu::TextureFormat::Bgra8UnormSrgb
            ]),
            wgpu::TextureFormat::Bgra8UnormSrgb
        );
        assert_eq!(
            pick(&[
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Rgba8UnormSrgb
            ]),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            pick(&[wgpu::TextureFormat::Rgb10a2Unorm]),
            wgpu::TextureFormat::Rgb10a2Unorm
        );
    }

    #[test]
    fn test_present_mode_follows_vsync() {
        let all = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Immediate,
            wgpu::PresentMode::Mailbox,
        ];
        let mode = |modes: &[wgpu::PresentMode], vsync| {
            surface_configuration(&caps(&[wgpu::TextureFormat::Bgra8UnormSrgb], modes), 8, 8, vsync)
                .present_mode
        };
        assert_eq!(mode(&all, true), wgpu::PresentMode::Fifo);
        assert_eq!(mode(&all, false), wgpu::PresentMode::Mailbox);
        assert_eq!(mode(&all[..2], false), wgpu::PresentMode::Immediate);
        assert_eq!(mode(&all[..1], false), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn test_opaque_alpha_is_preferred() {
        let config = surface_configuration(
            &caps(&[wgpu::TextureFormat::Bgra8UnormSrgb], &[wgpu::PresentMode::Fifo]),
            8,
            8,
            true,
        );
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
    }

    #[test]
    fn test_hdr_support_names_what_is_missing() {
        let full = wgpu::TextureFormatFeatures {
            allowed_usages: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING,
            flags: wgpu::TextureFormatFeatureFlags::FILTERABLE,
        };
        assert!(check_hdr_support("test", full).is_ok());

        let no_storage = wgpu::TextureFormatFeatures {
            allowed_usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
            ..full
        };
        let err = check_hdr_support("test", no_storage).unwrap_err();
        assert_eq!(err.to_string(), "adapter test cannot store to Rgba16Float textures");

        let unfilterable = wgpu::TextureFormatFeatures {
            flags: wgpu::TextureFormatFeatureFlags::empty(),
            ..full
        };
        assert!(matches!(
            check_hdr_support("test", unfilterable),
            Err(GpuContextError::MissingFormatSupport { missing: "filter", .. })
        ));
    }
}
