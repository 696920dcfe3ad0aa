//! Window creation and event handling via winit.
//!
//! [`App`] implements winit's [`ApplicationHandler`]: it builds the scene and
//! the GPU backend when the window appears, forwards resizes and key edits
//! to the orchestration loop, and drives one frame per redraw.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aether_config::{Config, DebugConfig, MAX_FPS_REPORT_INTERVAL_SECS};
use aether_render::{Camera, ShaderLibrary, SurfaceError, TextureImage, init_gpu_context_blocking};
use aether_sky::{
    DecorativeProp, FpsReporter, OrchestrationLoop, RenderContext, SKY_PROGRAM, SkyDome,
    WaterSurface, WgpuBackend, register_builtin_programs,
};
use glam::Vec3;
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::editor::ParameterEditor;

/// Default window title.
pub const DEFAULT_TITLE: &str = "Aether Sky";

/// Size of the procedural textures used when an asset file cannot be read.
pub const FALLBACK_TEXTURE_SIZE: u32 = 256;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// The static scene camera for a viewport of `width` x `height`.
pub fn camera_from_config(config: &Config, width: u32, height: u32) -> Camera {
    let camera_config = &config.camera;
    let mut camera = Camera::look_at(
        Vec3::from(camera_config.position),
        Vec3::from(camera_config.target),
        camera_config.fov_y_degrees,
        camera_config.near,
        camera_config.far,
    );
    camera.set_aspect_ratio(width as f32, height as f32);
    camera
}

/// Decode `path`, or log why not and use `fallback`.
pub fn load_texture_or(path: &Path, fallback: impl FnOnce() -> TextureImage) -> TextureImage {
    match TextureImage::load(path) {
        Ok(image) => {
            info!("Loaded {} ({}x{})", path.display(), image.width, image.height);
            image
        }
        Err(e) => {
            warn!(
                "Failed to load {}: {e}; using a procedural texture",
                path.display()
            );
            fallback()
        }
    }
}

/// How often the FPS reporter logs. Out-of-range settings fall back to the default.
pub fn fps_report_interval(debug: &DebugConfig) -> Duration {
    let secs = debug.fps_report_interval_secs;
    if secs > 0.0 && secs <= MAX_FPS_REPORT_INTERVAL_SECS {
        return Duration::from_secs_f32(secs.max(0.1));
    }
    let fallback = DebugConfig::default().fps_report_interval_secs;
    warn!("FPS report interval {secs} s is unusable; reporting every {fallback} s");
    Duration::from_secs_f32(fallback)
}

/// Window, scene and editing state.
pub struct App {
    config: Config,
    window: Option<Arc<Window>>,
    orchestration: Option<OrchestrationLoop<WgpuBackend>>,
    editor: ParameterEditor,
    start_time: Instant,
}

impl App {
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            window: None,
            orchestration: None,
            editor: ParameterEditor::new(),
            start_time: Instant::now(),
        }
    }

    /// Build the scene around `window` and start the loop.
    fn initialize(&self, window: Arc<Window>) -> Result<OrchestrationLoop<WgpuBackend>, String> {
        let render_config = &self.config.render;
        let gpu = init_gpu_context_blocking(window.clone(), self.config.window.vsync)
            .map_err(|e| format!("GPU initialization failed: {e}"))?;

        let mut shaders = match &render_config.shader_dir {
            Some(dir) => {
                info!("Loading shaders from {}", dir.display());
                ShaderLibrary::new().with_shader_dir(dir)
            }
            None => ShaderLibrary::new(),
        };
        register_builtin_programs(&mut shaders);

        let sky_program = match shaders.program(SKY_PROGRAM) {
            Ok(program) => Some(program),
            Err(e) => {
                error!("Sky program unavailable: {e}");
                None
            }
        };
        let noise = load_texture_or(&render_config.noise_texture, || {
            TextureImage::tiling_noise(FALLBACK_TEXTURE_SIZE, 0)
        });
        let normals = load_texture_or(&render_config.water_normals, || {
            TextureImage::tiling_normal_map(FALLBACK_TEXTURE_SIZE, 1)
        });

        let sky = SkyDome::new(noise, sky_program);
        let water = WaterSurface::new(sky.scale(), normals);
        let backend = WgpuBackend::new(
            gpu,
            &mut shaders,
            &sky,
            &water,
            &DecorativeProp::new(),
            render_config,
        )
        .map_err(|e| format!("Render backend creation failed: {e}"))?;

        let size = window.inner_size();
        let camera = camera_from_config(&self.config, size.width, size.height);
        let mut ctx = RenderContext::new(backend, camera, sky, water, render_config.water_clock);
        if self.config.debug.show_fps {
            let interval = fps_report_interval(&self.config.debug);
            ctx = ctx.with_observer(Box::new(FpsReporter::new(interval)));
        }

        let mut orchestration = OrchestrationLoop::new(ctx);
        orchestration.start();
        Ok(orchestration)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(orchestration)) = (&self.window, &mut self.orchestration) else {
            return;
        };

        if let Some(params) = self.editor.take_batch(orchestration.params()) {
            orchestration.apply_parameters(params);
        }

        match orchestration.frame(self.start_time.elapsed()) {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                let size = window.inner_size();
                orchestration.resize(size.width, size.height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, exiting");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {}
        }

        window.request_redraw();
    }

    fn shutdown(&mut self) {
        if let Some(orchestration) = self.orchestration.take() {
            orchestration.shutdown();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("Failed to create window"),
        );

        match self.initialize(window.clone()) {
            Ok(orchestration) => self.orchestration = Some(orchestration),
            Err(e) => {
                error!("{e}");
                event_loop.exit();
                return;
            }
        }

        self.start_time = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(orchestration) = &mut self.orchestration {
                    orchestration.resize(new_size.width, new_size.height);
                    info!("Window resized to {}x{}", new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    self.shutdown();
                    event_loop.exit();
                } else {
                    self.editor.process_event(&event);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer with the given config.
///
/// This function blocks until the window is closed.
#[instrument(skip(config))]
pub fn run_with_config(config: Config) {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = App::with_config(config);
    event_loop.run_app(&mut app).expect("Event loop failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_title() {
        assert_eq!(DEFAULT_TITLE, "Aether Sky");
        assert_eq!(Config::default().window.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_app_starts_without_window() {
        let app = App::with_config(Config::default());
        assert!(app.window.is_none());
        assert!(app.orchestration.is_none());
    }

    #[test]
    fn test_camera_follows_config() {
        let camera = camera_from_config(&Config::default(), 800, 600);
        assert_eq!(camera.position, Vec3::new(0.0, 100.0, 300.0));
        assert!((camera.aspect_ratio - 800.0 / 600.0).abs() < 1e-6);
        assert!((camera.fov_y - 55f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.far, 20000.0);
    }

    #[test]
    fn test_missing_texture_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let image = load_texture_or(&dir.path().join("perlin256.png"), || {
            TextureImage::tiling_noise(4, 0)
        });
        assert_eq!((image.width, image.height), (4, 4));
    }

    #[test]
    fn test_fps_report_interval_falls_back_when_unusable() {
        let interval = |secs| {
            fps_report_interval(&DebugConfig {
                fps_report_interval_secs: secs,
                ..DebugConfig::default()
            })
        };
        assert_eq!(interval(0.5), Duration::from_millis(500));
        assert_eq!(interval(0.01), Duration::from_secs_f32(0.1));
        for unusable in [1e30, f32::INFINITY, f32::NAN, -3.0] {
            assert_eq!(interval(unusable), Duration::from_secs(2));
        }
    }

    #[test]
    fn test_window_builder_from_config() {
        let _attrs = window_attributes_from_config(&Config::default());
    }
}
