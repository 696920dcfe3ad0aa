//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Longest accepted FPS report interval, in seconds.
pub const MAX_FPS_REPORT_INTERVAL_SECS: f32 = 3600.0;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering resources and environment bake settings.
    pub render: RenderConfig,
    /// Static camera placement.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// How the water surface advances its animation time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WaterClock {
    /// A constant 1/60 s per rendered frame, independent of frame duration.
    #[default]
    FixedStep,
    /// The same wall-clock seconds the sky uses.
    WallClock,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Face size in texels of the baked environment cube.
    pub environment_size: u32,
    /// Number of prefiltered roughness levels in the environment bake.
    pub environment_mip_levels: u32,
    /// Water time source.
    pub water_clock: WaterClock,
    /// Cloud density noise texture.
    pub noise_texture: PathBuf,
    /// Tiling water normal map.
    pub water_normals: PathBuf,
    /// Load WGSL programs from this directory instead of the built-in copies.
    pub shader_dir: Option<PathBuf>,
}

/// Camera placement. The camera is static; only its aspect ratio follows the window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// World-space eye position.
    pub position: [f32; 3],
    /// World-space look-at target.
    pub target: [f32; 3],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Report frame rate through the log.
    pub show_fps: bool,
    /// Seconds between frame rate reports.
    pub fps_report_interval_secs: f32,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Aether Sky".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            environment_size: 256,
            environment_mip_levels: 6,
            water_clock: WaterClock::FixedStep,
            noise_texture: PathBuf::from("assets/perlin256.png"),
            water_normals: PathBuf::from("assets/waternormals.jpg"),
            shader_dir: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 55.0,
            near: 1.0,
            far: 20000.0,
            position: [0.0, 100.0, 300.0],
            target: [0.0, 10.0, 0.0],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: true,
            fps_report_interval_secs: 2.0,
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let write_error = |source| ConfigError::Write {
            path: config_path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(write_error)?;
        Ok(())
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        let render = &self.render;
        if !render.environment_size.is_power_of_two() || render.environment_size < 8 {
            return invalid("render.environment_size", "must be a power of two of at least 8");
        }
        if render.environment_mip_levels == 0 {
            return invalid("render.environment_mip_levels", "must be at least 1");
        }
        let camera = &self.camera;
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) {
            return invalid("camera.fov_y_degrees", "must lie strictly between 0 and 180");
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return invalid("camera.near", "need 0 < near < far");
        }
        if camera.position == camera.target {
            return invalid("camera.target", "must differ from the camera position");
        }
        if self.window.width == 0 || self.window.height == 0 {
            return invalid("window", "width and height must be non-zero");
        }
        let interval = self.debug.fps_report_interval_secs;
        if !(interval > 0.0 && interval <= MAX_FPS_REPORT_INTERVAL_SECS) {
            return invalid(
                "debug.fps_report_interval_secs",
                "must be a positive number of seconds up to 3600",
            );
        }
        Ok(())
    }

    /// Resolve relative asset paths against `assets_root`.
    pub fn rebase_assets(&mut self, assets_root: &Path) {
        for path in [&mut self.render.noise_texture, &mut self.render.water_normals] {
            if path.is_relative() {
                *path = assets_root.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("environment_size: 256"));
        assert!(ron_str.contains("FixedStep"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.render.water_clock = WaterClock::WallClock;
        config.render.shader_dir = Some(PathBuf::from("shaders"));
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(window: (width: 640), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.render, RenderConfig::default());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_camera_defaults() {
        let camera = CameraConfig::default();
        assert_eq!(camera.fov_y_degrees, 55.0);
        assert_eq!(camera.near, 1.0);
        assert_eq!(camera.far, 20000.0);
        assert_eq!(camera.position, [0.0, 100.0, 300.0]);
        assert_eq!(camera.target, [0.0, 10.0, 0.0]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.window.height = 1080;
        config.render.environment_size = 128;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut config = Config::default();
        config.render.environment_size = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "render.environment_size",
                ..
            })
        ));

        let mut config = Config::default();
        config.camera.near = 50.0;
        config.camera.far = 10.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid camera.near: need 0 < near < far");

        for interval in [0.0, -1.0, 1e30, f32::INFINITY, f32::NAN] {
            let mut config = Config::default();
            config.debug.fps_report_interval_secs = interval;
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::Invalid {
                        field: "debug.fps_report_interval_secs",
                        ..
                    })
                ),
                "interval {interval} accepted"
            );
        }
    }

    #[test]
    fn test_invalid_file_is_reported_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "(render: (environment_mip_levels: 0))").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("environment_mip_levels: 0"));
    }

    #[test]
    fn test_rebase_assets_only_touches_relative_paths() {
        let mut config = Config::default();
        let absolute = std::env::temp_dir().join("normals.jpg");
        config.render.water_normals = absolute.clone();
        config.rebase_assets(Path::new("/opt/aether"));
        assert_eq!(
            config.render.noise_texture,
            Path::new("/opt/aether").join("assets/perlin256.png")
        );
        assert_eq!(config.render.water_normals, absolute);
    }
}
