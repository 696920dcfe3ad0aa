//! Configuration system for the Aether sky viewer.
//!
//! Engine settings (window, rendering resources, camera placement, debug
//! output) persist to disk as RON and can be overridden from the command
//! line. Sky parameters are deliberately not part of this: they live in
//! memory only and reset to their defaults at every start.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, MAX_FPS_REPORT_INTERVAL_SECS, RenderConfig, WaterClock,
    WindowConfig,
};
pub use error::ConfigError;
