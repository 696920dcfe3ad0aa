//! Command-line argument parsing for the Aether sky viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, WaterClock};

/// Aether command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "aether", about = "Procedural sky, clouds and water viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory that relative asset paths are resolved against.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Advance water animation by wall-clock time instead of a fixed per-frame step.
    #[arg(long)]
    pub wall_clock_water: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref root) = args.assets {
            self.rebase_assets(root);
        }
        if args.wall_clock_water {
            self.render.water_clock = WaterClock::WallClock;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            log_level: Some("debug".to_string()),
            wall_clock_water: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.debug.log_level, "debug");
        assert_eq!(config.render.water_clock, WaterClock::WallClock);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["aether", "--height", "600", "--wall-clock-water"]);
        assert_eq!(args.height, Some(600));
        assert!(args.wall_clock_water);
        assert!(args.width.is_none());
    }
}
