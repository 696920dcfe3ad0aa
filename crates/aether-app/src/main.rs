//! The binary entry point for the Aether sky viewer.

use aether_app::platform::PlatformDirs;
use aether_config::{CliArgs, Config};
use clap::Parser;
use tracing::{info, warn};

fn main() {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve_and_create() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            std::process::exit(1);
        }
    };
    let dirs = match &args.config {
        Some(dir) => dirs.with_config_dir(dir.clone()),
        None => dirs,
    };

    let (mut config, config_error) = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    aether_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    if let Some(e) = config_error {
        warn!("Using default configuration: {e}");
    }
    info!("Config directory: {}", dirs.config_dir.display());
    info!("Log directory: {}", dirs.log_dir.display());

    aether_app::run_with_config(config);
}
