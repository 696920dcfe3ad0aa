//! Aether sky viewer application.
//!
//! Provides window creation, keyboard parameter editing, and the OS
//! directory layout for configuration and logs.

pub mod editor;
pub mod platform;
pub mod window;

pub use window::run_with_config;
