//! Built-in WGSL programs.

use aether_render::ShaderLibrary;

use crate::dome::SKY_PROGRAM;
use crate::prop::STANDARD_PROGRAM;
use crate::water::WATER_PROGRAM;

/// Shader library name of the environment prefilter compute program.
pub const ENVIRONMENT_PROGRAM: &str = "environment";

pub const SKY_SHADER_SOURCE: &str = include_str!("../shaders/sky.wgsl");
pub const WATER_SHADER_SOURCE: &str = include_str!("../shaders/water.wgsl");
pub const STANDARD_SHADER_SOURCE: &str = include_str!("../shaders/standard.wgsl");
pub const ENVIRONMENT_SHADER_SOURCE: &str = include_str!("../shaders/environment.wgsl");

/// Register every program the viewer draws with.
pub fn register_builtin_programs(library: &mut ShaderLibrary) {
    library.register_builtin(SKY_PROGRAM, SKY_SHADER_SOURCE);
    library.register_builtin(WATER_PROGRAM, WATER_SHADER_SOURCE);
    library.register_builtin(STANDARD_PROGRAM, STANDARD_SHADER_SOURCE);
    library.register_builtin(ENVIRONMENT_PROGRAM, ENVIRONMENT_SHADER_SOURCE);
}
