//! Procedural sky scene: Preetham scattering with raymarched clouds on a
//! dome, a reflective water plane, a decorative cube, and the environment
//! bake that lights the latter two from the sky.
//!
//! The scene logic (parameters, uniform binding, animation clock, bake
//! lifecycle, per-frame orchestration) is GPU-agnostic and drives any
//! [`RenderBackend`]; [`gpu::WgpuBackend`] is the wgpu implementation.

pub mod backend;
pub mod bake;
pub mod clock;
pub mod dome;
pub mod gpu;
pub mod orchestration;
pub mod overlay;
pub mod params;
pub mod programs;
pub mod prop;
pub mod renderable;
pub mod sun;
pub mod uniforms;
pub mod water;

pub use backend::{RenderBackend, SceneView};
pub use bake::{Bake, EnvironmentBaker};
pub use clock::{AnimationClock, WATER_STEP};
pub use dome::{SKY_PROGRAM, SkyDome};
pub use gpu::{EnvironmentMap, WgpuBackend};
pub use orchestration::{LoopState, OrchestrationLoop, RenderContext};
pub use overlay::{FpsReporter, FrameObserver};
pub use params::{ParamGroup, ParamKind, ParamSpec, ParamValue, ParameterError, ParameterSet};
pub use programs::register_builtin_programs;
pub use prop::{DecorativeProp, STANDARD_PROGRAM};
pub use renderable::{Geometry, MaterialState, Renderable};
pub use sun::sun_direction;
pub use uniforms::{SkyUniform, UniformSnapshot, WaterUniform};
pub use water::{WATER_PROGRAM, WaterSurface};
