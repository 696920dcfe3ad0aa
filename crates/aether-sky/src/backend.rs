//! The seam between the orchestration core and a GPU.

use aether_render::Camera;

use crate::dome::SkyDome;
use crate::prop::DecorativeProp;
use crate::water::WaterSurface;

/// Everything one frame draws, borrowed from the render context.
pub struct SceneView<'a> {
    pub camera: &'a Camera,
    pub sky: &'a SkyDome,
    pub water: &'a WaterSurface,
    pub prop: &'a DecorativeProp,
}

/// A renderer the orchestration loop can drive.
///
/// Environment bakes are opaque to the core. The backend creates them,
/// installs one as the scene's ambient light, and frees them when told to;
/// [`EnvironmentBaker`](crate::bake::EnvironmentBaker) decides when.
pub trait RenderBackend {
    /// A prefiltered environment resource.
    type Environment;
    /// Per-frame failure, such as an unavailable surface.
    type Error: std::fmt::Display;

    /// Push the dome and water material state to the GPU after a parameter change.
    fn upload_materials(&mut self, sky: &SkyDome, water: &WaterSurface);

    /// Capture `sky` into a new environment. Allocation failure is not recoverable.
    fn bake_environment(&mut self, sky: &SkyDome) -> Self::Environment;

    fn release_environment(&mut self, environment: Self::Environment);

    /// Make `environment` the lighting source of every environment-lit material.
    fn install_environment(&mut self, environment: &Self::Environment);

    fn render(&mut self, scene: &SceneView<'_>) -> Result<(), Self::Error>;

    /// The output surface changed size in physical pixels.
    fn resize(&mut self, width: u32, height: u32);
}
