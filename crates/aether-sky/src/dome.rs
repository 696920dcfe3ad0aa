//! The sky dome: an inward-facing sphere shaded by the scattering and cloud program.

use aether_render::{ShaderProgram, TextureImage};
use glam::{Mat4, Vec3};

use crate::params::ParameterSet;
use crate::renderable::{Geometry, MaterialState, Renderable};
use crate::sun::sun_direction;
use crate::uniforms::{SkyUniform, UniformSnapshot};

/// Shader library name of the sky program.
pub const SKY_PROGRAM: &str = "sky";

/// The sky sphere and everything its material consumes.
///
/// The dome's world scale is the `scale` parameter, so the same number sets
/// the horizon distance and the planet radius the cloud curvature assumes.
/// Only the time uniform changes between parameter edits.
pub struct SkyDome {
    noise: TextureImage,
    program: Option<ShaderProgram>,
    uniform: SkyUniform,
    scale: f32,
    time: f32,
}

impl SkyDome {
    /// Sphere tessellation. The dome is far away and smooth-shaded, so this stays coarse.
    pub const WIDTH_SEGMENTS: u32 = 32;
    pub const HEIGHT_SEGMENTS: u32 = 16;

    /// Build a dome around a cloud density `noise` texture.
    ///
    /// Without a `program` the dome still takes part in every update but
    /// draws nothing meaningful.
    pub fn new(noise: TextureImage, program: Option<ShaderProgram>) -> Self {
        if program.is_none() {
            tracing::error!("Sky program unavailable; the dome will not shade");
        }
        let params = ParameterSet::default();
        let snapshot = UniformSnapshot::bind(
            &params,
            sun_direction(params.sun.elevation, params.sun.azimuth),
        );
        Self {
            noise,
            program,
            uniform: snapshot.sky,
            scale: snapshot.dome_scale,
            time: 0.0,
        }
    }

    /// Replace the material state with `snapshot`.
    pub fn apply(&mut self, snapshot: &UniformSnapshot) {
        self.uniform = snapshot.sky;
        self.scale = snapshot.dome_scale;
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn uniform(&self) -> &SkyUniform {
        &self.uniform
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn noise(&self) -> &TextureImage {
        &self.noise
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    pub fn is_functional(&self) -> bool {
        self.program.is_some()
    }

    pub fn sun_direction(&self) -> Vec3 {
        Vec3::from(self.uniform.sun_direction)
    }
}

impl Renderable for SkyDome {
    fn geometry(&self) -> Geometry {
        Geometry::Sphere {
            width_segments: Self::WIDTH_SEGMENTS,
            height_segments: Self::HEIGHT_SEGMENTS,
        }
    }

    /// Back faces only, never writes depth.
    fn material(&self) -> MaterialState {
        MaterialState {
            program: SKY_PROGRAM,
            cull_mode: Some(wgpu::Face::Front),
            depth_write: false,
        }
    }

    fn transform(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dome() -> SkyDome {
        SkyDome::new(
            TextureImage::tiling_noise(8, 1),
            Some(ShaderProgram {
                name: SKY_PROGRAM.to_string(),
                source: "@vertex fn vs_main() {}".into(),
            }),
        )
    }

    #[test]
    fn test_material_is_inward_facing_and_depthless() {
        let material = dome().material();
        assert_eq!(material.cull_mode, Some(wgpu::Face::Front));
        assert!(!material.depth_write);
        assert_eq!(material.program, "sky");
    }

    #[test]
    fn test_transform_follows_scale() {
        let mut dome = dome();
        let mut params = ParameterSet::default();
        params.cloud.scale = 1234.0;
        dome.apply(&UniformSnapshot::bind(&params, Vec3::Y));

        assert_eq!(dome.scale(), 1234.0);
        let p = dome.transform().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1234.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_apply_replaces_uniform_but_not_time() {
        let mut dome = dome();
        dome.set_time(12.5);
        let mut params = ParameterSet::default();
        params.atmosphere.turbidity = 3.0;
        dome.apply(&UniformSnapshot::bind(&params, Vec3::Y));

        assert_eq!(dome.uniform().turbidity, 3.0);
        assert_eq!(dome.sun_direction(), Vec3::Y);
        assert_eq!(dome.time(), 12.5);
    }

    #[test]
    fn test_missing_program_yields_inert_dome() {
        let mut dome = SkyDome::new(TextureImage::tiling_noise(4, 0), None);
        assert!(!dome.is_functional());
        dome.apply(&UniformSnapshot::bind(&ParameterSet::default(), Vec3::Y));
        dome.set_time(1.0);
        assert_eq!(dome.time(), 1.0);
    }

    #[test]
    fn test_new_dome_starts_with_default_state() {
        let dome = dome();
        assert_eq!(dome.scale(), 6371.393);
        assert_eq!(dome.noise().width, 8);
        assert!(dome.sun_direction().y > 0.0);
    }
}
