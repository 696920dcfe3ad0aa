//! The reflective water plane.

use std::f32::consts::FRAC_PI_2;

use aether_render::TextureImage;
use glam::Mat4;

use crate::params::ParameterSet;
use crate::renderable::{Geometry, MaterialState, Renderable};
use crate::sun::sun_direction;
use crate::uniforms::{UniformSnapshot, WaterUniform};

pub const WATER_PROGRAM: &str = "water";

/// A horizontal square of side `extent` at y = 0 with an animated normal map.
///
/// The extent is fixed when the surface is built; later `scale` edits move
/// the dome horizon but leave the plane alone.
pub struct WaterSurface {
    extent: f32,
    normals: TextureImage,
    uniform: WaterUniform,
    time: f32,
}

impl WaterSurface {
    pub fn new(extent: f32, normals: TextureImage) -> Self {
        let params = ParameterSet::default();
        let uniform = WaterUniform::from_params(
            &params,
            sun_direction(params.sun.elevation, params.sun.azimuth),
        );
        Self {
            extent,
            normals,
            uniform,
            time: 0.0,
        }
    }

    pub fn apply(&mut self, snapshot: &UniformSnapshot) {
        self.uniform = snapshot.water;
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn uniform(&self) -> &WaterUniform {
        &self.uniform
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn normals(&self) -> &TextureImage {
        &self.normals
    }
}

impl Renderable for WaterSurface {
    fn geometry(&self) -> Geometry {
        Geometry::Plane {
            width: self.extent,
            height: self.extent,
        }
    }

    fn material(&self) -> MaterialState {
        MaterialState {
            program: WATER_PROGRAM,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
        }
    }

    /// Lays the XY plane flat so its normal points up.
    fn transform(&self) -> Mat4 {
        Mat4::from_rotation_x(-FRAC_PI_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn water() -> WaterSurface {
        WaterSurface::new(1000.0, TextureImage::tiling_normal_map(8, 0))
    }

    #[test]
    fn test_plane_lies_flat_facing_up() {
        let water = water();
        let normal = water.transform().transform_vector3(Vec3::Z);
        assert!((normal - Vec3::Y).length() < 1e-6);
        let corner = water.transform().transform_point3(Vec3::new(500.0, 500.0, 0.0));
        assert!(corner.y.abs() < 1e-3);
    }

    #[test]
    fn test_extent_is_fixed_at_construction() {
        let mut water = water();
        let mut params = ParameterSet::default();
        params.cloud.scale = 50.0;
        water.apply(&UniformSnapshot::bind(&params, Vec3::Y));
        assert_eq!(
            water.geometry(),
            Geometry::Plane {
                width: 1000.0,
                height: 1000.0
            }
        );
    }

    #[test]
    fn test_apply_takes_water_uniform() {
        let mut water = water();
        let mut params = ParameterSet::default();
        params.water.distortion_scale = 1.5;
        water.apply(&UniformSnapshot::bind(&params, Vec3::X));
        assert_eq!(water.uniform().distortion_scale, 1.5);
        assert_eq!(water.uniform().sun_direction, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_time() {
        let mut water = water();
        water.set_time(0.5);
        assert_eq!(water.time(), 0.5);
    }
}
