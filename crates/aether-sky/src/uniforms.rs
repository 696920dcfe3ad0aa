//! Parameter-to-uniform binding.
//!
//! [`UniformSnapshot::bind`] turns a [`ParameterSet`] and the solved sun
//! direction into the exact bytes the sky and water programs read. The
//! snapshot is rebuilt wholesale on every parameter change and never patched
//! field by field. Nothing here validates: out-of-range values, including
//! negative step counts, reach the GPU unchanged.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::params::ParameterSet;

/// Angular diameter of the real sun in degrees; `sunSize` multiplies it.
pub const SOLAR_ANGULAR_DIAMETER: f32 = 0.505;

/// `windSpeed` is authored per ten update ticks.
pub const WIND_SPEED_DIVISOR: f32 = 10.0;

/// Sky program inputs. Matches `SkyUniforms` in `sky.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyUniform {
    /// Unit vector towards the sun. (offset 0)
    pub sun_direction: [f32; 3],
    /// Degrees. (offset 12)
    pub sun_angular_diameter: f32,
    /// (offset 16)
    pub sun_color: [f32; 3],
    /// (offset 28)
    pub sun_intensity: f32,
    /// (offset 32)
    pub up: [f32; 3],
    /// (offset 44)
    pub exposure: f32,
    /// (offset 48)
    pub sky_glow_color: [f32; 3],
    /// (offset 60)
    pub turbidity: f32,
    /// (offset 64)
    pub sun_glow_color: [f32; 3],
    /// (offset 76)
    pub rayleigh: f32,
    /// (offset 80)
    pub back_sky_color: [f32; 3],
    /// (offset 92)
    pub mie_coefficient: f32,
    /// (offset 96)
    pub fog_color: [f32; 3],
    /// (offset 108)
    pub mie_directional_g: f32,
    /// Wind direction, not normalized. (offset 112)
    pub wind: [f32; 3],
    /// Per-tick wind rate. (offset 124)
    pub wind_speed: f32,
    /// (offset 128)
    pub fog_density: f32,
    /// Dome radius in world units. (offset 132)
    pub dome_scale: f32,
    /// Cloud layer thickness as a fraction of the dome radius. (offset 136)
    pub thickness: f32,
    /// (offset 140)
    pub absorption: f32,
    /// (offset 144)
    pub mult: f32,
    /// (offset 148)
    pub weaken: f32,
    /// (offset 152)
    pub coverage: f32,
    /// (offset 156)
    pub skyline_factor: f32,
    /// `1 - curve`. (offset 160)
    pub flatness: f32,
    /// (offset 164)
    pub march_steps: i32,
    /// (offset 168)
    pub light_steps: i32,
    /// (offset 172)
    pub _pad: f32,
}

/// Water program inputs. Matches `WaterUniforms` in `water.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniform {
    /// (offset 0)
    pub sun_direction: [f32; 3],
    /// (offset 12)
    pub distortion_scale: f32,
    /// (offset 16)
    pub sun_color: [f32; 3],
    /// Normal map frequency. (offset 28)
    pub size: f32,
    /// (offset 32)
    pub water_color: [f32; 3],
    /// (offset 44)
    pub alpha: f32,
}

/// Shader-ready state derived from one [`ParameterSet`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformSnapshot {
    pub sky: SkyUniform,
    pub water: WaterUniform,
    /// World-space dome radius, applied as the dome's uniform scale.
    pub dome_scale: f32,
}

impl SkyUniform {
    pub fn from_params(params: &ParameterSet, sun: Vec3) -> Self {
        let cloud = &params.cloud;
        let shading = &params.shading;
        Self {
            sun_direction: sun.to_array(),
            sun_angular_diameter: params.sun.sun_size * SOLAR_ANGULAR_DIAMETER,
            sun_color: shading.sun_color.to_array(),
            sun_intensity: shading.sun_intensity,
            up: shading.up.to_array(),
            exposure: shading.exposure,
            sky_glow_color: shading.sky_glow_color.to_array(),
            turbidity: params.atmosphere.turbidity,
            sun_glow_color: shading.sun_glow_color.to_array(),
            rayleigh: params.atmosphere.rayleigh,
            back_sky_color: shading.back_sky_color.to_array(),
            mie_coefficient: params.atmosphere.mie_coefficient,
            fog_color: shading.fog_color.to_array(),
            mie_directional_g: params.atmosphere.mie_directional_g,
            wind: cloud.wind.to_array(),
            wind_speed: cloud.wind_speed / WIND_SPEED_DIVISOR,
            fog_density: shading.fog_density,
            dome_scale: cloud.scale,
            thickness: cloud.thickness / cloud.scale,
            absorption: cloud.absorption,
            mult: cloud.mult,
            weaken: cloud.weaken,
            coverage: cloud.coverage,
            skyline_factor: cloud.skyline_factor,
            flatness: 1.0 - cloud.curve,
            march_steps: cloud.march_steps,
            light_steps: cloud.light_steps,
            _pad: 0.0,
        }
    }
}

impl WaterUniform {
    pub fn from_params(params: &ParameterSet, sun: Vec3) -> Self {
        Self {
            sun_direction: sun.to_array(),
            distortion_scale: params.water.distortion_scale,
            sun_color: params.water.sun_color.to_array(),
            size: params.water.size,
            water_color: params.water.water_color.to_array(),
            alpha: 1.0,
        }
    }
}

impl UniformSnapshot {
    /// Resolve every shader input from `params` and the solved `sun` direction.
    pub fn bind(params: &ParameterSet, sun: Vec3) -> Self {
        Self {
            sky: SkyUniform::from_params(params, sun),
            water: WaterUniform::from_params(params, sun),
            dome_scale: params.cloud.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sun::sun_direction;

    fn snapshot(params: &ParameterSet) -> UniformSnapshot {
        UniformSnapshot::bind(
            params,
            sun_direction(params.sun.elevation, params.sun.azimuth),
        )
    }

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SkyUniform>(), 176);
        assert_eq!(std::mem::size_of::<SkyUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<WaterUniform>(), 48);
    }

    #[test]
    fn test_atmosphere_is_copied_verbatim() {
        let s = snapshot(&ParameterSet::default());
        assert_eq!(s.sky.turbidity, 10.0);
        assert_eq!(s.sky.rayleigh, 0.4);
        assert_eq!(s.sky.mie_coefficient, 0.005);
        assert_eq!(s.sky.mie_directional_g, 1.0);
    }

    #[test]
    fn test_unit_conversions() {
        let mut params = ParameterSet::default();
        params.sun.sun_size = 2.0;
        params.cloud.wind_speed = 0.5;
        params.cloud.curve = 0.3;
        params.cloud.wind = Vec3::new(0.3, -0.2, 0.1);
        let s = snapshot(&params);
        assert!((s.sky.sun_angular_diameter - 1.01).abs() < 1e-6);
        assert!((s.sky.wind_speed - 0.05).abs() < 1e-7);
        assert!((s.sky.flatness - 0.7).abs() < 1e-6);
        assert_eq!(s.sky.wind, [0.3, -0.2, 0.1]);
        assert!((s.sky.thickness - 6.0 / 6371.393).abs() < 1e-9);
    }

    #[test]
    fn test_thickness_scales_inversely_with_dome_scale() {
        let mut params = ParameterSet::default();
        params.cloud.scale = 1000.0;
        let before = snapshot(&params).sky.thickness;
        params.cloud.scale = 2000.0;
        let after = snapshot(&params).sky.thickness;
        assert_eq!(after, before / 2.0);
    }

    #[test]
    fn test_step_counts_pass_through_unchecked() {
        let mut params = ParameterSet::default();
        params.cloud.march_steps = -3;
        params.cloud.light_steps = 400;
        let s = snapshot(&params);
        assert_eq!(s.sky.march_steps, -3);
        assert_eq!(s.sky.light_steps, 400);
    }

    #[test]
    fn test_sun_direction_reaches_both_programs() {
        let sun = Vec3::new(0.0, 0.6, 0.8);
        let s = UniformSnapshot::bind(&ParameterSet::default(), sun);
        assert_eq!(s.sky.sun_direction, [0.0, 0.6, 0.8]);
        assert_eq!(s.water.sun_direction, [0.0, 0.6, 0.8]);
    }

    #[test]
    fn test_water_fields() {
        let s = snapshot(&ParameterSet::default());
        assert_eq!(s.water.distortion_scale, 3.7);
        assert_eq!(s.water.size, 1.0);
        assert_eq!(s.water.sun_color, [1.0, 1.0, 1.0]);
        assert_eq!(s.water.alpha, 1.0);
        assert_eq!(s.dome_scale, 6371.393);
    }

    #[test]
    fn test_bind_is_bit_identical_for_equal_inputs() {
        let params = ParameterSet::default();
        let a = snapshot(&params);
        let b = snapshot(&params.clone());
        assert_eq!(bytemuck::bytes_of(&a.sky), bytemuck::bytes_of(&b.sky));
        assert_eq!(bytemuck::bytes_of(&a.water), bytemuck::bytes_of(&b.water));
    }
}
