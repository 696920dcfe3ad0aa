//! The editable sky configuration and its advisory ranges.
//!
//! [`ParameterSet`] is plain data grouped by concern. Editing surfaces
//! address fields by their external name (`"mieCoefficient"`, `"windX"`,
//! ...) through [`ParameterSet::get`] / [`ParameterSet::set`] and read
//! ranges from [`ParameterSet::specs`]. Ranges are metadata only: nothing in
//! the uniform pipeline clamps or rejects values.

use glam::Vec3;

/// Sun placement and apparent size.
#[derive(Debug, Clone, PartialEq)]
pub struct SunParams {
    /// Degrees above the horizon.
    pub elevation: f32,
    /// Degrees around the vertical axis.
    pub azimuth: f32,
    /// Multiplier on the real solar angular diameter.
    pub sun_size: f32,
}

/// Rayleigh/Mie scattering coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphereParams {
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
}

/// Dome size and cloud raymarch controls.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudParams {
    /// World-space radius of the dome; doubles as the planet radius.
    pub scale: f32,
    pub mult: f32,
    pub weaken: f32,
    /// Cloud layer thickness in world units.
    pub thickness: f32,
    pub absorption: f32,
    pub march_steps: i32,
    pub light_steps: i32,
    pub coverage: f32,
    pub skyline_factor: f32,
    pub curve: f32,
    pub wind_speed: f32,
    pub wind: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterParams {
    pub distortion_scale: f32,
    /// Normal map frequency multiplier.
    pub size: f32,
    pub water_color: Vec3,
    pub sun_color: Vec3,
}

/// Look-development inputs of the sky program that have no physical derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingParams {
    pub sun_color: Vec3,
    pub sun_intensity: f32,
    pub exposure: f32,
    pub sky_glow_color: Vec3,
    pub sun_glow_color: Vec3,
    pub back_sky_color: Vec3,
    pub up: Vec3,
    pub fog_color: Vec3,
    pub fog_density: f32,
}

/// Everything an editing surface can change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    pub sun: SunParams,
    pub atmosphere: AtmosphereParams,
    pub cloud: CloudParams,
    pub water: WaterParams,
    pub shading: ShadingParams,
}

impl Default for SunParams {
    fn default() -> Self {
        Self {
            elevation: 45.0,
            azimuth: 180.0,
            sun_size: 1.0,
        }
    }
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 0.4,
            mie_coefficient: 0.005,
            mie_directional_g: 1.0,
        }
    }
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            scale: 6371.393,
            mult: 0.2,
            weaken: 0.15,
            thickness: 6.0,
            absorption: 0.45,
            march_steps: 12,
            light_steps: 3,
            coverage: 0.5,
            skyline_factor: 0.2,
            curve: 0.3,
            wind_speed: 0.5,
            wind: Vec3::new(0.3, 0.3, 0.1),
        }
    }
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            distortion_scale: 3.7,
            size: 1.0,
            // 0x001e0f
            water_color: Vec3::new(0.0, 30.0 / 255.0, 15.0 / 255.0),
            sun_color: Vec3::ONE,
        }
    }
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            sun_color: Vec3::new(1.0, 0.0, 0.0),
            sun_intensity: 1.0,
            exposure: 1.0,
            sky_glow_color: Vec3::new(1.0, 0.5, 0.5),
            sun_glow_color: Vec3::new(0.9216, 0.2431, 0.1059),
            back_sky_color: Vec3::splat(0.1),
            up: Vec3::Y,
            fog_color: Vec3::splat(0.7),
            fog_density: 0.0001,
        }
    }
}

/// Which subgroup a parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamGroup {
    Sun,
    Atmosphere,
    Cloud,
    Water,
    Shading,
}

/// Shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    Integer,
    Vector,
}

/// A parameter value as seen by an editing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Integer(i32),
    Vector(Vec3),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Scalar(_) => ParamKind::Scalar,
            ParamValue::Integer(_) => ParamKind::Integer,
            ParamValue::Vector(_) => ParamKind::Vector,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParameterError {
    #[error("unknown parameter '{0}'")]
    Unknown(String),

    #[error("parameter '{name}' expects a {expected:?} value, got {found:?}")]
    KindMismatch {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },
}

/// Advisory range and slider step of one parameter. Vector ranges apply per component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub group: ParamGroup,
    pub kind: ParamKind,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamSpec {
    /// `value` limited to this range; integers are rounded.
    pub fn clamp(&self, value: ParamValue) -> ParamValue {
        match value {
            ParamValue::Scalar(v) => ParamValue::Scalar(v.clamp(self.min, self.max)),
            ParamValue::Integer(v) => {
                ParamValue::Integer((v as f32).clamp(self.min, self.max).round() as i32)
            }
            ParamValue::Vector(v) => {
                ParamValue::Vector(v.clamp(Vec3::splat(self.min), Vec3::splat(self.max)))
            }
        }
    }

    /// `value` moved by `steps` slider steps and clamped. Vectors are returned unchanged.
    pub fn nudge(&self, value: ParamValue, steps: f32) -> ParamValue {
        let delta = self.step * steps;
        let moved = match value {
            ParamValue::Scalar(v) => ParamValue::Scalar(v + delta),
            ParamValue::Integer(v) => ParamValue::Integer(v + delta.round() as i32),
            ParamValue::Vector(v) => return ParamValue::Vector(v),
        };
        self.clamp(moved)
    }
}

const fn spec(
    name: &'static str,
    group: ParamGroup,
    kind: ParamKind,
    min: f32,
    max: f32,
    step: f32,
) -> ParamSpec {
    ParamSpec {
        name,
        group,
        kind,
        min,
        max,
        step,
    }
}

use ParamGroup::{Atmosphere, Cloud, Shading, Sun, Water};
use ParamKind::{Integer, Scalar, Vector};

static PARAM_SPECS: &[ParamSpec] = &[
    spec("elevation", Sun, Scalar, 0.0, 90.0, 0.1),
    spec("azimuth", Sun, Scalar, -180.0, 180.0, 0.1),
    spec("sunSize", Sun, Scalar, 0.0, 10.0, 1.0),
    spec("turbidity", Atmosphere, Scalar, 0.0, 20.0, 1.0),
    spec("rayleigh", Atmosphere, Scalar, 0.0, 4.0, 0.001),
    spec("mieCoefficient", Atmosphere, Scalar, 0.0, 0.1, 0.001),
    spec("mieDirectionalG", Atmosphere, Scalar, 0.0, 0.99999999999, 0.001),
    spec("scale", Cloud, Scalar, 0.0, 10000.0, 1.0),
    spec("mult", Cloud, Scalar, 0.0, 5.0, 0.01),
    spec("weaken", Cloud, Scalar, 0.0, 1.0, 0.01),
    spec("thickness", Cloud, Scalar, 0.0, 20.0, 0.001),
    spec("absorption", Cloud, Scalar, 0.0, 1.0, 0.01),
    spec("marchSteps", Cloud, Integer, 0.0, 30.0, 1.0),
    spec("lightSteps", Cloud, Integer, 0.0, 10.0, 1.0),
    spec("coverage", Cloud, Scalar, 0.0, 1.0, 0.01),
    spec("skylineFactor", Cloud, Scalar, 0.0, 1.0, 0.01),
    spec("curve", Cloud, Scalar, 0.1, 0.6, 0.01),
    spec("windSpeed", Cloud, Scalar, 0.0, 10.0, 0.1),
    spec("windX", Cloud, Scalar, -1.0, 1.0, 0.01),
    spec("windY", Cloud, Scalar, -1.0, 1.0, 0.01),
    spec("windZ", Cloud, Scalar, -1.0, 1.0, 0.01),
    spec("distortionScale", Water, Scalar, 0.0, 8.0, 0.1),
    spec("size", Water, Scalar, 0.1, 10.0, 0.1),
    spec("waterColor", Water, Vector, 0.0, 1.0, 0.01),
    spec("waterSunColor", Water, Vector, 0.0, 1.0, 0.01),
    spec("sunColor", Shading, Vector, 0.0, 1.0, 0.01),
    spec("sunIntensity", Shading, Scalar, 0.0, 10.0, 0.1),
    spec("exposure", Shading, Scalar, 0.0, 10.0, 0.01),
    spec("skyGlowColor", Shading, Vector, 0.0, 1.0, 0.01),
    spec("sunGlowColor", Shading, Vector, 0.0, 1.0, 0.01),
    spec("backSkyColor", Shading, Vector, 0.0, 1.0, 0.01),
    spec("up", Shading, Vector, -1.0, 1.0, 0.01),
    spec("fogColor", Shading, Vector, 0.0, 1.0, 0.01),
    spec("fogDensity", Shading, Scalar, 0.0, 0.01, 0.00001),
];

enum FieldMut<'a> {
    Scalar(&'a mut f32),
    Integer(&'a mut i32),
    Vector(&'a mut Vec3),
}

/// Generates the by-name accessors from one name-to-field table.
macro_rules! named_fields {
    ($($name:literal => $($path:ident).+ : $kind:ident),* $(,)?) => {
        impl ParameterSet {
            fn field(&self, name: &str) -> Option<ParamValue> {
                match name {
                    $($name => Some(ParamValue::$kind(self.$($path).+)),)*
                    _ => None,
                }
            }

            fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
                match name {
                    $($name => Some(FieldMut::$kind(&mut self.$($path).+)),)*
                    _ => None,
                }
            }
        }
    };
}

named_fields! {
    "elevation" => sun.elevation: Scalar,
    "azimuth" => sun.azimuth: Scalar,
    "sunSize" => sun.sun_size: Scalar,
    "turbidity" => atmosphere.turbidity: Scalar,
    "rayleigh" => atmosphere.rayleigh: Scalar,
    "mieCoefficient" => atmosphere.mie_coefficient: Scalar,
    "mieDirectionalG" => atmosphere.mie_directional_g: Scalar,
    "scale" => cloud.scale: Scalar,
    "mult" => cloud.mult: Scalar,
    "weaken" => cloud.weaken: Scalar,
    "thickness" => cloud.thickness: Scalar,
    "absorption" => cloud.absorption: Scalar,
    "marchSteps" => cloud.march_steps: Integer,
    "lightSteps" => cloud.light_steps: Integer,
    "coverage" => cloud.coverage: Scalar,
    "skylineFactor" => cloud.skyline_factor: Scalar,
    "curve" => cloud.curve: Scalar,
    "windSpeed" => cloud.wind_speed: Scalar,
    "windX" => cloud.wind.x: Scalar,
    "windY" => cloud.wind.y: Scalar,
    "windZ" => cloud.wind.z: Scalar,
    "distortionScale" => water.distortion_scale: Scalar,
    "size" => water.size: Scalar,
    "waterColor" => water.water_color: Vector,
    "waterSunColor" => water.sun_color: Vector,
    "sunColor" => shading.sun_color: Vector,
    "sunIntensity" => shading.sun_intensity: Scalar,
    "exposure" => shading.exposure: Scalar,
    "skyGlowColor" => shading.sky_glow_color: Vector,
    "sunGlowColor" => shading.sun_glow_color: Vector,
    "backSkyColor" => shading.back_sky_color: Vector,
    "up" => shading.up: Vector,
    "fogColor" => shading.fog_color: Vector,
    "fogDensity" => shading.fog_density: Scalar,
}

impl ParameterSet {
    /// All editable parameters with their advisory ranges.
    pub fn specs() -> &'static [ParamSpec] {
        PARAM_SPECS
    }

    pub fn spec(name: &str) -> Option<&'static ParamSpec> {
        PARAM_SPECS.iter().find(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Result<ParamValue, ParameterError> {
        self.field(name)
            .ok_or_else(|| ParameterError::Unknown(name.to_string()))
    }

    /// Store `value` verbatim. Out-of-range values are accepted.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let field = self
            .field_mut(name)
            .ok_or_else(|| ParameterError::Unknown(name.to_string()))?;
        match (field, value) {
            (FieldMut::Scalar(slot), ParamValue::Scalar(v)) => *slot = v,
            (FieldMut::Integer(slot), ParamValue::Integer(v)) => *slot = v,
            (FieldMut::Vector(slot), ParamValue::Vector(v)) => *slot = v,
            (field, value) => {
                let expected = match field {
                    FieldMut::Scalar(_) => ParamKind::Scalar,
                    FieldMut::Integer(_) => ParamKind::Integer,
                    FieldMut::Vector(_) => ParamKind::Vector,
                };
                return Err(ParameterError::KindMismatch {
                    name: name.to_string(),
                    expected,
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }
}
