//! A mirror-finish box floating over the water, lit only by the environment bake.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::renderable::{Geometry, MaterialState, Renderable};

pub const STANDARD_PROGRAM: &str = "standard";

pub struct DecorativeProp {
    size: f32,
    translation: Vec3,
    rotation: Quat,
}

impl DecorativeProp {
    pub const SIZE: f32 = 30.0;

    pub fn new() -> Self {
        let mut prop = Self {
            size: Self::SIZE,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        };
        prop.animate(0.0);
        prop
    }

    /// Bob and tumble at `seconds` of scene time.
    pub fn animate(&mut self, seconds: f32) {
        self.translation = Vec3::new(0.0, seconds.sin() * 20.0 + 5.0, 0.0);
        self.rotation = Quat::from_euler(EulerRot::XYZ, seconds * 0.5, 0.0, seconds * 0.51);
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }
}

impl Default for DecorativeProp {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderable for DecorativeProp {
    fn geometry(&self) -> Geometry {
        Geometry::Cuboid { size: self.size }
    }

    fn material(&self) -> MaterialState {
        MaterialState {
            program: STANDARD_PROGRAM,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
        }
    }

    fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}
