//! The capability every scene object exposes to a renderer.

use aether_render::MeshData;
use glam::Mat4;

/// Procedural geometry, generated in object space by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Unit-radius latitude/longitude sphere.
    Sphere {
        width_segments: u32,
        height_segments: u32,
    },
    /// XY plane facing +Z.
    Plane { width: f32, height: f32 },
    Cuboid { size: f32 },
}

impl Geometry {
    pub fn mesh(&self) -> MeshData {
        match *self {
            Geometry::Sphere {
                width_segments,
                height_segments,
            } => MeshData::uv_sphere(1.0, width_segments, height_segments),
            Geometry::Plane { width, height } => MeshData::plane(width, height),
            Geometry::Cuboid { size } => MeshData::cuboid(size),
        }
    }
}

/// Fixed-function state and program of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialState {
    /// Shader library name.
    pub program: &'static str,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
}

/// Something the scene can draw: what it is made of, how it is shaded, and where it sits.
pub trait Renderable {
    fn geometry(&self) -> Geometry;
    fn material(&self) -> MaterialState;
    fn transform(&self) -> Mat4;
}
