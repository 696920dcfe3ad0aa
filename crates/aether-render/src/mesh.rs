//! Procedural CPU-side geometry: UV sphere, plane and box.
//!
//! All generators emit counter-clockwise front faces.

use std::f32::consts::PI;

use glam::Vec3;

use crate::buffer::VertexPositionNormalUv;

/// Indexed triangle list ready for upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Latitude/longitude sphere with `width_segments` around and
    /// `height_segments` from pole to pole. Poles share no degenerate triangles.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let normal = Vec3::new(
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                );
                vertices.push(VertexPositionNormalUv {
                    position: (normal * radius).to_array(),
                    normal: normal.to_array(),
                    uv: [u, 1.0 - v],
                });
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::new();
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// A single quad in the XY plane facing +Z, centred on the origin.
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let corners = [
            ([-hw, hh], [0.0, 1.0]),
            ([hw, hh], [1.0, 1.0]),
            ([-hw, -hh], [0.0, 0.0]),
            ([hw, -hh], [1.0, 0.0]),
        ];
        let vertices = corners
            .iter()
            .map(|([x, y], uv)| VertexPositionNormalUv {
                position: [*x, *y, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: *uv,
            })
            .collect();

        Self {
            vertices,
            indices: vec![0, 2, 1, 2, 3, 1],
        }
    }

    /// Axis-aligned cube with edge length `size`, flat-shaded (four vertices per face).
    pub fn cuboid(size: f32) -> Self {
        // (normal, u axis, v axis) with u x v == normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let half = size * 0.5;
        let mut mesh = Self::default();

        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = (normal + u * su + v * sv) * half;
                mesh.vertices.push(VertexPositionNormalUv {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }
}
