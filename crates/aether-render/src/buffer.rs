//! Vertex and index buffer upload.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::mesh::MeshData;

/// Uploaded mesh: vertex and index buffers plus the draw range.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
    }

    /// Bind and draw the whole mesh once.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        self.bind(render_pass);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Index data in the narrowest format that can address the vertices.
#[derive(Debug, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    /// Narrow `indices` to `u16` when every index fits.
    pub fn compact(indices: &[u32]) -> Self {
        if indices.iter().all(|&i| i <= u16::MAX as u32) {
            IndexData::U16(indices.iter().map(|&i| i as u16).collect())
        } else {
            IndexData::U32(indices.to_vec())
        }
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            IndexData::U16(data) => data.len() as u32,
            IndexData::U32(data) => data.len() as u32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(data) => bytemuck::cast_slice(data),
            IndexData::U32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// Creates GPU buffers on one device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload a procedural mesh.
    pub fn create_mesh(&self, label: &str, mesh: &MeshData) -> MeshBuffer {
        let indices = IndexData::compact(&mesh.indices);
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: indices.as_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: indices.count(),
            index_format: indices.format(),
        }
    }

    /// A uniform buffer initialised with `value`, writable afterwards.
    pub fn create_uniform<T: Pod>(&self, label: &str, value: &T) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(value),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }
}

/// Position, normal and texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPositionNormalUv {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexPositionNormalUv {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexPositionNormalUv>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<VertexPositionNormalUv>(), 32);
        let layout = VertexPositionNormalUv::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn test_small_meshes_use_u16_indices() {
        let indices = IndexData::compact(&[0, 1, 2, 65535]);
        assert_eq!(indices.format(), wgpu::IndexFormat::Uint16);
        assert_eq!(indices.count(), 4);
        assert_eq!(indices.as_bytes().len(), 8);
    }

    #[test]
    fn test_large_meshes_keep_u32_indices() {
        let indices = IndexData::compact(&[0, 70000, 2]);
        assert_eq!(indices.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(indices.as_bytes().len(), 12);
    }

    #[test]
    fn test_sphere_fits_u16() {
        let mesh = MeshData::uv_sphere(1.0, 32, 16);
        assert_eq!(
            IndexData::compact(&mesh.indices).format(),
            wgpu::IndexFormat::Uint16
        );
    }
}
