//! wgpu plumbing for the sky viewer: device and surface, camera, depth,
//! shader sources, render passes, procedural meshes and sampled textures.

pub mod buffer;
pub mod camera;
pub mod cube;
pub mod depth;
pub mod gpu;
pub mod mesh;
pub mod pass;
pub mod shader;
pub mod texture;

pub use buffer::{BufferAllocator, IndexData, MeshBuffer, VertexPositionNormalUv};
pub use camera::{Camera, CameraUniform};
pub use cube::{CUBE_FACE_COUNT, face_uv_to_direction, prefilter_mip_count};
pub use depth::DepthBuffer;
pub use gpu::{GpuContext, GpuContextError, HDR_FORMAT, SurfaceError, init_gpu_context_blocking};
pub use mesh::MeshData;
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use shader::{ShaderError, ShaderLibrary, ShaderProgram};
pub use texture::{GpuTexture, SamplerSettings, TextureError, TextureImage};
