//! Environment bake: a cube capture of the sky, GGX-prefiltered into a mip chain.
//!
//! Mip 0 is a mirror reflection of the sky; the last mip is rough enough to
//! stand in for diffuse irradiance. Roughness grows linearly with the level.

use aether_render::{BufferAllocator, CUBE_FACE_COUNT, prefilter_mip_count};
use bytemuck::{Pod, Zeroable};

use super::{sampler_entry, texture_entry, uniform_entry};

/// GGX samples per texel for every level above the mirror level.
pub const PREFILTER_SAMPLE_COUNT: u32 = 64;

const WORKGROUP_SIZE: u32 = 8;

/// Prefilter dispatch parameters as laid out in WGSL (`struct PrefilterParams`).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct PrefilterUniform {
    roughness: f32,
    mip_size: u32,
    sample_count: u32,
    _pad: u32,
}

impl PrefilterUniform {
    fn for_level(mip: u32, mip_count: u32, face_size: u32) -> Self {
        let roughness = mip as f32 / (mip_count - 1).max(1) as f32;
        Self {
            roughness,
            mip_size: (face_size >> mip).max(1),
            sample_count: if mip == 0 { 1 } else { PREFILTER_SAMPLE_COUNT },
            _pad: 0,
        }
    }
}

/// One baked environment: a prefiltered cube texture and its cube view.
pub struct EnvironmentMap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    mip_count: u32,
}

impl EnvironmentMap {
    /// A black 1x1 cube bound whenever no bake is installed.
    pub(crate) fn placeholder(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("environment-placeholder"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: CUBE_FACE_COUNT,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: EnvironmentBakePipeline::CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = cube_view(&texture, "environment-placeholder-view");
        Self {
            texture,
            view,
            mip_count: 1,
        }
    }

    pub fn mip_count(&self) -> u32 {
        self.mip_count
    }

    /// The roughest level, as a sampling LOD.
    pub fn max_lod(&self) -> f32 {
        (self.mip_count - 1) as f32
    }

    /// Free the GPU memory now instead of when the last reference drops.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}

fn cube_view(texture: &wgpu::Texture, label: &str) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        array_layer_count: Some(CUBE_FACE_COUNT),
        ..Default::default()
    })
}

/// The capture target and the compute pipeline that prefilters it.
///
/// The capture cube is reused across bakes; each bake allocates a new
/// [`EnvironmentMap`].
pub(crate) struct EnvironmentBakePipeline {
    capture_texture: wgpu::Texture,
    capture_view: wgpu::TextureView,
    face_views: Vec<wgpu::TextureView>,
    capture_sampler: wgpu::Sampler,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
    size: u32,
    mip_count: u32,
}

impl EnvironmentBakePipeline {
    pub const CAPTURE_FORMAT: wgpu::TextureFormat = aether_render::HDR_FORMAT;

    pub fn new(device: &wgpu::Device, module: &wgpu::ShaderModule, size: u32, mip_levels: u32) -> Self {
        let size = size.max(1);
        let mip_count = prefilter_mip_count(size, mip_levels);

        let capture_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("environment-capture"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: CUBE_FACE_COUNT,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let capture_view = cube_view(&capture_texture, "environment-capture-view");
        let face_views = (0..CUBE_FACE_COUNT)
            .map(|face| {
                capture_texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("environment-capture-face{face}")),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: face,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();
        let capture_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("environment-capture-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("environment-prefilter-bgl"),
            entries: &[
                uniform_entry::<PrefilterUniform>(0, wgpu::ShaderStages::COMPUTE),
                texture_entry(1, wgpu::ShaderStages::COMPUTE, wgpu::TextureViewDimension::Cube),
                sampler_entry(2, wgpu::ShaderStages::COMPUTE),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: Self::CAPTURE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                    },
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("environment-prefilter-pipeline-layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("environment-prefilter-pipeline"),
            layout: Some(&pipeline_layout),
            module,
            entry_point: Some("cs_prefilter"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            capture_texture,
            capture_view,
            face_views,
            capture_sampler,
            layout,
            pipeline,
            size,
            mip_count,
        }
    }

    /// Render targets for the six capture faces, in cube layer order.
    pub fn face_views(&self) -> &[wgpu::TextureView] {
        &self.face_views
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn mip_count(&self) -> u32 {
        self.mip_count
    }

    /// Record one prefilter dispatch per level into `encoder`, reading the capture cube.
    ///
    /// Every level gets its own parameter buffer: all dispatches execute in
    /// one submission, after every buffer write.
    pub fn prefilter(&self, device: &wgpu::Device, encoder: &mut wgpu::CommandEncoder) -> EnvironmentMap {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("environment-prefiltered"),
            size: self.capture_texture.size(),
            mip_level_count: self.mip_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let allocator = BufferAllocator::new(device);
        for mip in 0..self.mip_count {
            let params = PrefilterUniform::for_level(mip, self.mip_count, self.size);
            let params_buffer =
                allocator.create_uniform(&format!("environment-prefilter-mip{mip}"), &params);
            let storage_view = texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(&format!("environment-prefilter-storage-mip{mip}")),
                dimension: Some(wgpu::TextureViewDimension::D2Array),
                base_mip_level: mip,
                mip_level_count: Some(1),
                array_layer_count: Some(CUBE_FACE_COUNT),
                ..Default::default()
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("environment-prefilter-bg-mip{mip}")),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&self.capture_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.capture_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(&storage_view),
                    },
                ],
            });

            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("environment-prefilter-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let groups = params.mip_size.div_ceil(WORKGROUP_SIZE);
            pass.dispatch_workgroups(groups, groups, CUBE_FACE_COUNT);
        }

        let view = cube_view(&texture, "environment-prefiltered-view");
        EnvironmentMap {
            texture,
            view,
            mip_count: self.mip_count,
        }
    }
}
