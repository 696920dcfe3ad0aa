//! wgpu implementation of [`RenderBackend`].
//!
//! Bind group layout shared by every scene program:
//!
//! | group | contents                                   |
//! |-------|--------------------------------------------|
//! | 0     | camera                                     |
//! | 1     | object (model matrix, animation time)      |
//! | 2     | material (sky, water) or environment (prop)|
//! | 3     | environment (water only)                   |

mod environment;
mod prop_pass;
mod sky_pass;
mod water_pass;

use std::num::NonZeroU64;

use aether_config::RenderConfig;
use aether_render::{
    BufferAllocator, CameraUniform, DepthBuffer, FrameEncoder, GpuContext, RenderPassBuilder,
    ShaderError, ShaderLibrary, SurfaceError, VertexPositionNormalUv,
};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tracing::{debug, error, info};

use crate::backend::{RenderBackend, SceneView};
use crate::dome::SkyDome;
use crate::programs::ENVIRONMENT_PROGRAM;
use crate::prop::{DecorativeProp, STANDARD_PROGRAM};
use crate::renderable::MaterialState;
use crate::water::{WATER_PROGRAM, WaterSurface};

pub use environment::{EnvironmentMap, PREFILTER_SAMPLE_COUNT};

use environment::EnvironmentBakePipeline;
use prop_pass::PropPass;
use sky_pass::SkyPass;
use water_pass::WaterPass;

/// Per-object data as laid out in WGSL (`struct Object`).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    /// Object-to-world matrix, column-major. (offset 0)
    pub model: [[f32; 4]; 4],
    /// Animation time in seconds. (offset 64)
    pub time: f32,
    pub _pad: [f32; 3],
}

impl ObjectUniform {
    pub fn new(model: Mat4, time: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            time,
            _pad: [0.0; 3],
        }
    }
}

/// Environment lighting parameters as laid out in WGSL (`struct Environment`).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct EnvironmentUniform {
    /// Mip level holding the roughest prefilter. (offset 0)
    pub max_lod: f32,
    /// Tone mapping exposure shared with the sky. (offset 4)
    pub exposure: f32,
    pub _pad0: f32,
    pub _pad1: f32,
}

pub(crate) fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

pub(crate) fn texture_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Layouts of the groups every scene pipeline shares.
pub(crate) struct SceneLayouts {
    pub camera: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub environment: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let camera = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-camera-bgl"),
            entries: &[uniform_entry::<CameraUniform>(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-object-bgl"),
            entries: &[uniform_entry::<ObjectUniform>(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let environment = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene-environment-bgl"),
            entries: &[
                uniform_entry::<EnvironmentUniform>(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::ShaderStages::FRAGMENT, wgpu::TextureViewDimension::Cube),
                sampler_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        Self {
            camera,
            object,
            environment,
        }
    }
}

/// An object uniform buffer and its group 1 bind group.
pub(crate) struct ObjectBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ObjectBinding {
    pub fn new(device: &wgpu::Device, layouts: &SceneLayouts, label: &str, value: &ObjectUniform) -> Self {
        let buffer = BufferAllocator::new(device).create_uniform(&format!("{label}-object"), value);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-object-bg")),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, value: &ObjectUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

/// Depth state a material asks for.
pub(crate) fn depth_state(material: &MaterialState) -> wgpu::DepthStencilState {
    if material.depth_write {
        DepthBuffer::opaque_state()
    } else {
        DepthBuffer::background_state()
    }
}

/// A triangle-list pipeline over [`VertexPositionNormalUv`] meshes with `vs_main`/`fs_main`.
pub(crate) fn scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    material: &MaterialState,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: material.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(depth_state(material)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// Draws the scene to a window surface and owns the environment bakes' GPU side.
pub struct WgpuBackend {
    gpu: GpuContext,
    depth: DepthBuffer,
    layouts: SceneLayouts,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    environment_uniform: EnvironmentUniform,
    environment_buffer: wgpu::Buffer,
    environment_sampler: wgpu::Sampler,
    environment_bind_group: wgpu::BindGroup,
    placeholder: EnvironmentMap,
    bake: EnvironmentBakePipeline,
    sky: SkyPass,
    water: WaterPass,
    prop: PropPass,
    pass_builder: RenderPassBuilder,
}

impl WgpuBackend {
    /// Build every pipeline and upload the scene's textures and meshes.
    ///
    /// The sky program comes from the dome itself; a dome without one, or
    /// whose program fails validation, is skipped when drawing and captures
    /// as black.
    pub fn new(
        gpu: GpuContext,
        shaders: &mut ShaderLibrary,
        sky: &SkyDome,
        water: &WaterSurface,
        prop: &DecorativeProp,
        config: &RenderConfig,
    ) -> Result<Self, ShaderError> {
        let device = &gpu.device;
        let layouts = SceneLayouts::new(device);

        let water_module = shaders.load(device, WATER_PROGRAM)?;
        let standard_module = shaders.load(device, STANDARD_PROGRAM)?;
        let environment_module = shaders.load(device, ENVIRONMENT_PROGRAM)?;
        let sky_module = sky
            .program()
            .and_then(|program| match shaders.compile(device, program) {
                Ok(module) => Some(module),
                Err(e) => {
                    error!("{e}; the dome will not be drawn");
                    None
                }
            });

        let (width, height) = gpu.surface_size();
        let depth = DepthBuffer::new(device, width, height);

        let allocator = BufferAllocator::new(device);
        let camera_buffer = allocator.create_uniform("scene-camera", &CameraUniform::zeroed());
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-camera-bg"),
            layout: &layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let environment_uniform = EnvironmentUniform {
            max_lod: 0.0,
            exposure: sky.uniform().exposure,
            _pad0: 0.0,
            _pad1: 0.0,
        };
        let environment_buffer = allocator.create_uniform("scene-environment", &environment_uniform);
        let environment_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("environment-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let placeholder = EnvironmentMap::placeholder(device);
        let environment_bind_group = Self::environment_bind_group(
            device,
            &layouts,
            &environment_buffer,
            &placeholder.view,
            &environment_sampler,
        );

        let bake = EnvironmentBakePipeline::new(
            device,
            &environment_module,
            config.environment_size,
            config.environment_mip_levels,
        );
        let sky_pass = SkyPass::new(
            &gpu,
            &layouts,
            sky_module.as_deref(),
            sky,
            EnvironmentBakePipeline::CAPTURE_FORMAT,
        );
        let water_pass = WaterPass::new(&gpu, &layouts, &water_module, water);
        let prop_pass = PropPass::new(&gpu, &layouts, &standard_module, prop);

        info!(
            "Render backend ready ({}x{}, environment {}px with {} levels)",
            width,
            height,
            bake.size(),
            bake.mip_count()
        );

        Ok(Self {
            gpu,
            depth,
            layouts,
            camera_buffer,
            camera_bind_group,
            environment_uniform,
            environment_buffer,
            environment_sampler,
            environment_bind_group,
            placeholder,
            bake,
            sky: sky_pass,
            water: water_pass,
            prop: prop_pass,
            pass_builder: RenderPassBuilder::new().with_depth().label("scene-pass"),
        })
    }

    fn environment_bind_group(
        device: &wgpu::Device,
        layouts: &SceneLayouts,
        buffer: &wgpu::Buffer,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-environment-bg"),
            layout: &layouts.environment,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Point the environment group at `environment`, or at the black placeholder.
    fn bind_environment(&mut self, environment: Option<&EnvironmentMap>) {
        let map = environment.unwrap_or(&self.placeholder);
        self.environment_uniform.max_lod = map.max_lod();
        self.gpu.queue.write_buffer(
            &self.environment_buffer,
            0,
            bytemuck::bytes_of(&self.environment_uniform),
        );
        self.environment_bind_group = Self::environment_bind_group(
            &self.gpu.device,
            &self.layouts,
            &self.environment_buffer,
            &map.view,
            &self.environment_sampler,
        );
    }
}

impl RenderBackend for WgpuBackend {
    type Environment = EnvironmentMap;
    type Error = SurfaceError;

    fn upload_materials(&mut self, sky: &SkyDome, water: &WaterSurface) {
        let queue = &self.gpu.queue;
        self.sky.upload(queue, sky);
        self.water.upload(queue, water);
        self.environment_uniform.exposure = sky.uniform().exposure;
        queue.write_buffer(
            &self.environment_buffer,
            0,
            bytemuck::bytes_of(&self.environment_uniform),
        );
    }

    fn bake_environment(&mut self, sky: &SkyDome) -> EnvironmentMap {
        let device = &self.gpu.device;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("environment-bake-encoder"),
        });

        self.sky.update(&self.gpu.queue, sky);
        let capture_builder = RenderPassBuilder::new().label("sky-capture");
        for (face, view) in self.bake.face_views().iter().enumerate() {
            let mut pass = capture_builder.begin(&mut encoder, view, None);
            self.sky.capture(&mut pass, &self.camera_bind_group, face as u32);
        }

        let environment = self.bake.prefilter(device, &mut encoder);
        self.gpu.queue.submit([encoder.finish()]);
        debug!(
            "Captured and prefiltered environment ({} levels)",
            environment.mip_count()
        );
        environment
    }

    fn release_environment(&mut self, environment: EnvironmentMap) {
        // Nothing may sample the texture once it is destroyed.
        self.bind_environment(None);
        environment.destroy();
    }

    fn install_environment(&mut self, environment: &EnvironmentMap) {
        self.bind_environment(Some(environment));
    }

    fn render(&mut self, scene: &SceneView<'_>) -> Result<(), SurfaceError> {
        let surface_texture = self.gpu.get_current_texture()?;

        let queue = &self.gpu.queue;
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&scene.camera.to_uniform()),
        );
        self.sky.update(queue, scene.sky);
        self.water.update(queue, scene.water);
        self.prop.update(queue, scene.prop);

        let mut frame = FrameEncoder::new(&self.gpu.device, queue.clone(), surface_texture);
        {
            let Some(mut pass) = frame.begin_render_pass(&self.pass_builder, Some(&self.depth.view))
            else {
                return Ok(());
            };
            self.sky.render(&mut pass, &self.camera_bind_group);
            self.water
                .render(&mut pass, &self.camera_bind_group, &self.environment_bind_group);
            self.prop
                .render(&mut pass, &self.camera_bind_group, &self.environment_bind_group);
        }
        frame.submit();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let (width, height) = self.gpu.surface_size();
        self.depth.resize(&self.gpu.device, width, height);
    }
}
