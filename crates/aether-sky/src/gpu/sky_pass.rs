//! Sky dome pipelines: the on-screen dome and the cube capture used by environment bakes.

use aether_render::{BufferAllocator, GpuContext, GpuTexture, MeshBuffer, SamplerSettings};
use tracing::warn;

use super::{ObjectBinding, ObjectUniform, SceneLayouts, sampler_entry, scene_pipeline, texture_entry, uniform_entry};
use crate::dome::SkyDome;
use crate::renderable::Renderable;
use crate::uniforms::SkyUniform;

struct SkyPipelines {
    render: wgpu::RenderPipeline,
    capture: wgpu::RenderPipeline,
}

pub(crate) struct SkyPass {
    /// `None` when the sky program failed to load or compile.
    pipelines: Option<SkyPipelines>,
    uniform_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    object: ObjectBinding,
    mesh: MeshBuffer,
    _noise: GpuTexture,
}

impl SkyPass {
    pub fn new(
        gpu: &GpuContext,
        layouts: &SceneLayouts,
        module: Option<&wgpu::ShaderModule>,
        sky: &SkyDome,
        capture_format: wgpu::TextureFormat,
    ) -> Self {
        let device = &gpu.device;
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky-material-bgl"),
            entries: &[
                uniform_entry::<SkyUniform>(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::ShaderStages::FRAGMENT, wgpu::TextureViewDimension::D2),
                sampler_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let noise = GpuTexture::upload(
            device,
            &gpu.queue,
            "sky-noise",
            sky.noise(),
            &SamplerSettings::TILING,
        );
        let uniform_buffer = BufferAllocator::new(device).create_uniform("sky-uniform", sky.uniform());
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky-material-bg"),
            layout: &material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&noise.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&noise.sampler),
                },
            ],
        });

        let object = ObjectBinding::new(device, layouts, "sky", &Self::object_uniform(sky));
        let mesh = BufferAllocator::new(device).create_mesh("sky-dome", &sky.geometry().mesh());

        let pipelines = match module {
            Some(module) => {
                let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("sky-pipeline-layout"),
                    bind_group_layouts: &[&layouts.camera, &layouts.object, &material_layout],
                    immediate_size: 0,
                });
                let render = scene_pipeline(
                    device,
                    "sky-pipeline",
                    module,
                    &layout,
                    gpu.surface_format,
                    &sky.material(),
                    None,
                );
                let capture = Self::capture_pipeline(device, module, &layout, capture_format);
                Some(SkyPipelines { render, capture })
            }
            None => {
                warn!("Sky pass has no program; the dome will not be drawn");
                None
            }
        };

        Self {
            pipelines,
            uniform_buffer,
            material_bind_group,
            object,
            mesh,
            _noise: noise,
        }
    }

    /// Fullscreen triangle per cube face; the face index arrives as the instance index.
    fn capture_pipeline(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky-capture-pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_capture"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_capture"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        })
    }

    fn object_uniform(sky: &SkyDome) -> ObjectUniform {
        ObjectUniform::new(sky.transform(), sky.time())
    }

    pub fn upload(&self, queue: &wgpu::Queue, sky: &SkyDome) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(sky.uniform()));
        self.update(queue, sky);
    }

    /// Push the per-frame transform and time.
    pub fn update(&self, queue: &wgpu::Queue, sky: &SkyDome) {
        self.object.write(queue, &Self::object_uniform(sky));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, camera: &wgpu::BindGroup) {
        let Some(pipelines) = &self.pipelines else {
            return;
        };
        pass.set_pipeline(&pipelines.render);
        pass.set_bind_group(0, camera, &[]);
        pass.set_bind_group(1, &self.object.bind_group, &[]);
        pass.set_bind_group(2, &self.material_bind_group, &[]);
        self.mesh.draw(pass);
    }

    /// Draw `face` of the capture cube into a pass targeting that face.
    /// Without a program the pass only clears.
    pub fn capture(&self, pass: &mut wgpu::RenderPass<'_>, camera: &wgpu::BindGroup, face: u32) {
        let Some(pipelines) = &self.pipelines else {
            return;
        };
        pass.set_pipeline(&pipelines.capture);
        pass.set_bind_group(0, camera, &[]);
        pass.set_bind_group(1, &self.object.bind_group, &[]);
        pass.set_bind_group(2, &self.material_bind_group, &[]);
        pass.draw(0..3, face..face + 1);
    }
}
