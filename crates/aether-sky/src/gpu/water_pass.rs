//! Water plane pipeline.

use aether_render::{BufferAllocator, GpuContext, GpuTexture, MeshBuffer, SamplerSettings};

use super::{ObjectBinding, ObjectUniform, SceneLayouts, sampler_entry, scene_pipeline, texture_entry, uniform_entry};
use crate::renderable::Renderable;
use crate::uniforms::WaterUniform;
use crate::water::WaterSurface;

pub(crate) struct WaterPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    object: ObjectBinding,
    mesh: MeshBuffer,
    _normals: GpuTexture,
}

impl WaterPass {
    pub fn new(
        gpu: &GpuContext,
        layouts: &SceneLayouts,
        module: &wgpu::ShaderModule,
        water: &WaterSurface,
    ) -> Self {
        let device = &gpu.device;
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("water-material-bgl"),
            entries: &[
                uniform_entry::<WaterUniform>(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::ShaderStages::FRAGMENT, wgpu::TextureViewDimension::D2),
                sampler_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let normals = GpuTexture::upload(
            device,
            &gpu.queue,
            "water-normals",
            water.normals(),
            &SamplerSettings::TILING,
        );
        let allocator = BufferAllocator::new(device);
        let uniform_buffer = allocator.create_uniform("water-uniform", water.uniform());
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water-material-bg"),
            layout: &material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normals.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&normals.sampler),
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water-pipeline-layout"),
            bind_group_layouts: &[
                &layouts.camera,
                &layouts.object,
                &material_layout,
                &layouts.environment,
            ],
            immediate_size: 0,
        });
        let pipeline = scene_pipeline(
            device,
            "water-pipeline",
            module,
            &layout,
            gpu.surface_format,
            &water.material(),
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        Self {
            pipeline,
            uniform_buffer,
            material_bind_group,
            object: ObjectBinding::new(device, layouts, "water", &Self::object_uniform(water)),
            mesh: allocator.create_mesh("water-plane", &water.geometry().mesh()),
            _normals: normals,
        }
    }

    fn object_uniform(water: &WaterSurface) -> ObjectUniform {
        ObjectUniform::new(water.transform(), water.time())
    }

    pub fn upload(&self, queue: &wgpu::Queue, water: &WaterSurface) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(water.uniform()));
    }

    pub fn update(&self, queue: &wgpu::Queue, water: &WaterSurface) {
        self.object.write(queue, &Self::object_uniform(water));
    }

    pub fn render(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        camera: &wgpu::BindGroup,
        environment: &wgpu::BindGroup,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera, &[]);
        pass.set_bind_group(1, &self.object.bind_group, &[]);
        pass.set_bind_group(2, &self.material_bind_group, &[]);
        pass.set_bind_group(3, environment, &[]);
        self.mesh.draw(pass);
    }
}
