//! Environment-lit cube pipeline.

use aether_render::{BufferAllocator, GpuContext, MeshBuffer};

use super::{ObjectBinding, ObjectUniform, SceneLayouts, scene_pipeline};
use crate::prop::DecorativeProp;
use crate::renderable::Renderable;

pub(crate) struct PropPass {
    pipeline: wgpu::RenderPipeline,
    object: ObjectBinding,
    mesh: MeshBuffer,
}

impl PropPass {
    pub fn new(
        gpu: &GpuContext,
        layouts: &SceneLayouts,
        module: &wgpu::ShaderModule,
        prop: &DecorativeProp,
    ) -> Self {
        let device = &gpu.device;
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prop-pipeline-layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object, &layouts.environment],
            immediate_size: 0,
        });
        let pipeline = scene_pipeline(
            device,
            "prop-pipeline",
            module,
            &layout,
            gpu.surface_format,
            &prop.material(),
            None,
        );

        Self {
            pipeline,
            object: ObjectBinding::new(device, layouts, "prop", &ObjectUniform::new(prop.transform(), 0.0)),
            mesh: BufferAllocator::new(device).create_mesh("prop-cube", &prop.geometry().mesh()),
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, prop: &DecorativeProp) {
        self.object.write(queue, &ObjectUniform::new(prop.transform(), 0.0));
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
        pass.set_bind_group(2, environment, &[]);
        self.mesh.draw(pass);
    }
}
