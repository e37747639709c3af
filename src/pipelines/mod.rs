//! Render pipelines.
//!
//! - `brick` builds the flat shaded instanced pipeline, once opaque for placed
//!   bricks and the floor and once blended for the in-hand brick
//! - `light` holds the hemispheric light uniform shared by both

pub mod brick;
pub mod light;

use brick::{BrickBlend, mk_brick_pipeline};

/// All pipelines the renderer switches between in one frame.
#[derive(Debug)]
pub struct Pipelines {
    pub opaque: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Brick Pipeline Layout"),
            bind_group_layouts: &[Some(camera_bind_group_layout), Some(light_bind_group_layout)],
            immediate_size: 0,
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Brick Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("brick.wgsl").into()),
        });
        Self {
            opaque: mk_brick_pipeline(device, &layout, &shader, color_format, BrickBlend::Opaque),
            transparent: mk_brick_pipeline(
                device,
                &layout,
                &shader,
                color_format,
                BrickBlend::Translucent,
            ),
        }
    }
}
