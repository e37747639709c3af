use crate::data_structures::{
    instance::InstanceRaw,
    model::{ModelVertex, Vertex},
    texture::DepthTexture,
};

/// How a brick pipeline writes its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickBlend {
    /// Overwrites the target and writes depth.
    Opaque,
    /// Mixes by instance alpha. Depth is tested but not written, so a
    /// translucent brick never hides what is behind it.
    Translucent,
}

impl BrickBlend {
    fn label(self) -> &'static str {
        match self {
            Self::Opaque => "Opaque Brick Pipeline",
            Self::Translucent => "Translucent Brick Pipeline",
        }
    }

    fn blend_state(self) -> wgpu::BlendState {
        match self {
            Self::Opaque => wgpu::BlendState::REPLACE,
            Self::Translucent => wgpu::BlendState::ALPHA_BLENDING,
        }
    }

    fn writes_depth(self) -> bool {
        self == Self::Opaque
    }
}

pub fn mk_brick_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    blend: BrickBlend,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(blend.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[ModelVertex::desc(), InstanceRaw::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(blend.blend_state()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::FORMAT,
            depth_write_enabled: Some(blend.writes_depth()),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_opaque_bricks_write_depth() {
        assert!(BrickBlend::Opaque.writes_depth());
        assert!(!BrickBlend::Translucent.writes_depth());
        assert_eq!(BrickBlend::Opaque.blend_state(), wgpu::BlendState::REPLACE);
        assert_eq!(
            BrickBlend::Translucent.blend_state(),
            wgpu::BlendState::ALPHA_BLENDING
        );
    }
}
