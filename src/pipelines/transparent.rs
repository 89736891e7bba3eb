use crate::{
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::mk_render_pipeline,
};

/**
 * Pipeline for transparent submeshes.
 *
 * Same shader as the opaque pipeline, blended with the material's
 * transparency as alpha. Depth is tested but not written; transparent
 * submeshes are drawn after all opaque ones.
 */
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    layout: &wgpu::PipelineLayout,
) -> wgpu::RenderPipeline {
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Viewer Shader (transparent)"),
        source: wgpu::ShaderSource::Wgsl(include_str!("viewer.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        false,
        &[ModelVertex::desc()],
        shader,
    )
}
