//! GPU side of a loaded [`Model`].
//!
//! [`GpuModel`] uploads the shared vertex and index arrays once, builds one
//! bind group per material and sorts the submeshes into an opaque and a
//! transparent batch. Drawing replays every submesh as an indexed draw with
//! its own base vertex.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        model::{Material, Model, Shading, SubMesh},
        texture::{Texture, TextureImage, TextureSet},
    },
    pipelines::Pipelines,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    color: [f32; 3],
    transparency: f32,
    is_emissive: u32,
    is_transparent: u32,
    _padding: [u32; 2],
}

impl MaterialUniform {
    pub fn from_material(material: &Material) -> Self {
        let (is_emissive, is_transparent) = match material.shading() {
            Shading::Opaque => (0, 0),
            Shading::Emissive => (1, 0),
            Shading::Transparent { .. } => (0, 1),
        };
        Self {
            color: material.diffuse_color,
            transparency: material.transparency,
            is_emissive,
            is_transparent,
            _padding: [0; 2],
        }
    }

    /// White, opaque. Used for submeshes whose material index is out of range.
    pub fn neutral() -> Self {
        Self {
            color: [1.0; 3],
            transparency: 1.0,
            is_emissive: 0,
            is_transparent: 0,
            _padding: [0; 2],
        }
    }
}

struct MaterialBinding {
    #[allow(unused)]
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

fn bind_material(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    uniform: MaterialUniform,
    label: &str,
) -> MaterialBinding {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Uniform")),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer.as_entire_binding(),
            },
        ],
        label: Some(label),
    });
    MaterialBinding { buffer, bind_group }
}

/// A [`Model`] uploaded to the GPU, ready to draw.
pub struct GpuModel {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    materials: Vec<MaterialBinding>,
    fallback: MaterialBinding,
    opaque: Vec<SubMesh>,
    transparent: Vec<SubMesh>,
    // keeps every material texture alive as long as the bind groups
    #[allow(unused)]
    textures: TextureSet,
    #[allow(unused)]
    fallback_texture: Texture,
}

impl GpuModel {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &Pipelines,
        model: &Model,
        textures: TextureSet,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Vertex Buffer"),
            contents: bytemuck::cast_slice(&model.buffers.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Index Buffer"),
            contents: bytemuck::cast_slice(&model.buffers.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let fallback_texture =
            Texture::from_image(device, queue, &TextureImage::white_pixel(), "fallback_white");
        let fallback = bind_material(
            device,
            &pipelines.material_layout,
            &fallback_texture,
            MaterialUniform::neutral(),
            "Fallback Material",
        );

        let materials = model
            .materials
            .iter()
            .enumerate()
            .map(|(idx, material)| {
                let texture = match textures.get(material.texture) {
                    Some(texture) => texture,
                    None => {
                        log::warn!(
                            "Material {idx} refers to unknown texture {}; drawing it untextured.",
                            material.texture.get()
                        );
                        &fallback_texture
                    }
                };
                let label = material
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Material {idx}"));
                bind_material(
                    device,
                    &pipelines.material_layout,
                    texture,
                    MaterialUniform::from_material(material),
                    &label,
                )
            })
            .collect();

        let (transparent, opaque) = partition_submeshes(model);

        Self {
            vertex_buffer,
            index_buffer,
            materials,
            fallback,
            opaque,
            transparent,
            textures,
            fallback_texture,
        }
    }

    fn bind_group_for(&self, submesh: &SubMesh) -> &wgpu::BindGroup {
        self.materials
            .get(submesh.material_index as usize)
            .map_or(&self.fallback.bind_group, |binding| &binding.bind_group)
    }

    /// Draw opaque and emissive submeshes, then the transparent ones.
    ///
    /// A model with an empty vertex or index buffer draws nothing.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        pipelines: &Pipelines,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        // empty buffers can not be sliced
        if self.vertex_buffer.size() == 0 || self.index_buffer.size() == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.set_bind_group(1, camera_bind_group, &[]);

        for (pipeline, batch) in [
            (&pipelines.opaque, &self.opaque),
            (&pipelines.transparent, &self.transparent),
        ] {
            if batch.is_empty() {
                continue;
            }
            render_pass.set_pipeline(pipeline);
            for submesh in batch {
                render_pass.set_bind_group(0, self.bind_group_for(submesh), &[]);
                render_pass.draw_indexed(
                    submesh.index_range(),
                    submesh.base_vertex as i32,
                    0..1,
                );
            }
        }
    }
}

/// Split submeshes into (transparent, opaque) keeping their order.
///
/// Emissive materials draw with the opaque batch. Submeshes without a valid
/// material are opaque as well.
pub fn partition_submeshes(model: &Model) -> (Vec<SubMesh>, Vec<SubMesh>) {
    model.buffers.submeshes.iter().partition(|sm| {
        matches!(
            model.material_for(sm).map(Material::shading),
            Some(Shading::Transparent { .. })
        )
    })
}
