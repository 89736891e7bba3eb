//! Flattened, GPU-ready model data.
//!
//! A [`Model`] is what the load phase hands to the renderer: one shared
//! vertex buffer, one shared index buffer, one [`SubMesh`] per source mesh
//! and one [`Material`] per source material.

use crate::data_structures::texture::TextureHandle;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// One source mesh's slice of the shared buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub index_count: u32,
    pub base_index: u32,
    pub base_vertex: u32,
    /// Position in [`Model::materials`]. Not validated; may be out of range.
    pub material_index: u32,
}

impl SubMesh {
    pub fn index_range(&self) -> std::ops::Range<u32> {
        self.base_index..self.base_index + self.index_count
    }
}

/// How a material is shaded. Emissive wins over transparency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shading {
    Opaque,
    Emissive,
    Transparent { amount: f32 },
}

/// A normalized shading descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub diffuse_color: [f32; 3],
    pub texture: TextureHandle,
    pub is_emissive: bool,
    pub is_transparent: bool,
    /// Alpha used when blending; 1.0 for opaque materials.
    pub transparency: f32,
}

impl Material {
    pub fn shading(&self) -> Shading {
        if self.is_emissive {
            Shading::Emissive
        } else if self.is_transparent {
            Shading::Transparent {
                amount: self.transparency,
            }
        } else {
            Shading::Opaque
        }
    }
}

/// Shared vertex/index arrays plus the submeshes slicing them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub submeshes: Vec<SubMesh>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub buffers: MeshBuffers,
    pub materials: Vec<Material>,
}

impl Model {
    /// The material a submesh refers to, if its index is in range.
    pub fn material_for(&self, submesh: &SubMesh) -> Option<&Material> {
        self.materials.get(submesh.material_index as usize)
    }

    /// Submeshes whose material index points past the material list.
    pub fn dangling_submeshes(&self) -> impl Iterator<Item = (usize, &SubMesh)> {
        self.buffers
            .submeshes
            .iter()
            .enumerate()
            .filter(|(_, sm)| self.material_for(sm).is_none())
    }
}
