use anyhow::{Context, bail};
use cgmath::{InnerSpace, Vector3, Zero};

use crate::data_structures::{
    model::{MeshBuffers, ModelVertex, SubMesh},
    scene_graph::SourceMesh,
};

/// Normal used for vertices of meshes that declare none.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
pub const DEFAULT_TEX_COORDS: [f32; 2] = [0.0, 0.0];

/**
 * Accumulates meshes into one shared vertex and index buffer.
 *
 * Each flattened mesh gets a `SubMesh` that records where its indices start,
 * how many there are and which vertex its local index 0 maps to, so the
 * renderer can draw it with a base-vertex indexed draw call.
 */
#[derive(Debug, Default)]
pub struct MeshBuilder {
    buffers: MeshBuffers,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `mesh` to the shared buffers.
    ///
    /// Faces are expected to be triangles already. Missing normals become
    /// [`DEFAULT_NORMAL`], missing texture coordinates [`DEFAULT_TEX_COORDS`].
    /// A mesh that would push the buffers past `u32` addressing is rejected
    /// and leaves the buffers untouched.
    pub fn flatten(&mut self, mesh: &SourceMesh) -> anyhow::Result<()> {
        let vertices = &mut self.buffers.vertices;
        let indices = &mut self.buffers.indices;

        let base_vertex = u32::try_from(vertices.len()).context("vertex buffer overflow")?;
        let base_index = u32::try_from(indices.len()).context("index buffer overflow")?;
        let index_count = mesh
            .faces
            .len()
            .checked_mul(3)
            .and_then(|n| u32::try_from(n).ok())
            .context("too many faces")?;
        if base_index.checked_add(index_count).is_none()
            || u32::try_from(vertices.len() + mesh.positions.len()).is_err()
        {
            bail!(
                "{} vertices / {} indices do not fit into 32-bit buffers",
                vertices.len() + mesh.positions.len(),
                indices.len() as u64 + index_count as u64
            );
        }

        let normals = mesh.normals.as_deref();
        let tex_coords = mesh.tex_coords.as_deref();
        vertices.extend(mesh.positions.iter().enumerate().map(|(i, &position)| {
            ModelVertex {
                position,
                normal: normals
                    .and_then(|n| n.get(i))
                    .copied()
                    .unwrap_or(DEFAULT_NORMAL),
                tex_coords: tex_coords
                    .and_then(|t| t.get(i))
                    .copied()
                    .unwrap_or(DEFAULT_TEX_COORDS),
            }
        }));
        indices.extend(mesh.faces.iter().flatten().copied());

        self.buffers.submeshes.push(SubMesh {
            index_count,
            base_index,
            base_vertex,
            material_index: mesh.material_index,
        });
        Ok(())
    }

    pub fn finish(self) -> MeshBuffers {
        self.buffers
    }
}

/**
 * Smooth per-vertex normals for meshes that come without any.
 *
 * Each face adds its unnormalized cross product (so larger faces weigh more)
 * to its three vertices; the sums are normalized at the end. Vertices that
 * belong to no face, or only to degenerate ones, get `DEFAULT_NORMAL`.
 */
pub fn generate_normals(positions: &[[f32; 3]], faces: &[[u32; 3]]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vector3::<f32>::zero(); positions.len()];

    for face in faces {
        let [a, b, c] = face.map(|i| i as usize);
        let (Some(&p0), Some(&p1), Some(&p2)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let p0: Vector3<f32> = p0.into();
        let p1: Vector3<f32> = p1.into();
        let p2: Vector3<f32> = p2.into();
        let face_normal = (p1 - p0).cross(p2 - p0);
        for i in [a, b, c] {
            sums[i] += face_normal;
        }
    }

    sums.into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                DEFAULT_NORMAL
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_normals_face_the_winding() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = generate_normals(&positions, &[[0, 1, 2]]);
        assert_eq!(normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(normals[2], [0.0, 0.0, 1.0]);
        // unreferenced
        assert_eq!(normals[3], DEFAULT_NORMAL);
    }

    #[test]
    fn short_attribute_arrays_fall_back_per_vertex() {
        let mesh = SourceMesh {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Some(vec![[1.0, 0.0, 0.0]]),
            tex_coords: Some(vec![[0.5, 0.5], [1.0, 1.0]]),
            faces: vec![[0, 1, 2]],
            ..Default::default()
        };
        let mut builder = MeshBuilder::new();
        builder.flatten(&mesh).unwrap();
        let buffers = builder.finish();
        assert_eq!(buffers.vertices[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(buffers.vertices[1].normal, DEFAULT_NORMAL);
        assert_eq!(buffers.vertices[2].tex_coords, DEFAULT_TEX_COORDS);
    }
}
