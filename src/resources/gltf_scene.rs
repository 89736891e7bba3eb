use std::path::Path;

use anyhow::{Context, bail};
use log::{debug, info, warn};

use crate::{
    data_structures::scene_graph::{SourceMaterial, SourceMesh, SourceNode, SourceScene},
    resources::mesh::generate_normals,
};

/**
 * Import a glTF (`.gltf` + buffers, or binary `.glb`) file.
 *
 * Nodes keep the file's hierarchy below a synthetic root whose children are
 * the root nodes of the default scene (or the first scene). Every triangle
 * list primitive with at least one face becomes its own mesh; other
 * primitive modes are skipped.
 * Node transforms are not applied.
 */
pub fn load(path: &Path) -> anyhow::Result<SourceScene> {
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)
        .with_context(|| format!("failed to read glTF file {}", path.display()))?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)
        .with_context(|| format!("failed to load buffers of {}", path.display()))?;

    let mut scene = SourceScene {
        materials: document.materials().map(convert_material).collect(),
        ..Default::default()
    };

    let mut default_material: Option<u32> = None;
    // source mesh indices for every glTF mesh, by glTF mesh index
    let mut mesh_table: Vec<Vec<usize>> = Vec::new();
    for mesh in document.meshes() {
        let mesh_name = mesh.name().unwrap_or("unknown_mesh");
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!(
                    "Primitive {} of mesh {mesh_name} uses {:?}; only triangle lists are supported.",
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

            let Some(positions) = reader.read_positions() else {
                warn!("Primitive {} of mesh {mesh_name} has no positions.", primitive.index());
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let faces: Vec<[u32; 3]> = indices
                .chunks_exact(3)
                .map(|f| [f[0], f[1], f[2]])
                .collect();
            if faces.is_empty() {
                debug!(
                    "Primitive {} of mesh {mesh_name} has no faces, skipping it.",
                    primitive.index()
                );
                continue;
            }
            let normals = match reader.read_normals() {
                Some(normals) => normals.collect(),
                None => {
                    debug!("Generating normals for mesh {mesh_name}");
                    generate_normals(&positions, &faces)
                }
            };
            let tex_coords = reader
                .read_tex_coords(0)
                .map(|tc| tc.into_f32().collect());

            let material_index = match primitive.material().index() {
                Some(idx) => u32::try_from(idx).unwrap_or(u32::MAX),
                None => *default_material.get_or_insert_with(|| {
                    scene.materials.push(SourceMaterial {
                        name: Some(super::obj_scene::DEFAULT_MATERIAL_NAME.to_string()),
                        ..Default::default()
                    });
                    (scene.materials.len() - 1) as u32
                }),
            };

            primitives.push(scene.add_mesh(SourceMesh {
                name: format!("{mesh_name}#{}", primitive.index()),
                positions,
                normals: Some(normals),
                tex_coords,
                faces,
                material_index,
            }));
        }
        mesh_table.push(primitives);
    }

    for node in document.nodes() {
        scene.add_node(SourceNode {
            name: node.name().unwrap_or("unnamed_node").to_string(),
            meshes: node
                .mesh()
                .and_then(|m| mesh_table.get(m.index()))
                .cloned()
                .unwrap_or_default(),
            children: node.children().map(|c| c.index()).collect(),
        });
    }

    let Some(gltf_scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        bail!("{} does not contain a scene", path.display());
    };
    scene.root = scene.add_node(SourceNode {
        name: gltf_scene.name().unwrap_or("scene").to_string(),
        meshes: Vec::new(),
        children: gltf_scene.nodes().map(|n| n.index()).collect(),
    });

    if scene.meshes.is_empty() {
        bail!("{} contains no triangle meshes", path.display());
    }

    info!(
        "Imported {}: {} nodes, {} meshes, {} materials",
        path.display(),
        scene.nodes.len(),
        scene.meshes.len(),
        scene.materials.len()
    );
    Ok(scene)
}

fn convert_material(material: gltf::Material) -> SourceMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let diffuse_texture = pbr
        .base_color_texture()
        .and_then(|info| match info.texture().source().source() {
            gltf::image::Source::Uri { uri, .. } => Some(uri.to_string()),
            gltf::image::Source::View { .. } => {
                warn!(
                    "Material {} embeds its base colour image; embedded images are not loaded.",
                    material.name().unwrap_or("<unnamed>")
                );
                None
            }
        });

    SourceMaterial {
        name: material.name().map(str::to_string),
        diffuse: Some([r, g, b]),
        opacity: Some(a),
        diffuse_texture,
    }
}
