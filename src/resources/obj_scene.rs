use std::path::Path;

use anyhow::{Context, bail};
use log::{debug, info, warn};

use crate::{
    data_structures::scene_graph::{SourceMaterial, SourceMesh, SourceNode, SourceScene},
    resources::mesh::generate_normals,
};

/// Name given to the material that meshes without `usemtl` end up with.
pub const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

/**
 * Import a Wavefront OBJ file (and the MTL libraries it references).
 *
 * The scene gets a root node named after the file with one child per OBJ
 * object/group, each owning exactly one mesh. Polygons are triangulated and
 * identical vertices shared by tobj; normals are generated for meshes that
 * have none. A missing or broken MTL file is logged and the scene continues
 * without its materials.
 */
pub fn load(path: &Path) -> anyhow::Result<SourceScene> {
    let (models, obj_materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("failed to read OBJ file {}", path.display()))?;

    let mut materials: Vec<SourceMaterial> = match obj_materials {
        Ok(materials) => materials.into_iter().map(convert_material).collect(),
        Err(e) => {
            warn!(
                "Material library of {} could not be loaded ({e}); continuing without materials.",
                path.display()
            );
            Vec::new()
        }
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut scene = SourceScene::default();
    scene.root = scene.add_node(SourceNode {
        name: file_name,
        ..Default::default()
    });

    let mut default_material: Option<u32> = None;
    for model in models {
        let mesh = &model.mesh;
        if mesh.indices.is_empty() {
            debug!("OBJ object {} has no faces, skipping it.", model.name);
            continue;
        }

        let material_index = match mesh.material_id {
            Some(id) => u32::try_from(id).unwrap_or(u32::MAX),
            None => *default_material.get_or_insert_with(|| {
                materials.push(SourceMaterial {
                    name: Some(DEFAULT_MATERIAL_NAME.to_string()),
                    ..Default::default()
                });
                (materials.len() - 1) as u32
            }),
        };

        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let faces: Vec<[u32; 3]> = mesh
            .indices
            .chunks_exact(3)
            .map(|f| [f[0], f[1], f[2]])
            .collect();
        let normals = if mesh.normals.is_empty() {
            debug!("Generating normals for OBJ object {}", model.name);
            generate_normals(&positions, &faces)
        } else {
            mesh.normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect()
        };
        let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| [t[0], t[1]])
                .collect()
        });

        let mesh_idx = scene.add_mesh(SourceMesh {
            name: model.name.clone(),
            positions,
            normals: Some(normals),
            tex_coords,
            faces,
            material_index,
        });
        let node_idx = scene.add_node(SourceNode {
            name: model.name,
            meshes: vec![mesh_idx],
            children: Vec::new(),
        });
        scene.nodes[scene.root].children.push(node_idx);
    }

    if scene.meshes.is_empty() {
        bail!("{} contains no meshes", path.display());
    }
    scene.materials = materials;

    info!(
        "Imported {}: {} meshes, {} materials",
        path.display(),
        scene.meshes.len(),
        scene.materials.len()
    );
    Ok(scene)
}

fn convert_material(m: tobj::Material) -> SourceMaterial {
    SourceMaterial {
        name: (!m.name.is_empty()).then_some(m.name),
        diffuse: m.diffuse,
        opacity: m.dissolve,
        diffuse_texture: m.diffuse_texture.filter(|t| !t.is_empty()),
    }
}
