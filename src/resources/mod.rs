use std::path::{Path, PathBuf};

use anyhow::bail;

use crate::data_structures::{
    model::{MeshBuffers, Model},
    scene_graph::{self, SourceScene},
    texture::TextureFactory,
};

/**
 * This module contains all logic for turning model files into a flattened `Model`.
 */
pub mod gltf_scene;
pub mod material;
pub mod mesh;
pub mod obj_scene;
pub mod texture;

/// Import `path` into a [`SourceScene`], picking the importer by extension.
pub fn load_scene(path: &Path) -> anyhow::Result<SourceScene> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("obj") => obj_scene::load(path),
        Some("gltf") | Some("glb") => gltf_scene::load(path),
        Some(other) => bail!("unsupported model format .{other} ({})", path.display()),
        None => bail!("{} has no file extension to pick an importer by", path.display()),
    }
}

/// Flatten every mesh reachable from the scene root into shared buffers.
///
/// Fails when nothing drawable is reachable: no root, no reachable meshes,
/// or only meshes without faces.
pub fn flatten_scene(scene: &SourceScene) -> anyhow::Result<MeshBuffers> {
    let mut builder = mesh::MeshBuilder::new();
    let flattened = scene_graph::traverse(scene, &mut builder);
    if flattened < scene.meshes.len() {
        log::warn!(
            "Only {flattened} of {} meshes are reachable from the scene root.",
            scene.meshes.len()
        );
    }
    let buffers = builder.finish();
    if buffers.indices.is_empty() {
        bail!(
            "no faces are reachable from the scene root ({flattened} of {} meshes flattened)",
            scene.meshes.len()
        );
    }
    Ok(buffers)
}

/**
 * Classify the scene's materials and flatten its meshes.
 *
 * Textures are created through `factory`; `search_dirs` are tried in order
 * for every texture a material declares. Flattening runs first, so a scene
 * with nothing to draw fails before any texture is created.
 */
pub fn load_model(
    scene: &SourceScene,
    search_dirs: &[PathBuf],
    factory: &mut dyn TextureFactory,
) -> anyhow::Result<Model> {
    let buffers = flatten_scene(scene)?;
    let materials = material::classify_materials(&scene.materials, search_dirs, factory);
    let model = Model { buffers, materials };

    for (idx, submesh) in model.dangling_submeshes() {
        log::warn!(
            "SubMesh {idx} references material {} but only {} exist; it will use the default material.",
            submesh.material_index,
            model.materials.len()
        );
    }
    log::info!(
        "Model Loaded! Vertices: {}, indices: {}, submeshes: {}",
        model.buffers.vertices.len(),
        model.buffers.indices.len(),
        model.buffers.submeshes.len()
    );
    Ok(model)
}
