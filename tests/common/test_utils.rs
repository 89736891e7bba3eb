#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::DynamicImage;
use orbit_viewer::data_structures::{
    scene_graph::{SourceMesh, SourceNode, SourceScene},
    texture::{TextureFactory, TextureHandle, TextureImage},
};

/// Remembers every texture it is asked to create instead of touching a GPU.
#[derive(Default)]
pub(crate) struct RecordingFactory {
    pub created: Vec<(String, TextureImage)>,
    /// Mirrors a device texture size limit when set.
    pub max_dimension: Option<u32>,
}

impl RecordingFactory {
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: Some(max_dimension),
            ..Default::default()
        }
    }

    pub fn label(&self, handle: TextureHandle) -> &str {
        &self.created[handle.index()].0
    }

    pub fn image(&self, handle: TextureHandle) -> &TextureImage {
        &self.created[handle.index()].1
    }
}

impl TextureFactory for RecordingFactory {
    fn create_texture(&mut self, image: &TextureImage, label: &str) -> TextureHandle {
        self.created.push((label.to_string(), image.clone()));
        TextureHandle::from_index(self.created.len() - 1)
    }

    fn max_dimension(&self) -> u32 {
        self.max_dimension.unwrap_or(u32::MAX)
    }
}

/// A scratch directory below the system temp dir, removed on drop.
pub(crate) struct TempDir(PathBuf);

impl TempDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "orbit-viewer-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.0.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }

    pub fn write_image(&self, relative: &str, image: DynamicImage) -> PathBuf {
        let path = self.0.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        image.save(&path).expect("failed to write image fixture");
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

pub fn rgba_image(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba(pixel),
    ))
}

/// `n` vertices in a fan, `n - 2` triangles, tagged with `material_index`.
pub fn fan_mesh(n: usize, material_index: u32) -> SourceMesh {
    let positions = (0..n)
        .map(|i| {
            let angle = i as f32 / n as f32 * std::f32::consts::TAU;
            [angle.cos(), angle.sin(), 0.0]
        })
        .collect();
    let faces = (1..n.saturating_sub(1) as u32)
        .map(|i| [0, i, i + 1])
        .collect();
    SourceMesh {
        name: format!("fan{material_index}"),
        positions,
        faces,
        material_index,
        ..Default::default()
    }
}

/// A root node owning every mesh of `meshes`, in order.
pub fn flat_scene(meshes: Vec<SourceMesh>) -> SourceScene {
    let mut scene = SourceScene::default();
    let mesh_indices = meshes.into_iter().map(|m| scene.add_mesh(m)).collect();
    scene.root = scene.add_node(SourceNode {
        name: "root".to_string(),
        meshes: mesh_indices,
        children: Vec::new(),
    });
    scene
}
