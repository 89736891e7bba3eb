//! Heuristic material classification.
//!
//! Source files rarely say which parts glow or are see-through, so the
//! classifier guesses from material names and then lets an explicit opacity
//! value have the final word. The rules run in a fixed order; see [`RULES`].

use std::path::PathBuf;

use log::{debug, info};

use crate::{
    data_structures::{
        model::Material,
        scene_graph::SourceMaterial,
        texture::{TextureFactory, TextureHandle, TextureImage},
    },
    resources::texture::load_texture,
};

pub const EMISSIVE_TOKENS: [&str; 6] = ["light", "Light", "tail", "Tail", "lamp", "Lamp"];
pub const GLASS_TOKENS: [&str; 6] = [
    "glass",
    "Glass",
    "window",
    "Window",
    "windshield",
    "Windshield",
];

pub const EMISSIVE_TINT: [f32; 3] = [1.0, 0.1, 0.0];
pub const GLASS_TINT: [f32; 3] = [0.1, 0.1, 0.15];
pub const GLASS_TRANSPARENCY: f32 = 0.3;
/// Opacity values below this make a material transparent.
pub const OPACITY_THRESHOLD: f32 = 0.99;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Shading decisions for one material, before a texture is attached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub diffuse_color: [f32; 3],
    pub is_emissive: bool,
    pub is_transparent: bool,
    pub transparency: f32,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            diffuse_color: WHITE,
            is_emissive: false,
            is_transparent: false,
            transparency: 1.0,
        }
    }
}

impl Classification {
    pub fn into_material(self, name: Option<String>, texture: TextureHandle) -> Material {
        Material {
            name,
            diffuse_color: self.diffuse_color,
            texture,
            is_emissive: self.is_emissive,
            is_transparent: self.is_transparent,
            transparency: self.transparency,
        }
    }
}

type Rule = fn(&SourceMaterial, &mut Classification);

/// Applied first to last. Later rules see and may override earlier results:
/// the name rules decide whether the source colour is used at all, and the
/// opacity rule always wins on transparency.
pub const RULES: [(&str, Rule); 4] = [
    ("emissive name", emissive_name),
    ("glass name", glass_name),
    ("source colour", source_colour),
    ("opacity", opacity),
];

fn name_contains_any(material: &SourceMaterial, tokens: &[&str]) -> bool {
    material
        .name
        .as_deref()
        .is_some_and(|name| tokens.iter().any(|token| name.contains(token)))
}

fn emissive_name(material: &SourceMaterial, c: &mut Classification) {
    if name_contains_any(material, &EMISSIVE_TOKENS) {
        c.is_emissive = true;
        c.diffuse_color = EMISSIVE_TINT;
        info!("  - LIGHT detected - making emissive");
    }
}

fn glass_name(material: &SourceMaterial, c: &mut Classification) {
    if name_contains_any(material, &GLASS_TOKENS) {
        c.is_transparent = true;
        c.transparency = GLASS_TRANSPARENCY;
        c.diffuse_color = GLASS_TINT;
        info!("  - GLASS/WINDOW detected - making transparent");
    }
}

fn source_colour(material: &SourceMaterial, c: &mut Classification) {
    if c.is_emissive || c.is_transparent {
        return;
    }
    match material.diffuse {
        Some(color) => {
            c.diffuse_color = color;
            info!("  - Color: ({}, {}, {})", color[0], color[1], color[2]);
        }
        None => info!("  - No color found, using white"),
    }
}

fn opacity(material: &SourceMaterial, c: &mut Classification) {
    if let Some(opacity) = material.opacity {
        if opacity < OPACITY_THRESHOLD {
            c.is_transparent = true;
            c.transparency = opacity;
            info!("  - Opacity: {opacity} - making transparent");
        }
    }
}

/// Run every rule of [`RULES`] over `material`.
pub fn classify(material: &SourceMaterial) -> Classification {
    let mut classification = Classification::default();
    for (rule_name, rule) in RULES {
        rule(material, &mut classification);
        debug!("    after {rule_name}: {classification:?}");
    }
    classification
}

/**
 * Classify every scene material, in scene order, and give each a texture.
 *
 * A declared diffuse texture is looked up in each of `search_dirs` in turn.
 * Materials without a usable texture share a 1x1 white texture, created the
 * first time one is needed, so every returned material has a valid handle.
 */
pub fn classify_materials(
    materials: &[SourceMaterial],
    search_dirs: &[PathBuf],
    factory: &mut dyn TextureFactory,
) -> Vec<Material> {
    info!("=== Loading Materials ===");
    info!("Total materials found: {}", materials.len());

    let mut white: Option<TextureHandle> = None;
    materials
        .iter()
        .enumerate()
        .map(|(idx, source)| {
            info!(
                "Material {idx} name: {}",
                source.name.as_deref().unwrap_or("<unnamed>")
            );
            let classification = classify(source);

            let texture = source.diffuse_texture.as_deref().and_then(|reference| {
                info!("  - Texture: {reference}");
                search_dirs
                    .iter()
                    .find_map(|dir| load_texture(reference, dir, &mut *factory))
            });
            let texture = match texture {
                Some(handle) => handle,
                None => *white.get_or_insert_with(|| {
                    factory.create_texture(&TextureImage::white_pixel(), "white fallback")
                }),
            };

            classification.into_material(source.name.clone(), texture)
        })
        .collect()
}
