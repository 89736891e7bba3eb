use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{info, warn};

use crate::data_structures::texture::{TextureFactory, TextureHandle, TextureImage};

/// `dir + "/" + reference`, concatenated rather than joined so that a
/// reference starting with a separator still stays inside `dir`.
pub fn search_path(dir: &Path, reference: &str) -> PathBuf {
    let mut path = OsString::from(dir.as_os_str());
    path.push("/");
    path.push(reference);
    PathBuf::from(path)
}

/// Text after the last `/` or `\`, or the whole reference.
pub fn basename(reference: &str) -> &str {
    reference
        .rfind(['/', '\\'])
        .map_or(reference, |idx| &reference[idx + 1..])
}

pub fn decode_image(path: &Path) -> anyhow::Result<TextureImage> {
    let img = image::open(path).with_context(|| format!("decoding {}", path.display()))?;
    Ok(TextureImage::from_dynamic(img))
}

/// Hand `image` to `factory` unless it is larger than the factory allows.
fn create_within_limits(
    factory: &mut dyn TextureFactory,
    image: &TextureImage,
    label: &str,
    path: &Path,
) -> Option<TextureHandle> {
    let limit = factory.max_dimension();
    if image.width > limit || image.height > limit {
        warn!(
            "Failed to load texture: {} is {}x{}, above the {limit} pixel limit",
            path.display(),
            image.width,
            image.height
        );
        return None;
    }
    Some(factory.create_texture(image, label))
}

/**
 * Load the texture `reference` from `search_dir`.
 *
 * Material files frequently carry paths from the machine they were authored
 * on, so when `search_dir/reference` does not decode the bare file name is
 * tried in `search_dir` as well. An image larger than
 * [`TextureFactory::max_dimension`] counts as a failed attempt. Returns
 * `None` when neither works; that is not an error, callers substitute a
 * fallback texture.
 */
pub fn load_texture(
    reference: &str,
    search_dir: &Path,
    factory: &mut dyn TextureFactory,
) -> Option<TextureHandle> {
    let primary = search_path(search_dir, reference);
    match decode_image(&primary) {
        Ok(image) => {
            if let Some(handle) = create_within_limits(factory, &image, reference, &primary) {
                info!("Loaded texture: {reference} ({})", primary.display());
                return Some(handle);
            }
        }
        Err(e) => warn!("Failed to load texture: {}: {e:#}", primary.display()),
    }

    let simple_name = basename(reference);
    let fallback = search_path(search_dir, simple_name);
    if fallback == primary {
        return None;
    }
    match decode_image(&fallback) {
        Ok(image) => {
            let handle = create_within_limits(factory, &image, simple_name, &fallback)?;
            info!("Loaded texture (fallback): {simple_name} ({})", fallback.display());
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to load texture: {}: {e:#}", fallback.display());
            None
        }
    }
}
