//! Texture data, texture handles and the GPU texture factory.
//!
//! The ingestion pipeline never talks to wgpu directly. It decodes images
//! into a [`TextureImage`] and hands them to a [`TextureFactory`]; the factory
//! returns an opaque [`TextureHandle`]. [`GpuTextureFactory`] is the real
//! implementation, tests substitute a recording double.

use std::num::NonZeroU32;

use image::{DynamicImage, GenericImageView, imageops::FilterType};

/// Opaque id of a texture created by a [`TextureFactory`].
///
/// Handles are never zero; "no texture" is expressed as `Option::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(NonZeroU32);

impl TextureHandle {
    /// Handle for the `n`-th texture (zero based) created by a factory.
    ///
    /// Saturates at `u32::MAX`.
    pub fn from_index(index: usize) -> Self {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Channel layout of decoded pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    R8,
    Rgb8,
    Rgba8,
}

/// Decoded, tightly packed 8-bit pixel data ready for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Keeps 1, 3 and 4 channel 8-bit images as they are and converts
    /// everything else (grey+alpha, 16 bit, float) to RGBA8.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        let (layout, pixels) = match img {
            DynamicImage::ImageLuma8(buf) => (PixelLayout::R8, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (PixelLayout::Rgb8, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (PixelLayout::Rgba8, buf.into_raw()),
            other => (PixelLayout::Rgba8, other.to_rgba8().into_raw()),
        };
        Self {
            width,
            height,
            layout,
            pixels,
        }
    }

    /// A single opaque white RGBA pixel.
    pub fn white_pixel() -> Self {
        Self {
            width: 1,
            height: 1,
            layout: PixelLayout::Rgba8,
            pixels: vec![255, 255, 255, 255],
        }
    }

    /// Number of levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }

    /// Convert into an image the GPU can store: single channel stays single
    /// channel, RGB is widened to RGBA since there is no 3-channel format.
    fn to_uploadable(&self) -> Option<DynamicImage> {
        match self.layout {
            PixelLayout::R8 => {
                image::GrayImage::from_raw(self.width, self.height, self.pixels.clone())
                    .map(DynamicImage::ImageLuma8)
            }
            PixelLayout::Rgb8 => {
                image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
                    .map(|rgb| DynamicImage::ImageRgba8(DynamicImage::ImageRgb8(rgb).to_rgba8()))
            }
            PixelLayout::Rgba8 => {
                image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
                    .map(DynamicImage::ImageRgba8)
            }
        }
    }
}

/// Turns decoded pixel data into a texture owned by the factory.
pub trait TextureFactory {
    fn create_texture(&mut self, image: &TextureImage, label: &str) -> TextureHandle;

    /// Largest width or height `create_texture` accepts.
    fn max_dimension(&self) -> u32 {
        u32::MAX
    }
}

/// A GPU texture with a view and a sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Upload `image` with a full mip chain.
    ///
    /// Single channel images are stored as `R8Unorm`, everything else as
    /// `Rgba8UnormSrgb`. The sampler repeats on both axes and filters
    /// linearly between texels and between mip levels.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        label: &str,
    ) -> Self {
        let format = match image.layout {
            PixelLayout::R8 => wgpu::TextureFormat::R8Unorm,
            PixelLayout::Rgb8 | PixelLayout::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        let mip_level_count = image.mip_level_count();
        let size = wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        match image.to_uploadable() {
            Some(base) => {
                let bytes_per_pixel = match image.layout {
                    PixelLayout::R8 => 1,
                    _ => 4,
                };
                for level in 0..mip_level_count {
                    let width = (size.width >> level).max(1);
                    let height = (size.height >> level).max(1);
                    let level_image = if level == 0 {
                        base.clone()
                    } else {
                        base.resize_exact(width, height, FilterType::Triangle)
                    };
                    queue.write_texture(
                        wgpu::TexelCopyTextureInfo {
                            aspect: wgpu::TextureAspect::All,
                            texture: &texture,
                            mip_level: level,
                            origin: wgpu::Origin3d::ZERO,
                        },
                        level_image.as_bytes(),
                        wgpu::TexelCopyBufferLayout {
                            offset: 0,
                            bytes_per_row: Some(bytes_per_pixel * width),
                            rows_per_image: Some(height),
                        },
                        wgpu::Extent3d {
                            width,
                            height,
                            depth_or_array_layers: 1,
                        },
                    );
                }
            }
            None => log::error!(
                "Texture {label} has {} bytes, which does not match {}x{} {:?}",
                image.pixels.len(),
                image.width,
                image.height,
                image.layout
            ),
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_default_sampler(device);
        Self {
            texture,
            view,
            sampler,
        }
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

/// Creates GPU textures during the load phase and keeps ownership of them.
pub struct GpuTextureFactory<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    textures: Vec<Texture>,
}

impl<'a> GpuTextureFactory<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: Vec::new(),
        }
    }

    pub fn finish(self) -> TextureSet {
        TextureSet {
            textures: self.textures,
        }
    }
}

impl TextureFactory for GpuTextureFactory<'_> {
    fn create_texture(&mut self, image: &TextureImage, label: &str) -> TextureHandle {
        let texture = Texture::from_image(self.device, self.queue, image, label);
        self.textures.push(texture);
        TextureHandle::from_index(self.textures.len() - 1)
    }

    fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// Every texture created during the load phase. Dropping it releases them.
#[derive(Debug, Default)]
pub struct TextureSet {
    textures: Vec<Texture>,
}

impl TextureSet {
    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.index())
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_one_based() {
        let handle = TextureHandle::from_index(0);
        assert_eq!(handle.get(), 1);
        assert_eq!(handle.index(), 0);
    }

    #[test]
    fn grey_alpha_is_widened_to_rgba() {
        let img = DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_pixel(
            2,
            1,
            image::LumaA([10, 200]),
        ));
        let converted = TextureImage::from_dynamic(img);
        assert_eq!(converted.layout, PixelLayout::Rgba8);
        assert_eq!(converted.pixels, vec![10, 10, 10, 200, 10, 10, 10, 200]);
    }

    #[test]
    fn full_mip_chain_length() {
        let mut img = TextureImage::white_pixel();
        assert_eq!(img.mip_level_count(), 1);
        img.width = 256;
        img.height = 64;
        assert_eq!(img.mip_level_count(), 9);
        img.width = 300;
        assert_eq!(img.mip_level_count(), 9);
    }
}
