//! Viewer tunables.
//!
//! Everything is a fixed default; only the model path can be changed, via
//! the first positional command line argument.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub model_path: PathBuf,
    /// Directories searched, in order, for textures named by materials.
    pub texture_dirs: Vec<PathBuf>,
    pub clear_colour: wgpu::Color,
    pub camera: CameraConfig,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    pub radius: f32,
    pub height: f32,
    /// Radians per second.
    pub angular_speed: f32,
    pub target: [f32; 3],
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub model_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            height: 1.5,
            angular_speed: 0.3,
            target: [0.0, 0.5, 0.0],
            fovy_degrees: 45.0,
            znear: 0.1,
            zfar: 100.0,
            model_scale: 0.5,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "orbit-viewer".to_string(),
            width: 1280,
            height: 720,
            model_path: PathBuf::from("supra.obj"),
            texture_dirs: vec![PathBuf::from("."), PathBuf::from("textures")],
            clear_colour: wgpu::Color {
                r: 0.2,
                g: 0.2,
                b: 0.2,
                a: 1.0,
            },
            camera: CameraConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Defaults, with the model path replaced by the first non-flag argument.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().skip(1).find(|arg| !arg.starts_with('-')) {
            config.model_path = PathBuf::from(path);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_positional_argument_is_the_model() {
        let args = ["orbit-viewer", "--verbose", "car.gltf", "other.obj"].map(String::from);
        let config = ViewerConfig::from_args(args);
        assert_eq!(config.model_path, PathBuf::from("car.gltf"));
    }

    #[test]
    fn defaults_without_arguments() {
        let config = ViewerConfig::from_args(["orbit-viewer".to_string()]);
        assert_eq!(config.model_path, PathBuf::from("supra.obj"));
        assert_eq!(config.texture_dirs.len(), 2);
    }
}
