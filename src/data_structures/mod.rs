//! Viewer data structures: imported scenes, flattened models and textures.
//!
//! - `scene_graph` holds the importer-neutral scene tree and its traversal
//! - `model` contains the flattened vertex/index buffers, submeshes and materials
//! - `texture` contains texture handles, decoded images and the GPU texture wrapper

pub mod model;
pub mod scene_graph;
pub mod texture;
