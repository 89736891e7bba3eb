//! orbit-viewer
//!
//! Loads one OBJ or glTF model, flattens every mesh of its scene graph into a
//! single vertex and index buffer, classifies its materials by name and
//! opacity and renders it under an orbiting camera.
//!
//! High-level modules
//! - `config`: window, camera and texture search defaults
//! - `camera`: orbit camera and its uniform
//! - `context`: window surface, device and queue
//! - `data_structures`: source scene, flattened model and texture types
//! - `resources`: importers, texture loading, material classification and flattening
//! - `pipelines`: opaque and transparent render pipelines
//! - `render`: the GPU copy of a loaded model
//! - `viewer`: the winit event loop
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewer;
