//! lightbox
//!
//! Loads textured 3D models from OBJ or glTF files into GPU-ready meshes and
//! shows them in a small real-time Phong lighting demo. The loading pipeline
//! (import, texture cache, mesh assembly, scene walk) talks to the GPU only
//! through [`resources::gpu::GpuUpload`], so it runs without a device in tests.
//!
//! High-level modules
//! - `camera`: free-fly camera, controller and view/projection uniform
//! - `config`: command-line settings of the demo
//! - `context`: window, surface, device/queue and depth buffer
//! - `data_structures`: models, meshes, GPU textures and instances
//! - `demo`: the lit demo scene
//! - `error`: error types of the loading pipeline
//! - `flow`: the winit event loop
//! - `logging`: logger setup
//! - `pipelines`: the Phong and light marker render pipelines
//! - `resources`: importing scenes, decoding and caching textures, assembling meshes
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod demo;
pub mod error;
pub mod flow;
pub mod logging;
pub mod pipelines;
pub mod resources;

pub use data_structures::model::{Mesh, Model, TextureKind};
pub use error::{ImportError, LoadError, TextureError};
pub use resources::{LoadOptions, TextureFallback, import::ImportOptions};
