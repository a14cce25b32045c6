//! Core data types shared by loading and rendering.
//!
//! - `model` contains meshes, models and the vertex layout
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data

pub mod instance;
pub mod model;
pub mod texture;
