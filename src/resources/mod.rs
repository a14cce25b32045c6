//! Loading models from disk: scene import, texture decoding and caching,
//! mesh assembly and the GPU upload seam.
//!
//! The entry point is [`Model::load`](crate::data_structures::model::Model::load);
//! the pieces below are public so tests and tools can drive them separately.

pub mod gpu;
pub mod import;
pub mod mesh;
pub mod scene;
pub mod texture;

use import::ImportOptions;

/// What to do when a material texture cannot be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureFallback {
    /// Log the error and bind a 1x1 placeholder in its place.
    #[default]
    Placeholder,
    /// Fail the whole load.
    Abort,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub import: ImportOptions,
    pub on_texture_error: TextureFallback,
}
