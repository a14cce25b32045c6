//! Error types for scene import, texture decoding and model assembly.

use std::path::PathBuf;

use thiserror::Error;

/// The scene file could not be turned into an [`ImportedScene`](crate::resources::import::ImportedScene).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read OBJ scene {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("failed to read glTF scene {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("no importer for {path} (supported: .obj, .gltf, .glb)")]
    UnsupportedFormat { path: PathBuf },
    #[error("scene {path} has no root node")]
    MissingRoot { path: PathBuf },
    #[error("scene {path} is incomplete: {reason}")]
    Incomplete { path: PathBuf, reason: String },
    #[error("scene {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// A texture referenced by a material could not be turned into pixel data.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {path} has {channels} channels, only 1, 3 or 4 are supported")]
    UnsupportedFormat { path: PathBuf, channels: u8 },
}

impl TextureError {
    pub fn path(&self) -> &PathBuf {
        match self {
            TextureError::Decode { path, .. } => path,
            TextureError::UnsupportedFormat { path, .. } => path,
        }
    }
}

/// Loading a [`Model`](crate::data_structures::model::Model) failed. No partial model is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("mesh {mesh:?} references an unusable texture: {source}")]
    Texture {
        mesh: String,
        #[source]
        source: TextureError,
    },
    #[error("mesh {mesh:?} is not a valid triangle list: {reason}")]
    InvalidMesh { mesh: String, reason: String },
}
