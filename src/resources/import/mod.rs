//! Scene importers.
//!
//! Every backend produces the same plain-data [`ImportedScene`]: a node arena
//! with a root, the meshes the nodes point at and the materials the meshes
//! point at. Nothing here touches the GPU; the scene is read once by the
//! [`scene walker`](crate::resources::scene) and then dropped.
//!
//! Texture coordinates in an `ImportedScene` have their origin in the
//! bottom-left corner (the OBJ convention). Backends whose source format
//! differs convert on the way in.

use std::path::{Path, PathBuf};

use crate::{data_structures::model::TextureKind, error::ImportError};

mod gltf_scene;
mod obj;

/// Post-processing requested from the importer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Split polygons into triangles while importing.
    pub triangulate: bool,
    /// Flip texture coordinates vertically (`v -> 1 - v`) during assembly so
    /// they match the top-left origin of wgpu textures.
    pub flip_uvs: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            flip_uvs: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedNode {
    pub name: String,
    /// Indices into [`ImportedScene::meshes`], in draw order.
    pub meshes: Vec<usize>,
    /// Indices into [`ImportedScene::nodes`], in traversal order.
    pub children: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// Either empty or one normal per position.
    pub normals: Vec<[f32; 3]>,
    /// First texture-coordinate channel; either empty or one entry per position.
    pub tex_coords: Vec<[f32; 2]>,
    /// Flat face index list.
    pub indices: Vec<u32>,
    /// Vertex count of each face. Empty means every face is a triangle.
    pub face_arities: Vec<u32>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMaterial {
    pub name: String,
    /// Texture file names relative to the scene directory, in slot order.
    pub diffuse: Vec<String>,
    pub specular: Vec<String>,
    pub emission: Vec<String>,
}

impl ImportedMaterial {
    pub fn textures(&self, kind: TextureKind) -> &[String] {
        match kind {
            TextureKind::Diffuse => &self.diffuse,
            TextureKind::Specular => &self.specular,
            TextureKind::Emission => &self.emission,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedScene {
    /// Where the scene came from; used for diagnostics only.
    pub source: PathBuf,
    pub root: Option<usize>,
    pub nodes: Vec<ImportedNode>,
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
}

impl ImportedScene {
    /// Rejects scenes the walker cannot start on: no root, a dangling root
    /// index, no meshes at all, or a mesh naming a material that does not
    /// exist.
    pub fn validate(&self) -> Result<usize, ImportError> {
        let root = self.root.ok_or_else(|| ImportError::MissingRoot {
            path: self.source.clone(),
        })?;
        if root >= self.nodes.len() {
            return Err(ImportError::Malformed {
                path: self.source.clone(),
                reason: format!("root node {} out of {} nodes", root, self.nodes.len()),
            });
        }
        if self.meshes.is_empty() {
            return Err(ImportError::Incomplete {
                path: self.source.clone(),
                reason: "scene contains no meshes".to_string(),
            });
        }
        if let Some((mesh, material)) = self
            .meshes
            .iter()
            .find_map(|mesh| mesh.material.filter(|&m| m >= self.materials.len()).map(|m| (mesh, m)))
        {
            return Err(ImportError::Malformed {
                path: self.source.clone(),
                reason: format!(
                    "mesh {:?} uses material {} out of {} materials",
                    mesh.name,
                    material,
                    self.materials.len()
                ),
            });
        }
        Ok(root)
    }
}

/// Imports the scene at `path`, picking the backend from the file extension.
pub fn import_file(path: &Path, options: &ImportOptions) -> Result<ImportedScene, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let scene = match extension.as_deref() {
        Some("obj") => obj::import(path, options)?,
        Some("gltf") | Some("glb") => gltf_scene::import(path, options)?,
        _ => {
            return Err(ImportError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    scene.validate()?;
    log::debug!(
        "imported {}: {} nodes, {} meshes, {} materials",
        path.display(),
        scene.nodes.len(),
        scene.meshes.len(),
        scene.materials.len()
    );
    Ok(scene)
}
