use std::{borrow::Cow, ops::Range, path::Path};

use crate::error::ImportError;

use super::{ImportOptions, ImportedMaterial, ImportedMesh, ImportedNode, ImportedScene};

/// glTF 2.0 (`.gltf` with external buffers or binary `.glb`).
///
/// Arena layout: index 0 is a synthetic root whose children are the nodes of
/// the default scene; glTF node `n` lives at `n + 1`. Every primitive becomes
/// its own mesh. Node transforms are not applied. Base colour textures count
/// as diffuse and emissive textures as emission; glTF core has no specular
/// slot.
pub(super) fn import(path: &Path, options: &ImportOptions) -> Result<ImportedScene, ImportError> {
    let gltf_err = |source| ImportError::Gltf {
        path: path.to_path_buf(),
        source,
    };
    let gltf = gltf::Gltf::open(path).map_err(gltf_err)?;
    let buffers =
        gltf::import_buffers(&gltf.document, path.parent(), gltf.blob.clone()).map_err(gltf_err)?;
    let document = &gltf.document;

    let materials = document
        .materials()
        .map(|material| {
            let name = material
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("material{}", material.index().unwrap_or(0)));
            let diffuse = material
                .pbr_metallic_roughness()
                .base_color_texture()
                .and_then(|info| image_file(info.texture(), "base colour", &name, path))
                .into_iter()
                .collect();
            let emission = material
                .emissive_texture()
                .and_then(|info| image_file(info.texture(), "emissive", &name, path))
                .into_iter()
                .collect();
            ImportedMaterial {
                name,
                diffuse,
                specular: Vec::new(),
                emission,
            }
        })
        .collect();

    let mut meshes = Vec::new();
    let mut mesh_ranges: Vec<Range<usize>> = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        let start = meshes.len();
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));
        for primitive in mesh.primitives() {
            let name = format!("{mesh_name}.{}", primitive.index());
            match read_primitive(&primitive, &buffers, name, options) {
                Some(imported) => meshes.push(imported),
                None => log::warn!(
                    "skipping primitive {} of mesh {mesh_name}: mode {:?} is not renderable as triangles",
                    primitive.index(),
                    primitive.mode()
                ),
            }
        }
        mesh_ranges.push(start..meshes.len());
    }

    let mut nodes = Vec::with_capacity(document.nodes().len() + 1);
    nodes.push(ImportedNode {
        name: "root".to_string(),
        ..Default::default()
    });
    for node in document.nodes() {
        nodes.push(ImportedNode {
            name: node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node{}", node.index())),
            meshes: node
                .mesh()
                .and_then(|mesh| mesh_ranges.get(mesh.index()).cloned())
                .map(|range| range.collect())
                .unwrap_or_default(),
            children: node.children().map(|child| child.index() + 1).collect(),
        });
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    let root = scene.map(|scene| {
        nodes[0].children = scene.nodes().map(|node| node.index() + 1).collect();
        0
    });

    Ok(ImportedScene {
        source: path.to_path_buf(),
        root,
        nodes,
        meshes,
        materials,
    })
}

/// The file behind `texture`, or `None` with a warning when its image is not
/// a file next to the scene.
fn image_file(texture: gltf::Texture, slot: &str, material: &str, path: &Path) -> Option<String> {
    let file = match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } => texture_file(uri),
        gltf::image::Source::View { .. } => {
            Err("embedded buffer-view images are not supported".to_string())
        }
    };
    match file {
        Ok(file) => Some(file),
        Err(reason) => {
            log::warn!(
                "skipping {slot} texture of material {material} in {}: {reason}",
                path.display()
            );
            None
        }
    }
}

/// File name, relative to the scene directory, that an image URI points at.
///
/// Relative references are percent-decoded; `file:` URIs lose their scheme.
/// `data:` URIs and every other scheme are rejected with a reason.
fn texture_file(uri: &str) -> Result<String, String> {
    if uri.starts_with("data:") {
        return Err("embedded data URIs are not supported".to_string());
    }
    let reference = match uri.strip_prefix("file://").or_else(|| uri.strip_prefix("file:")) {
        Some(rest) => rest,
        None if uri.contains(':') => return Err(format!("URI {uri:?} is not a file reference")),
        None => uri,
    };
    urlencoding::decode(reference)
        .map(Cow::into_owned)
        .map_err(|err| format!("URI {uri:?} is not valid UTF-8 once decoded: {err}"))
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    name: String,
    options: &ImportOptions,
) -> Option<ImportedMesh> {
    let reader =
        primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .map(|iter| iter.collect())
        .unwrap_or_default();
    let normals = reader
        .read_normals()
        .map(|iter| iter.collect())
        .unwrap_or_default();
    // glTF puts the UV origin top-left; scenes carry bottom-left.
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().map(|[u, v]| [u, 1.0 - v]).collect())
        .unwrap_or_default();
    let raw: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let (indices, face_arities) = match primitive.mode() {
        gltf::mesh::Mode::Triangles => (raw, Vec::new()),
        gltf::mesh::Mode::TriangleStrip if options.triangulate => (strip_to_list(&raw), Vec::new()),
        gltf::mesh::Mode::TriangleFan if options.triangulate => (fan_to_list(&raw), Vec::new()),
        gltf::mesh::Mode::TriangleStrip | gltf::mesh::Mode::TriangleFan => {
            let arity = raw.len() as u32;
            (raw, vec![arity])
        }
        _ => return None,
    };

    Some(ImportedMesh {
        name,
        positions,
        normals,
        tex_coords,
        indices,
        face_arities,
        material: primitive.material().index(),
    })
}

fn strip_to_list(strip: &[u32]) -> Vec<u32> {
    let mut list = Vec::with_capacity(strip.len().saturating_sub(2) * 3);
    for (i, w) in strip.windows(3).enumerate() {
        // Every other triangle is wound the opposite way.
        if i % 2 == 0 {
            list.extend_from_slice(&[w[0], w[1], w[2]]);
        } else {
            list.extend_from_slice(&[w[1], w[0], w[2]]);
        }
    }
    list
}

fn fan_to_list(fan: &[u32]) -> Vec<u32> {
    let mut list = Vec::with_capacity(fan.len().saturating_sub(2) * 3);
    if let Some((&center, rest)) = fan.split_first() {
        for w in rest.windows(2) {
            list.extend_from_slice(&[center, w[0], w[1]]);
        }
    }
    list
}
