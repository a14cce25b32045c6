use std::path::Path;

use crate::{
    data_structures::model::{BoundTexture, Mesh, ModelVertex, TextureBinding, TextureKind},
    error::{ImportError, LoadError},
    resources::{
        LoadOptions, TextureFallback,
        gpu::GpuUpload,
        import::{ImportedMaterial, ImportedMesh},
        texture::{TextureCache, TextureId},
    },
};

/// Turns imported meshes into [`Mesh`]es, resolving material textures
/// through the model's texture cache.
pub struct Assembler<'a, G: GpuUpload> {
    gpu: &'a mut G,
    textures: &'a mut TextureCache<G::Texture>,
    directory: &'a Path,
    options: &'a LoadOptions,
}

impl<'a, G: GpuUpload> Assembler<'a, G> {
    pub fn new(
        gpu: &'a mut G,
        textures: &'a mut TextureCache<G::Texture>,
        directory: &'a Path,
        options: &'a LoadOptions,
    ) -> Self {
        Self {
            gpu,
            textures,
            directory,
            options,
        }
    }

    pub fn assemble(
        &mut self,
        mesh: &ImportedMesh,
        materials: &[ImportedMaterial],
    ) -> Result<Mesh<G::Mesh>, LoadError> {
        let vertices = self.vertices(mesh);
        let indices = triangle_indices(mesh, vertices.len())?;

        let mut bindings = Vec::new();
        if let Some(material_index) = mesh.material {
            let material = materials.get(material_index).ok_or_else(|| ImportError::Malformed {
                path: self.directory.to_path_buf(),
                reason: format!(
                    "mesh {:?} uses material {} out of {} materials",
                    mesh.name,
                    material_index,
                    materials.len()
                ),
            })?;
            // Diffuse, then specular, then emission; shaders bind by these names.
            for kind in [TextureKind::Diffuse, TextureKind::Specular, TextureKind::Emission] {
                for (slot, file) in material.textures(kind).iter().enumerate() {
                    let id = self.resolve(file, kind, &mesh.name)?;
                    bindings.push(TextureBinding {
                        id,
                        kind,
                        uniform: kind.uniform_name(slot + 1),
                    });
                }
            }
        }

        let bound: Vec<BoundTexture<'_, G::Texture>> = bindings
            .iter()
            .filter_map(|binding| {
                self.textures.get(binding.id).map(|entry| BoundTexture {
                    uniform: &binding.uniform,
                    kind: binding.kind,
                    texture: &entry.handle,
                })
            })
            .collect();
        let buffers = self.gpu.upload_mesh(&mesh.name, &vertices, &indices, &bound);
        log::debug!(
            "assembled mesh {:?}: {} vertices, {} triangles, {} textures",
            mesh.name,
            vertices.len(),
            indices.len() / 3,
            bindings.len()
        );

        Ok(Mesh {
            name: mesh.name.clone(),
            vertices,
            indices,
            textures: bindings,
            buffers,
        })
    }

    fn vertices(&self, mesh: &ImportedMesh) -> Vec<ModelVertex> {
        let flip = self.options.import.flip_uvs;
        mesh.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| ModelVertex {
                position,
                normal: mesh.normals.get(i).copied().unwrap_or_default(),
                tex_coords: match mesh.tex_coords.get(i) {
                    Some(&[u, v]) if flip => [u, 1.0 - v],
                    Some(&uv) => uv,
                    None => [0.0, 0.0],
                },
            })
            .collect()
    }

    fn resolve(&mut self, file: &str, kind: TextureKind, mesh: &str) -> Result<TextureId, LoadError> {
        match self
            .textures
            .load_or_fetch(file, self.directory, kind, &mut *self.gpu)
        {
            Ok(id) => Ok(id),
            Err(source) => match self.options.on_texture_error {
                TextureFallback::Abort => Err(LoadError::Texture {
                    mesh: mesh.to_string(),
                    source,
                }),
                TextureFallback::Placeholder => {
                    log::warn!("{source}; using a placeholder for mesh {mesh:?}");
                    Ok(self
                        .textures
                        .insert_placeholder(file, self.directory, kind, &mut *self.gpu))
                }
            },
        }
    }
}

/// Copies the face indices of `mesh`, rejecting anything that is not a
/// triangle list over `vertex_count` vertices.
fn triangle_indices(mesh: &ImportedMesh, vertex_count: usize) -> Result<Vec<u32>, LoadError> {
    let invalid = |reason: String| LoadError::InvalidMesh {
        mesh: mesh.name.clone(),
        reason,
    };
    if let Some((face, arity)) = mesh
        .face_arities
        .iter()
        .enumerate()
        .find(|(_, arity)| **arity != 3)
    {
        return Err(invalid(format!(
            "face {face} has {arity} vertices, expected a triangulated mesh"
        )));
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(invalid(format!(
            "{} indices do not form whole triangles",
            mesh.indices.len()
        )));
    }
    if let Some(index) = mesh
        .indices
        .iter()
        .find(|&&index| index as usize >= vertex_count)
    {
        return Err(invalid(format!(
            "index {index} out of range for {vertex_count} vertices"
        )));
    }
    Ok(mesh.indices.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{RecordingGpu, scratch_dir};

    fn triangle(name: &str) -> ImportedMesh {
        ImportedMesh {
            name: name.to_string(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            tex_coords: vec![[0.0, 0.25], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    fn assemble_with(
        mesh: &ImportedMesh,
        materials: &[ImportedMaterial],
        directory: &Path,
        options: &LoadOptions,
    ) -> (Result<Mesh<usize>, LoadError>, RecordingGpu, TextureCache<usize>) {
        let mut gpu = RecordingGpu::default();
        let mut cache = TextureCache::new();
        let result = Assembler::new(&mut gpu, &mut cache, directory, options).assemble(mesh, materials);
        (result, gpu, cache)
    }

    #[test]
    fn flips_uvs_and_defaults_missing_attributes() {
        let mut mesh = triangle("tri");
        mesh.normals.clear();
        mesh.tex_coords.truncate(1);
        let (result, _, _) = assemble_with(&mesh, &[], Path::new("."), &LoadOptions::default());
        let mesh = result.unwrap();
        assert_eq!(mesh.vertices()[0].tex_coords, [0.0, 0.75]);
        assert_eq!(mesh.vertices()[1].tex_coords, [0.0, 0.0]);
        assert_eq!(mesh.vertices()[2].normal, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn keeps_uvs_when_flip_is_disabled() {
        let mut options = LoadOptions::default();
        options.import.flip_uvs = false;
        let (result, _, _) = assemble_with(&triangle("tri"), &[], Path::new("."), &options);
        assert_eq!(result.unwrap().vertices()[0].tex_coords, [0.0, 0.25]);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut mesh = triangle("broken");
        mesh.indices = vec![0, 1, 7];
        let (result, gpu, _) = assemble_with(&mesh, &[], Path::new("."), &LoadOptions::default());
        assert!(matches!(result, Err(LoadError::InvalidMesh { .. })));
        assert!(gpu.meshes.is_empty());
    }

    #[test]
    fn rejects_untriangulated_faces() {
        let mut mesh = triangle("quad");
        mesh.positions.push([1.0, 1.0, 0.0]);
        mesh.indices = vec![0, 1, 3, 2];
        mesh.face_arities = vec![4];
        let (result, _, _) = assemble_with(&mesh, &[], Path::new("."), &LoadOptions::default());
        assert!(matches!(result, Err(LoadError::InvalidMesh { .. })));
    }

    #[test]
    fn dangling_material_index_is_an_error() {
        let mut mesh = triangle("tri");
        mesh.material = Some(3);
        let (result, gpu, _) = assemble_with(&mesh, &[], Path::new("."), &LoadOptions::default());
        assert!(matches!(
            result,
            Err(LoadError::Import(ImportError::Malformed { .. }))
        ));
        assert!(gpu.meshes.is_empty());
    }

    #[test]
    fn undecodable_texture_becomes_placeholder() {
        let dir = scratch_dir("assembler_placeholder");
        let mut mesh = triangle("tri");
        mesh.material = Some(0);
        let materials = [ImportedMaterial {
            name: "mat".into(),
            diffuse: vec!["missing.png".into()],
            ..Default::default()
        }];
        let (result, gpu, cache) = assemble_with(&mesh, &materials, &dir, &LoadOptions::default());
        let mesh = result.unwrap();
        assert_eq!(mesh.textures().len(), 1);
        let entry = cache.get(mesh.textures()[0].id).unwrap();
        assert!(entry.placeholder);
        assert_eq!(gpu.textures, vec![(dir.join("missing.png").to_string_lossy().into_owned(), 1, 1)]);
    }

    #[test]
    fn undecodable_texture_aborts_in_strict_mode() {
        let dir = scratch_dir("assembler_abort");
        let mut mesh = triangle("tri");
        mesh.material = Some(0);
        let materials = [ImportedMaterial {
            name: "mat".into(),
            specular: vec!["missing_spec.png".into()],
            ..Default::default()
        }];
        let options = LoadOptions {
            on_texture_error: TextureFallback::Abort,
            ..Default::default()
        };
        let (result, gpu, _) = assemble_with(&mesh, &materials, &dir, &options);
        assert!(matches!(result, Err(LoadError::Texture { .. })));
        assert!(gpu.textures.is_empty());
    }
}
