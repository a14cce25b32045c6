//! Models, meshes and the vertex layout shared by every pipeline.

use std::path::{Path, PathBuf};

use crate::{
    data_structures::texture::Texture,
    error::LoadError,
    resources::{
        LoadOptions,
        gpu::{GpuMesh, GpuUpload},
        import::{self, ImportedScene},
        mesh::Assembler,
        scene,
        texture::{DecodedImage, TextureCache, TextureId},
    },
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// What a texture is sampled for in the lighting shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    /// Self-lit colour added on top of the lighting result.
    Emission,
}

impl TextureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "diffuse",
            TextureKind::Specular => "specular",
            TextureKind::Emission => "emission",
        }
    }

    /// Shader-facing name of the `slot`-th texture of this kind, counting from 1
    /// (`texture_diffuse1`, `texture_diffuse2`, `texture_specular1`, ...).
    pub fn uniform_name(self, slot: usize) -> String {
        format!("texture_{}{}", self.as_str(), slot)
    }

    /// Stand-in pixel for a texture that failed to load: magenta diffuse,
    /// black (no highlight) specular, black (no glow) emission.
    pub fn placeholder(self) -> DecodedImage {
        match self {
            TextureKind::Diffuse => DecodedImage::solid([255, 0, 255, 255]),
            TextureKind::Specular | TextureKind::Emission => DecodedImage::solid([0, 0, 0, 255]),
        }
    }
}

/// A mesh's reference into its model's texture cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureBinding {
    pub id: TextureId,
    pub kind: TextureKind,
    pub uniform: String,
}

/// A cached texture paired with the uniform it is bound to for one mesh.
#[derive(Debug)]
pub struct BoundTexture<'a, T> {
    pub uniform: &'a str,
    pub kind: TextureKind,
    pub texture: &'a T,
}

// Manual impls: deriving would require `T: Clone`/`T: Copy`.
impl<T> Clone for BoundTexture<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for BoundTexture<'_, T> {}

/// One drawable surface: a triangle list plus its texture bindings.
///
/// `buffers` is whatever the GPU collaborator returned for this mesh
/// ([`GpuMesh`] for wgpu). Meshes are built once during loading and never
/// change afterwards.
#[derive(Debug)]
pub struct Mesh<M = GpuMesh> {
    pub(crate) name: String,
    pub(crate) vertices: Vec<ModelVertex>,
    pub(crate) indices: Vec<u32>,
    pub(crate) textures: Vec<TextureBinding>,
    pub(crate) buffers: M,
}

impl<M> Mesh<M> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    /// Triangle list; every entry indexes [`vertices`](Self::vertices).
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[TextureBinding] {
        &self.textures
    }

    pub fn buffers(&self) -> &M {
        &self.buffers
    }
}

/// Receives one draw per mesh from [`Model::draw`].
pub trait DrawMesh<T, M> {
    fn draw_mesh(&mut self, mesh: &Mesh<M>, textures: &[BoundTexture<'_, T>]);
}

/// A loaded model: its meshes in scene traversal order and the textures they share.
#[derive(Debug)]
pub struct Model<T = Texture, M = GpuMesh> {
    meshes: Vec<Mesh<M>>,
    textures: TextureCache<T>,
    directory: PathBuf,
}

impl<T, M> Model<T, M> {
    /// Loads the scene file at `path` with default [`LoadOptions`].
    pub fn load<G>(path: impl AsRef<Path>, gpu: &mut G) -> Result<Self, LoadError>
    where
        G: GpuUpload<Texture = T, Mesh = M>,
    {
        Self::load_with(path, &LoadOptions::default(), gpu)
    }

    /// Imports `path` and assembles every mesh of its scene. Texture paths are
    /// resolved against the directory containing `path`.
    pub fn load_with<G>(
        path: impl AsRef<Path>,
        options: &LoadOptions,
        gpu: &mut G,
    ) -> Result<Self, LoadError>
    where
        G: GpuUpload<Texture = T, Mesh = M>,
    {
        let path = path.as_ref();
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let scene = import::import_file(path, &options.import)?;
        let model = Self::from_scene(&scene, directory, options, gpu)?;
        log::info!(
            "loaded {}: {} meshes, {} textures",
            path.display(),
            model.meshes.len(),
            model.textures.len()
        );
        Ok(model)
    }

    /// Runs the walk/assemble pipeline over an already imported scene.
    pub fn from_scene<G>(
        scene: &ImportedScene,
        directory: impl Into<PathBuf>,
        options: &LoadOptions,
        gpu: &mut G,
    ) -> Result<Self, LoadError>
    where
        G: GpuUpload<Texture = T, Mesh = M>,
    {
        let directory = directory.into();
        let mut textures = TextureCache::new();
        let meshes = {
            let mut assembler = Assembler::new(gpu, &mut textures, &directory, options);
            scene::walk(scene, &mut assembler)?
        };
        Ok(Self {
            meshes,
            textures,
            directory,
        })
    }

    pub fn meshes(&self) -> &[Mesh<M>] {
        &self.meshes
    }

    pub fn textures(&self) -> &TextureCache<T> {
        &self.textures
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Pairs each binding of `mesh` with its cached texture.
    pub fn bound_textures<'a>(&'a self, mesh: &'a Mesh<M>) -> Vec<BoundTexture<'a, T>> {
        mesh.textures
            .iter()
            .filter_map(|binding| {
                self.textures.get(binding.id).map(|entry| BoundTexture {
                    uniform: &binding.uniform,
                    kind: binding.kind,
                    texture: &entry.handle,
                })
            })
            .collect()
    }

    /// Issues one draw per mesh, in traversal order. Camera, transform and
    /// light state must already be set on `target`.
    pub fn draw<D>(&self, target: &mut D)
    where
        D: DrawMesh<T, M>,
    {
        for mesh in &self.meshes {
            let textures = self.bound_textures(mesh);
            target.draw_mesh(mesh, &textures);
        }
    }
}
