use std::path::{Path, PathBuf};

use lightbox::{
    TextureKind,
    data_structures::model::{BoundTexture, DrawMesh, Mesh, ModelVertex},
    resources::{gpu::GpuUpload, texture::DecodedImage},
};

/// One recorded texture upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUpload {
    pub label: String,
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
}

/// One recorded mesh upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshUpload {
    pub name: String,
    pub vertex_count: usize,
    pub index_count: usize,
    /// (uniform name, texture handle) in binding order.
    pub textures: Vec<(String, usize)>,
}

/// Stands in for the GPU: hands out sequential handles and remembers every
/// upload so tests can count them.
#[derive(Debug, Default)]
pub struct RecordingGpu {
    pub textures: Vec<TextureUpload>,
    pub meshes: Vec<MeshUpload>,
}

impl GpuUpload for RecordingGpu {
    type Texture = usize;
    type Mesh = usize;

    fn upload_texture(&mut self, image: &DecodedImage, kind: TextureKind, label: &str) -> usize {
        self.textures.push(TextureUpload {
            label: label.to_string(),
            kind,
            width: image.width(),
            height: image.height(),
        });
        self.textures.len() - 1
    }

    fn upload_mesh(
        &mut self,
        name: &str,
        vertices: &[ModelVertex],
        indices: &[u32],
        textures: &[BoundTexture<'_, usize>],
    ) -> usize {
        self.meshes.push(MeshUpload {
            name: name.to_string(),
            vertex_count: vertices.len(),
            index_count: indices.len(),
            textures: textures
                .iter()
                .map(|bound| (bound.uniform.to_string(), *bound.texture))
                .collect(),
        });
        self.meshes.len() - 1
    }
}

/// One draw issued through [`RecordingPass`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub mesh: String,
    pub buffers: usize,
    /// (uniform name, texture handle) as handed to the pass.
    pub textures: Vec<(String, usize)>,
}

/// Stands in for a render pass and records the draws a model issues.
#[derive(Debug, Default)]
pub struct RecordingPass {
    pub draws: Vec<DrawCall>,
}

impl DrawMesh<usize, usize> for RecordingPass {
    fn draw_mesh(&mut self, mesh: &Mesh<usize>, textures: &[BoundTexture<'_, usize>]) {
        self.draws.push(DrawCall {
            mesh: mesh.name().to_string(),
            buffers: *mesh.buffers(),
            textures: textures
                .iter()
                .map(|bound| (bound.uniform.to_string(), *bound.texture))
                .collect(),
        });
    }
}

/// Empty directory private to one test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("lightbox-it-{}", std::process::id()))
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

pub fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

pub fn write_rgb_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 128]))
        .save(&path)
        .expect("failed to write png");
    path
}

/// A grey + alpha PNG, which the loader has no GPU format for.
pub fn write_grey_alpha_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::GrayAlphaImage::from_pixel(2, 2, image::LumaA([90, 255]))
        .save(&path)
        .expect("failed to write png");
    path
}

/// Two objects sharing one material: a quad `Lid` and a triangle `Base`.
pub const CRATE_OBJ: &str = "\
mtllib crate.mtl
o Lid
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl crate
f 1/1/1 2/2/1 3/3/1 4/4/1
o Base
v 0 0 1
v 1 0 1
v 1 1 1
usemtl crate
f 5/1/1 6/2/1 7/3/1
";

pub fn crate_mtl(diffuse: &str, specular: &str) -> String {
    format!("newmtl crate\nKd 1 1 1\nmap_Kd {diffuse}\nmap_Ks {specular}\n")
}
