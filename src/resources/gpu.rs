//! The GPU side of model loading.
//!
//! [`GpuUpload`] is the seam between the import pipeline and the graphics
//! API: the pipeline hands it decoded images and assembled meshes and stores
//! whatever handles it returns. [`WgpuUpload`] is the wgpu implementation.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        model::{BoundTexture, ModelVertex, TextureKind},
        texture::Texture,
    },
    resources::texture::DecodedImage,
};

pub trait GpuUpload {
    type Texture;
    type Mesh;

    /// Creates a sampled texture (repeat wrapping, linear mip-mapped
    /// filtering) from decoded pixels.
    fn upload_texture(&mut self, image: &DecodedImage, kind: TextureKind, label: &str)
    -> Self::Texture;

    /// Creates vertex/index buffers for a mesh and binds its textures.
    fn upload_mesh(
        &mut self,
        name: &str,
        vertices: &[ModelVertex],
        indices: &[u32],
        textures: &[BoundTexture<'_, Self::Texture>],
    ) -> Self::Mesh;
}

/// Vertex and index buffers of one mesh plus its material bind group.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub bind_group: wgpu::BindGroup,
}

/// Texture + sampler pairs: diffuse at bindings 0/1, specular at 2/3,
/// emission at 4/5.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            texture_entry(0),
            sampler_entry(1),
            texture_entry(2),
            sampler_entry(3),
            texture_entry(4),
            sampler_entry(5),
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// Uploads through a wgpu device/queue pair.
///
/// The shader has one slot per kind, so only the `texture_diffuse1`,
/// `texture_specular1` and `texture_emission1` bindings of a mesh are sampled.
/// A mesh without one of them gets a white diffuse, or a black specular or
/// emission texture.
pub struct WgpuUpload<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    default_diffuse: Texture,
    default_specular: Texture,
    default_emission: Texture,
}

impl<'a> WgpuUpload<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        let layout = material_layout(device);
        let default_diffuse = Texture::from_decoded(
            device,
            queue,
            &DecodedImage::solid([255, 255, 255, 255]),
            TextureKind::Diffuse,
            Some("default diffuse"),
        );
        let default_specular = Texture::from_decoded(
            device,
            queue,
            &DecodedImage::solid([0, 0, 0, 255]),
            TextureKind::Specular,
            Some("default specular"),
        );
        let default_emission = Texture::from_decoded(
            device,
            queue,
            &DecodedImage::solid([0, 0, 0, 255]),
            TextureKind::Emission,
            Some("default emission"),
        );
        Self {
            device,
            queue,
            layout,
            default_diffuse,
            default_specular,
            default_emission,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    fn first_of<'t>(
        textures: &[BoundTexture<'t, Texture>],
        kind: TextureKind,
    ) -> Option<&'t Texture> {
        let uniform = kind.uniform_name(1);
        textures
            .iter()
            .find(|bound| bound.kind == kind && bound.uniform == uniform)
            .map(|bound| bound.texture)
    }
}

impl GpuUpload for WgpuUpload<'_> {
    type Texture = Texture;
    type Mesh = GpuMesh;

    fn upload_texture(&mut self, image: &DecodedImage, kind: TextureKind, label: &str) -> Texture {
        Texture::from_decoded(self.device, self.queue, image, kind, Some(label))
    }

    fn upload_mesh(
        &mut self,
        name: &str,
        vertices: &[ModelVertex],
        indices: &[u32],
        textures: &[BoundTexture<'_, Texture>],
    ) -> GpuMesh {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", name)),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", name)),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let diffuse =
            Self::first_of(textures, TextureKind::Diffuse).unwrap_or(&self.default_diffuse);
        let specular =
            Self::first_of(textures, TextureKind::Specular).unwrap_or(&self.default_specular);
        let emission =
            Self::first_of(textures, TextureKind::Emission).unwrap_or(&self.default_emission);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&specular.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&emission.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&emission.sampler),
                },
            ],
            label: Some(&format!("{:?} Material Bind Group", name)),
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            bind_group,
        }
    }
}
