use std::ops::Range;

use crate::{
    data_structures::{
        model::{BoundTexture, DrawMesh, Mesh, ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::mk_render_pipeline,
    resources::gpu::GpuMesh,
};

/// Placement and flat colour of one light marker.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerRaw {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl MarkerRaw {
    /// A cube of edge `scale` centred on `position`.
    pub fn new(position: [f32; 3], scale: f32, color: [f32; 3]) -> Self {
        let model = cgmath::Matrix4::from_translation(position.into())
            * cgmath::Matrix4::from_scale(scale);
        Self {
            model: model.into(),
            color: [color[0], color[1], color[2], 1.0],
        }
    }

    pub fn color(&self) -> [f32; 3] {
        [self.color[0], self.color[1], self.color[2]]
    }

    pub fn translation(&self) -> [f32; 3] {
        [self.model[3][0], self.model[3][1], self.model[3][2]]
    }
}

impl Vertex for MarkerRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MarkerRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

pub fn mk_marker_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Marker Pipeline Layout"),
        bind_group_layouts: &[camera_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Marker Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("marker.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Marker Pipeline",
        &layout,
        config.format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), MarkerRaw::desc()],
        shader,
    )
}

/// Draws mesh geometry as flat-coloured markers, ignoring materials. The
/// marker pipeline, camera bind group and marker buffer (slot 1) must already
/// be set.
pub struct MarkerPass<'a, 'pass> {
    pub pass: &'a mut wgpu::RenderPass<'pass>,
    pub markers: Range<u32>,
}

impl DrawMesh<Texture, GpuMesh> for MarkerPass<'_, '_> {
    fn draw_mesh(&mut self, mesh: &Mesh<GpuMesh>, _textures: &[BoundTexture<'_, Texture>]) {
        let buffers = mesh.buffers();
        self.pass
            .set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass
            .draw_indexed(0..buffers.num_elements, 0, self.markers.clone());
    }
}
