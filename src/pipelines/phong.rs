//! The lit pipeline: Phong shading with a directional light, four point lights
//! and a camera-mounted spot light.
//!
//! Bind groups: 0 is the mesh material (see
//! [`material_layout`](crate::resources::gpu::material_layout)),
//! 1 the camera and 2 the [`LightsUniform`].

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{BoundTexture, DrawMesh, Mesh, ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{mk_render_pipeline, uniform_layout},
    resources::gpu::GpuMesh,
};

pub const POINT_LIGHTS: usize = 4;

/// Ambient, diffuse and specular intensity of a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phong {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Phong {
    pub fn grey(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient: [ambient; 3],
            diffuse: [diffuse; 3],
            specular: [specular; 3],
        }
    }
}

/// Constant, linear and quadratic distance falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLightRaw {
    direction: [f32; 3],
    _pad0: f32,
    ambient: [f32; 3],
    _pad1: f32,
    diffuse: [f32; 3],
    _pad2: f32,
    specular: [f32; 3],
    _pad3: f32,
}

impl DirLightRaw {
    pub fn new(direction: [f32; 3], colour: Phong) -> Self {
        Self {
            direction,
            ambient: colour.ambient,
            diffuse: colour.diffuse,
            specular: colour.specular,
            ..Default::default()
        }
    }

    pub fn direction(&self) -> [f32; 3] {
        self.direction
    }
}

// vec3 + f32 pairs keep every member on a 16 byte boundary.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    position: [f32; 3],
    constant: f32,
    ambient: [f32; 3],
    linear: f32,
    diffuse: [f32; 3],
    quadratic: f32,
    specular: [f32; 3],
    _pad: f32,
}

impl PointLightRaw {
    pub fn new(position: [f32; 3], colour: Phong, attenuation: Attenuation) -> Self {
        Self {
            position,
            constant: attenuation.constant,
            ambient: colour.ambient,
            linear: attenuation.linear,
            diffuse: colour.diffuse,
            quadratic: attenuation.quadratic,
            specular: colour.specular,
            _pad: 0.0,
        }
    }

    pub fn position(&self) -> [f32; 3] {
        self.position
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    position: [f32; 3],
    /// Cosine of the inner cone angle.
    cut_off: f32,
    direction: [f32; 3],
    /// Cosine of the outer cone angle.
    outer_cut_off: f32,
    ambient: [f32; 3],
    constant: f32,
    diffuse: [f32; 3],
    linear: f32,
    specular: [f32; 3],
    quadratic: f32,
}

impl SpotLightRaw {
    pub fn new(
        cut_off: cgmath::Deg<f32>,
        outer_cut_off: cgmath::Deg<f32>,
        colour: Phong,
        attenuation: Attenuation,
    ) -> Self {
        Self {
            position: [0.0; 3],
            cut_off: cgmath::Rad::from(cut_off).0.cos(),
            direction: [0.0, 0.0, -1.0],
            outer_cut_off: cgmath::Rad::from(outer_cut_off).0.cos(),
            ambient: colour.ambient,
            constant: attenuation.constant,
            diffuse: colour.diffuse,
            linear: attenuation.linear,
            specular: colour.specular,
            quadratic: attenuation.quadratic,
        }
    }

    /// Moves the cone apex to `position`, pointing along `direction`.
    pub fn aim(&mut self, position: [f32; 3], direction: [f32; 3]) {
        self.position = position;
        self.direction = direction;
    }

    pub fn cut_offs(&self) -> (f32, f32) {
        (self.cut_off, self.outer_cut_off)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub dir: DirLightRaw,
    pub points: [PointLightRaw; POINT_LIGHTS],
    pub spot: SpotLightRaw,
    shininess: f32,
    _pad: [f32; 3],
}

impl LightsUniform {
    pub fn new(
        dir: DirLightRaw,
        points: [PointLightRaw; POINT_LIGHTS],
        spot: SpotLightRaw,
        shininess: f32,
    ) -> Self {
        Self {
            dir,
            points,
            spot,
            shininess,
            _pad: [0.0; 3],
        }
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }
}

/// The lights uniform buffer and its bind group.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightsUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightsUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = uniform_layout(device, "lights_bind_group_layout");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("lights_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_phong_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    material_layout: &wgpu::BindGroupLayout,
    camera_layout: &wgpu::BindGroupLayout,
    lights_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Phong Pipeline Layout"),
        bind_group_layouts: &[material_layout, camera_layout, lights_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Phong Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("phong.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Phong Pipeline",
        &layout,
        config.format,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}

/// Draws meshes through the Phong pipeline. The pipeline, the camera and
/// lights bind groups and the instance buffer (slot 1) must already be set.
pub struct PhongPass<'a, 'pass> {
    pub pass: &'a mut wgpu::RenderPass<'pass>,
    pub instances: Range<u32>,
}

impl DrawMesh<Texture, GpuMesh> for PhongPass<'_, '_> {
    fn draw_mesh(&mut self, mesh: &Mesh<GpuMesh>, _textures: &[BoundTexture<'_, Texture>]) {
        // The material bind group was built from the textures at upload time.
        let buffers = mesh.buffers();
        self.pass
            .set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.set_bind_group(0, &buffers.bind_group, &[]);
        self.pass
            .draw_indexed(0..buffers.num_elements, 0, self.instances.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<DirLightRaw>(), 64);
        assert_eq!(std::mem::size_of::<PointLightRaw>(), 64);
        assert_eq!(std::mem::size_of::<SpotLightRaw>(), 80);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 416);
    }

    #[test]
    fn spot_cut_offs_are_cosines() {
        let spot = SpotLightRaw::new(
            cgmath::Deg(12.5),
            cgmath::Deg(14.0),
            Phong::grey(0.2, 0.5, 1.0),
            Attenuation {
                constant: 1.0,
                linear: 0.09,
                quadratic: 0.032,
            },
        );
        let (inner, outer) = spot.cut_offs();
        assert!((inner - 12.5f32.to_radians().cos()).abs() < 1e-6);
        assert!(inner > outer);
    }
}
