//! The demo scene: ten spinning textured cubes, the loaded model, and markers
//! for every light, all lit by the Phong pipeline.

use std::path::PathBuf;

use cgmath::{Deg, InnerSpace, Rotation3, Vector3};
use instant::Duration;
use wgpu::util::DeviceExt;

use crate::{
    camera::Camera,
    config::DemoConfig,
    context::Context,
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::Model,
    },
    error::LoadError,
    pipelines::{
        light::{MarkerPass, MarkerRaw, mk_marker_pipeline},
        phong::{
            Attenuation, DirLightRaw, LightResources, LightsUniform, POINT_LIGHTS, Phong,
            PhongPass, PointLightRaw, SpotLightRaw, mk_phong_pipeline,
        },
    },
    resources::{
        LoadOptions,
        gpu::WgpuUpload,
        import::{ImportedMaterial, ImportedMesh, ImportedNode, ImportedScene},
    },
};

pub const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

pub const DIR_LIGHT_DIRECTION: [f32; 3] = [-0.2, -1.0, -0.3];

pub const POINT_LIGHT_POSITIONS: [[f32; 3]; POINT_LIGHTS] = [
    [0.7, 0.2, 2.0],
    [2.3, -3.3, -4.0],
    [-4.0, 2.0, -12.0],
    [0.0, 0.0, -3.0],
];

pub const POINT_LIGHT_COLOURS: [[f32; 3]; POINT_LIGHTS] = [
    [0.2, 0.2, 0.6],
    [0.3, 0.3, 0.7],
    [0.0, 0.0, 0.3],
    [0.4, 0.4, 0.4],
];

pub const CUBE_DIFFUSE: &str = "container2.png";
pub const CUBE_SPECULAR: &str = "container2_specular.png";
pub const CUBE_EMISSION: &str = "matrix.jpg";

const ATTENUATION: Attenuation = Attenuation {
    constant: 1.0,
    linear: 0.09,
    quadratic: 0.032,
};
const SHININESS: f32 = 32.0;
const CUBE_SPIN: f32 = 22.5;
/// Emission scroll per second for the first cube; cube `i` scrolls `i + 1` times as fast.
const EMISSION_SPEED: f32 = 0.1;
const MODEL_POSITION: [f32; 3] = [5.0, 5.0, 0.0];
const MODEL_TILT: f32 = 22.5;
const MARKER_SCALE: f32 = 0.2;

/// A unit cube centred on the origin: four vertices per face so every face
/// has its own normal and a full 0..1 texture square, counter-clockwise
/// from outside.
fn cube_mesh(name: &str, material: Option<usize>) -> ImportedMesh {
    // (normal, u axis, v axis) with u x v == normal
    const FACES: [[[f32; 3]; 3]; 6] = [
        [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]],
        [[-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
        [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
        [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        [[0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    ];
    const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut mesh = ImportedMesh {
        name: name.to_string(),
        material,
        ..Default::default()
    };
    for [normal, u, v] in FACES {
        let base = mesh.positions.len() as u32;
        for [s, t] in CORNERS {
            let position = std::array::from_fn(|axis| {
                0.5 * normal[axis] + (s - 0.5) * u[axis] + (t - 0.5) * v[axis]
            });
            mesh.positions.push(position);
            mesh.normals.push(normal);
            mesh.tex_coords.push([s, t]);
        }
        mesh.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

fn single_mesh_scene(mesh: ImportedMesh, materials: Vec<ImportedMaterial>) -> ImportedScene {
    ImportedScene {
        source: PathBuf::from(format!("<{}>", mesh.name)),
        root: Some(0),
        nodes: vec![ImportedNode {
            name: mesh.name.clone(),
            meshes: vec![0],
            children: vec![],
        }],
        meshes: vec![mesh],
        materials,
    }
}

/// The container cube, textured with the diffuse and specular container maps
/// and a scrolling emission map.
pub fn cube_scene() -> ImportedScene {
    let material = ImportedMaterial {
        name: "container".to_string(),
        diffuse: vec![CUBE_DIFFUSE.to_string()],
        specular: vec![CUBE_SPECULAR.to_string()],
        emission: vec![CUBE_EMISSION.to_string()],
    };
    single_mesh_scene(cube_mesh("cube", Some(0)), vec![material])
}

/// The same cube without a material, for light markers.
pub fn marker_scene() -> ImportedScene {
    single_mesh_scene(cube_mesh("marker", None), vec![])
}

/// Placement of every cube `seconds` into the demo.
pub fn cube_instances(seconds: f32) -> Vec<Instance> {
    CUBE_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let axis = Vector3::new(
                (i % 4) as f32 / 3.0,
                (i % 6) as f32 / 5.0,
                (i % 9) as f32 / 8.0,
            );
            let mut instance = Instance::from(Vector3::from(position));
            // A zero axis has no direction to spin around.
            if axis.magnitude2() > 0.0 {
                instance.rotation =
                    cgmath::Quaternion::from_axis_angle(axis.normalize(), Deg(CUBE_SPIN * seconds));
            }
            instance.emission_scroll = seconds * (i + 1) as f32 * EMISSION_SPEED;
            instance
        })
        .collect()
}

pub fn model_instance() -> Instance {
    Instance {
        position: MODEL_POSITION.into(),
        rotation: cgmath::Quaternion::from_axis_angle(
            Vector3::new(1.0, 1.0, 1.0).normalize(),
            Deg(MODEL_TILT),
        ),
        ..Default::default()
    }
}

/// White cubes on the point lights, a yellow one on the directional light.
pub fn light_markers() -> Vec<MarkerRaw> {
    POINT_LIGHT_POSITIONS
        .iter()
        .map(|&position| MarkerRaw::new(position, MARKER_SCALE, [1.0, 1.0, 1.0]))
        .chain(std::iter::once(MarkerRaw::new(
            DIR_LIGHT_DIRECTION,
            MARKER_SCALE,
            [1.0, 1.0, 0.0],
        )))
        .collect()
}

/// The fixed lights plus a flashlight aimed from `camera`.
pub fn scene_lights(camera: &Camera) -> LightsUniform {
    let dir = DirLightRaw::new(DIR_LIGHT_DIRECTION, Phong::grey(0.05, 0.4, 0.5));
    let points = std::array::from_fn(|i| {
        let colour = POINT_LIGHT_COLOURS[i];
        PointLightRaw::new(
            POINT_LIGHT_POSITIONS[i],
            Phong {
                ambient: colour.map(|c| 0.1 * c),
                diffuse: colour,
                specular: colour,
            },
            ATTENUATION,
        )
    });
    let mut spot = SpotLightRaw::new(
        Deg(12.5),
        Deg(14.0),
        Phong::grey(0.2, 0.5, 1.0),
        ATTENUATION,
    );
    spot.aim(camera.position.into(), camera.front().into());
    LightsUniform::new(dir, points, spot, SHININESS)
}

/// Loads a model, or logs why it could not be loaded.
fn load_or_log(what: &str, result: Result<Model, LoadError>) -> Option<Model> {
    match result {
        Ok(model) => Some(model),
        Err(e) => {
            log::error!("could not load {what}: {e}");
            None
        }
    }
}

/// GPU state of the demo scene.
#[derive(Debug)]
pub struct DemoScene {
    phong_pipeline: wgpu::RenderPipeline,
    marker_pipeline: wgpu::RenderPipeline,
    lights: LightResources,
    cube: Option<Model>,
    model: Option<Model>,
    marker: Model,
    cube_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    marker_buffer: wgpu::Buffer,
    marker_count: u32,
    elapsed: Duration,
}

impl DemoScene {
    pub fn new(ctx: &Context, config: &DemoConfig) -> anyhow::Result<Self> {
        let mut upload = WgpuUpload::new(&ctx.device, &ctx.queue);

        let model = load_or_log(
            &config.model_path.display().to_string(),
            Model::load_with(&config.model_path, &config.load, &mut upload),
        );
        let cube = load_or_log(
            "the container cube",
            Model::from_scene(
                &cube_scene(),
                config.assets_dir.clone(),
                &config.load,
                &mut upload,
            ),
        );
        let marker = Model::from_scene(
            &marker_scene(),
            config.assets_dir.clone(),
            &LoadOptions::default(),
            &mut upload,
        )?;

        let lights = LightResources::new(&ctx.device, scene_lights(&ctx.camera.camera));
        let phong_pipeline = mk_phong_pipeline(
            &ctx.device,
            &ctx.config,
            upload.layout(),
            &ctx.camera.bind_group_layout,
            &lights.bind_group_layout,
        );
        let marker_pipeline =
            mk_marker_pipeline(&ctx.device, &ctx.config, &ctx.camera.bind_group_layout);

        let cube_raw: Vec<InstanceRaw> = cube_instances(0.0).iter().map(Instance::to_raw).collect();
        let cube_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Instance Buffer"),
                contents: bytemuck::cast_slice(&cube_raw),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let model_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Instance Buffer"),
                contents: bytemuck::cast_slice(&[model_instance().to_raw()]),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let markers = light_markers();
        let marker_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Marker Instance Buffer"),
                contents: bytemuck::cast_slice(&markers),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(Self {
            phong_pipeline,
            marker_pipeline,
            lights,
            cube,
            model,
            marker,
            cube_buffer,
            model_buffer,
            marker_buffer,
            marker_count: markers.len() as u32,
            elapsed: Duration::ZERO,
        })
    }

    /// Spins the cubes, scrolls their emission and moves the flashlight with
    /// the camera.
    pub fn update(&mut self, ctx: &Context, dt: Duration) {
        self.elapsed += dt;
        let cube_raw: Vec<InstanceRaw> = cube_instances(self.elapsed.as_secs_f32())
            .iter()
            .map(Instance::to_raw)
            .collect();
        ctx.queue
            .write_buffer(&self.cube_buffer, 0, bytemuck::cast_slice(&cube_raw));

        let camera = &ctx.camera.camera;
        self.lights
            .uniform
            .spot
            .aim(camera.position.into(), camera.front().into());
        self.lights.write(&ctx.queue);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, ctx: &Context) {
        pass.set_pipeline(&self.phong_pipeline);
        pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
        pass.set_bind_group(2, &self.lights.bind_group, &[]);

        if let Some(cube) = &self.cube {
            pass.set_vertex_buffer(1, self.cube_buffer.slice(..));
            cube.draw(&mut PhongPass {
                pass: &mut *pass,
                instances: 0..CUBE_POSITIONS.len() as u32,
            });
        }
        if let Some(model) = &self.model {
            pass.set_vertex_buffer(1, self.model_buffer.slice(..));
            model.draw(&mut PhongPass {
                pass: &mut *pass,
                instances: 0..1,
            });
        }

        pass.set_pipeline(&self.marker_pipeline);
        pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
        pass.set_vertex_buffer(1, self.marker_buffer.slice(..));
        self.marker.draw(&mut MarkerPass {
            pass: &mut *pass,
            markers: 0..self.marker_count,
        });
    }
}
