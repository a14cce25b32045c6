use std::path::PathBuf;

use lightbox::{
    ImportError, LoadError, LoadOptions, Model, TextureKind,
    resources::import::{ImportedMaterial, ImportedMesh, ImportedNode, ImportedScene},
};

use crate::common::test_utils::{
    CRATE_OBJ, DrawCall, RecordingGpu, RecordingPass, crate_mtl, scratch_dir, write_file,
    write_rgb_png,
};

mod common;

fn triangle(name: &str, material: Option<usize>) -> ImportedMesh {
    ImportedMesh {
        name: name.to_string(),
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        tex_coords: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        indices: vec![0, 1, 2],
        material,
        ..Default::default()
    }
}

fn node(name: &str, meshes: Vec<usize>, children: Vec<usize>) -> ImportedNode {
    ImportedNode {
        name: name.to_string(),
        meshes,
        children,
    }
}

#[test]
fn should_load_obj_with_shared_material() {
    let dir = scratch_dir("obj_shared_material");
    write_rgb_png(&dir, "wall.png", 8, 4);
    write_rgb_png(&dir, "wall_spec.png", 2, 2);
    write_file(&dir, "crate.mtl", crate_mtl("wall.png", "wall_spec.png"));
    let obj = write_file(&dir, "crate.obj", CRATE_OBJ);

    let mut gpu = RecordingGpu::default();
    let model: Model<usize, usize> = Model::load(&obj, &mut gpu).unwrap();

    let names: Vec<_> = model.meshes().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["Lid", "Base"]);
    assert_eq!(model.directory(), dir.as_path());

    // Both textures are decoded and uploaded once although two meshes use them.
    assert_eq!(model.textures().len(), 2);
    assert_eq!(gpu.textures.len(), 2);
    assert_eq!(gpu.textures[0].kind, TextureKind::Diffuse);
    assert_eq!((gpu.textures[0].width, gpu.textures[0].height), (8, 4));
    assert_eq!(gpu.textures[1].kind, TextureKind::Specular);
    assert_eq!(
        model.meshes()[0].textures(),
        model.meshes()[1].textures(),
        "meshes sharing a material share cache entries"
    );

    let uniforms: Vec<_> = gpu.meshes[0].textures.iter().map(|(u, _)| u.as_str()).collect();
    assert_eq!(uniforms, vec!["texture_diffuse1", "texture_specular1"]);
}

#[test]
fn should_produce_valid_triangle_lists() {
    let dir = scratch_dir("obj_triangle_lists");
    write_rgb_png(&dir, "wall.png", 1, 1);
    write_rgb_png(&dir, "wall_spec.png", 1, 1);
    write_file(&dir, "crate.mtl", crate_mtl("wall.png", "wall_spec.png"));
    let obj = write_file(&dir, "crate.obj", CRATE_OBJ);

    let mut gpu = RecordingGpu::default();
    let model: Model<usize, usize> = Model::load(&obj, &mut gpu).unwrap();

    let lid = &model.meshes()[0];
    assert_eq!(lid.vertices().len(), 4);
    assert_eq!(lid.indices().len(), 6, "the quad is split into two triangles");
    for mesh in model.meshes() {
        assert_eq!(mesh.indices().len() % 3, 0);
        assert!(
            mesh.indices()
                .iter()
                .all(|&i| (i as usize) < mesh.vertices().len())
        );
    }

    // OBJ texture coordinates start bottom-left; vertices carry them flipped.
    let origin = lid
        .vertices()
        .iter()
        .find(|v| v.position == [0.0, 0.0, 0.0])
        .unwrap();
    assert_eq!(origin.tex_coords, [0.0, 1.0]);
    assert_eq!(origin.normal, [0.0, 0.0, 1.0]);
}

#[test]
fn should_keep_original_uvs_without_flip() {
    let dir = scratch_dir("obj_no_flip");
    write_rgb_png(&dir, "wall.png", 1, 1);
    write_rgb_png(&dir, "wall_spec.png", 1, 1);
    write_file(&dir, "crate.mtl", crate_mtl("wall.png", "wall_spec.png"));
    let obj = write_file(&dir, "crate.obj", CRATE_OBJ);

    let mut options = LoadOptions::default();
    options.import.flip_uvs = false;
    let mut gpu = RecordingGpu::default();
    let model: Model<usize, usize> = Model::load_with(&obj, &options, &mut gpu).unwrap();
    let origin = model.meshes()[0]
        .vertices()
        .iter()
        .find(|v| v.position == [0.0, 0.0, 0.0])
        .unwrap();
    assert_eq!(origin.tex_coords, [0.0, 0.0]);
}

#[test]
fn should_bind_emission_after_diffuse_and_specular() {
    let dir = scratch_dir("obj_emission_map");
    for file in ["wall.png", "wall_spec.png", "glow.png"] {
        write_rgb_png(&dir, file, 2, 2);
    }
    let mtl = format!("{}map_Ke glow.png\n", crate_mtl("wall.png", "wall_spec.png"));
    write_file(&dir, "crate.mtl", mtl);
    let obj = write_file(&dir, "crate.obj", CRATE_OBJ);

    let mut gpu = RecordingGpu::default();
    let model: Model<usize, usize> = Model::load(&obj, &mut gpu).unwrap();

    let bindings: Vec<_> = model.meshes()[0]
        .textures()
        .iter()
        .map(|t| (t.uniform.as_str(), t.kind))
        .collect();
    assert_eq!(
        bindings,
        vec![
            ("texture_diffuse1", TextureKind::Diffuse),
            ("texture_specular1", TextureKind::Specular),
            ("texture_emission1", TextureKind::Emission),
        ]
    );
    assert_eq!(gpu.textures[2].kind, TextureKind::Emission);
    assert_eq!(gpu.textures[2].label, dir.join("glow.png").to_string_lossy());
}

#[test]
fn should_walk_nodes_depth_first() {
    let scene = ImportedScene {
        source: PathBuf::from("order"),
        root: Some(0),
        nodes: vec![
            node("root", vec![0, 1], vec![1, 2]),
            node("child0", vec![2], vec![]),
            node("child1", vec![3], vec![]),
        ],
        meshes: vec![
            triangle("root.m0", None),
            triangle("root.m1", None),
            triangle("child0.m0", None),
            triangle("child1.m0", None),
        ],
        materials: vec![],
    };

    let mut gpu = RecordingGpu::default();
    let model: Model<usize, usize> =
        Model::from_scene(&scene, ".", &LoadOptions::default(), &mut gpu).unwrap();
    let names: Vec<_> = model.meshes().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["root.m0", "root.m1", "child0.m0", "child1.m0"]);

    let uploaded: Vec<_> = gpu.meshes.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(uploaded, names, "meshes are uploaded in traversal order");
}

#[test]
fn should_number_texture_slots_per_kind() {
    let dir = scratch_dir("numbered_slots");
    for file in ["a.png", "b.png", "s.png"] {
        write_rgb_png(&dir, file, 2, 2);
    }
    let scene = ImportedScene {
        source: PathBuf::from("slots"),
        root: Some(0),
        nodes: vec![node("root", vec![0], vec![])],
        meshes: vec![triangle("layered", Some(0))],
        materials: vec![ImportedMaterial {
            name: "layered".to_string(),
            diffuse: vec!["a.png".to_string(), "b.png".to_string()],
            specular: vec!["s.png".to_string()],
            ..Default::default()
        }],
    };

    let mut gpu = RecordingGpu::default();
    let model: Model<usize, usize> =
        Model::from_scene(&scene, &dir, &LoadOptions::default(), &mut gpu).unwrap();
    let mesh = &model.meshes()[0];
    let bindings: Vec<_> = mesh
        .textures()
        .iter()
        .map(|t| (t.uniform.as_str(), t.kind))
        .collect();
    assert_eq!(
        bindings,
        vec![
            ("texture_diffuse1", TextureKind::Diffuse),
            ("texture_diffuse2", TextureKind::Diffuse),
            ("texture_specular1", TextureKind::Specular),
        ]
    );

    let bound = model.bound_textures(mesh);
    assert_eq!(bound.len(), 3);
    assert_eq!(*bound[1].texture, 1);
    assert_eq!(gpu.meshes[0].textures.len(), 3);
}

#[test]
fn should_draw_each_mesh_once_with_its_bindings() {
    let dir = scratch_dir("draw_order");
    for file in ["a.png", "b.png", "s.png"] {
        write_rgb_png(&dir, file, 2, 2);
    }
    let scene = ImportedScene {
        source: PathBuf::from("draw"),
        root: Some(0),
        nodes: vec![
            node("root", vec![0], vec![1]),
            node("child", vec![1], vec![]),
        ],
        meshes: vec![triangle("layered", Some(0)), triangle("plain", None)],
        materials: vec![ImportedMaterial {
            name: "layered".to_string(),
            diffuse: vec!["a.png".to_string(), "b.png".to_string()],
            specular: vec!["s.png".to_string()],
            ..Default::default()
        }],
    };

    let mut gpu = RecordingGpu::default();
    let model: Model<usize, usize> =
        Model::from_scene(&scene, &dir, &LoadOptions::default(), &mut gpu).unwrap();

    let mut pass = RecordingPass::default();
    model.draw(&mut pass);

    let handle = |uniform: &str| {
        let binding = model.meshes()[0]
            .textures()
            .iter()
            .find(|b| b.uniform == uniform)
            .unwrap();
        model.textures().get(binding.id).unwrap().handle
    };
    assert_eq!(
        pass.draws,
        vec![
            DrawCall {
                mesh: "layered".to_string(),
                buffers: 0,
                textures: vec![
                    ("texture_diffuse1".to_string(), handle("texture_diffuse1")),
                    ("texture_diffuse2".to_string(), handle("texture_diffuse2")),
                    ("texture_specular1".to_string(), handle("texture_specular1")),
                ],
            },
            DrawCall {
                mesh: "plain".to_string(),
                buffers: 1,
                textures: vec![],
            },
        ]
    );
    assert_eq!(
        pass.draws[0].textures,
        gpu.meshes[0].textures,
        "draws bind what was uploaded"
    );

    // Drawing leaves the model untouched, so the next frame looks the same.
    let mut next_frame = RecordingPass::default();
    model.draw(&mut next_frame);
    assert_eq!(next_frame.draws, pass.draws);
    assert_eq!(gpu.textures.len(), 3);
}

#[test]
fn should_reject_dangling_material_index() {
    let scene = ImportedScene {
        source: PathBuf::from("dangling"),
        root: Some(0),
        nodes: vec![node("root", vec![0], vec![])],
        meshes: vec![triangle("lid", Some(2))],
        materials: vec![],
    };

    let mut gpu = RecordingGpu::default();
    let result: Result<Model<usize, usize>, _> =
        Model::from_scene(&scene, ".", &LoadOptions::default(), &mut gpu);
    assert!(matches!(
        result,
        Err(LoadError::Import(ImportError::Malformed { .. }))
    ));
    assert!(gpu.meshes.is_empty());
}

#[test]
fn should_reject_missing_model_file() {
    let mut gpu = RecordingGpu::default();
    let result: Result<Model<usize, usize>, _> =
        Model::load("tests/fixtures/does_not_exist.obj", &mut gpu);
    assert!(matches!(
        result,
        Err(LoadError::Import(ImportError::Obj { .. }))
    ));
    assert!(gpu.meshes.is_empty());
}

#[test]
fn should_reject_unknown_format() {
    let mut gpu = RecordingGpu::default();
    let result: Result<Model<usize, usize>, _> = Model::load("scene.fbx", &mut gpu);
    assert!(matches!(
        result,
        Err(LoadError::Import(ImportError::UnsupportedFormat { .. }))
    ));
}

#[test]
fn should_reject_out_of_range_indices() {
    let mut broken = triangle("broken", None);
    broken.indices = vec![0, 1, 7];
    let scene = ImportedScene {
        source: PathBuf::from("broken"),
        root: Some(0),
        nodes: vec![node("root", vec![0], vec![])],
        meshes: vec![broken],
        materials: vec![],
    };

    let mut gpu = RecordingGpu::default();
    let result: Result<Model<usize, usize>, _> =
        Model::from_scene(&scene, ".", &LoadOptions::default(), &mut gpu);
    assert!(matches!(
        result,
        Err(LoadError::InvalidMesh { ref mesh, .. }) if mesh == "broken"
    ));
}

#[test]
fn should_reject_untriangulated_faces() {
    let dir = scratch_dir("obj_untriangulated");
    let obj = write_file(&dir, "quad.obj", "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");

    let mut options = LoadOptions::default();
    options.import.triangulate = false;
    let mut gpu = RecordingGpu::default();
    let result: Result<Model<usize, usize>, _> = Model::load_with(&obj, &options, &mut gpu);
    assert!(matches!(result, Err(LoadError::InvalidMesh { .. })));
}
