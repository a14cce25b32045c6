use std::path::Path;

use crate::error::ImportError;

use super::{ImportOptions, ImportedMaterial, ImportedMesh, ImportedNode, ImportedScene};

/// Wavefront OBJ/MTL through `tobj`.
///
/// OBJ has no hierarchy, so the scene is a root node with one child per
/// object/group, each owning exactly one mesh. A missing or broken MTL file
/// is logged and the scene is imported without materials.
pub(super) fn import(path: &Path, options: &ImportOptions) -> Result<ImportedScene, ImportError> {
    let (models, obj_materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: options.triangulate,
            single_index: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        },
    )
    .map_err(|source| ImportError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = match obj_materials {
        Ok(materials) => materials.into_iter().map(to_material).collect(),
        Err(e) => {
            log::warn!(
                "materials of {} could not be loaded ({e}), importing without textures",
                path.display()
            );
            Vec::new()
        }
    };

    let root_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    let mut nodes = vec![ImportedNode {
        name: root_name,
        ..Default::default()
    }];
    let mut meshes = Vec::with_capacity(models.len());

    for model in models {
        let mesh_index = meshes.len();
        let node_index = nodes.len();
        nodes[0].children.push(node_index);
        nodes.push(ImportedNode {
            name: model.name.clone(),
            meshes: vec![mesh_index],
            children: Vec::new(),
        });
        meshes.push(to_mesh(model));
    }

    Ok(ImportedScene {
        source: path.to_path_buf(),
        root: Some(0),
        nodes,
        meshes,
        materials,
    })
}

fn to_mesh(model: tobj::Model) -> ImportedMesh {
    let m = model.mesh;
    ImportedMesh {
        name: model.name,
        positions: m
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect(),
        normals: m
            .normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect(),
        tex_coords: m.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect(),
        indices: m.indices,
        face_arities: m.face_arities,
        material: m.material_id,
    }
}

/// `map_Kd` and `map_Ks` map to diffuse and specular. tobj has no field for
/// the emissive `map_Ke`, so it is read from the unparsed parameters.
fn to_material(mut material: tobj::Material) -> ImportedMaterial {
    let emission = material.unknown_param.remove("map_Ke");
    ImportedMaterial {
        name: material.name,
        diffuse: material.diffuse_texture.into_iter().collect(),
        specular: material.specular_texture.into_iter().collect(),
        emission: emission.into_iter().collect(),
    }
}
