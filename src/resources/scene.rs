use crate::{
    data_structures::model::Mesh,
    error::{ImportError, LoadError},
    resources::{gpu::GpuUpload, import::ImportedScene, mesh::Assembler},
};

/// Flattens `scene` into meshes, depth-first and pre-order: a node's own
/// meshes in its mesh order come before any of its children, and children
/// are visited in their given order.
///
/// The node graph is assumed to be acyclic.
pub fn walk<G: GpuUpload>(
    scene: &ImportedScene,
    assembler: &mut Assembler<'_, G>,
) -> Result<Vec<Mesh<G::Mesh>>, LoadError> {
    let root = scene.validate()?;
    let malformed = |reason: String| ImportError::Malformed {
        path: scene.source.clone(),
        reason,
    };

    let mut meshes = Vec::with_capacity(scene.meshes.len());
    let mut stack = vec![root];
    while let Some(node_index) = stack.pop() {
        let node = scene
            .nodes
            .get(node_index)
            .ok_or_else(|| malformed(format!("node {node_index} does not exist")))?;
        log::trace!("visiting node {:?}", node.name);

        for &mesh_index in &node.meshes {
            let imported = scene.meshes.get(mesh_index).ok_or_else(|| {
                malformed(format!(
                    "node {:?} references missing mesh {mesh_index}",
                    node.name
                ))
            })?;
            meshes.push(assembler.assemble(imported, &scene.materials)?);
        }
        // Reversed so the first child is popped first.
        stack.extend(node.children.iter().rev().copied());
    }
    Ok(meshes)
}
