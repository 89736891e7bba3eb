//! Imported scene representation and its traversal.
//!
//! Importers translate OBJ or glTF files into a [`SourceScene`]: an
//! arena of nodes indexed by position, a mesh table and a material table.
//! [`traverse`] walks the node tree depth first and feeds every mesh it
//! reaches into a [`MeshBuilder`].

use log::warn;

use crate::resources::mesh::MeshBuilder;

/// Subtrees nested deeper than this are not visited.
pub const MAX_NODE_DEPTH: usize = 256;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceNode {
    pub name: String,
    /// Indices into [`SourceScene::meshes`].
    pub meshes: Vec<usize>,
    /// Indices into [`SourceScene::nodes`].
    pub children: Vec<usize>,
}

/// A triangulated mesh as delivered by an importer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    /// First UV channel only.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub faces: Vec<[u32; 3]>,
    pub material_index: u32,
}

/// Material metadata as found in the source file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMaterial {
    pub name: Option<String>,
    pub diffuse: Option<[f32; 3]>,
    pub opacity: Option<f32>,
    pub diffuse_texture: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceScene {
    pub nodes: Vec<SourceNode>,
    pub root: usize,
    pub meshes: Vec<SourceMesh>,
    pub materials: Vec<SourceMaterial>,
}

impl SourceScene {
    pub fn root_node(&self) -> Option<&SourceNode> {
        self.nodes.get(self.root)
    }

    /// Append a node and return its index.
    pub fn add_node(&mut self, node: SourceNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a mesh and return its index.
    pub fn add_mesh(&mut self, mesh: SourceMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }
}

/// Depth-first, pre-order walk from the root: a node's meshes are flattened
/// in declared order before its children are visited in declared order.
///
/// Nodes reached a second time (shared or cyclic references), nodes nested
/// deeper than [`MAX_NODE_DEPTH`] and dangling node/mesh indices are logged
/// and skipped. Returns the number of meshes handed to the builder.
pub fn traverse(scene: &SourceScene, builder: &mut MeshBuilder) -> usize {
    let mut visited = vec![false; scene.nodes.len()];
    let mut stack = vec![(scene.root, 0usize)];
    let mut flattened = 0;

    while let Some((node_idx, depth)) = stack.pop() {
        let Some(node) = scene.nodes.get(node_idx) else {
            warn!("Node index {node_idx} does not exist, skipping it.");
            continue;
        };
        if visited[node_idx] {
            warn!(
                "Node {node_idx} ({}) was already visited; the scene graph is not a tree.",
                node.name
            );
            continue;
        }
        if depth > MAX_NODE_DEPTH {
            warn!(
                "Node {node_idx} ({}) is nested deeper than {MAX_NODE_DEPTH} levels, skipping its subtree.",
                node.name
            );
            continue;
        }
        visited[node_idx] = true;

        for &mesh_idx in &node.meshes {
            match scene.meshes.get(mesh_idx) {
                Some(mesh) => match builder.flatten(mesh) {
                    Ok(()) => flattened += 1,
                    Err(e) => warn!("Mesh {mesh_idx} ({}) was dropped: {e}", mesh.name),
                },
                None => warn!(
                    "Node {node_idx} ({}) references missing mesh {mesh_idx}.",
                    node.name
                ),
            }
        }

        // reversed so the first child is popped first
        stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
    }

    flattened
}
