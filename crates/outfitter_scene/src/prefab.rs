use std::sync::Arc;

use crate::mesh::Mesh;
use crate::transform::Transform;

/// Prefab node: plain data, children referenced by index.
#[derive(Debug, Clone)]
pub struct PrefabNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Indices of the children in `Prefab::nodes`.
    pub children_indices: Vec<usize>,
    pub mesh: Option<Mesh>,
    /// Index of the skin in `Prefab::skeletons` driving this node's mesh.
    pub skin_index: Option<usize>,
}

impl PrefabNode {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            transform: Transform::new(),
            children_indices: Vec::new(),
            mesh: None,
            skin_index: None,
        }
    }

    #[must_use]
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), ..Self::new() }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[must_use]
    pub fn with_skin(mut self, skin_index: usize) -> Self {
        self.skin_index = Some(skin_index);
        self
    }
}

impl Default for PrefabNode {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct PrefabSkeleton {
    pub name: String,
    /// Index of the root bone within `bone_indices`.
    pub root_bone_index: usize,
    /// Bone nodes as indices into `Prefab::nodes`.
    pub bone_indices: Vec<usize>,
}

/// Intermediate, scene-independent description of an imported asset.
///
/// A prefab holds no [`NodeHandle`](crate::NodeHandle)s; [`Scene::instantiate`](crate::Scene::instantiate)
/// turns it into live nodes.
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    pub nodes: Vec<PrefabNode>,
    pub root_indices: Vec<usize>,
    pub skeletons: Vec<PrefabSkeleton>,
}

impl Prefab {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node without linking it anywhere.
    pub fn add_node(&mut self, node: PrefabNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Appends a node as a top-level node of the asset.
    pub fn add_root(&mut self, node: PrefabNode) -> usize {
        let index = self.add_node(node);
        self.root_indices.push(index);
        index
    }

    /// Appends a node as the last child of `parent`. Out-of-range parents leave it unlinked.
    pub fn add_child(&mut self, parent: usize, node: PrefabNode) -> usize {
        let index = self.add_node(node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children_indices.push(index);
        }
        index
    }

    pub fn add_skeleton(&mut self, name: &str, bone_indices: Vec<usize>) -> usize {
        self.skeletons.push(PrefabSkeleton {
            name: name.to_string(),
            root_bone_index: 0,
            bone_indices,
        });
        self.skeletons.len() - 1
    }
}

/// Thread-safe prefab reference.
pub type SharedPrefab = Arc<Prefab>;
