use glam::{Affine3A, Quat, Vec3};
use slotmap::{SecondaryMap, SlotMap, SparseSecondaryMap};

use crate::bounds::BoundingBox;
use crate::mesh::Mesh;
use crate::node::Node;
use crate::prefab::Prefab;
use crate::ray::Ray;
use crate::skeleton::Skeleton;
use crate::transform_system;
use crate::wrapper::SceneNode;
use crate::{NodeHandle, SkeletonKey};

/// Scene graph
///
/// Owns every node plus the per-node components. A node is either *attached*
/// (it has a parent or is listed in `root_nodes`) or *detached*: alive in the
/// slot map but unreachable from any root. Detached subtrees are used as
/// staging areas while importing assets and to keep deleted objects around
/// for undo.
#[derive(Debug, Default)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // Components
    pub names: SecondaryMap<NodeHandle, String>,
    pub meshes: SparseSecondaryMap<NodeHandle, Mesh>,
    pub skeletons: SlotMap<SkeletonKey, Skeleton>,
    /// Bone tag: which skeleton a node belongs to.
    pub bones: SparseSecondaryMap<NodeHandle, SkeletonKey>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Node creation
    // ========================================================================

    /// Creates a detached node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.nodes.insert(Node::new())
    }

    /// Creates a detached, named node.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node();
        self.set_name(handle, name);
        handle
    }

    /// Chainable wrapper around a node.
    pub fn node(&mut self, handle: NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, handle)
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    /// Node name, or `""` for unnamed or missing nodes.
    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> &str {
        self.names.get(handle).map_or("", String::as_str)
    }

    pub fn set_mesh(&mut self, handle: NodeHandle, mesh: Mesh) {
        if self.nodes.contains_key(handle) {
            self.meshes.insert(handle, mesh);
        }
    }

    #[must_use]
    pub fn get_mesh(&self, handle: NodeHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    pub fn get_mesh_mut(&mut self, handle: NodeHandle) -> Option<&mut Mesh> {
        self.meshes.get_mut(handle)
    }

    /// Registers a skeleton and tags each of its bones.
    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        let bones = skeleton.bones.clone();
        let key = self.skeletons.insert(skeleton);
        for bone in bones {
            if self.nodes.contains_key(bone) {
                self.bones.insert(bone, key);
            }
        }
        key
    }

    #[inline]
    #[must_use]
    pub fn is_bone(&self, handle: NodeHandle) -> bool {
        self.bones.contains_key(handle)
    }

    // ========================================================================
    // Hierarchy queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn parent_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children_of(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    /// Position of `child` in `parent`'s child list.
    #[must_use]
    pub fn child_index(&self, parent: NodeHandle, child: NodeHandle) -> Option<usize> {
        self.children_of(parent).iter().position(|&c| c == child)
    }

    /// Whether the node has a parent or is a top-level node.
    #[must_use]
    pub fn is_attached(&self, handle: NodeHandle) -> bool {
        match self.nodes.get(handle) {
            Some(node) => node.parent.is_some() || self.root_nodes.contains(&handle),
            None => false,
        }
    }

    /// Whether the node is reachable from one of the top-level nodes.
    #[must_use]
    pub fn is_in_hierarchy(&self, handle: NodeHandle) -> bool {
        let mut current = handle;
        loop {
            let Some(node) = self.nodes.get(current) else {
                return false;
            };
            match node.parent {
                Some(parent) => current = parent,
                None => return self.root_nodes.contains(&current),
            }
        }
    }

    /// Whether `ancestor` is `handle` or one of its ancestors.
    #[must_use]
    pub fn is_self_or_descendant_of(&self, handle: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent_of(node);
        }
        false
    }

    /// Depth-first, pre-order walk of the subtree rooted at `root` (root included).
    ///
    /// Children are visited in their stored order, so the result is stable.
    #[must_use]
    pub fn traverse(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }

        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            out.push(handle);
            for &child in self.children_of(handle).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// First node in traversal order under `root` whose name equals `name`.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.traverse(root).into_iter().find(|&h| self.name(h) == name)
    }

    // ========================================================================
    // Hierarchy mutation
    // ========================================================================

    /// Re-parents `child` under `parent`, appending it as the last child.
    ///
    /// The child keeps its local transform, so its world pose generally changes.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        let len = self.children_of(parent).len();
        self.insert_child_at(child, parent, len);
    }

    /// Re-parents `child` under `parent` at `index`, appending when the index is out of range.
    ///
    /// Returns the index the child ended up at, or `None` if the operation was rejected.
    pub fn insert_child_at(&mut self, child: NodeHandle, parent: NodeHandle, index: usize) -> Option<usize> {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return None;
        }
        if !self.contains(child) || !self.contains(parent) {
            log::error!("Node not found during attach!");
            return None;
        }
        if self.is_self_or_descendant_of(parent, child) {
            log::warn!("Cannot attach node to one of its descendants!");
            return None;
        }

        self.detach(child);

        let parent_node = self.nodes.get_mut(parent)?;
        let at = index.min(parent_node.children.len());
        parent_node.children.insert(at, child);

        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
        Some(at)
    }

    /// Makes `child` a top-level node.
    pub fn add_root(&mut self, child: NodeHandle) {
        if !self.contains(child) {
            return;
        }
        self.detach(child);
        self.root_nodes.push(child);
        if let Some(c) = self.nodes.get_mut(child) {
            c.transform.mark_dirty();
        }
    }

    /// Unlinks a node from its parent (or the top-level list) without destroying it.
    ///
    /// Returns the previous parent and the index the node had there.
    pub fn detach(&mut self, child: NodeHandle) -> Option<(Option<NodeHandle>, usize)> {
        let old_parent = self.nodes.get(child)?.parent;

        let removed_at = if let Some(p) = old_parent {
            let index = self.nodes.get_mut(p).and_then(|n| {
                let i = n.children.iter().position(|&x| x == child)?;
                n.children.remove(i);
                Some(i)
            });
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = None;
                c.transform.mark_dirty();
            }
            index
        } else {
            let index = self.root_nodes.iter().position(|&x| x == child)?;
            self.root_nodes.remove(index);
            Some(index)
        };

        removed_at.map(|i| (old_parent, i))
    }

    /// Destroys a node and its whole subtree, including components.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.contains(handle) {
            return;
        }
        self.detach(handle);

        for node in self.traverse(handle) {
            self.names.remove(node);
            self.meshes.remove(node);
            self.bones.remove(node);
            self.nodes.remove(node);
        }

        self.skeletons
            .retain(|_, skeleton| skeleton.root_bone().is_some_and(|bone| self.nodes.contains_key(bone)));
    }

    // ========================================================================
    // World transforms
    // ========================================================================

    /// World matrix computed from the current local TRS of the ancestor chain.
    ///
    /// Always up to date, independent of the cached matrices.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Affine3A {
        let mut matrix = Affine3A::IDENTITY;
        let mut current = Some(handle);
        while let Some(h) = current {
            let Some(node) = self.nodes.get(h) else {
                break;
            };
            matrix = node.transform.to_affine() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// World (scale, rotation, translation) of a node.
    #[must_use]
    pub fn world_pose(&self, handle: NodeHandle) -> Option<(Vec3, Quat, Vec3)> {
        if !self.contains(handle) {
            return None;
        }
        Some(self.world_matrix(handle).to_scale_rotation_translation())
    }

    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Vec3 {
        Vec3::from(self.world_matrix(handle).translation)
    }

    /// Union of the world-space mesh bounds in the subtree rooted at `root`.
    #[must_use]
    pub fn world_bounds(&self, root: NodeHandle) -> BoundingBox {
        self.traverse(root)
            .into_iter()
            .filter_map(|h| self.meshes.get(h).map(|mesh| mesh.bounds.transform(&self.world_matrix(h))))
            .fold(BoundingBox::EMPTY, |acc, b| acc.union(&b))
    }

    /// Refreshes cached world matrices for everything reachable from the top-level nodes.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }

    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }

    // ========================================================================
    // Picking
    // ========================================================================

    /// Closest mesh among `candidates` hit by `ray`, with the hit distance.
    ///
    /// Candidates without a mesh are skipped.
    #[must_use]
    pub fn raycast(&self, ray: &Ray, candidates: &[NodeHandle]) -> Option<(NodeHandle, f32)> {
        candidates
            .iter()
            .filter_map(|&h| {
                let mesh = self.meshes.get(h)?;
                let distance = ray.intersect_box_transformed(&mesh.bounds, &self.world_matrix(h))?;
                Some((h, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    // ========================================================================
    // Instantiation
    // ========================================================================

    /// Instantiates a prefab as a detached subtree and returns its group node.
    ///
    /// The group has an identity transform; the prefab's top-level nodes become
    /// its children. Only nodes reachable from `root_indices` are created.
    pub fn instantiate(&mut self, prefab: &Prefab) -> NodeHandle {
        let group = self.create_node();
        let mut handles: Vec<Option<NodeHandle>> = vec![None; prefab.nodes.len()];

        // (prefab index, parent handle)
        let mut stack: Vec<(usize, NodeHandle)> = prefab.root_indices.iter().rev().map(|&i| (i, group)).collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(prefab_node) = prefab.nodes.get(index) else {
                log::warn!("Prefab node index {index} out of range");
                continue;
            };
            if handles[index].is_some() {
                log::warn!("Prefab node {index} referenced twice, skipping");
                continue;
            }

            let handle = self.create_node();
            if let Some(node) = self.nodes.get_mut(handle) {
                node.transform = prefab_node.transform.clone();
                node.transform.mark_dirty();
            }
            if let Some(name) = &prefab_node.name {
                self.set_name(handle, name);
            }
            if let Some(mesh) = &prefab_node.mesh {
                self.set_mesh(handle, mesh.clone());
            }
            self.attach(handle, parent);
            handles[index] = Some(handle);

            for &child in prefab_node.children_indices.iter().rev() {
                stack.push((child, handle));
            }
        }

        for (skin_index, prefab_skeleton) in prefab.skeletons.iter().enumerate() {
            let bones: Vec<NodeHandle> = prefab_skeleton
                .bone_indices
                .iter()
                .filter_map(|&i| handles.get(i).copied().flatten())
                .collect();
            if bones.is_empty() {
                continue;
            }
            let root = prefab_skeleton.root_bone_index.min(bones.len() - 1);
            let key = self.add_skeleton(Skeleton::new(&prefab_skeleton.name, bones, root));

            for (index, prefab_node) in prefab.nodes.iter().enumerate() {
                if prefab_node.skin_index == Some(skin_index)
                    && let Some(handle) = handles[index]
                    && let Some(mesh) = self.meshes.get_mut(handle)
                {
                    mesh.skin = Some(key);
                }
            }
        }

        group
    }
}
