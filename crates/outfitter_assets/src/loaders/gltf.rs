//! glTF / GLB import.
//!
//! Only the scene structure is imported: node hierarchy, names, local TRS,
//! skins (as bone lists) and per-mesh summaries (topology, vertex count,
//! local bounds). Vertex data is never decoded, so external buffers and
//! images do not need to be present. POSITION accessor `min`/`max` and
//! `count` provide everything the wearable pipeline inspects.

use glam::{Quat, Vec3};
use gltf::mesh::Mode;
use outfitter_scene::{BoundingBox, Mesh, MeshTopology, Prefab, PrefabNode, PrefabSkeleton, Transform};
use rustc_hash::FxHashSet;

use crate::errors::{AssetError, Result};

pub struct GltfLoader;

impl GltfLoader {
    /// Parses a `.gltf` (JSON) or `.glb` (binary) document into a [`Prefab`].
    ///
    /// `label` is only used in log messages.
    pub fn load_from_slice(bytes: &[u8], label: &str) -> Result<Prefab> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        let scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .ok_or_else(|| AssetError::Gltf(format!("{label}: document has no scene")))?;

        // Prefab node i mirrors glTF node i.
        let mut prefab = Prefab::new();
        for node in gltf.nodes() {
            prefab.nodes.push(Self::convert_node(&node));
        }
        prefab.root_indices = scene.nodes().map(|n| n.index()).collect();
        prefab.skeletons = gltf.skins().map(|skin| Self::convert_skin(&skin)).collect();

        log::debug!(
            "Parsed glTF '{label}': {} nodes, {} roots, {} skins",
            prefab.nodes.len(),
            prefab.root_indices.len(),
            prefab.skeletons.len()
        );

        Ok(prefab)
    }

    fn convert_node(node: &gltf::Node) -> PrefabNode {
        let name = node
            .name()
            .or_else(|| node.mesh().and_then(|m| m.name()))
            .map_or_else(|| format!("Node_{}", node.index()), str::to_string);

        let (t, r, s) = node.transform().decomposed();
        let transform = Transform::from_trs(Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s));

        PrefabNode {
            name: Some(name),
            transform,
            children_indices: node.children().map(|c| c.index()).collect(),
            mesh: node.mesh().map(|m| Self::summarize_mesh(&m)),
            skin_index: node.skin().map(|skin| skin.index()),
        }
    }

    /// Collapses every primitive of a glTF mesh into a single [`Mesh`] summary.
    ///
    /// The mesh is a curve only if all of its primitives are line primitives.
    fn summarize_mesh(mesh: &gltf::Mesh) -> Mesh {
        let mut vertex_count = 0;
        let mut bounds = BoundingBox::EMPTY;
        let mut all_lines = true;
        let mut any_primitive = false;

        for primitive in mesh.primitives() {
            any_primitive = true;
            all_lines &= matches!(primitive.mode(), Mode::Lines | Mode::LineLoop | Mode::LineStrip);

            if let Some(positions) = primitive.get(&gltf::Semantic::Positions) {
                vertex_count += positions.count();
                if let (Some(min), Some(max)) = (positions.min(), positions.max())
                    && let (Some(min), Some(max)) = (json_vec3(&min), json_vec3(&max))
                {
                    bounds = bounds.union(&BoundingBox::new(min, max));
                }
            }
        }

        Mesh {
            topology: if any_primitive && all_lines { MeshTopology::Lines } else { MeshTopology::Triangles },
            vertex_count,
            bounds,
            shape: None,
            skin: None,
        }
    }

    fn convert_skin(skin: &gltf::Skin) -> PrefabSkeleton {
        let joints: Vec<gltf::Node> = skin.joints().collect();
        let joint_indices: FxHashSet<usize> = joints.iter().map(gltf::Node::index).collect();

        // Joints referenced as children of other joints are not roots.
        let child_joint_indices: FxHashSet<usize> = joints
            .iter()
            .flat_map(gltf::Node::children)
            .map(|child| child.index())
            .filter(|index| joint_indices.contains(index))
            .collect();

        let root_bone_index = skin
            .skeleton()
            .and_then(|root| joints.iter().position(|n| n.index() == root.index()))
            .or_else(|| joints.iter().position(|n| !child_joint_indices.contains(&n.index())))
            .unwrap_or(0);

        PrefabSkeleton {
            name: skin.name().unwrap_or("Skeleton").to_string(),
            root_bone_index,
            bone_indices: joints.iter().map(gltf::Node::index).collect(),
        }
    }
}

fn json_vec3(value: &gltf::json::Value) -> Option<Vec3> {
    let array = value.as_array()?;
    let component = |i: usize| array.get(i).and_then(gltf::json::Value::as_f64).map(|v| v as f32);
    Some(Vec3::new(component(0)?, component(1)?, component(2)?))
}
