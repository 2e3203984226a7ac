//! Import filter: decides which meshes of a freshly imported wearable asset
//! are kept.
//!
//! Wearable files are authored on top of a copy of the character, so they
//! routinely ship body parts, eyes, teeth and modelling placeholders next to
//! the actual garment. Those are dropped by name, by shape and, for the rich
//! policy, by matching them against the meshes of the live base model.

use glam::Vec3;
use outfitter_scene::{NodeHandle, PrimitiveShape, Scene};
use rustc_hash::FxHashMap;

use crate::config::FilterPolicy;

/// Excluded by both policies.
const BODY_PART_NAMES: &[&str] = &["body", "eye", "teeth", "tongue", "nose", "whisker"];

/// Additional head parts excluded by the rich policy.
const HEAD_PART_NAMES: &[&str] = &["tooth", "head", "mouth", "jaw", "snout", "muzzle"];

/// Authoring leftovers excluded by the rich policy.
const PLACEHOLDER_NAMES: &[&str] = &["cone", "geo", "sphere", "placeholder", "temp"];

/// An "eye" match is ignored when the name also contains one of these (rich policy).
const EYE_EXCEPTIONS: &[&str] = &["ear", "bunny"];

const VERTEX_COUNT_TOLERANCE: usize = 10;
const SIZE_TOLERANCE: f32 = 0.01;

/// Why a mesh was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BodyPart,
    Placeholder,
    PrimitiveShape,
    BaseModelDuplicate,
}

/// Vertex count and world-space size of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshSignature {
    pub vertex_count: usize,
    pub size: Vec3,
}

impl MeshSignature {
    fn matches(&self, other: &MeshSignature) -> bool {
        self.vertex_count.abs_diff(other.vertex_count) < VERTEX_COUNT_TOLERANCE
            && (self.size - other.size).abs().max_element() < SIZE_TOLERANCE
    }
}

/// Signatures of the base model's named meshes, for duplicate detection.
#[derive(Debug, Clone, Default)]
pub struct BodyReference {
    meshes: FxHashMap<String, Vec<MeshSignature>>,
}

impl BodyReference {
    #[must_use]
    pub fn from_model(scene: &Scene, model_root: NodeHandle) -> Self {
        let mut meshes: FxHashMap<String, Vec<MeshSignature>> = FxHashMap::default();
        for handle in scene.traverse(model_root) {
            if let Some(signature) = signature(scene, handle) {
                let name = scene.name(handle);
                if !name.is_empty() {
                    meshes.entry(name.to_string()).or_default().push(signature);
                }
            }
        }
        Self { meshes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Same name, vertex count within 10 and size within 0.01 on every axis.
    #[must_use]
    pub fn matches(&self, name: &str, candidate: &MeshSignature) -> bool {
        self.meshes
            .get(name)
            .is_some_and(|signatures| signatures.iter().any(|s| s.matches(candidate)))
    }
}

fn signature(scene: &Scene, handle: NodeHandle) -> Option<MeshSignature> {
    let mesh = scene.get_mesh(handle)?;
    let size = mesh.bounds.transform(&scene.world_matrix(handle)).size();
    Some(MeshSignature {
        vertex_count: mesh.vertex_count,
        size,
    })
}

/// Destroys every node under `asset_root` whose name contains `placeholder`
/// (case-insensitive). Returns how many were removed.
pub fn remove_placeholders(scene: &mut Scene, asset_root: NodeHandle) -> usize {
    let doomed: Vec<NodeHandle> = scene
        .traverse(asset_root)
        .into_iter()
        .filter(|&h| h != asset_root && scene.name(h).to_lowercase().contains("placeholder"))
        .collect();

    let mut removed = 0;
    for handle in doomed {
        // An earlier removal may already have taken this node with its parent.
        if scene.contains(handle) {
            scene.remove_node(handle);
            removed += 1;
        }
    }
    if removed > 0 {
        log::debug!("Removed {removed} placeholder node(s)");
    }
    removed
}

/// Returns the meshes and curves under `asset_root` to keep, in traversal order.
///
/// Curves are always kept. `body` is only consulted by the rich policy.
#[must_use]
pub fn filter_wearable_meshes(
    scene: &Scene,
    asset_root: NodeHandle,
    policy: FilterPolicy,
    body: Option<&BodyReference>,
) -> Vec<NodeHandle> {
    let mut kept = Vec::new();

    for handle in scene.traverse(asset_root) {
        let Some(mesh) = scene.get_mesh(handle) else {
            continue;
        };
        if mesh.is_curve() {
            kept.push(handle);
            continue;
        }

        match rejection(scene, handle, policy, body) {
            Some(reason) => log::debug!("Filtered out '{}': {reason:?}", scene.name(handle)),
            None => kept.push(handle),
        }
    }

    kept
}

/// Reason a mesh would be excluded under `policy`, if any.
#[must_use]
pub fn rejection(
    scene: &Scene,
    handle: NodeHandle,
    policy: FilterPolicy,
    body: Option<&BodyReference>,
) -> Option<Rejection> {
    let name = scene.name(handle).to_lowercase();

    match policy {
        FilterPolicy::Simple => {
            if contains_any(&name, BODY_PART_NAMES) {
                return Some(Rejection::BodyPart);
            }
        }
        FilterPolicy::Rich => {
            if contains_any(&name, PLACEHOLDER_NAMES) {
                return Some(Rejection::Placeholder);
            }
            let eye_part = name.contains("eye") && !contains_any(&name, EYE_EXCEPTIONS);
            let other_part = BODY_PART_NAMES
                .iter()
                .filter(|&&part| part != "eye")
                .chain(HEAD_PART_NAMES)
                .any(|part| name.contains(part));
            if eye_part || other_part {
                return Some(Rejection::BodyPart);
            }

            let mesh = scene.get_mesh(handle)?;
            if matches!(mesh.shape, Some(PrimitiveShape::Cone | PrimitiveShape::Sphere)) {
                return Some(Rejection::PrimitiveShape);
            }

            if let Some(body) = body
                && let Some(signature) = signature(scene, handle)
                && body.matches(scene.name(handle), &signature)
            {
                return Some(Rejection::BaseModelDuplicate);
            }
        }
    }

    None
}

fn contains_any(name: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| name.contains(needle))
}

/// Drops skin bindings so the meshes render rigidly.
pub fn strip_skinning(scene: &mut Scene, meshes: &[NodeHandle]) {
    for &handle in meshes {
        if let Some(mesh) = scene.get_mesh_mut(handle)
            && mesh.skin.take().is_some()
        {
            log::debug!("Stripped skinning from '{}'", scene.name(handle));
        }
    }
}
