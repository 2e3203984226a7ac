//! Attachment resolver: finds the bone a wearable hangs from and parents it there.

use outfitter_scene::{NodeHandle, Scene};

use crate::catalog::Slot;
use crate::config::{OffsetConfig, ShirtAnchor};

/// Outcome of attaching a wearable wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachResult {
    Attached(NodeHandle),
    /// No suitable bone; parented to the base model root.
    AttachedToRoot,
    /// Nothing to attach to.
    Failed,
}

impl AttachResult {
    #[must_use]
    pub fn is_attached(self) -> bool {
        !matches!(self, AttachResult::Failed)
    }
}

/// Locates the head and body bones of a base model.
pub trait BoneResolver: Send + Sync {
    fn head_bone(&self, scene: &Scene, model_root: NodeHandle) -> Option<NodeHandle>;
    fn body_bone(&self, scene: &Scene, model_root: NodeHandle) -> Option<NodeHandle>;
}

/// Case-insensitive substring matching over the bones of the model.
///
/// Returns the first match in depth-first, child-order traversal.
#[derive(Debug, Clone)]
pub struct SubstringBoneResolver {
    pub head_patterns: Vec<String>,
    pub body_patterns: Vec<String>,
    /// Names containing any of these never count as body bones.
    pub body_exclusions: Vec<String>,
}

impl Default for SubstringBoneResolver {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            head_patterns: owned(&["head"]),
            body_patterns: owned(&["body", "torso", "spine", "chest", "root"]),
            body_exclusions: owned(&["head"]),
        }
    }
}

impl SubstringBoneResolver {
    fn first_bone(&self, scene: &Scene, model_root: NodeHandle, accept: impl Fn(&str) -> bool) -> Option<NodeHandle> {
        scene
            .traverse(model_root)
            .into_iter()
            .filter(|&h| scene.is_bone(h))
            .find(|&h| accept(&scene.name(h).to_lowercase()))
    }
}

impl BoneResolver for SubstringBoneResolver {
    fn head_bone(&self, scene: &Scene, model_root: NodeHandle) -> Option<NodeHandle> {
        self.first_bone(scene, model_root, |name| self.head_patterns.iter().any(|p| name.contains(p.as_str())))
    }

    fn body_bone(&self, scene: &Scene, model_root: NodeHandle) -> Option<NodeHandle> {
        self.first_bone(scene, model_root, |name| {
            self.body_patterns.iter().any(|p| name.contains(p.as_str()))
                && !self.body_exclusions.iter().any(|p| name.contains(p.as_str()))
        })
    }
}

/// Exact (case-insensitive) bone names, for rigs that follow a naming convention.
#[derive(Debug, Clone)]
pub struct NamedBoneResolver {
    pub head: String,
    pub body: String,
}

impl NamedBoneResolver {
    #[must_use]
    pub fn new(head: &str, body: &str) -> Self {
        Self {
            head: head.to_string(),
            body: body.to_string(),
        }
    }

    fn find(scene: &Scene, model_root: NodeHandle, name: &str) -> Option<NodeHandle> {
        scene
            .traverse(model_root)
            .into_iter()
            .find(|&h| scene.is_bone(h) && scene.name(h).eq_ignore_ascii_case(name))
    }
}

impl BoneResolver for NamedBoneResolver {
    fn head_bone(&self, scene: &Scene, model_root: NodeHandle) -> Option<NodeHandle> {
        Self::find(scene, model_root, &self.head)
    }

    fn body_bone(&self, scene: &Scene, model_root: NodeHandle) -> Option<NodeHandle> {
        Self::find(scene, model_root, &self.body)
    }
}

/// Everything the attach step needs besides the scene.
pub struct AttachContext<'a> {
    pub resolver: &'a dyn BoneResolver,
    pub offsets: &'a OffsetConfig,
    pub shirt_anchor: ShirtAnchor,
}

impl AttachContext<'_> {
    /// The node a slot's wrapper should hang from, or `None` for the model root.
    fn anchor(&self, scene: &Scene, slot: Slot, model_root: NodeHandle) -> Option<NodeHandle> {
        match slot {
            Slot::Hat | Slot::Eyes => self.resolver.head_bone(scene, model_root),
            Slot::Shirt => match self.shirt_anchor {
                ShirtAnchor::Root => None,
                ShirtAnchor::BodyBone => self.resolver.body_bone(scene, model_root),
            },
        }
    }

    /// Parents a freshly built wrapper onto the base model.
    ///
    /// Head slots go to the head bone with the calibrated offset, or to the
    /// root with a warning. Shirts go to the configured anchor and only take
    /// an offset if one is configured.
    pub fn attach(
        &self,
        scene: &mut Scene,
        wrapper: NodeHandle,
        slot: Slot,
        asset_name: &str,
        model_root: Option<NodeHandle>,
    ) -> AttachResult {
        let Some(model_root) = model_root.filter(|&root| scene.contains(root)) else {
            log::error!("Cannot attach {slot} '{asset_name}': no base model loaded");
            return AttachResult::Failed;
        };

        match self.anchor(scene, slot, model_root) {
            Some(bone) => {
                scene.attach(wrapper, bone);
                if let Some(offset) = self.offsets.resolve(slot, asset_name)
                    && let Some(node) = scene.get_node_mut(wrapper)
                {
                    offset.apply(&mut node.transform);
                }
                log::debug!("Attached {slot} '{asset_name}' to bone '{}'", scene.name(bone));
                AttachResult::Attached(bone)
            }
            None => {
                if slot.is_head_slot() {
                    log::warn!("No head bone found, attaching {slot} '{asset_name}' to root instead");
                } else if let Some(offset) = self.offsets.resolve(slot, asset_name)
                    && let Some(node) = scene.get_node_mut(wrapper)
                {
                    offset.apply(&mut node.transform);
                }
                scene.attach(wrapper, model_root);
                AttachResult::AttachedToRoot
            }
        }
    }

    /// Moves an existing wrapper onto a new base model, keeping its local pose.
    ///
    /// Head slots require a head bone on the new model; `Failed` tells the
    /// caller to discard the instance.
    pub fn reattach(&self, scene: &mut Scene, wrapper: NodeHandle, slot: Slot, model_root: NodeHandle) -> AttachResult {
        match self.anchor(scene, slot, model_root) {
            Some(bone) => {
                scene.attach(wrapper, bone);
                AttachResult::Attached(bone)
            }
            None if slot.is_head_slot() => AttachResult::Failed,
            None => {
                scene.attach(wrapper, model_root);
                AttachResult::AttachedToRoot
            }
        }
    }
}
