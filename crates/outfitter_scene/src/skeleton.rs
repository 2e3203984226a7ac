use crate::NodeHandle;

/// A named set of bone nodes.
///
/// Every node listed in `bones` is tagged as a bone on the owning scene.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    pub bones: Vec<NodeHandle>,
    pub(crate) root_bone_index: usize,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str, bones: Vec<NodeHandle>, root_bone_index: usize) -> Self {
        Self {
            name: name.to_string(),
            bones,
            root_bone_index,
        }
    }

    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }
}
