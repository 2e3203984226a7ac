//! Hierarchical scene graph used by the Outfitter avatar builder.
//!
//! Nodes live in a [`slotmap::SlotMap`] and are addressed by [`NodeHandle`].
//! Names, mesh components and bone tags are stored in secondary maps on the
//! [`Scene`] so that the node itself stays a plain transform + hierarchy record.

pub mod bounds;
pub mod mesh;
pub mod node;
pub mod prefab;
pub mod ray;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;
pub mod wrapper;

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a node in the [`Scene`].
    pub struct NodeHandle;
    /// Handle of a skeleton registered on the [`Scene`].
    pub struct SkeletonKey;
}

pub use bounds::BoundingBox;
pub use mesh::{Mesh, MeshTopology, PrimitiveShape};
pub use node::Node;
pub use prefab::{Prefab, PrefabNode, PrefabSkeleton, SharedPrefab};
pub use ray::Ray;
pub use scene::Scene;
pub use skeleton::Skeleton;
pub use transform::Transform;
pub use wrapper::SceneNode;
