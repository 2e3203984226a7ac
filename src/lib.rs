#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub use outfitter_assets as assets;
pub use outfitter_scene as scene;
pub use outfitter_wardrobe as wardrobe;

pub use glam;

pub use assets::{AssetError, AssetServer, AssetSource, MemoryAssetSource};
pub use scene::{BoundingBox, Mesh, NodeHandle, Prefab, PrefabNode, Ray, Scene, Transform};
pub use wardrobe::{
    AttachResult, AvatarState, Catalog, GizmoMode, KeyPress, LoadOutcome, LoadReport, RandomizeOutcome,
    SelectionTarget, Slot, Wardrobe, WardrobeConfig, WardrobeError,
};

pub mod prelude {
    pub use crate::assets::{AssetServer, AssetSource, MemoryAssetSource};
    pub use crate::scene::{NodeHandle, Prefab, Ray, Scene};
    pub use crate::wardrobe::{
        BoneResolver, GizmoMode, Key, KeyPress, NudgeDirection, RotationAxis, SelectionTarget, Slot, Wardrobe,
        WardrobeConfig,
    };
    pub use glam::{Quat, Vec3};
}
