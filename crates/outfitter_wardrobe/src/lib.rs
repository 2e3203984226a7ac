//! Avatar wardrobe: puts wearables (hats, shirts, eyes) on a rigged base model.
//!
//! A wearable load runs through four stages:
//!
//! 1. [`filter`]: drop body parts, placeholders and base-model duplicates that
//!    ship inside wearable files.
//! 2. [`normalize`]: re-root the kept meshes under a wrapper node without
//!    moving them in world space.
//! 3. [`attach`]: parent the wrapper to the head bone, body bone or model root
//!    and apply the calibrated offset.
//! 4. [`state`]: record the instance in its slot, replacing the previous one.
//!
//! [`edit`] and [`history`] provide interactive re-editing with undo/redo, and
//! [`Wardrobe`] drives everything asynchronously from an
//! [`AssetSource`](outfitter_assets::AssetSource).

pub mod attach;
pub mod catalog;
pub mod config;
pub mod edit;
pub mod errors;
pub mod filter;
pub mod history;
pub mod loading;
pub mod metadata;
pub mod normalize;
pub mod persistence;
pub mod state;
pub mod wardrobe;

pub use attach::{AttachContext, AttachResult, BoneResolver, NamedBoneResolver, SubstringBoneResolver};
pub use catalog::{Catalog, Category, Slot, encode_path};
pub use config::{
    CalibratedOffset, FilterConfig, FilterPolicy, FolderConfig, OffsetConfig, RandomizeConfig, ShirtAnchor,
    SlotOffsets, StaggerConfig, WardrobeConfig,
};
pub use edit::{
    DEFAULT_NUDGE, EditSession, Gizmo, GizmoMode, Key, KeyPress, NudgeDirection, RotationAxis, SelectableEntry,
    SelectionTarget,
};
pub use errors::{Result, WardrobeError};
pub use filter::{BodyReference, Rejection, filter_wearable_meshes, remove_placeholders, strip_skinning};
pub use history::{ChildState, DeletionRecord, History, NodeState, ObjectState, TransformSnapshot};
pub use loading::LoadingIndicator;
pub use metadata::{TokenMetadata, TraitAttribute, TraitSet};
pub use normalize::normalize_into_wrapper;
pub use persistence::{JsonFileStore, MemoryStore, PositionStore, SavedPositions};
pub use state::{AvatarState, BaseLoadTicket, BaseModel, LoadOutcome, LoadTicket, SlotTable, WearableInstance};
pub use wardrobe::{LoadReport, RandomizeOutcome, StateGuard, Wardrobe};
