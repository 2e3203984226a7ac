//! Wardrobe configuration.
//!
//! Every field has a default matching the shipped avatar builder, so a config
//! file only needs to list what it changes:
//!
//! ```json
//! { "history_limit": 20, "shirt_anchor": "body_bone" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use glam::{EulerRot, Quat, Vec3};
use outfitter_scene::Transform;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Category, Slot, encode_path};
use crate::errors::Result;

// ============================================================================
// Calibrated offsets
// ============================================================================

/// Local transform forced onto a wearable wrapper after it is attached to a bone.
///
/// `rotation` (XYZ Euler) and `quaternion` describe the same orientation; the
/// quaternion is what gets applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedOffset {
    pub position: Vec3,
    pub rotation: Vec3,
    pub quaternion: Quat,
    pub scale: Vec3,
}

impl CalibratedOffset {
    #[must_use]
    pub fn from_euler(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            quaternion: Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
            scale: Vec3::ONE,
        }
    }

    /// Offset calibrated for the collection's head bone.
    #[must_use]
    pub fn head() -> Self {
        Self {
            position: Vec3::new(-0.607_745, 0.0, 0.005_627),
            rotation: Vec3::new(0.0, -0.0, -1.570_796),
            quaternion: Quat::from_xyzw(0.0, -0.0, -0.707_107, 0.707_107),
            scale: Vec3::ONE,
        }
    }

    pub fn apply(&self, transform: &mut Transform) {
        transform.position = self.position;
        transform.rotation = self.quaternion.normalize();
        transform.scale = self.scale;
    }
}

/// Offset used for every asset of a slot, with per-asset exceptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotOffsets {
    pub default: Option<CalibratedOffset>,
    pub overrides: BTreeMap<String, CalibratedOffset>,
}

impl SlotOffsets {
    #[must_use]
    pub fn resolve(&self, asset_name: &str) -> Option<CalibratedOffset> {
        self.overrides.get(asset_name).copied().or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetConfig {
    pub hat: SlotOffsets,
    pub shirt: SlotOffsets,
    pub eyes: SlotOffsets,
}

impl OffsetConfig {
    #[must_use]
    pub fn for_slot(&self, slot: Slot) -> &SlotOffsets {
        match slot {
            Slot::Hat => &self.hat,
            Slot::Shirt => &self.shirt,
            Slot::Eyes => &self.eyes,
        }
    }

    #[must_use]
    pub fn resolve(&self, slot: Slot, asset_name: &str) -> Option<CalibratedOffset> {
        self.for_slot(slot).resolve(asset_name)
    }
}

impl Default for OffsetConfig {
    fn default() -> Self {
        let head = SlotOffsets {
            default: Some(CalibratedOffset::head()),
            overrides: BTreeMap::new(),
        };
        Self {
            hat: head.clone(),
            shirt: SlotOffsets::default(),
            eyes: head,
        }
    }
}

// ============================================================================
// Pipeline policies
// ============================================================================

/// Name vocabulary used by the import filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    #[default]
    Simple,
    /// Adds head parts, authoring placeholders, primitive shapes and base-model duplicates.
    Rich,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub hat: FilterPolicy,
    pub shirt: FilterPolicy,
    pub eyes: FilterPolicy,
}

impl FilterConfig {
    #[must_use]
    pub fn policy(&self, slot: Slot) -> FilterPolicy {
        match slot {
            Slot::Hat => self.hat,
            Slot::Shirt => self.shirt,
            Slot::Eyes => self.eyes,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            hat: FilterPolicy::Simple,
            shirt: FilterPolicy::Rich,
            eyes: FilterPolicy::Simple,
        }
    }
}

/// Where shirts are parented on the base model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShirtAnchor {
    #[default]
    Root,
    /// First body bone, falling back to the root.
    BodyBone,
}

// ============================================================================
// Timing
// ============================================================================

/// Start delays, in milliseconds, for the slot loads of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaggerConfig {
    pub hat_ms: u64,
    pub shirt_ms: u64,
    pub eyes_ms: u64,
}

impl StaggerConfig {
    #[must_use]
    pub const fn new(hat_ms: u64, shirt_ms: u64, eyes_ms: u64) -> Self {
        Self { hat_ms, shirt_ms, eyes_ms }
    }

    #[must_use]
    pub fn delay(&self, slot: Slot) -> Duration {
        Duration::from_millis(match slot {
            Slot::Hat => self.hat_ms,
            Slot::Shirt => self.shirt_ms,
            Slot::Eyes => self.eyes_ms,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizeConfig {
    pub hat_chance: f64,
    pub shirt_chance: f64,
    pub eyes_chance: f64,
    pub stagger: StaggerConfig,
}

impl RandomizeConfig {
    #[must_use]
    pub fn chance(&self, slot: Slot) -> f64 {
        match slot {
            Slot::Hat => self.hat_chance,
            Slot::Shirt => self.shirt_chance,
            Slot::Eyes => self.eyes_chance,
        }
    }
}

impl Default for RandomizeConfig {
    fn default() -> Self {
        Self {
            hat_chance: 0.7,
            shirt_chance: 0.8,
            eyes_chance: 1.0,
            stagger: StaggerConfig::new(100, 150, 200),
        }
    }
}

// ============================================================================
// Folders
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    pub furs: String,
    pub hats: String,
    pub shirts: String,
    pub eyes: String,
    pub metadata: String,
}

impl FolderConfig {
    #[must_use]
    pub fn folder(&self, category: Category) -> &str {
        match category {
            Category::Fur => &self.furs,
            Category::Hat => &self.hats,
            Category::Shirt => &self.shirts,
            Category::Eyes => &self.eyes,
        }
    }
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            furs: "WEARABLES/Furs".to_string(),
            hats: "WEARABLES/Hats".to_string(),
            shirts: "WEARABLES/Shirts".to_string(),
            eyes: "WEARABLES/Eyes".to_string(),
            metadata: "metadata".to_string(),
        }
    }
}

// ============================================================================
// Wardrobe config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardrobeConfig {
    pub folders: FolderConfig,
    pub catalog: Catalog,
    /// Highest valid token ID; IDs run from 1.
    pub collection_size: u32,
    pub offsets: OffsetConfig,
    pub filters: FilterConfig,
    pub shirt_anchor: ShirtAnchor,
    pub history_limit: usize,
    pub randomize: RandomizeConfig,
    pub trait_stagger: StaggerConfig,
    pub min_loading_display_ms: u64,
    /// Key under which saved positions are persisted.
    pub storage_key: String,
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        Self {
            folders: FolderConfig::default(),
            catalog: Catalog::default(),
            collection_size: 2222,
            offsets: OffsetConfig::default(),
            filters: FilterConfig::default(),
            shirt_anchor: ShirtAnchor::Root,
            history_limit: 50,
            randomize: RandomizeConfig::default(),
            trait_stagger: StaggerConfig::new(200, 300, 400),
            min_loading_display_ms: 3000,
            storage_key: "avatarBuilder_positions".to_string(),
        }
    }
}

impl WardrobeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Percent-encoded path of a model, e.g. `WEARABLES/Hats/Helmet%20Green.glb`.
    #[must_use]
    pub fn asset_path(&self, category: Category, name: &str) -> String {
        encode_path(self.folders.folder(category), &format!("{name}.glb"))
    }

    #[must_use]
    pub fn metadata_path(&self, token_id: u32) -> String {
        encode_path(&self.folders.metadata, &format!("{token_id}.json"))
    }

    #[must_use]
    pub fn min_loading_display(&self) -> Duration {
        Duration::from_millis(self.min_loading_display_ms)
    }
}
