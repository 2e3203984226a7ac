//! Saved wearable positions.
//!
//! Positions are keyed by slot and asset name and hold the wrapper's local
//! pose plus its direct children, in the same shape as history entries.

use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::catalog::Slot;
use crate::errors::Result;
use crate::history::ObjectState;
use crate::state::AvatarState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedPositions {
    pub hats: BTreeMap<String, ObjectState>,
    pub shirts: BTreeMap<String, ObjectState>,
    pub eyes: BTreeMap<String, ObjectState>,
}

impl SavedPositions {
    fn map(&self, slot: Slot) -> &BTreeMap<String, ObjectState> {
        match slot {
            Slot::Hat => &self.hats,
            Slot::Shirt => &self.shirts,
            Slot::Eyes => &self.eyes,
        }
    }

    fn map_mut(&mut self, slot: Slot) -> &mut BTreeMap<String, ObjectState> {
        match slot {
            Slot::Hat => &mut self.hats,
            Slot::Shirt => &mut self.shirts,
            Slot::Eyes => &mut self.eyes,
        }
    }

    #[must_use]
    pub fn get(&self, slot: Slot, asset_name: &str) -> Option<&ObjectState> {
        self.map(slot).get(asset_name)
    }

    pub fn insert(&mut self, slot: Slot, asset_name: &str, state: ObjectState) {
        self.map_mut(slot).insert(asset_name.to_string(), state);
    }

    /// Overlays `other` on top of these entries.
    pub fn merge(&mut self, other: SavedPositions) {
        self.hats.extend(other.hats);
        self.shirts.extend(other.shirts);
        self.eyes.extend(other.eyes);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hats.len() + self.shirts.len() + self.eyes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key-value style storage for [`SavedPositions`].
pub trait PositionStore: Send + Sync {
    /// Returns the stored positions, or empty ones if nothing was saved yet.
    fn load(&self) -> Result<SavedPositions>;
    fn save(&self, positions: &SavedPositions) -> Result<()>;
}

/// Stores positions as `<dir>/<key>.json`.
///
/// Reads and writes are blocking. The blob is a few hundred bytes and is
/// written while the avatar state is locked, outside any `.await`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: dir.into().join(format!("{key}.json")),
        }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl PositionStore for JsonFileStore {
    fn load(&self) -> Result<SavedPositions> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SavedPositions::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, positions: &SavedPositions) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(positions)?)?;
        log::debug!("Saved positions to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the serialized positions in memory. The default store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Option<String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored JSON, if anything was saved.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.data.lock().clone()
    }
}

impl PositionStore for MemoryStore {
    fn load(&self) -> Result<SavedPositions> {
        match self.data.lock().as_deref() {
            Some(text) => Ok(serde_json::from_str(text)?),
            None => Ok(SavedPositions::default()),
        }
    }

    fn save(&self, positions: &SavedPositions) -> Result<()> {
        *self.data.lock() = Some(serde_json::to_string(positions)?);
        Ok(())
    }
}

impl AvatarState {
    /// Local poses of every active wearable, keyed by slot and asset name.
    #[must_use]
    pub fn capture_positions(&self) -> SavedPositions {
        let mut positions = SavedPositions::default();
        for instance in self.slots.iter() {
            if let Some(state) = ObjectState::capture(&self.scene, instance.wrapper) {
                positions.insert(instance.slot, &instance.asset_name, state);
            }
        }
        positions
    }

    /// Applies a saved pose to the wearable in `slot`.
    pub fn apply_object_state(&mut self, slot: Slot, state: &ObjectState) -> bool {
        let Some(wrapper) = self.slots.get(slot).map(|i| i.wrapper) else {
            return false;
        };
        state.apply(&mut self.scene, wrapper);
        self.scene.update_subtree(wrapper);
        self.request_redraw();
        true
    }

    pub(crate) fn take_persist_pending(&mut self) -> bool {
        std::mem::take(&mut self.persist_pending)
    }
}
