//! The [`Wardrobe`] controller: async loads on top of [`AvatarState`].
//!
//! The state lives behind a `parking_lot::Mutex` that is only held for
//! synchronous sections; every `.await` happens with the lock released.
//! Overlapping loads of the same slot are resolved by the slot's generation
//! number, so the most recently started load wins.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use outfitter_assets::{AssetError, AssetSource};
use outfitter_scene::SharedPrefab;
use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::attach::{BoneResolver, SubstringBoneResolver};
use crate::catalog::{Category, Slot};
use crate::config::{StaggerConfig, WardrobeConfig};
use crate::edit::KeyPress;
use crate::errors::{Result, WardrobeError};
use crate::history::ObjectState;
use crate::loading::LoadingIndicator;
use crate::metadata::{TokenMetadata, TraitSet};
use crate::persistence::{JsonFileStore, MemoryStore, PositionStore, SavedPositions};
use crate::state::{AvatarState, LoadOutcome};

/// What a randomize or trait load ended up putting on the avatar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub fur: String,
    pub hat: Option<String>,
    pub shirt: Option<String>,
    pub eyes: Option<String>,
}

impl LoadReport {
    fn new(fur: String, loaded: Vec<(Slot, String)>) -> Self {
        let mut report = Self {
            fur,
            ..Self::default()
        };
        for (slot, name) in loaded {
            match slot {
                Slot::Hat => report.hat = Some(name),
                Slot::Shirt => report.shirt = Some(name),
                Slot::Eyes => report.eyes = Some(name),
            }
        }
        report
    }

    #[must_use]
    pub fn wearable(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Hat => self.hat.as_deref(),
            Slot::Shirt => self.shirt.as_deref(),
            Slot::Eyes => self.eyes.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandomizeOutcome {
    Completed(LoadReport),
    /// Another randomize was already running.
    Skipped,
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Locked avatar state.
///
/// If a history snapshot was recorded while the guard was held, the current
/// positions are written to the store when it is released.
pub struct StateGuard<'a, S: AssetSource> {
    wardrobe: &'a Wardrobe<S>,
    state: MutexGuard<'a, AvatarState>,
}

impl<S: AssetSource> Deref for StateGuard<'_, S> {
    type Target = AvatarState;

    fn deref(&self) -> &AvatarState {
        &self.state
    }
}

impl<S: AssetSource> DerefMut for StateGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut AvatarState {
        &mut self.state
    }
}

impl<S: AssetSource> Drop for StateGuard<'_, S> {
    fn drop(&mut self) {
        if !self.state.take_persist_pending() {
            return;
        }
        let positions = self.state.capture_positions();
        if let Err(e) = self.wardrobe.persist(positions) {
            log::warn!("Could not persist positions: {e}");
        }
    }
}

pub struct Wardrobe<S: AssetSource> {
    source: S,
    config: WardrobeConfig,
    resolver: Box<dyn BoneResolver>,
    store: Box<dyn PositionStore>,
    state: Mutex<AvatarState>,
    randomizing: AtomicBool,
    loading: LoadingIndicator,
}

impl<S: AssetSource> Wardrobe<S> {
    pub fn new(source: S, config: WardrobeConfig) -> Self {
        let state = AvatarState::new(config.history_limit);
        let loading = LoadingIndicator::new(config.min_loading_display());
        Self {
            source,
            config,
            resolver: Box::new(SubstringBoneResolver::default()),
            store: Box::new(MemoryStore::new()),
            state: Mutex::new(state),
            randomizing: AtomicBool::new(false),
            loading,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl BoneResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: impl PositionStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Persists positions as `<dir>/<storage_key>.json`.
    #[must_use]
    pub fn with_file_store(self, dir: impl Into<PathBuf>) -> Self {
        let store = JsonFileStore::new(dir, &self.config.storage_key);
        self.with_store(store)
    }

    #[must_use]
    pub fn config(&self) -> &WardrobeConfig {
        &self.config
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Locks the avatar state. Do not hold the guard across an `.await`.
    pub fn state(&self) -> StateGuard<'_, S> {
        StateGuard {
            wardrobe: self,
            state: self.state.lock(),
        }
    }

    #[must_use]
    pub fn loading_visible(&self) -> bool {
        self.loading.is_visible()
    }

    #[must_use]
    pub fn is_randomizing(&self) -> bool {
        self.randomizing.load(Ordering::Acquire)
    }

    pub fn take_redraw(&self) -> bool {
        self.state().take_redraw()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    async fn fetch(&self, category: Category, name: &str) -> Result<SharedPrefab> {
        let path = self.config.asset_path(category, name);
        match self.source.load_prefab(&path).await {
            Ok(prefab) => Ok(prefab),
            Err(source) => {
                let folder = self.config.folders.folder(category).to_string();
                let error = WardrobeError::AssetLoad {
                    name: name.to_string(),
                    path,
                    folder,
                    source,
                };
                log::error!("{error}");
                Err(error)
            }
        }
    }

    /// Loads a fur as the base model.
    ///
    /// Returns `false` if a newer base-model load finished first.
    pub async fn load_base_model(&self, name: &str, preserve_wearables: bool) -> Result<bool> {
        self.config.catalog.validate(Category::Fur, name)?;
        let ticket = self.state().begin_base_load();

        let prefab = self.fetch(Category::Fur, name).await?;

        let installed = self.state().finish_base_load(
            ticket,
            name,
            &prefab,
            preserve_wearables,
            &self.config,
            self.resolver.as_ref(),
        );
        Ok(installed)
    }

    /// Replaces whatever is in `slot` with the named wearable.
    pub async fn load_wearable(&self, slot: Slot, name: &str) -> Result<LoadOutcome> {
        self.config.catalog.validate(slot.category(), name)?;
        let ticket = self.state().begin_slot_load(slot)?;

        let prefab = self.fetch(slot.category(), name).await?;

        let outcome = self
            .state()
            .finish_slot_load(ticket, name, &prefab, &self.config, self.resolver.as_ref());
        Ok(outcome)
    }

    pub fn remove_wearable(&self, slot: Slot) -> bool {
        self.state().remove_wearable(slot)
    }

    /// Loads several wearables concurrently, each after its stagger delay.
    ///
    /// Failures are logged and leave that slot empty.
    async fn load_batch(&self, picks: &[(Slot, String)], stagger: StaggerConfig) -> Vec<(Slot, String)> {
        let loads = picks.iter().map(|(slot, name)| async move {
            tokio::time::sleep(stagger.delay(*slot)).await;
            match self.load_wearable(*slot, name).await {
                Ok(LoadOutcome::Loaded { attach, .. }) if attach.is_attached() => Some((*slot, name.clone())),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Could not load {slot} '{name}': {e}");
                    None
                }
            }
        });
        join_all(loads).await.into_iter().flatten().collect()
    }

    /// Puts a random fur and random wearables on the avatar.
    ///
    /// All choices are drawn up front. A call made while another randomize is
    /// running returns [`RandomizeOutcome::Skipped`] without touching anything.
    pub async fn randomize<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RandomizeOutcome> {
        let Some(_busy) = BusyGuard::acquire(&self.randomizing) else {
            log::info!("Randomize already in progress, skipping");
            return Ok(RandomizeOutcome::Skipped);
        };

        let catalog = &self.config.catalog;
        let Some(fur) = catalog.furs.choose(rng).cloned() else {
            return Err(WardrobeError::InvalidInput("no fur options to randomize from".to_string()));
        };
        let picks: Vec<(Slot, String)> = Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                if !rng.random_bool(self.config.randomize.chance(slot).clamp(0.0, 1.0)) {
                    return None;
                }
                let name = catalog.options(slot.category()).choose(rng)?;
                Some((slot, name.clone()))
            })
            .collect();
        log::info!("Randomizing: fur '{fur}', wearables {picks:?}");

        self.loading.show();
        self.state().remove_all_wearables();
        let result = self.load_avatar(fur, &picks, self.config.randomize.stagger).await;
        self.loading.hide().await;

        result.map(RandomizeOutcome::Completed)
    }

    /// Builds the avatar described by token `id`'s metadata.
    ///
    /// Unknown wearable names are skipped with a warning; an unknown or
    /// missing fur is an error and nothing is loaded.
    pub async fn load_traits(&self, id: u32) -> Result<LoadReport> {
        let max = self.config.collection_size;
        if id == 0 || id > max {
            return Err(WardrobeError::InvalidTokenId { id, max });
        }

        self.loading.show();
        let result = self.load_traits_inner(id).await;
        self.loading.hide().await;
        result
    }

    async fn load_traits_inner(&self, id: u32) -> Result<LoadReport> {
        let path = self.config.metadata_path(id);
        let bytes = match self.source.read_bytes(&path).await {
            Ok(bytes) => bytes,
            Err(source) => return Err(WardrobeError::Metadata { id, path, source }),
        };
        let metadata: TokenMetadata = match serde_json::from_slice(&bytes) {
            Ok(metadata) => metadata,
            Err(e) => {
                return Err(WardrobeError::Metadata {
                    id,
                    path,
                    source: AssetError::Json(e),
                });
            }
        };

        let traits = TraitSet::from_metadata(&metadata);
        let Some(fur) = traits.fur.clone() else {
            return Err(WardrobeError::MissingFurTrait { id });
        };
        self.config.catalog.validate(Category::Fur, &fur)?;

        let picks: Vec<(Slot, String)> = Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                let name = traits.wearable(slot)?;
                if self.config.catalog.contains(slot.category(), name) {
                    Some((slot, name.to_string()))
                } else {
                    log::warn!("{slot} \"{name}\" not found in available options");
                    None
                }
            })
            .collect();

        self.load_avatar(fur, &picks, self.config.trait_stagger).await
    }

    async fn load_avatar(&self, fur: String, picks: &[(Slot, String)], stagger: StaggerConfig) -> Result<LoadReport> {
        self.load_base_model(&fur, false).await?;
        let loaded = self.load_batch(picks, stagger).await;
        Ok(LoadReport::new(fur, loaded))
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Runs `f` against the locked state, then persists positions if a
    /// snapshot was recorded.
    pub fn edit<T>(&self, f: impl FnOnce(&mut AvatarState) -> T) -> T {
        let mut state = self.state();
        f(&mut state)
    }

    pub fn set_edit_mode(&self, enabled: bool) {
        self.edit(|state| state.set_edit_mode(enabled));
    }

    pub fn undo(&self) -> bool {
        self.edit(AvatarState::undo)
    }

    pub fn redo(&self) -> bool {
        self.edit(AvatarState::redo)
    }

    pub fn handle_key(&self, press: KeyPress) -> bool {
        self.edit(|state| state.handle_key(press))
    }

    // ========================================================================
    // Saved positions
    // ========================================================================

    fn persist(&self, positions: SavedPositions) -> Result<usize> {
        let mut stored = self.store.load()?;
        let count = positions.len();
        stored.merge(positions);
        self.store.save(&stored)?;
        Ok(count)
    }

    /// Writes the local poses of all active wearables to the store.
    ///
    /// Returns how many wearables were saved.
    pub fn save_positions(&self) -> Result<usize> {
        let positions = {
            let mut state = self.state();
            state.take_persist_pending();
            state.capture_positions()
        };
        let count = self.persist(positions)?;
        log::info!("Saved positions for {count} wearable(s)");
        Ok(count)
    }

    pub fn saved_position(&self, slot: Slot, asset_name: &str) -> Result<Option<ObjectState>> {
        Ok(self.store.load()?.get(slot, asset_name).cloned())
    }

    /// Restores the saved pose of the wearable currently in `slot`.
    ///
    /// Returns `false` if the slot is empty or nothing was saved for it.
    pub fn apply_saved_position(&self, slot: Slot) -> Result<bool> {
        let Some(asset_name) = self.state().instance(slot).map(|i| i.asset_name.clone()) else {
            return Ok(false);
        };
        let Some(saved) = self.saved_position(slot, &asset_name)? else {
            return Ok(false);
        };
        Ok(self.state().apply_object_state(slot, &saved))
    }
}
