//! Avatar state and the wearable slot manager.
//!
//! [`AvatarState`] is the single owner of the scene, the active base model,
//! the three slots, the edit session and the undo history. Every mutation of
//! slots or the base model goes through the methods here.

use glam::Vec3;
use outfitter_scene::{NodeHandle, Prefab, Scene};

use crate::attach::{AttachContext, AttachResult, BoneResolver};
use crate::catalog::Slot;
use crate::config::{FilterPolicy, WardrobeConfig};
use crate::edit::{EditSession, SelectableEntry};
use crate::errors::{Result, WardrobeError};
use crate::filter::{BodyReference, filter_wearable_meshes, remove_placeholders, strip_skinning};
use crate::history::History;
use crate::normalize::normalize_into_wrapper;

/// Tolerance for "already centred at the origin" when framing a base model.
const CENTERED_EPSILON: f32 = 0.01;
/// Target largest dimension for a framed base model.
const FRAMED_SIZE: f32 = 2.0;
/// Vertical drop applied when recentring a base model.
const FRAMED_DROP: f32 = 0.9;

/// A wearable living in a slot: a wrapper node owning the filtered meshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WearableInstance {
    pub slot: Slot,
    pub asset_name: String,
    pub wrapper: NodeHandle,
}

/// The active character model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseModel {
    pub name: String,
    pub root: NodeHandle,
}

/// At most one instance per slot.
#[derive(Debug, Clone, Default)]
pub struct SlotTable([Option<WearableInstance>; 3]);

impl SlotTable {
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&WearableInstance> {
        self.0[slot.index()].as_ref()
    }

    /// Stores an instance in its slot, returning whatever was there.
    pub fn set(&mut self, instance: WearableInstance) -> Option<WearableInstance> {
        let index = instance.slot.index();
        self.0[index].replace(instance)
    }

    pub fn take(&mut self, slot: Slot) -> Option<WearableInstance> {
        self.0[slot.index()].take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WearableInstance> {
        self.0.iter().flatten()
    }

    #[must_use]
    pub fn find_by_wrapper(&self, wrapper: NodeHandle) -> Option<&WearableInstance> {
        self.iter().find(|instance| instance.wrapper == wrapper)
    }

    /// Instance whose wrapper is `node` or one of its ancestors.
    #[must_use]
    pub fn owner_of(&self, scene: &Scene, node: NodeHandle) -> Option<&WearableInstance> {
        self.iter().find(|instance| scene.is_self_or_descendant_of(node, instance.wrapper))
    }
}

/// Permission to complete a slot load, invalidated by any later load or removal of that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub slot: Slot,
    generation: u64,
}

/// Permission to complete a base-model load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseLoadTicket {
    generation: u64,
}

/// Result of completing a slot load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { attach: AttachResult, meshes: usize },
    /// A newer load or removal of the same slot happened meanwhile; nothing changed.
    Superseded,
}

pub struct AvatarState {
    pub(crate) scene: Scene,
    pub(crate) base: Option<BaseModel>,
    pub(crate) slots: SlotTable,
    generations: [u64; 3],
    base_generation: u64,

    pub(crate) edit: EditSession,
    pub(crate) history: History,
    pub(crate) selectables: Vec<SelectableEntry>,

    needs_redraw: bool,
    pub(crate) persist_pending: bool,
}

impl AvatarState {
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            scene: Scene::new(),
            base: None,
            slots: SlotTable::default(),
            generations: [0; 3],
            base_generation: 0,
            edit: EditSession::default(),
            history: History::new(history_limit),
            selectables: Vec::new(),
            needs_redraw: true,
            persist_pending: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for the host (rendering, custom nodes).
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.needs_redraw = true;
        &mut self.scene
    }

    #[must_use]
    pub fn base_model(&self) -> Option<&BaseModel> {
        self.base.as_ref()
    }

    #[must_use]
    pub fn instance(&self, slot: Slot) -> Option<&WearableInstance> {
        self.slots.get(slot)
    }

    pub fn instances(&self) -> impl Iterator<Item = &WearableInstance> {
        self.slots.iter()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns whether a redraw was requested since the last call, and clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Called after any change to slots, the base model or the hierarchy.
    pub(crate) fn mark_changed(&mut self) {
        self.needs_redraw = true;
        self.prune_selection();
        if self.edit.is_active() {
            self.refresh_selectables();
        }
    }

    // ========================================================================
    // Slot loads
    // ========================================================================

    /// Starts loading into `slot`: discards the current instance and issues a ticket.
    pub fn begin_slot_load(&mut self, slot: Slot) -> Result<LoadTicket> {
        if self.base.is_none() {
            return Err(WardrobeError::NoBaseModel);
        }
        self.discard_slot(slot);
        let generation = self.bump_generation(slot);
        self.mark_changed();
        Ok(LoadTicket { slot, generation })
    }

    /// Runs filter, normalize and attach for a fetched asset and records the instance.
    pub fn finish_slot_load(
        &mut self,
        ticket: LoadTicket,
        asset_name: &str,
        prefab: &Prefab,
        config: &WardrobeConfig,
        resolver: &dyn BoneResolver,
    ) -> LoadOutcome {
        let slot = ticket.slot;
        if self.generations[slot.index()] != ticket.generation {
            log::debug!("Discarding stale {slot} load of '{asset_name}'");
            return LoadOutcome::Superseded;
        }
        // Anything that slipped in under the same generation is replaced.
        self.discard_slot(slot);

        let model_root = self.base.as_ref().map(|b| b.root);
        let policy = config.filters.policy(slot);

        let asset_root = self.scene.instantiate(prefab);
        remove_placeholders(&mut self.scene, asset_root);

        let body = match (policy, model_root) {
            (FilterPolicy::Rich, Some(root)) => Some(BodyReference::from_model(&self.scene, root)),
            _ => None,
        };
        let meshes = filter_wearable_meshes(&self.scene, asset_root, policy, body.as_ref());
        if meshes.is_empty() {
            log::warn!("{slot} '{asset_name}' has no wearable meshes after filtering");
        }
        if slot == Slot::Shirt {
            strip_skinning(&mut self.scene, &meshes);
        }

        let wrapper = self.scene.create_node_with_name(&format!("{}:{asset_name}", slot.label()));
        normalize_into_wrapper(&mut self.scene, &meshes, wrapper);
        self.scene.remove_node(asset_root);

        let context = AttachContext {
            resolver,
            offsets: &config.offsets,
            shirt_anchor: config.shirt_anchor,
        };
        let attach = context.attach(&mut self.scene, wrapper, slot, asset_name, model_root);
        if !attach.is_attached() {
            self.scene.remove_node(wrapper);
            return LoadOutcome::Loaded { attach, meshes: 0 };
        }

        self.slots.set(WearableInstance {
            slot,
            asset_name: asset_name.to_string(),
            wrapper,
        });
        self.mark_changed();
        log::info!("Loaded {slot} '{asset_name}' ({} mesh(es), {attach:?})", meshes.len());

        LoadOutcome::Loaded {
            attach,
            meshes: meshes.len(),
        }
    }

    /// Destroys the instance in `slot` and invalidates in-flight loads for it.
    pub fn remove_wearable(&mut self, slot: Slot) -> bool {
        self.bump_generation(slot);
        let removed = self.discard_slot(slot);
        if removed {
            log::info!("Removed {slot}");
            self.mark_changed();
        }
        removed
    }

    pub fn remove_all_wearables(&mut self) {
        for slot in Slot::ALL {
            self.remove_wearable(slot);
        }
    }

    fn discard_slot(&mut self, slot: Slot) -> bool {
        match self.slots.take(slot) {
            Some(instance) => {
                self.scene.remove_node(instance.wrapper);
                true
            }
            None => false,
        }
    }

    fn bump_generation(&mut self, slot: Slot) -> u64 {
        let generation = &mut self.generations[slot.index()];
        *generation += 1;
        *generation
    }

    // ========================================================================
    // Base model
    // ========================================================================

    pub fn begin_base_load(&mut self) -> BaseLoadTicket {
        self.base_generation += 1;
        BaseLoadTicket {
            generation: self.base_generation,
        }
    }

    /// Swaps in a new base model.
    ///
    /// With `preserve_wearables`, current instances are moved onto the new
    /// model (head slots are dropped if it has no head bone). Otherwise all
    /// slots are cleared. Returns `false` if the ticket is stale.
    pub fn finish_base_load(
        &mut self,
        ticket: BaseLoadTicket,
        name: &str,
        prefab: &Prefab,
        preserve_wearables: bool,
        config: &WardrobeConfig,
        resolver: &dyn BoneResolver,
    ) -> bool {
        if ticket.generation != self.base_generation {
            log::debug!("Discarding stale base model load of '{name}'");
            return false;
        }

        let root = self.scene.instantiate(prefab);
        self.scene.set_name(root, name);

        let previous = self.base.take();
        match &previous {
            Some(previous) => self.carry_pose(previous.root, root),
            None => self.frame_base_model(root),
        }

        let carried: Vec<WearableInstance> = if preserve_wearables {
            Slot::ALL
                .into_iter()
                .filter_map(|slot| self.slots.take(slot))
                .inspect(|instance| {
                    self.scene.detach(instance.wrapper);
                })
                .collect()
        } else {
            for slot in Slot::ALL {
                self.bump_generation(slot);
                self.discard_slot(slot);
            }
            Vec::new()
        };

        if let Some(previous) = previous {
            self.scene.remove_node(previous.root);
        }
        self.scene.add_root(root);
        self.base = Some(BaseModel {
            name: name.to_string(),
            root,
        });

        let context = AttachContext {
            resolver,
            offsets: &config.offsets,
            shirt_anchor: config.shirt_anchor,
        };
        for instance in carried {
            match context.reattach(&mut self.scene, instance.wrapper, instance.slot, root) {
                AttachResult::Failed => {
                    log::warn!(
                        "New base model '{name}' has no head bone, discarding {} '{}'",
                        instance.slot,
                        instance.asset_name
                    );
                    self.scene.remove_node(instance.wrapper);
                }
                _ => {
                    self.slots.set(instance);
                }
            }
        }

        self.scene.update_matrix_world();
        self.mark_changed();
        log::info!("Loaded base model '{name}'");
        true
    }

    fn carry_pose(&mut self, from: NodeHandle, to: NodeHandle) {
        let Some((position, scale)) = self
            .scene
            .get_node(from)
            .map(|n| (n.transform.position, n.transform.scale))
        else {
            return;
        };
        self.scene.node(to).set_position(position).set_scale(scale);
    }

    /// Centres and scales a first base model so it fits the default camera.
    fn frame_base_model(&mut self, root: NodeHandle) {
        let bounds = self.scene.world_bounds(root);
        let max_dim = bounds.max_dimension();
        if bounds.is_empty() || max_dim <= f32::EPSILON {
            return;
        }
        let center = bounds.center();

        let Some(node) = self.scene.get_node_mut(root) else {
            return;
        };
        let transform = &mut node.transform;
        let centered = center.abs().max_element() < CENTERED_EPSILON
            && transform.position.abs().max_element() < CENTERED_EPSILON;

        if centered {
            if !(0.1..=10.0).contains(&max_dim) {
                transform.scale *= FRAMED_SIZE / max_dim;
            }
        } else {
            transform.position -= center;
            transform.position.y -= FRAMED_DROP;
            transform.position.x = 0.0;
            transform.scale *= FRAMED_SIZE / max_dim;
        }
        log::debug!(
            "Framed base model: size {max_dim:.3}, position {:?}, scale {:?}",
            transform.position,
            transform.scale
        );
    }

    /// World-space position of a slot's wrapper.
    #[must_use]
    pub fn world_position(&self, slot: Slot) -> Option<Vec3> {
        self.slots.get(slot).map(|i| self.scene.world_position(i.wrapper))
    }
}
