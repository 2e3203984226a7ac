//! Undo/redo history of wearable transforms.
//!
//! A [`TransformSnapshot`] records the local pose of every wearable wrapper
//! and its direct children. Deletions additionally carry a [`DeletionRecord`]
//! so the detached node can be put back where it was.

use std::collections::VecDeque;

use glam::{Quat, Vec3};
use outfitter_scene::{NodeHandle, Scene, Transform};
use serde::{Deserialize, Serialize};

use crate::catalog::Slot;
use crate::state::{AvatarState, WearableInstance};

/// Local pose and visibility of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub position: Vec3,
    /// XYZ Euler angles, kept alongside the quaternion for readability.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub quaternion: Quat,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

impl NodeState {
    #[must_use]
    pub fn capture(transform: &Transform, visible: bool) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation_euler(),
            scale: transform.scale,
            quaternion: transform.rotation,
            visible,
        }
    }

    /// Writes the pose back. The quaternion wins over the Euler angles.
    pub fn apply(&self, scene: &mut Scene, handle: NodeHandle) {
        scene
            .node(handle)
            .set_position(self.position)
            .set_rotation(self.quaternion.normalize())
            .set_scale(self.scale)
            .set_visible(self.visible);
    }
}

/// State of a direct child, matched back by name first and index second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildState {
    pub name: String,
    pub index: usize,
    #[serde(flatten)]
    pub state: NodeState,
}

/// A wrapper's pose plus the poses of its direct children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    #[serde(flatten)]
    pub state: NodeState,
    #[serde(default)]
    pub children: Vec<ChildState>,
}

impl ObjectState {
    #[must_use]
    pub fn capture(scene: &Scene, wrapper: NodeHandle) -> Option<Self> {
        let node = scene.get_node(wrapper)?;
        let children = node
            .children()
            .iter()
            .enumerate()
            .filter_map(|(index, &child)| {
                let child_node = scene.get_node(child)?;
                Some(ChildState {
                    name: scene.name(child).to_string(),
                    index,
                    state: NodeState::capture(&child_node.transform, child_node.visible),
                })
            })
            .collect();

        Some(Self {
            state: NodeState::capture(&node.transform, node.visible),
            children,
        })
    }

    pub fn apply(&self, scene: &mut Scene, wrapper: NodeHandle) {
        if !scene.contains(wrapper) {
            return;
        }
        self.state.apply(scene, wrapper);

        let children = scene.children_of(wrapper).to_vec();
        for saved in &self.children {
            let target = children
                .iter()
                .copied()
                .find(|&c| !saved.name.is_empty() && scene.name(c) == saved.name)
                .or_else(|| children.get(saved.index).copied());
            if let Some(child) = target {
                saved.state.apply(scene, child);
            }
        }
    }
}

/// Where a deleted node lived, so undo can reinsert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRecord {
    pub node: NodeHandle,
    /// `None` for a top-level node.
    pub parent: Option<NodeHandle>,
    pub index: usize,
    /// Set when the deleted node was a whole wearable.
    pub instance: Option<WearableInstance>,
}

/// One history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSnapshot {
    pub action: String,
    pub hat: Option<ObjectState>,
    pub shirt: Option<ObjectState>,
    pub eyes: Option<ObjectState>,
    pub deletion: Option<DeletionRecord>,
}

impl TransformSnapshot {
    #[must_use]
    pub fn state(&self, slot: Slot) -> Option<&ObjectState> {
        match slot {
            Slot::Hat => self.hat.as_ref(),
            Slot::Shirt => self.shirt.as_ref(),
            Slot::Eyes => self.eyes.as_ref(),
        }
    }

    fn state_mut(&mut self, slot: Slot) -> &mut Option<ObjectState> {
        match slot {
            Slot::Hat => &mut self.hat,
            Slot::Shirt => &mut self.shirt,
            Slot::Eyes => &mut self.eyes,
        }
    }
}

/// The two entries involved in an undo.
#[derive(Debug)]
pub struct UndoStep<'a> {
    /// Entry being undone; its deletion, if any, is reverted.
    pub undone: &'a TransformSnapshot,
    /// Entry whose transforms become current.
    pub current: &'a TransformSnapshot,
}

/// Bounded list of snapshots with a cursor.
///
/// The entry at the cursor describes the current state. Pushing discards the
/// redo branch; exceeding the limit evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<TransformSnapshot>,
    index: usize,
    limit: usize,
}

impl History {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Appends a snapshot and returns the entries that fell out of the history.
    pub fn push(&mut self, snapshot: TransformSnapshot) -> Vec<TransformSnapshot> {
        let mut dropped: Vec<TransformSnapshot> = if self.entries.is_empty() {
            Vec::new()
        } else {
            self.entries.drain(self.index + 1..).collect()
        };

        self.entries.push_back(snapshot);
        while self.entries.len() > self.limit {
            dropped.extend(self.entries.pop_front());
        }
        self.index = self.entries.len() - 1;
        dropped
    }

    /// Moves the cursor back one entry. `None` at the start of history.
    pub fn undo(&mut self) -> Option<UndoStep<'_>> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(UndoStep {
            undone: &self.entries[self.index + 1],
            current: &self.entries[self.index],
        })
    }

    /// Moves the cursor forward one entry and returns it. `None` at the end of history.
    pub fn redo(&mut self) -> Option<&TransformSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0 && !self.entries.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn current(&self) -> Option<&TransformSnapshot> {
        self.entries.get(self.index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformSnapshot> {
        self.entries.iter()
    }

    /// Whether any remaining entry's deletion record points at `node`.
    #[must_use]
    pub fn references(&self, node: NodeHandle) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.deletion.as_ref().is_some_and(|d| d.node == node))
    }

    pub fn clear(&mut self) -> Vec<TransformSnapshot> {
        self.index = 0;
        self.entries.drain(..).collect()
    }
}

// ============================================================================
// Applying history to the avatar
// ============================================================================

impl AvatarState {
    fn capture_snapshot(&mut self, action: &str, deletion: Option<DeletionRecord>) -> TransformSnapshot {
        self.scene.update_matrix_world();
        let mut snapshot = TransformSnapshot {
            action: action.to_string(),
            hat: None,
            shirt: None,
            eyes: None,
            deletion,
        };
        for instance in self.slots.iter() {
            *snapshot.state_mut(instance.slot) = ObjectState::capture(&self.scene, instance.wrapper);
        }
        snapshot
    }

    /// Records the current wearable transforms as a new history entry.
    pub fn commit_snapshot(&mut self, action: &str) {
        self.commit_with(action, None);
    }

    pub(crate) fn commit_with(&mut self, action: &str, deletion: Option<DeletionRecord>) {
        let snapshot = self.capture_snapshot(action, deletion);
        let dropped = self.history.push(snapshot);
        self.release_dropped(dropped);
        self.persist_pending = true;
        log::debug!(
            "History: '{action}' ({}/{})",
            self.history.index() + 1,
            self.history.len()
        );
    }

    /// Destroys deleted nodes that no history entry can bring back anymore.
    fn release_dropped(&mut self, dropped: Vec<TransformSnapshot>) {
        for record in dropped.into_iter().filter_map(|s| s.deletion) {
            if !self.history.references(record.node) && !self.scene.is_attached(record.node) {
                self.scene.remove_node(record.node);
            }
        }
    }

    /// Steps one entry back. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(step) = self.history.undo() else {
            log::debug!("Nothing to undo");
            return false;
        };
        let deletion = step.undone.deletion.clone();
        let current = step.current.clone();

        if let Some(record) = deletion {
            self.restore_deletion(&record);
        }
        self.apply_snapshot(&current);
        self.persist_pending = true;
        self.mark_changed();
        log::info!("Undo to '{}'", current.action);
        true
    }

    /// Steps one entry forward. Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            log::debug!("Nothing to redo");
            return false;
        };

        if let Some(record) = &snapshot.deletion {
            self.replay_deletion(record);
        }
        self.apply_snapshot(&snapshot);
        self.persist_pending = true;
        self.mark_changed();
        log::info!("Redo '{}'", snapshot.action);
        true
    }

    fn apply_snapshot(&mut self, snapshot: &TransformSnapshot) {
        let targets: Vec<(NodeHandle, ObjectState)> = self
            .slots
            .iter()
            .filter_map(|instance| Some((instance.wrapper, snapshot.state(instance.slot)?.clone())))
            .collect();
        for (wrapper, state) in targets {
            state.apply(&mut self.scene, wrapper);
        }
        self.scene.update_matrix_world();
    }

    /// Puts a deleted node back at its old parent and index.
    fn restore_deletion(&mut self, record: &DeletionRecord) {
        if !self.scene.contains(record.node) || self.scene.is_attached(record.node) {
            return;
        }
        if let Some(instance) = &record.instance
            && self.slots.get(instance.slot).is_some()
        {
            log::warn!("{} slot is occupied, not restoring '{}'", instance.slot, instance.asset_name);
            return;
        }

        match record.parent {
            Some(parent) if self.scene.contains(parent) => {
                self.scene.insert_child_at(record.node, parent, record.index);
            }
            Some(_) => {
                log::warn!("Parent of deleted node no longer exists, cannot restore");
                return;
            }
            None => self.scene.add_root(record.node),
        }

        if let Some(instance) = &record.instance {
            self.slots.set(instance.clone());
        }
    }

    /// Removes a node again after its deletion was undone.
    fn replay_deletion(&mut self, record: &DeletionRecord) {
        if !self.scene.contains(record.node) {
            return;
        }
        self.scene.detach(record.node);

        let slot = self.slots.find_by_wrapper(record.node).map(|i| i.slot);
        if let Some(slot) = slot {
            self.slots.take(slot);
        }
        if let Some(selected) = self.edit.selected()
            && self.scene.is_self_or_descendant_of(selected, record.node)
        {
            self.edit.clear_selection();
        }
    }
}
