//! Edit session: selection, gizmo drags, deletion, keyboard shortcuts and the
//! nudge/rotate helpers.

use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use glam::{EulerRot, Quat, Vec3};
use outfitter_scene::{NodeHandle, Ray};

use crate::catalog::Slot;
use crate::errors::WardrobeError;
use crate::history::DeletionRecord;
use crate::state::AvatarState;

/// Default world-space step for [`AvatarState::nudge`].
pub const DEFAULT_NUDGE: f32 = 0.05;

const TRANSFORM_ACTION: &str = "Transform object";

// ============================================================================
// Session state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// Transform gizmo bound to the selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gizmo {
    pub target: NodeHandle,
    pub mode: GizmoMode,
    pub dragging: bool,
}

/// `Active(None)` is edit mode with nothing selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Inactive,
    Active(Option<Gizmo>),
}

impl EditSession {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, EditSession::Active(_))
    }

    #[must_use]
    pub fn gizmo(&self) -> Option<&Gizmo> {
        match self {
            EditSession::Active(Some(gizmo)) => Some(gizmo),
            _ => None,
        }
    }

    fn gizmo_mut(&mut self) -> Option<&mut Gizmo> {
        match self {
            EditSession::Active(Some(gizmo)) => Some(gizmo),
            _ => None,
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<NodeHandle> {
        self.gizmo().map(|g| g.target)
    }

    pub(crate) fn clear_selection(&mut self) {
        if let EditSession::Active(gizmo) = self {
            *gizmo = None;
        }
    }
}

// ============================================================================
// Selection targets
// ============================================================================

/// Something selectable by value: a whole wearable or one of its direct children.
///
/// Written as `hat` or `hat_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionTarget {
    Group(Slot),
    Part(Slot, usize),
}

impl SelectionTarget {
    #[must_use]
    pub fn slot(self) -> Slot {
        match self {
            SelectionTarget::Group(slot) | SelectionTarget::Part(slot, _) => slot,
        }
    }
}

impl fmt::Display for SelectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionTarget::Group(slot) => f.write_str(slot.key()),
            SelectionTarget::Part(slot, index) => write!(f, "{}_{index}", slot.key()),
        }
    }
}

impl FromStr for SelectionTarget {
    type Err = WardrobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('_') {
            Some((slot, index)) => {
                let index = index
                    .parse()
                    .map_err(|_| WardrobeError::InvalidInput(format!("bad part index in '{s}'")))?;
                Ok(SelectionTarget::Part(slot.parse()?, index))
            }
            None => Ok(SelectionTarget::Group(s.parse()?)),
        }
    }
}

/// One line of the selectable-object listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableEntry {
    pub target: SelectionTarget,
    pub node: NodeHandle,
    /// "Hat (Group)" or "Hat: Brim".
    pub label: String,
}

// ============================================================================
// Keyboard, nudge & rotate inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Ctrl or Cmd.
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyPress {
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    #[must_use]
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// World-space nudge direction. Forward is -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
}

impl NudgeDirection {
    #[must_use]
    pub fn vector(self) -> Vec3 {
        match self {
            NudgeDirection::Up => Vec3::Y,
            NudgeDirection::Down => Vec3::NEG_Y,
            NudgeDirection::Left => Vec3::NEG_X,
            NudgeDirection::Right => Vec3::X,
            NudgeDirection::Forward => Vec3::NEG_Z,
            NudgeDirection::Back => Vec3::Z,
        }
    }
}

impl FromStr for NudgeDirection {
    type Err = WardrobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(NudgeDirection::Up),
            "down" => Ok(NudgeDirection::Down),
            "left" => Ok(NudgeDirection::Left),
            "right" => Ok(NudgeDirection::Right),
            "forward" => Ok(NudgeDirection::Forward),
            "back" | "backward" => Ok(NudgeDirection::Back),
            other => Err(WardrobeError::InvalidInput(format!("unknown direction '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
    /// Half turn about Y, ignoring the amount.
    Flip,
    /// Quarter turn about Y unless an amount is given.
    Turn,
}

impl FromStr for RotationAxis {
    type Err = WardrobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(RotationAxis::X),
            "y" => Ok(RotationAxis::Y),
            "z" => Ok(RotationAxis::Z),
            "flip" => Ok(RotationAxis::Flip),
            "turn" => Ok(RotationAxis::Turn),
            other => Err(WardrobeError::InvalidInput(format!(
                "unknown axis '{other}', use 'x', 'y', 'z', 'flip' or 'turn'"
            ))),
        }
    }
}

// ============================================================================
// AvatarState: edit operations
// ============================================================================

impl AvatarState {
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.edit.is_active()
    }

    #[must_use]
    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    #[must_use]
    pub fn selected(&self) -> Option<NodeHandle> {
        self.edit.selected()
    }

    #[must_use]
    pub fn gizmo(&self) -> Option<&Gizmo> {
        self.edit.gizmo()
    }

    /// Entries for every active slot and its direct children. Empty outside edit mode.
    #[must_use]
    pub fn selectable_objects(&self) -> &[SelectableEntry] {
        &self.selectables
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        match (enabled, self.edit.is_active()) {
            (true, false) => {
                self.edit = EditSession::Active(None);
                if self.history.is_empty() {
                    self.commit_with("Initial state", None);
                }
                self.refresh_selectables();
                log::info!("Edit mode enabled");
            }
            (false, true) => {
                if self.edit.selected().is_some() {
                    self.commit_with(TRANSFORM_ACTION, None);
                }
                self.edit = EditSession::Inactive;
                self.selectables.clear();
                log::info!("Edit mode disabled");
            }
            _ => {}
        }
        self.request_redraw();
    }

    pub(crate) fn refresh_selectables(&mut self) {
        let mut entries = Vec::new();
        for instance in self.slots.iter() {
            let slot = instance.slot;
            entries.push(SelectableEntry {
                target: SelectionTarget::Group(slot),
                node: instance.wrapper,
                label: format!("{} (Group)", slot.label()),
            });
            for (index, &child) in self.scene.children_of(instance.wrapper).iter().enumerate() {
                let name = self.scene.name(child);
                let label = if name.is_empty() {
                    format!("{}: Mesh {index}", slot.label())
                } else {
                    format!("{}: {name}", slot.label())
                };
                entries.push(SelectableEntry {
                    target: SelectionTarget::Part(slot, index),
                    node: child,
                    label,
                });
            }
        }
        self.selectables = entries;
    }

    /// Drops the selection if the node left the scene graph.
    pub(crate) fn prune_selection(&mut self) {
        if let Some(selected) = self.edit.selected()
            && !self.scene.is_in_hierarchy(selected)
        {
            self.edit.clear_selection();
        }
    }

    /// Node a selection value refers to right now.
    #[must_use]
    pub fn resolve_target(&self, target: SelectionTarget) -> Option<NodeHandle> {
        let wrapper = self.slots.get(target.slot())?.wrapper;
        match target {
            SelectionTarget::Group(_) => Some(wrapper),
            SelectionTarget::Part(_, index) => self.scene.children_of(wrapper).get(index).copied(),
        }
    }

    pub fn select(&mut self, target: SelectionTarget) -> bool {
        match self.resolve_target(target) {
            Some(node) => self.select_node(node),
            None => {
                log::warn!("Nothing to select for '{target}'");
                false
            }
        }
    }

    /// Selects a wearable wrapper or one of its descendants.
    ///
    /// Switching away from a previous selection commits a snapshot. The gizmo
    /// starts in translate mode.
    pub fn select_node(&mut self, node: NodeHandle) -> bool {
        if !self.edit.is_active() {
            log::warn!("Selection requires edit mode");
            return false;
        }
        if self.slots.owner_of(&self.scene, node).is_none() {
            log::warn!("Only wearables can be selected");
            return false;
        }

        if let Some(previous) = self.edit.selected()
            && previous != node
        {
            self.commit_with(TRANSFORM_ACTION, None);
        }
        self.edit = EditSession::Active(Some(Gizmo {
            target: node,
            mode: GizmoMode::Translate,
            dragging: false,
        }));
        log::debug!("Selected '{}' for editing", self.scene.name(node));
        self.request_redraw();
        true
    }

    /// Clears the selection, committing a snapshot if something was selected.
    pub fn deselect(&mut self) {
        if self.edit.selected().is_some() {
            self.commit_with(TRANSFORM_ACTION, None);
            self.edit.clear_selection();
            self.request_redraw();
        }
    }

    /// Picks the nearest wearable mesh or curve hit by `ray`.
    ///
    /// The hit node itself is selected, or its whole wearable when
    /// `whole_group` is set. A miss deselects.
    pub fn pick(&mut self, ray: &Ray, whole_group: bool) -> Option<NodeHandle> {
        if !self.edit.is_active() {
            return None;
        }
        let candidates: Vec<NodeHandle> = self
            .slots
            .iter()
            .flat_map(|instance| self.scene.traverse(instance.wrapper))
            .filter(|&h| self.scene.get_mesh(h).is_some())
            .collect();

        let Some((hit, _)) = self.scene.raycast(ray, &candidates) else {
            self.deselect();
            return None;
        };
        let target = if whole_group {
            self.slots.owner_of(&self.scene, hit).map_or(hit, |i| i.wrapper)
        } else {
            hit
        };
        self.select_node(target).then_some(target)
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) -> bool {
        match self.edit.gizmo_mut() {
            Some(gizmo) => {
                gizmo.mode = mode;
                true
            }
            None => false,
        }
    }

    pub fn begin_drag(&mut self) -> bool {
        match self.edit.gizmo_mut() {
            Some(gizmo) => {
                gizmo.dragging = true;
                true
            }
            None => false,
        }
    }

    /// Applies a live gizmo delta to the selected node, in its parent's space.
    ///
    /// Translate adds `amount`, rotate applies it as XYZ Euler angles about the
    /// node's own axes, scale multiplies component-wise.
    pub fn drag(&mut self, amount: Vec3) -> bool {
        let Some(gizmo) = self.edit.gizmo().copied().filter(|g| g.dragging) else {
            return false;
        };
        let target = gizmo.target;
        match gizmo.mode {
            GizmoMode::Translate => {
                self.scene.node(target).translate(amount);
            }
            GizmoMode::Rotate => {
                self.scene
                    .node(target)
                    .rotate_local(Quat::from_euler(EulerRot::XYZ, amount.x, amount.y, amount.z));
            }
            GizmoMode::Scale => {
                let scale = self.scene.get_node(target).map_or(Vec3::ONE, |n| n.transform.scale);
                self.scene.node(target).set_scale(scale * amount);
            }
        }
        self.request_redraw();
        true
    }

    /// Releases the gizmo, flushes matrices and commits a snapshot.
    pub fn end_drag(&mut self) -> bool {
        let Some(gizmo) = self.edit.gizmo_mut().filter(|g| g.dragging) else {
            return false;
        };
        gizmo.dragging = false;
        self.scene.update_matrix_world();
        self.commit_with(TRANSFORM_ACTION, None);
        true
    }

    /// Detaches the selected node, recording where it was so undo can put it back.
    pub fn delete_selection(&mut self) -> bool {
        let Some(node) = self.edit.selected() else {
            log::warn!("No object selected to delete");
            return false;
        };
        let parent = self.scene.parent_of(node);
        let index = match parent {
            Some(p) => self.scene.child_index(p, node).unwrap_or(0),
            None => 0,
        };
        let instance = self.slots.find_by_wrapper(node).cloned();
        let name = match self.scene.name(node) {
            "" => "object".to_string(),
            name => name.to_string(),
        };

        self.commit_with(
            &format!("Delete {name}"),
            Some(DeletionRecord {
                node,
                parent,
                index,
                instance: instance.clone(),
            }),
        );

        self.scene.detach(node);
        if let Some(instance) = instance {
            self.slots.take(instance.slot);
        }
        self.edit.clear_selection();
        self.mark_changed();
        log::info!("Deleted {name}");
        true
    }

    /// Handles an editor shortcut. Returns whether the key was consumed.
    pub fn handle_key(&mut self, press: KeyPress) -> bool {
        if press.ctrl {
            return match press.key {
                Key::Char('z' | 'Z') if press.shift => self.redo(),
                Key::Char('z' | 'Z') => self.undo(),
                Key::Char('y' | 'Y') => self.redo(),
                _ => false,
            };
        }
        if self.edit.selected().is_none() {
            return false;
        }
        match press.key {
            Key::Char(c) => match c.to_ascii_lowercase() {
                'g' => self.set_gizmo_mode(GizmoMode::Translate),
                'r' => self.set_gizmo_mode(GizmoMode::Rotate),
                's' => self.set_gizmo_mode(GizmoMode::Scale),
                _ => false,
            },
            Key::Delete | Key::Backspace => self.delete_selection(),
        }
    }

    /// Moves a slot's wearable by `amount` along a world axis.
    pub fn nudge(&mut self, slot: Slot, direction: NudgeDirection, amount: f32) -> bool {
        let Some(wrapper) = self.slots.get(slot).map(|i| i.wrapper) else {
            log::warn!("No {slot} loaded to move");
            return false;
        };
        let step = direction.vector() * amount;

        match self.scene.parent_of(wrapper) {
            Some(parent) => {
                let target = self.scene.world_position(wrapper) + step;
                let local = self.scene.world_matrix(parent).inverse().transform_point3(target);
                self.scene.node(wrapper).set_position(local);
            }
            None => {
                self.scene.node(wrapper).translate(step);
            }
        }
        self.scene.update_subtree(wrapper);
        self.persist_pending = true;
        self.request_redraw();
        true
    }

    /// Rotates a slot's wearable by adding `amount` (default a quarter turn) to one Euler angle.
    pub fn rotate_wearable(&mut self, slot: Slot, axis: RotationAxis, amount: Option<f32>) -> bool {
        let Some(wrapper) = self.slots.get(slot).map(|i| i.wrapper) else {
            log::warn!("No {slot} loaded to rotate");
            return false;
        };
        let Some(mut euler) = self.scene.get_node(wrapper).map(|n| n.transform.rotation_euler()) else {
            return false;
        };
        let amount = amount.unwrap_or(FRAC_PI_2);
        match axis {
            RotationAxis::X => euler.x += amount,
            RotationAxis::Y | RotationAxis::Turn => euler.y += amount,
            RotationAxis::Z => euler.z += amount,
            RotationAxis::Flip => euler.y += PI,
        }
        self.scene.node(wrapper).set_rotation_euler(euler);
        self.scene.update_subtree(wrapper);
        self.persist_pending = true;
        self.request_redraw();
        true
    }
}
