//! Edit session and history tests
//!
//! Tests for:
//! - History bound and cursor movement through the avatar state
//! - Undo/redo of gizmo drags
//! - Deletion of wearables and parts, and restoring them
//! - Picking, selection listing and keyboard shortcuts
//! - Nudge and rotate helpers

mod common;

use std::f32::consts::PI;

use common::{base_model, eyes_model, hat_model, vec3_approx};
use glam::Vec3;
use outfitter::scene::{NodeHandle, Prefab, Ray};
use outfitter::wardrobe::{
    AvatarState, EditSession, GizmoMode, Key, KeyPress, NudgeDirection, RotationAxis, SelectionTarget, Slot,
    SubstringBoneResolver, WardrobeConfig,
};

// ============================================================================
// Helpers
// ============================================================================

fn load(state: &mut AvatarState, config: &WardrobeConfig, slot: Slot, name: &str, prefab: &Prefab) {
    let resolver = SubstringBoneResolver::default();
    let ticket = state.begin_slot_load(slot).unwrap();
    state.finish_slot_load(ticket, name, prefab, config, &resolver);
}

fn dressed(history_limit: usize) -> AvatarState {
    let config = WardrobeConfig {
        history_limit,
        ..WardrobeConfig::default()
    };
    let resolver = SubstringBoneResolver::default();
    let mut state = AvatarState::new(history_limit);
    let ticket = state.begin_base_load();
    state.finish_base_load(ticket, "OG", &base_model("Head"), false, &config, &resolver);
    load(&mut state, &config, Slot::Hat, "Crown", &hat_model());
    load(&mut state, &config, Slot::Eyes, "Shades", &eyes_model());
    state
}

fn wrapper(state: &AvatarState, slot: Slot) -> NodeHandle {
    state.instance(slot).unwrap().wrapper
}

fn position(state: &AvatarState, node: NodeHandle) -> Vec3 {
    state.scene().get_node(node).unwrap().transform.position
}

fn drag_selected(state: &mut AvatarState, amount: Vec3) {
    assert!(state.begin_drag());
    assert!(state.drag(amount));
    assert!(state.end_drag());
}

// ============================================================================
// History bound
// ============================================================================

#[test]
fn history_keeps_the_most_recent_fifty() {
    let mut state = dressed(50);
    state.set_edit_mode(true);
    for i in 0..59 {
        state.commit_snapshot(&format!("Edit {i}"));
    }

    let history = state.history();
    assert_eq!(history.len(), 50);
    assert_eq!(history.index(), 49);
    assert_eq!(history.current().unwrap().action, "Edit 58");
    assert!(!history.can_redo());
}

#[test]
fn entering_edit_mode_records_a_baseline_once() {
    let mut state = dressed(50);
    state.set_edit_mode(true);
    state.set_edit_mode(false);
    state.set_edit_mode(true);
    assert_eq!(state.history().len(), 1);
    assert!(!state.undo());
}

// ============================================================================
// Undo / redo of transforms
// ============================================================================

#[test]
fn undo_restores_previous_snapshot_and_redo_reapplies() {
    let mut state = dressed(50);
    let hat = wrapper(&state, Slot::Hat);
    let start = position(&state, hat);

    state.set_edit_mode(true);
    assert!(state.select(SelectionTarget::Group(Slot::Hat)));
    drag_selected(&mut state, Vec3::new(0.5, 0.0, 0.0));
    let moved = position(&state, hat);
    assert!(vec3_approx(moved, start + Vec3::new(0.5, 0.0, 0.0)));

    assert!(state.undo());
    assert!(vec3_approx(position(&state, hat), start));
    assert!(state.redo());
    assert!(vec3_approx(position(&state, hat), moved));
    assert!(!state.redo());
}

#[test]
fn rotate_and_scale_drags_are_undoable() {
    let mut state = dressed(50);
    let eyes = wrapper(&state, Slot::Eyes);
    state.set_edit_mode(true);
    state.select(SelectionTarget::Group(Slot::Eyes));

    state.set_gizmo_mode(GizmoMode::Scale);
    drag_selected(&mut state, Vec3::splat(2.0));
    assert!(vec3_approx(state.scene().get_node(eyes).unwrap().transform.scale, Vec3::splat(2.0)));

    state.set_gizmo_mode(GizmoMode::Rotate);
    let before = state.scene().get_node(eyes).unwrap().transform.rotation;
    drag_selected(&mut state, Vec3::new(0.0, 0.3, 0.0));
    let after = state.scene().get_node(eyes).unwrap().transform.rotation;
    assert!((before.angle_between(after) - 0.3).abs() < 1e-4);

    state.undo();
    state.undo();
    assert!(vec3_approx(state.scene().get_node(eyes).unwrap().transform.scale, Vec3::ONE));
}

#[test]
fn drag_without_selection_is_ignored() {
    let mut state = dressed(50);
    state.set_edit_mode(true);
    assert!(!state.begin_drag());
    assert!(!state.drag(Vec3::ONE));
    assert!(!state.end_drag());
}

#[test]
fn leaving_edit_mode_commits_the_selection() {
    let mut state = dressed(50);
    state.set_edit_mode(true);
    state.select(SelectionTarget::Group(Slot::Hat));
    state.set_edit_mode(false);

    assert!(!state.is_editing());
    assert!(state.selected().is_none());
    assert_eq!(state.history().len(), 2);
    assert!(state.selectable_objects().is_empty());
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn deleting_hat_then_undo_restores_it_in_place() {
    let mut state = dressed(50);
    let hat = wrapper(&state, Slot::Hat);
    let head = state.scene().parent_of(hat).unwrap();
    let index = state.scene().child_index(head, hat).unwrap();
    let start = position(&state, hat);

    state.set_edit_mode(true);
    state.select(SelectionTarget::Group(Slot::Hat));
    assert!(state.delete_selection());

    assert!(state.instance(Slot::Hat).is_none());
    assert!(state.selected().is_none());
    assert!(state.scene().contains(hat));
    assert!(!state.scene().is_attached(hat));
    assert_eq!(state.history().current().unwrap().action, "Delete Hat:Crown");

    assert!(state.undo());
    assert_eq!(wrapper(&state, Slot::Hat), hat);
    assert_eq!(state.scene().parent_of(hat), Some(head));
    assert_eq!(state.scene().child_index(head, hat), Some(index));
    assert!(vec3_approx(position(&state, hat), start));

    assert!(state.redo());
    assert!(state.instance(Slot::Hat).is_none());
    assert!(!state.scene().is_attached(hat));
}

#[test]
fn deleting_a_part_then_undo_reinserts_at_index() {
    let mut state = dressed(50);
    let hat = wrapper(&state, Slot::Hat);
    let brim = state.scene().children_of(hat)[1];

    state.set_edit_mode(true);
    assert!(state.select(SelectionTarget::Part(Slot::Hat, 1)));
    assert_eq!(state.selected(), Some(brim));
    assert!(state.delete_selection());
    assert_eq!(state.scene().children_of(hat).len(), 1);
    assert!(state.instance(Slot::Hat).is_some());

    state.undo();
    assert_eq!(state.scene().child_index(hat, brim), Some(1));
}

#[test]
fn undo_does_not_overwrite_a_reoccupied_slot() {
    let config = WardrobeConfig::default();
    let mut state = dressed(50);
    let old_hat = wrapper(&state, Slot::Hat);
    state.set_edit_mode(true);
    state.select(SelectionTarget::Group(Slot::Hat));
    state.delete_selection();

    load(&mut state, &config, Slot::Hat, "Halo", &hat_model());
    let new_hat = wrapper(&state, Slot::Hat);
    state.undo();

    assert_eq!(wrapper(&state, Slot::Hat), new_hat);
    assert!(!state.scene().is_attached(old_hat));
}

#[test]
fn evicted_deletions_are_destroyed() {
    let mut state = dressed(3);
    let hat = wrapper(&state, Slot::Hat);
    state.set_edit_mode(true);
    state.select(SelectionTarget::Group(Slot::Hat));
    state.delete_selection();

    state.commit_snapshot("Edit 1");
    assert!(state.scene().contains(hat));
    state.commit_snapshot("Edit 2");
    state.commit_snapshot("Edit 3");

    assert_eq!(state.history().len(), 3);
    assert!(!state.scene().contains(hat));
}

#[test]
fn discarded_redo_branch_keeps_restored_nodes() {
    let mut state = dressed(50);
    let hat = wrapper(&state, Slot::Hat);
    state.set_edit_mode(true);
    state.select(SelectionTarget::Group(Slot::Hat));
    state.delete_selection();
    state.undo();

    state.commit_snapshot("Edit");
    assert!(!state.history().can_redo());
    assert!(state.scene().contains(hat));
    assert_eq!(wrapper(&state, Slot::Hat), hat);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn selection_requires_edit_mode_and_a_wearable() {
    let mut state = dressed(50);
    assert!(!state.select(SelectionTarget::Group(Slot::Hat)));

    state.set_edit_mode(true);
    assert_eq!(*state.edit_session(), EditSession::Active(None));
    let root = state.base_model().unwrap().root;
    assert!(!state.select_node(root));
    assert!(!state.select(SelectionTarget::Group(Slot::Shirt)));
    assert!(!state.select(SelectionTarget::Part(Slot::Hat, 7)));
    assert!(state.select(SelectionTarget::Group(Slot::Hat)));
    assert_eq!(state.gizmo().unwrap().mode, GizmoMode::Translate);
}

#[test]
fn selectable_objects_list_groups_and_parts() {
    let mut state = dressed(50);
    state.set_edit_mode(true);

    let labels: Vec<&str> = state.selectable_objects().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Hat (Group)", "Hat: Crown", "Hat: Brim", "Eyes (Group)", "Eyes: Frame", "Eyes: Lens"]
    );
    let values: Vec<String> = state.selectable_objects().iter().map(|e| e.target.to_string()).collect();
    assert_eq!(values[..3], ["hat", "hat_0", "hat_1"]);

    state.remove_wearable(Slot::Eyes);
    assert_eq!(state.selectable_objects().len(), 3);
}

#[test]
fn pick_selects_hit_mesh_or_whole_group() {
    let mut state = dressed(50);
    state.remove_wearable(Slot::Eyes);
    let hat = wrapper(&state, Slot::Hat);
    let crown = state.scene().children_of(hat)[0];
    let target = state.scene().world_position(crown);
    let ray = Ray::new(target + Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);

    assert_eq!(state.pick(&ray, false), None);

    state.set_edit_mode(true);
    let hit = state.pick(&ray, false).unwrap();
    assert_eq!(state.scene().parent_of(hit), Some(hat));
    assert_eq!(state.selected(), Some(hit));

    assert_eq!(state.pick(&ray, true), Some(hat));
    let commits = state.history().len();

    let miss = Ray::new(Vec3::splat(100.0), Vec3::X);
    assert_eq!(state.pick(&miss, false), None);
    assert!(state.selected().is_none());
    assert_eq!(state.history().len(), commits + 1);
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn keyboard_shortcuts_drive_the_session() {
    let mut state = dressed(50);
    let hat = wrapper(&state, Slot::Hat);
    state.set_edit_mode(true);

    assert!(!state.handle_key(KeyPress::char('r')));
    state.select(SelectionTarget::Group(Slot::Hat));
    assert!(state.handle_key(KeyPress::char('R')));
    assert_eq!(state.gizmo().unwrap().mode, GizmoMode::Rotate);
    assert!(state.handle_key(KeyPress::char('s')));
    assert_eq!(state.gizmo().unwrap().mode, GizmoMode::Scale);
    assert!(!state.handle_key(KeyPress::char('x')));

    assert!(state.handle_key(KeyPress::new(Key::Backspace)));
    assert!(state.instance(Slot::Hat).is_none());

    assert!(state.handle_key(KeyPress::char('z').with_ctrl()));
    assert_eq!(wrapper(&state, Slot::Hat), hat);
    assert!(state.handle_key(KeyPress::char('z').with_ctrl().with_shift()));
    assert!(state.instance(Slot::Hat).is_none());
    assert!(state.handle_key(KeyPress::char('z').with_ctrl()));
    assert!(state.handle_key(KeyPress::char('y').with_ctrl()));
    assert!(state.instance(Slot::Hat).is_none());
}

// ============================================================================
// Nudge / rotate
// ============================================================================

#[test]
fn nudge_moves_in_world_space() {
    let mut state = dressed(50);
    let hat = wrapper(&state, Slot::Hat);
    let before = state.scene().world_position(hat);

    assert!(state.nudge(Slot::Hat, NudgeDirection::Up, 0.05));
    assert!(vec3_approx(state.scene().world_position(hat), before + Vec3::new(0.0, 0.05, 0.0)));

    assert!(state.nudge(Slot::Hat, "forward".parse().unwrap(), 0.1));
    assert!(vec3_approx(state.scene().world_position(hat), before + Vec3::new(0.0, 0.05, -0.1)));

    assert!(!state.nudge(Slot::Shirt, NudgeDirection::Left, 0.05));
}

#[test]
fn rotate_helpers_add_to_euler_angles() {
    let mut state = dressed(50);
    let eyes = wrapper(&state, Slot::Eyes);
    state.scene_mut().node(eyes).set_rotation(glam::Quat::IDENTITY);

    assert!(state.rotate_wearable(Slot::Eyes, RotationAxis::X, Some(0.25)));
    let euler = state.scene().get_node(eyes).unwrap().transform.rotation_euler();
    assert!(vec3_approx(euler, Vec3::new(0.25, 0.0, 0.0)));

    state.scene_mut().node(eyes).set_rotation(glam::Quat::IDENTITY);
    assert!(state.rotate_wearable(Slot::Eyes, RotationAxis::Flip, Some(0.1)));
    let rotation = state.scene().get_node(eyes).unwrap().transform.rotation;
    assert!((rotation.angle_between(glam::Quat::IDENTITY) - PI).abs() < 1e-4);

    assert!(!state.rotate_wearable(Slot::Shirt, RotationAxis::Turn, None));
}
