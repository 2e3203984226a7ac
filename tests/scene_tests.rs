//! Scene graph tests
//!
//! Tests for:
//! - Hierarchy mutation: attach, insert-at, detach, remove
//! - Traversal order and name lookup
//! - World-pose queries and bounds
//! - Prefab instantiation with skins
//! - Ray picking

mod common;

use common::{base_model, vec3_approx};
use glam::{Quat, Vec2, Vec3};
use outfitter::scene::{BoundingBox, Mesh, Ray, Scene};

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn attach_moves_child_between_parents() {
    let mut scene = Scene::new();
    let a = scene.create_node_with_name("A");
    let b = scene.create_node_with_name("B");
    let child = scene.create_node_with_name("Child");

    scene.attach(child, a);
    scene.attach(child, b);

    assert!(scene.children_of(a).is_empty());
    assert_eq!(scene.children_of(b), &[child]);
    assert_eq!(scene.parent_of(child), Some(b));
}

#[test]
fn attach_rejects_cycles() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(child, parent);

    assert_eq!(scene.insert_child_at(parent, child, 0), None);
    assert_eq!(scene.insert_child_at(parent, parent, 0), None);
    assert_eq!(scene.parent_of(child), Some(parent));
    assert_eq!(scene.parent_of(parent), None);
}

#[test]
fn insert_child_at_clamps_index() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let first = scene.create_node();
    let second = scene.create_node();
    let late = scene.create_node();
    scene.attach(first, parent);
    scene.attach(second, parent);

    assert_eq!(scene.insert_child_at(late, parent, 1), Some(1));
    assert_eq!(scene.children_of(parent), &[first, late, second]);

    scene.detach(late);
    assert_eq!(scene.insert_child_at(late, parent, 99), Some(2));
    assert_eq!(scene.child_index(parent, late), Some(2));
}

#[test]
fn detach_reports_previous_position() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let a = scene.create_node();
    let b = scene.create_node();
    scene.attach(a, parent);
    scene.attach(b, parent);

    assert_eq!(scene.detach(b), Some((Some(parent), 1)));
    assert!(scene.contains(b));
    assert!(!scene.is_attached(b));
    assert_eq!(scene.detach(b), None);
}

#[test]
fn top_level_nodes_are_in_hierarchy() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let child = scene.create_node();
    scene.attach(child, root);
    assert!(!scene.is_in_hierarchy(child));

    scene.add_root(root);
    assert!(scene.is_in_hierarchy(child));
    assert_eq!(scene.detach(root), Some((None, 0)));
    assert!(!scene.is_in_hierarchy(child));
}

#[test]
fn remove_node_destroys_subtree_and_components() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Root");
    let child = scene.create_node_with_name("Child");
    scene.attach(child, root);
    scene.set_mesh(child, Mesh::new(3, BoundingBox::new(Vec3::ZERO, Vec3::ONE)));
    scene.add_root(root);

    scene.remove_node(root);

    assert!(!scene.contains(root));
    assert!(!scene.contains(child));
    assert!(scene.get_mesh(child).is_none());
    assert_eq!(scene.name(child), "");
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn traverse_is_depth_first_in_child_order() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("root");
    let a = scene.create_node_with_name("a");
    let a1 = scene.create_node_with_name("a1");
    let b = scene.create_node_with_name("b");
    scene.attach(a, root);
    scene.attach(b, root);
    scene.attach(a1, a);

    let names: Vec<&str> = scene.traverse(root).into_iter().map(|h| scene.name(h)).collect();
    assert_eq!(names, vec!["root", "a", "a1", "b"]);
    assert_eq!(scene.find_by_name(root, "a1"), Some(a1));
    assert_eq!(scene.find_by_name(root, "missing"), None);
}

// ============================================================================
// World transforms
// ============================================================================

#[test]
fn world_matrix_composes_ancestors() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(child, parent);
    scene
        .node(parent)
        .set_position(Vec3::new(1.0, 0.0, 0.0))
        .set_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
        .set_scale(Vec3::splat(2.0));
    scene.node(child).set_position(Vec3::new(0.0, 0.0, 1.0));

    let (scale, _, position) = scene.world_pose(child).unwrap();
    assert!(vec3_approx(position, Vec3::new(3.0, 0.0, 0.0)));
    assert!(vec3_approx(scale, Vec3::splat(2.0)));
}

#[test]
fn cached_world_matrix_follows_update() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let child = scene.create_node();
    scene.attach(child, root);
    scene.add_root(root);
    scene.node(root).set_position(Vec3::Y);
    scene.update_matrix_world();

    let cached = scene.get_node(child).unwrap().transform.world_matrix().translation;
    assert!(vec3_approx(Vec3::from(cached), Vec3::Y));
}

#[test]
fn world_bounds_unions_meshes() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let a = scene.create_node();
    let b = scene.create_node();
    scene.attach(a, root);
    scene.attach(b, root);
    let unit = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
    scene.set_mesh(a, Mesh::new(8, unit));
    scene.set_mesh(b, Mesh::new(8, unit));
    scene.node(b).set_position(Vec3::new(2.0, 0.0, 0.0));

    let bounds = scene.world_bounds(root);
    assert!(vec3_approx(bounds.min, Vec3::ZERO));
    assert!(vec3_approx(bounds.max, Vec3::new(3.0, 1.0, 1.0)));
    let fresh = scene.create_node();
    assert!(scene.world_bounds(fresh).is_empty());
}

// ============================================================================
// Prefab instantiation
// ============================================================================

#[test]
fn instantiate_builds_detached_named_tree() {
    let mut scene = Scene::new();
    let group = scene.instantiate(&base_model("Head"));

    assert!(!scene.is_attached(group));
    let otter = scene.find_by_name(group, "Otter").unwrap();
    assert_eq!(scene.parent_of(otter), Some(group));
    let names: Vec<&str> = scene.traverse(otter).into_iter().map(|h| scene.name(h)).collect();
    assert_eq!(names, vec!["Otter", "Body", "Tail", "Armature", "Spine", "Head"]);
}

#[test]
fn instantiate_registers_bones_and_skins() {
    let mut scene = Scene::new();
    let group = scene.instantiate(&base_model("Head"));

    let head = scene.find_by_name(group, "Head").unwrap();
    let armature = scene.find_by_name(group, "Armature").unwrap();
    let body = scene.find_by_name(group, "Body").unwrap();
    assert!(scene.is_bone(head));
    assert!(!scene.is_bone(armature));
    assert!(scene.get_mesh(body).unwrap().is_skinned());

    scene.remove_node(group);
    assert!(!scene.is_bone(head));
}

// ============================================================================
// Picking
// ============================================================================

#[test]
fn raycast_returns_nearest_hit() {
    let mut scene = Scene::new();
    let near = scene.create_node();
    let far = scene.create_node();
    let unit = BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5));
    scene.set_mesh(near, Mesh::new(8, unit));
    scene.set_mesh(far, Mesh::new(8, unit));
    scene.node(near).set_position(Vec3::new(0.0, 0.0, -2.0));
    scene.node(far).set_position(Vec3::new(0.0, 0.0, -5.0));

    let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
    let (hit, distance) = scene.raycast(&ray, &[far, near]).unwrap();
    assert_eq!(hit, near);
    assert!((distance - 1.5).abs() < 1e-4);

    let miss = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
    assert!(scene.raycast(&miss, &[far, near]).is_none());
}

#[test]
fn ray_from_ndc_points_into_the_screen() {
    let projection = glam::Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
    let view = glam::Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let ray = Ray::from_ndc(Vec2::ZERO, projection * view).unwrap();
    assert!(vec3_approx(ray.direction, Vec3::NEG_Z));
}
