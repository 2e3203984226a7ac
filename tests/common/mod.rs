//! Shared fixtures: procedurally built models, an in-memory asset source and
//! approximate comparisons.

#![allow(dead_code)]

use std::time::Duration;

use glam::{Quat, Vec3};
use outfitter::assets::MemoryAssetSource;
use outfitter::scene::{BoundingBox, Mesh, Prefab, PrefabNode, PrimitiveShape, Transform};
use outfitter::wardrobe::{Category, StaggerConfig, Wardrobe, WardrobeConfig};

// ============================================================================
// Comparisons
// ============================================================================

pub const EPSILON: f32 = 1e-4;

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

pub fn quat_approx(a: Quat, b: Quat) -> bool {
    a.normalize().angle_between(b.normalize()) < EPSILON * 10.0
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Models
// ============================================================================

/// Uniform scale the default framing applies to [`base_model`].
pub const BASE_FRAMING_SCALE: f32 = 2.0 / 1.8;

fn translated(position: Vec3) -> Transform {
    Transform::from_trs(position, Quat::IDENTITY, Vec3::ONE)
}

/// Rigged character: `Body` and `Tail` meshes and an `Armature` with
/// `Spine` > `<head_name>` bones. The body is 1.8 tall and stands on y = 0.
pub fn base_model(head_name: &str) -> Prefab {
    let mut prefab = Prefab::new();
    let root = prefab.add_root(PrefabNode::named("Otter"));
    prefab.add_child(
        root,
        PrefabNode::named("Body")
            .with_mesh(Mesh::new(
                500,
                BoundingBox::new(Vec3::new(-0.5, 0.0, -0.3), Vec3::new(0.5, 1.8, 0.3)),
            ))
            .with_skin(0),
    );
    prefab.add_child(
        root,
        PrefabNode::named("Tail").with_mesh(Mesh::new(
            200,
            BoundingBox::new(Vec3::new(-0.1, 0.2, -1.0), Vec3::new(0.1, 0.4, 0.0)),
        )),
    );
    let armature = prefab.add_child(root, PrefabNode::named("Armature"));
    let spine = prefab.add_child(armature, PrefabNode::named("Spine").with_transform(translated(Vec3::new(0.0, 0.8, 0.0))));
    let head = prefab.add_child(spine, PrefabNode::named(head_name).with_transform(translated(Vec3::new(0.0, 0.7, 0.0))));
    prefab.add_skeleton("Armature", vec![spine, head]);
    prefab
}

/// Base model whose bones contain no "head".
pub fn headless_model() -> Prefab {
    base_model("Neck")
}

/// Hat asset authored on top of a body copy, with a placeholder subtree.
pub fn hat_model() -> Prefab {
    let mut prefab = Prefab::new();
    let root = prefab.add_root(
        PrefabNode::named("HatRoot").with_transform(Transform::from_trs(
            Vec3::new(0.0, 2.0, 0.0),
            Quat::from_rotation_y(0.5),
            Vec3::splat(0.5),
        )),
    );
    let unit = BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5));
    prefab.add_child(root, PrefabNode::named("Crown").with_mesh(Mesh::new(120, unit)));
    prefab.add_child(
        root,
        PrefabNode::named("Brim")
            .with_transform(translated(Vec3::new(0.0, -0.4, 0.0)))
            .with_mesh(Mesh::new(64, unit)),
    );
    prefab.add_child(root, PrefabNode::named("Body_Copy").with_mesh(Mesh::new(500, unit)));
    prefab.add_child(root, PrefabNode::named("EyeLeft").with_mesh(Mesh::new(40, unit)));
    let placeholder = prefab.add_child(root, PrefabNode::named("Placeholder"));
    prefab.add_child(placeholder, PrefabNode::named("Guide").with_mesh(Mesh::new(8, unit)));
    prefab
}

/// Shirt asset with a skinned garment, a curve, a primitive and a copy of the base model's tail.
pub fn shirt_model() -> Prefab {
    let mut prefab = Prefab::new();
    let root = prefab.add_root(PrefabNode::named("ShirtScene"));
    let rig = prefab.add_child(root, PrefabNode::named("ShirtBone"));
    prefab.add_child(
        root,
        PrefabNode::named("Shirt")
            .with_mesh(Mesh::new(
                300,
                BoundingBox::new(Vec3::new(-0.6, 0.6, -0.35), Vec3::new(0.6, 1.4, 0.35)),
            ))
            .with_skin(0),
    );
    prefab.add_child(
        root,
        PrefabNode::named("EyeletTrim").with_mesh(Mesh::lines(
            16,
            BoundingBox::new(Vec3::new(-0.6, 1.4, -0.35), Vec3::new(0.6, 1.4, 0.35)),
        )),
    );
    prefab.add_child(
        root,
        PrefabNode::named("Button").with_mesh(
            Mesh::new(32, BoundingBox::new(Vec3::splat(-0.05), Vec3::splat(0.05))).with_shape(PrimitiveShape::Sphere),
        ),
    );
    prefab.add_child(
        root,
        PrefabNode::named("Tail")
            .with_transform(Transform::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::splat(BASE_FRAMING_SCALE)))
            .with_mesh(Mesh::new(
                204,
                BoundingBox::new(Vec3::new(-0.1, 0.2, -1.0), Vec3::new(0.1, 0.4, 0.0)),
            )),
    );
    prefab.add_skeleton("ShirtRig", vec![rig]);
    prefab
}

pub fn eyes_model() -> Prefab {
    let mut prefab = Prefab::new();
    let root = prefab.add_root(PrefabNode::named("Glasses"));
    let lens = BoundingBox::new(Vec3::new(-0.1, -0.05, 0.0), Vec3::new(0.1, 0.05, 0.02));
    prefab.add_child(root, PrefabNode::named("Frame").with_mesh(Mesh::new(80, lens)));
    prefab.add_child(
        root,
        PrefabNode::named("Lens").with_transform(translated(Vec3::new(0.0, 0.0, 0.01))).with_mesh(Mesh::new(24, lens)),
    );
    prefab
}

// ============================================================================
// Wardrobe
// ============================================================================

/// Default config without stagger delays or minimum loading display.
pub fn fast_config() -> WardrobeConfig {
    let mut config = WardrobeConfig::default();
    config.min_loading_display_ms = 0;
    config.randomize.stagger = StaggerConfig::new(0, 0, 0);
    config.trait_stagger = StaggerConfig::new(0, 0, 0);
    config
}

/// Registers every catalog entry of `config` with a fixture model.
pub fn populated_source(config: &WardrobeConfig) -> MemoryAssetSource {
    let source = MemoryAssetSource::new();
    for fur in config.catalog.options(Category::Fur) {
        source.insert_prefab(&config.asset_path(Category::Fur, fur), base_model("Head"));
    }
    for hat in config.catalog.options(Category::Hat) {
        source.insert_prefab(&config.asset_path(Category::Hat, hat), hat_model());
    }
    for shirt in config.catalog.options(Category::Shirt) {
        source.insert_prefab(&config.asset_path(Category::Shirt, shirt), shirt_model());
    }
    for eyes in config.catalog.options(Category::Eyes) {
        source.insert_prefab(&config.asset_path(Category::Eyes, eyes), eyes_model());
    }
    source
}

pub fn wardrobe() -> Wardrobe<MemoryAssetSource> {
    init_logger();
    let config = fast_config();
    let source = populated_source(&config);
    Wardrobe::new(source, config)
}

pub fn wardrobe_with_latency(latency: Duration) -> Wardrobe<MemoryAssetSource> {
    init_logger();
    let config = fast_config();
    let source = populated_source(&config).with_latency(latency);
    Wardrobe::new(source, config)
}

pub fn metadata_json(attributes: &[(&str, &str)]) -> String {
    let attributes: Vec<serde_json::Value> = attributes
        .iter()
        .map(|(trait_type, value)| serde_json::json!({ "trait_type": trait_type, "value": value }))
        .collect();
    serde_json::json!({ "name": "Otter", "attributes": attributes }).to_string()
}
