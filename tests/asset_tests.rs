//! Asset source tests
//!
//! Tests for:
//! - `AssetServer` over a local directory: caching, missing files, raw bytes
//! - Reader selection from the asset root string
//! - A full wardrobe load from glTF files on disk

mod common;

use std::path::{Path, PathBuf};

use common::init_logger;
use outfitter::assets::{AssetReaderVariant, AssetServer, AssetSource, FileAssetReader};
use outfitter::wardrobe::{AttachResult, Category, LoadOutcome, Slot, Wardrobe, WardrobeConfig};

const FUR_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [
        { "name": "Otter", "children": [1, 2] },
        { "name": "Body", "mesh": 0, "skin": 0 },
        { "name": "Armature", "children": [3] },
        { "name": "Spine", "translation": [0.0, 0.8, 0.0], "children": [4] },
        { "name": "Head", "translation": [0.0, 0.7, 0.0] }
    ],
    "skins": [{ "name": "Rig", "joints": [3, 4] }],
    "meshes": [{ "name": "BodyMesh", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
    "accessors": [{
        "componentType": 5126, "count": 500, "type": "VEC3",
        "min": [-0.5, 0.0, -0.3], "max": [0.5, 1.8, 0.3]
    }]
}"#;

const HAT_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [
        { "name": "HatRoot", "translation": [0.0, 2.0, 0.0], "children": [1, 2] },
        { "name": "Visor", "mesh": 0 },
        { "name": "Body", "mesh": 0 }
    ],
    "meshes": [{ "name": "VisorMesh", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
    "accessors": [{
        "componentType": 5126, "count": 96, "type": "VEC3",
        "min": [-0.3, 0.0, -0.3], "max": [0.3, 0.1, 0.3]
    }]
}"#;

/// Temporary asset root laid out like the collection's web root.
struct AssetDir(PathBuf);

impl AssetDir {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("outfitter-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        Self(root)
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.0.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for AssetDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// ============================================================================
// AssetServer
// ============================================================================

#[tokio::test]
async fn server_parses_and_caches_prefabs() -> anyhow::Result<()> {
    let dir = AssetDir::new("cache");
    dir.write("WEARABLES/Furs/OG.glb", FUR_GLTF);
    let server = AssetServer::new(FileAssetReader::new(dir.path()));

    let first = server.load_prefab("WEARABLES/Furs/OG.glb").await?;
    let second = server.load_prefab("WEARABLES/Furs/OG.glb").await?;
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(server.cached_prefabs(), 1);
    assert_eq!(first.nodes.len(), 5);
    assert_eq!(first.skeletons[0].bone_indices, vec![3, 4]);

    server.clear_cache();
    assert_eq!(server.cached_prefabs(), 0);
    Ok(())
}

#[tokio::test]
async fn server_resolves_percent_encoded_names() -> anyhow::Result<()> {
    let dir = AssetDir::new("encoded");
    dir.write("WEARABLES/Hats/Helmet Green.glb", HAT_GLTF);
    let server = AssetServer::new(FileAssetReader::new(dir.path()));

    let prefab = server.load_prefab("WEARABLES/Hats/Helmet%20Green.glb").await?;
    assert_eq!(prefab.nodes[0].name.as_deref(), Some("HatRoot"));
    Ok(())
}

#[tokio::test]
async fn server_reports_missing_and_broken_assets() {
    let dir = AssetDir::new("broken");
    dir.write("WEARABLES/Eyes/Broken.glb", "{ this is not gltf");
    let server = AssetServer::new(FileAssetReader::new(dir.path()));

    let err = server.load_prefab("WEARABLES/Eyes/Missing.glb").await.unwrap_err();
    assert!(err.is_not_found());

    let err = server.load_prefab("WEARABLES/Eyes/Broken.glb").await.unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(server.cached_prefabs(), 0);
}

#[tokio::test]
async fn server_reads_raw_bytes() -> anyhow::Result<()> {
    let dir = AssetDir::new("bytes");
    dir.write("metadata/5.json", r#"{"attributes":[]}"#);
    let server = AssetServer::new(FileAssetReader::new(dir.path()));

    let bytes = server.read_bytes("metadata/5.json").await?;
    assert_eq!(bytes, br#"{"attributes":[]}"#);
    Ok(())
}

#[cfg(feature = "http")]
#[test]
fn reader_is_chosen_from_the_root() {
    let reader = AssetReaderVariant::from_source("./assets").unwrap();
    assert!(matches!(reader, AssetReaderVariant::File(_)));

    let reader = AssetReaderVariant::from_source("https://cdn.example.com/otters/").unwrap();
    assert!(matches!(reader, AssetReaderVariant::Http(_)));
}

// ============================================================================
// Wardrobe over files
// ============================================================================

#[tokio::test]
async fn wardrobe_loads_from_disk() -> anyhow::Result<()> {
    init_logger();
    let dir = AssetDir::new("wardrobe");
    let mut config = WardrobeConfig::default();
    config.min_loading_display_ms = 0;
    dir.write(&decoded(&config.asset_path(Category::Fur, "OG")), FUR_GLTF);
    dir.write(&decoded(&config.asset_path(Category::Hat, "Helmet Green")), HAT_GLTF);

    let server = AssetServer::from_source(&dir.path().to_string_lossy())?;
    let w = Wardrobe::new(server, config);
    w.load_base_model("OG", false).await?;
    let outcome = w.load_wearable(Slot::Hat, "Helmet Green").await?;

    let state = w.state();
    let root = state.base_model().unwrap().root;
    let head = state.scene().find_by_name(root, "Head").unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            attach: AttachResult::Attached(head),
            meshes: 1
        }
    );
    let hat = state.instance(Slot::Hat).unwrap().wrapper;
    let names: Vec<&str> = state.scene().children_of(hat).iter().map(|&h| state.scene().name(h)).collect();
    assert_eq!(names, vec!["Visor"]);
    Ok(())
}

fn decoded(uri: &str) -> String {
    uri.replace("%20", " ")
}
