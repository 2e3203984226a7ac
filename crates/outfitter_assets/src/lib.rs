//! Asset I/O for the Outfitter avatar builder.
//!
//! - [`io`]: byte readers for local files and (with the `http` feature) HTTP roots.
//! - [`loaders`]: glTF / GLB import into [`Prefab`](outfitter_scene::Prefab)s.
//! - [`source`]: the [`AssetSource`] seam the wardrobe loads through, with a
//!   caching [`AssetServer`] and an in-memory [`MemoryAssetSource`].

pub mod errors;
pub mod io;
pub mod loaders;
pub mod source;

pub use errors::{AssetError, Result};
pub use io::{AssetReader, AssetReaderVariant, FileAssetReader};
#[cfg(feature = "http")]
pub use io::HttpAssetReader;
pub use loaders::GltfLoader;
pub use source::{AssetServer, AssetSource, MemoryAssetSource};
