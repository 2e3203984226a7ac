//! Error Types
//!
//! [`WardrobeError`] is returned for the two user-visible failure classes:
//! an asset that could not be fetched or parsed, and invalid input rejected
//! before any load starts. Everything else (missing bones, a failed slot in a
//! batch, undo past the ends of history) is logged and absorbed.

use outfitter_assets::AssetError;
use thiserror::Error;

use crate::catalog::Category;

#[derive(Error, Debug)]
pub enum WardrobeError {
    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// A model could not be fetched or parsed. Aborts that one load only.
    #[error(
        "Error loading {name}.glb from {path}: {source}. Make sure the file exists in the {folder} folder and the asset root is being served correctly"
    )]
    AssetLoad {
        name: String,
        path: String,
        folder: String,
        #[source]
        source: AssetError,
    },

    /// Token metadata could not be fetched or decoded.
    #[error("Could not load metadata for #{id} from {path}: {source}")]
    Metadata {
        id: u32,
        path: String,
        #[source]
        source: AssetError,
    },

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The requested option is not in the catalog.
    #[error("{category} \"{name}\" not found in available options")]
    UnknownOption { category: Category, name: String },

    /// Token ID outside the collection.
    #[error("Please enter a valid number between 1 and {max} (got {id})")]
    InvalidTokenId { id: u32, max: u32 },

    /// Metadata without a fur trait cannot produce an avatar.
    #[error("No Fur trait found in metadata for #{id}")]
    MissingFurTrait { id: u32 },

    /// A wearable load was requested before any base model exists.
    #[error("Please load a base model first")]
    NoBaseModel,

    /// Unparseable direction, axis, slot or selection value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // Configuration & Storage Errors
    // ========================================================================
    /// JSON (de)serialization error for config or persisted positions.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Alias for `Result<T, WardrobeError>`.
pub type Result<T> = std::result::Result<T, WardrobeError>;
