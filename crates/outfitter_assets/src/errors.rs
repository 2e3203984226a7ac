//! Error Types
//!
//! [`AssetError`] covers every way fetching or decoding an asset can fail.
//! All fallible APIs in this crate return [`Result<T>`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// No asset exists at the requested location.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The asset root or URI could not be interpreted.
    #[error("Invalid asset URI: {0}")]
    InvalidUri(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // HTTP & Network Errors
    // ========================================================================
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status} for {url}")]
    HttpResponse {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// glTF parsing error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Platform Errors
    // ========================================================================
    /// Feature not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl From<gltf::Error> for AssetError {
    fn from(err: gltf::Error) -> Self {
        AssetError::Gltf(err.to_string())
    }
}

impl AssetError {
    /// Whether the failure means "nothing at that location" rather than a broken asset.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            Self::HttpResponse { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Alias for `Result<T, AssetError>`.
pub type Result<T> = std::result::Result<T, AssetError>;
