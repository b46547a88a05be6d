//! # Playback Error Types

use crate::types::Origin;
use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors returned by [`PlaybackController`](crate::PlaybackController) commands.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Validation Errors
    // ========================================================================
    /// URL-origin path is not an http(s) location.
    #[error("Invalid stream URL: {path}")]
    UrlInvalid { path: String },

    /// RAW-origin path is not a numeric id, or no packaged resource has that id.
    #[error("Invalid raw resource id: {path}")]
    RawInvalid { path: String },

    /// ASSETS-origin path does not name an openable bundled asset.
    #[error("Invalid asset path: {path}")]
    AssetsInvalid { path: String },

    /// FILE_PATH-origin path does not exist.
    #[error("File not found: {path}")]
    FilePathInvalid { path: String },

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The source validated but the engine refused to bind or prepare it.
    #[error("Failed to bind {origin} source {path}: {source}")]
    SourceBind {
        origin: Origin,
        path: String,
        #[source]
        source: BridgeError,
    },

    /// Engine construction or a control call failed.
    #[error("Engine error: {0}")]
    Engine(#[from] BridgeError),

    /// The controller has been destroyed and accepts no further commands.
    #[error("Playback controller destroyed")]
    Destroyed,
}

impl PlaybackError {
    /// The validation error matching `origin`.
    pub fn invalid_source(origin: Origin, path: impl Into<String>) -> Self {
        let path = path.into();
        match origin {
            Origin::Url => PlaybackError::UrlInvalid { path },
            Origin::Raw => PlaybackError::RawInvalid { path },
            Origin::Assets => PlaybackError::AssetsInvalid { path },
            Origin::FilePath => PlaybackError::FilePathInvalid { path },
        }
    }

    /// Returns `true` if the request was rejected before any engine was touched.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::UrlInvalid { .. }
                | PlaybackError::RawInvalid { .. }
                | PlaybackError::AssetsInvalid { .. }
                | PlaybackError::FilePathInvalid { .. }
        )
    }

    /// The offending path, for errors tied to a request.
    pub fn path(&self) -> Option<&str> {
        match self {
            PlaybackError::UrlInvalid { path }
            | PlaybackError::RawInvalid { path }
            | PlaybackError::AssetsInvalid { path }
            | PlaybackError::FilePathInvalid { path }
            | PlaybackError::SourceBind { path, .. } => Some(path),
            PlaybackError::Engine(_) | PlaybackError::Destroyed => None,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
