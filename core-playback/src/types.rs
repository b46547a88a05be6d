//! # Playback Types
//!
//! Requests the controller accepts and the status snapshots it emits.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Requests
// ============================================================================

/// Where an audio source's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Remote http(s) stream.
    Url,
    /// Packaged resource addressed by a numeric id.
    Raw,
    /// Bundled asset addressed by a path relative to the asset root.
    Assets,
    /// Local filesystem path.
    FilePath,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Url => "URL",
            Origin::Raw => "RAW",
            Origin::Assets => "ASSETS",
            Origin::FilePath => "FILE_PATH",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable item.
///
/// Two requests are the same track when path, origin and title all match;
/// the controller uses this to tell "resume" from "switch track".
///
/// # Example
///
/// ```rust
/// use core_playback::{AudioRequest, Origin};
///
/// let request = AudioRequest::url("https://cdn.example.com/a.mp3").with_title("Intro");
/// assert_eq!(request.origin(), Origin::Url);
/// assert_eq!(request.title(), Some("Intro"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioRequest {
    path: String,
    origin: Origin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl AudioRequest {
    pub fn new(path: impl Into<String>, origin: Origin) -> Self {
        Self {
            path: path.into(),
            origin,
            title: None,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(url, Origin::Url)
    }

    /// Packaged resource by numeric id.
    pub fn raw(id: u32) -> Self {
        Self::new(id.to_string(), Origin::Raw)
    }

    pub fn asset(path: impl Into<String>) -> Self {
        Self::new(path, Origin::Assets)
    }

    pub fn file_path(path: impl Into<String>) -> Self {
        Self::new(path, Origin::FilePath)
    }

    /// Attach a display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

// ============================================================================
// Status
// ============================================================================

/// Playback state carried by a [`PlaybackStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayState {
    Play,
    Pause,
    Stop,
    /// Heartbeat: periodic ticks and resume of the same track.
    Continue,
}

/// Snapshot of the controller at one emission. Built fresh every time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub request: Option<AudioRequest>,
    pub duration_ms: u64,
    pub position_ms: u64,
    pub state: PlayState,
}

impl PlaybackStatus {
    pub fn new(
        request: Option<AudioRequest>,
        duration_ms: u64,
        position_ms: u64,
        state: PlayState,
    ) -> Self {
        Self {
            request,
            duration_ms,
            position_ms,
            state,
        }
    }

    /// Playback progress in `[0.0, 1.0]`, `None` while the duration is unknown.
    pub fn progress(&self) -> Option<f64> {
        if self.duration_ms == 0 {
            return None;
        }
        Some((self.position_ms as f64 / self.duration_ms as f64).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_constructors() {
        assert_eq!(AudioRequest::raw(2131099648).path(), "2131099648");
        assert_eq!(AudioRequest::raw(7).origin(), Origin::Raw);
        assert_eq!(AudioRequest::asset("sounds/a.ogg").origin(), Origin::Assets);
        assert_eq!(AudioRequest::file_path("/a.mp3").origin(), Origin::FilePath);
    }

    #[test]
    fn test_request_equality_is_by_value() {
        let a = AudioRequest::url("https://x/a.mp3");
        assert_eq!(a, AudioRequest::url("https://x/a.mp3"));
        assert_ne!(a, AudioRequest::url("https://x/b.mp3"));
        assert_ne!(a, AudioRequest::new("https://x/a.mp3", Origin::FilePath));
        assert_ne!(a, a.clone().with_title("A"));
    }

    #[test]
    fn test_origin_wire_names() {
        assert_eq!(serde_json::to_string(&Origin::FilePath).unwrap(), "\"FILE_PATH\"");
        assert_eq!(Origin::Assets.to_string(), "ASSETS");

        let request: AudioRequest =
            serde_json::from_str(r#"{ "path": "12", "origin": "RAW" }"#).unwrap();
        assert_eq!(request, AudioRequest::raw(12));
    }

    #[test]
    fn test_status_progress() {
        let status = PlaybackStatus::new(None, 0, 0, PlayState::Play);
        assert_eq!(status.progress(), None);

        let status = PlaybackStatus::new(None, 200_000, 50_000, PlayState::Continue);
        assert_eq!(status.progress(), Some(0.25));
    }
}
