//! Events published by the playback controller.

use crate::types::{AudioRequest, Origin, PlaybackStatus};
use serde::{Deserialize, Serialize};

/// Everything a [`PlaybackController`](crate::PlaybackController) publishes
/// on its event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// One-shot status emitted by play/pause/stop/destroy and engine readiness.
    Status(PlaybackStatus),

    /// A play request failed validation.
    SourceRejected {
        origin: Origin,
        path: String,
        reason: String,
    },

    /// The engine reached the end of the current source.
    Completed { request: Option<AudioRequest> },

    /// Network buffering progress of the current source.
    Buffering { percent: u8 },

    /// The engine reported a decode or I/O error. Not handled by the controller.
    EngineError { what: i32, extra: i32 },
}

impl PlayerEvent {
    pub fn description(&self) -> &'static str {
        match self {
            PlayerEvent::Status(_) => "Playback status changed",
            PlayerEvent::SourceRejected { .. } => "Audio source rejected",
            PlayerEvent::Completed { .. } => "Playback completed",
            PlayerEvent::Buffering { .. } => "Buffering progress",
            PlayerEvent::EngineError { .. } => "Engine error",
        }
    }

    /// The status snapshot, for `Status` events.
    pub fn status(&self) -> Option<&PlaybackStatus> {
        match self {
            PlayerEvent::Status(status) => Some(status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayState;

    #[test]
    fn test_event_serialization() {
        let event = PlayerEvent::Status(PlaybackStatus::new(
            Some(AudioRequest::raw(3)),
            1_000,
            250,
            PlayState::Pause,
        ));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"status\""));
        assert!(json.contains("\"state\":\"PAUSE\""));

        let deserialized: PlayerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_status_accessor() {
        let event = PlayerEvent::Buffering { percent: 30 };
        assert!(event.status().is_none());
        assert_eq!(event.description(), "Buffering progress");
    }
}
