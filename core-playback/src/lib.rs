//! # Playback Module
//!
//! Background audio playback controller for the host application.
//!
//! ## Overview
//!
//! This module handles:
//! - Validation of play requests per origin (stream URL, packaged resource,
//!   bundled asset, filesystem path)
//! - Driving a single platform [`MediaEngine`](bridge_traits::MediaEngine)
//!   through load, resume, pause, seek and stop
//! - Status snapshots for every transition, plus a periodic heartbeat stream
//!
//! Decoding is delegated to the engine the host injects through
//! [`PlayerConfig`](core_runtime::config::PlayerConfig).

pub mod controller;
pub mod error;
pub mod events;
mod source;
pub mod time_change;
pub mod types;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use time_change::TimeChangeStream;
pub use types::{AudioRequest, Origin, PlayState, PlaybackStatus};
