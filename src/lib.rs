//! Workspace façade crate.
//!
//! Host applications depend on `playback-workspace` and pick a feature set
//! instead of wiring each crate individually:
//!
//! - `core`: the playback controller, runtime utilities and bridge traits.
//! - `desktop-shims` (default): `core` plus the desktop resolver and the
//!   headless engine.

#[cfg(feature = "core")]
pub use bridge_traits;
#[cfg(feature = "core")]
pub use core_playback;
#[cfg(feature = "core")]
pub use core_runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

#[cfg(feature = "core")]
pub use core_playback::{
    AudioRequest, Origin, PlayState, PlaybackController, PlaybackError, PlaybackStatus,
    PlayerEvent,
};
