//! # Host Bridge Traits
//!
//! Capabilities the playback core requires from its host platform.
//!
//! ## Overview
//!
//! The core owns the playback state machine; everything that touches native
//! media APIs or packaged files is expressed as a trait here and implemented
//! per platform:
//!
//! | Trait | Purpose | Android | Desktop |
//! |-------|---------|---------|---------|
//! | [`MediaEngineFactory`] / [`MediaEngine`] | decode/output pipeline | `MediaPlayer` | `bridge_desktop::HeadlessEngine` |
//! | [`EngineListener`] | engine lifecycle callbacks | `On*Listener` | timer threads |
//! | [`ResourceResolver`] | raw resources, assets, file checks | `Resources`/`AssetManager` | `bridge_desktop::TokioResourceResolver` |
//! | [`LoggerSink`] | host log forwarding | Logcat | stderr |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing; see `core_runtime::config::PlayerConfigBuilder::build`.
//!
//! ## Thread Safety
//!
//! All capabilities are `Send + Sync`. Engine callbacks may arrive on any
//! thread.

pub mod error;
pub mod logging;
pub mod platform;
pub mod playback;
pub mod resources;

pub use error::BridgeError;

pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{DataSource, EngineListener, MediaEngine, MediaEngineFactory};
pub use resources::{AssetDescriptor, ResourceResolver};
