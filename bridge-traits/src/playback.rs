//! Playback engine bridge traits.
//!
//! These abstractions describe the platform media pipeline the core drives
//! (`MediaPlayer` on Android, `AVPlayer` on iOS, a headless clock on desktop).
//! The core never decodes audio itself: it binds a source, asks the engine to
//! prepare asynchronously, and reacts to the callbacks the engine delivers
//! through an [`EngineListener`].
//!
//! Engine calls are synchronous. Preparation is the only long-running step and
//! it is non-blocking by contract: [`MediaEngine::prepare_async`] returns
//! immediately and readiness is reported later via
//! [`EngineListener::on_prepared`], possibly from a foreign thread.

use crate::{error::Result, platform::PlatformSendSync, resources::AssetDescriptor};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Source handed to an engine before preparation.
///
/// Borrowed so that descriptor-backed sources can be closed by the caller as
/// soon as the engine has bound them; engines that need the data later must
/// duplicate the handle inside [`MediaEngine::set_data_source`].
#[derive(Clone, Copy)]
pub enum DataSource<'a> {
    /// Remote HTTP(S) stream fetched by the engine itself.
    Network { url: &'a str },
    /// Slice of an open file (packaged resource or bundled asset).
    Descriptor(&'a AssetDescriptor),
    /// Local file addressed by path.
    LocalFile { path: &'a Path },
}

impl DataSource<'_> {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::Network { .. } => "network",
            DataSource::Descriptor(_) => "descriptor",
            DataSource::LocalFile { .. } => "local-file",
        }
    }
}

impl fmt::Debug for DataSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Network { url } => f.debug_struct("Network").field("url", url).finish(),
            DataSource::Descriptor(descriptor) => {
                f.debug_tuple("Descriptor").field(descriptor).finish()
            }
            DataSource::LocalFile { path } => {
                f.debug_struct("LocalFile").field("path", path).finish()
            }
        }
    }
}

/// Lifecycle callbacks an engine delivers to its owner.
///
/// Implementations must be cheap and must not call back into the engine; the
/// core forwards every callback to its own task.
pub trait EngineListener: PlatformSendSync {
    /// Preparation finished; the engine can start and reports a real duration.
    fn on_prepared(&self);

    /// Playback reached the end of the source.
    fn on_completion(&self);

    /// Network buffering progress, in percent of the stream.
    fn on_buffering_update(&self, percent: u8);

    /// The engine hit an error. Returning `false` lets the engine apply its
    /// own default recovery.
    fn on_error(&self, what: i32, extra: i32) -> bool;
}

/// A single decode/output instance bound to one audio source.
pub trait MediaEngine: PlatformSendSync {
    /// Bind the audio source. Must be called before [`prepare_async`](Self::prepare_async).
    fn set_data_source(&self, source: DataSource<'_>) -> Result<()>;

    /// Register the listener that receives lifecycle callbacks.
    fn set_listener(&self, listener: Arc<dyn EngineListener>);

    /// Begin asynchronous preparation. Returns immediately.
    fn prepare_async(&self) -> Result<()>;

    /// Start or resume output.
    fn start(&self) -> Result<()>;

    /// Pause output, keeping the current position.
    fn pause(&self) -> Result<()>;

    /// Halt output. The engine cannot be restarted without re-preparing.
    fn stop(&self) -> Result<()>;

    /// Free every native resource held by the engine.
    fn release(&self);

    /// Seek to an absolute position.
    fn seek_to(&self, position_ms: u64) -> Result<()>;

    /// Total duration in milliseconds, `0` while unknown.
    fn duration_ms(&self) -> u64;

    /// Current playback position in milliseconds.
    fn current_position_ms(&self) -> u64;

    /// Whether the engine is currently producing output.
    fn is_playing(&self) -> bool;
}

/// Constructs fresh engine instances. The core creates one engine per loaded source.
pub trait MediaEngineFactory: PlatformSendSync {
    fn create_engine(&self) -> Result<Box<dyn MediaEngine>>;
}
