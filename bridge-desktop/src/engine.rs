//! Headless media engine.
//!
//! Desktop hosts, CI and integration tests have no platform media player, so
//! [`HeadlessEngine`] implements the engine contract with a wall clock
//! instead of an audio device. Preparation probes the bound source with
//! symphonia to learn its real duration; playback then advances a position
//! clock and reports completion when the clock reaches that duration.
//!
//! Error codes passed to [`EngineListener::on_error`] follow the Android
//! `MediaPlayer` constants so hosts can share handling code.

use bridge_traits::{
    error::{BridgeError, Result},
    DataSource, EngineListener, MediaEngine, MediaEngineFactory,
};
use core_async::{runtime, time};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

pub const MEDIA_ERROR_UNKNOWN: i32 = 1;
pub const MEDIA_ERROR_IO: i32 = -1004;
pub const MEDIA_ERROR_MALFORMED: i32 = -1007;
pub const MEDIA_ERROR_UNSUPPORTED: i32 = -1010;

/// Creates [`HeadlessEngine`]s.
#[derive(Debug, Default, Clone)]
pub struct HeadlessEngineFactory;

impl HeadlessEngineFactory {
    pub fn new() -> Self {
        Self
    }
}

impl MediaEngineFactory for HeadlessEngineFactory {
    fn create_engine(&self) -> Result<Box<dyn MediaEngine>> {
        Ok(Box::new(HeadlessEngine::new()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Initialized,
    Preparing,
    Prepared,
    Started,
    Paused,
    Completed,
    Stopped,
    Error,
    Released,
}

impl Phase {
    fn has_media(self) -> bool {
        matches!(
            self,
            Phase::Prepared | Phase::Started | Phase::Paused | Phase::Completed | Phase::Stopped
        )
    }
}

enum BoundSource {
    Network,
    Path(PathBuf),
    Slice {
        file: File,
        offset: u64,
        length: u64,
        name: String,
    },
}

impl BoundSource {
    /// Independent handle for the probe thread.
    fn duplicate(&self) -> Result<BoundSource> {
        Ok(match self {
            BoundSource::Network => BoundSource::Network,
            BoundSource::Path(path) => BoundSource::Path(path.clone()),
            BoundSource::Slice {
                file,
                offset,
                length,
                name,
            } => BoundSource::Slice {
                file: file.try_clone()?,
                offset: *offset,
                length: *length,
                name: name.clone(),
            },
        })
    }
}

struct ClockState {
    phase: Phase,
    source: Option<BoundSource>,
    duration_ms: u64,
    base_position_ms: u64,
    started_at: Option<Instant>,
    /// Bumped on every transition that invalidates pending probes and timers.
    epoch: u64,
}

impl ClockState {
    fn position_ms(&self) -> u64 {
        let elapsed = self
            .started_at
            .map_or(0, |started| time::as_millis_u64(started.elapsed()));
        let position = self.base_position_ms.saturating_add(elapsed);
        if self.duration_ms > 0 {
            position.min(self.duration_ms)
        } else {
            position
        }
    }

    fn freeze(&mut self) {
        self.base_position_ms = self.position_ms();
        self.started_at = None;
    }

    fn invalid(&self, operation: &str) -> BridgeError {
        BridgeError::InvalidState(format!("{} called in state {:?}", operation, self.phase))
    }
}

struct Shared {
    state: Mutex<ClockState>,
    listener: Mutex<Option<Arc<dyn EngineListener>>>,
}

impl Shared {
    fn listener(&self) -> Option<Arc<dyn EngineListener>> {
        self.listener.lock().clone()
    }

    fn finish_prepare(&self, epoch: u64, probed: std::result::Result<u64, SymphoniaError>) {
        {
            let mut state = self.state.lock();
            if state.epoch != epoch || state.phase != Phase::Preparing {
                debug!(epoch, "Discarding probe result for superseded preparation");
                return;
            }
            match &probed {
                Ok(duration_ms) => {
                    state.phase = Phase::Prepared;
                    state.duration_ms = *duration_ms;
                    state.base_position_ms = 0;
                }
                Err(_) => state.phase = Phase::Error,
            }
        }

        let Some(listener) = self.listener() else {
            return;
        };
        match probed {
            Ok(duration_ms) => {
                debug!(duration_ms, "Headless engine prepared");
                listener.on_prepared();
            }
            Err(err) => {
                warn!(error = %err, "Headless engine failed to probe source");
                let (what, extra) = error_codes(&err);
                listener.on_error(what, extra);
            }
        }
    }

    fn finish_playback(&self, epoch: u64) {
        {
            let mut state = self.state.lock();
            if state.epoch != epoch || state.phase != Phase::Started {
                return;
            }
            state.base_position_ms = state.duration_ms;
            state.started_at = None;
            state.phase = Phase::Completed;
        }

        debug!("Headless engine reached end of source");
        if let Some(listener) = self.listener() {
            listener.on_completion();
        }
    }
}

/// Clock-driven [`MediaEngine`] that produces no audio.
pub struct HeadlessEngine {
    shared: Arc<Shared>,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ClockState {
                    phase: Phase::Idle,
                    source: None,
                    duration_ms: 0,
                    base_position_ms: 0,
                    started_at: None,
                    epoch: 0,
                }),
                listener: Mutex::new(None),
            }),
        }
    }

    fn schedule_completion(&self, state: &ClockState) {
        if state.duration_ms == 0 {
            return;
        }
        let remaining =
            Duration::from_millis(state.duration_ms.saturating_sub(state.position_ms()));
        let epoch = state.epoch;
        let shared = Arc::clone(&self.shared);

        match runtime::current_handle() {
            Some(handle) => {
                handle.spawn(async move {
                    core_async::time::sleep(remaining).await;
                    shared.finish_playback(epoch);
                });
            }
            None => {
                std::thread::spawn(move || {
                    std::thread::sleep(remaining);
                    shared.finish_playback(epoch);
                });
            }
        }
    }
}

impl MediaEngine for HeadlessEngine {
    fn set_data_source(&self, source: DataSource<'_>) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.phase != Phase::Idle {
            return Err(state.invalid("set_data_source"));
        }

        let bound = match source {
            DataSource::Network { .. } => BoundSource::Network,
            DataSource::LocalFile { path } => {
                std::fs::metadata(path)?;
                BoundSource::Path(path.to_path_buf())
            }
            DataSource::Descriptor(descriptor) => BoundSource::Slice {
                file: descriptor.file().try_clone()?,
                offset: descriptor.start_offset(),
                length: descriptor.length(),
                name: descriptor.name().to_string(),
            },
        };

        debug!(kind = source.kind(), "Headless engine bound source");
        state.source = Some(bound);
        state.phase = Phase::Initialized;
        Ok(())
    }

    fn set_listener(&self, listener: Arc<dyn EngineListener>) {
        *self.shared.listener.lock() = Some(listener);
    }

    fn prepare_async(&self) -> Result<()> {
        let (source, epoch) = {
            let mut state = self.shared.state.lock();
            if !matches!(state.phase, Phase::Initialized | Phase::Stopped) {
                return Err(state.invalid("prepare_async"));
            }
            let source = state
                .source
                .as_ref()
                .ok_or_else(|| state.invalid("prepare_async"))?
                .duplicate()?;
            state.phase = Phase::Preparing;
            state.epoch += 1;
            (source, state.epoch)
        };

        let shared = Arc::clone(&self.shared);
        let job = move || {
            let probed = probe_duration_ms(source);
            shared.finish_prepare(epoch, probed);
        };

        match runtime::current_handle() {
            Some(handle) => {
                handle.spawn_blocking(job);
            }
            None => {
                std::thread::spawn(job);
            }
        }
        Ok(())
    }

    fn start(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        match state.phase {
            Phase::Started => return Ok(()),
            Phase::Completed => state.base_position_ms = 0,
            Phase::Prepared | Phase::Paused => {}
            _ => return Err(state.invalid("start")),
        }

        state.phase = Phase::Started;
        state.started_at = Some(Instant::now());
        state.epoch += 1;
        self.schedule_completion(&state);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        match state.phase {
            Phase::Started => {
                state.freeze();
                state.phase = Phase::Paused;
                state.epoch += 1;
                Ok(())
            }
            Phase::Paused | Phase::Completed => Ok(()),
            _ => Err(state.invalid("pause")),
        }
    }

    fn stop(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        match state.phase {
            Phase::Preparing | Phase::Prepared | Phase::Started | Phase::Paused
            | Phase::Completed | Phase::Stopped => {
                state.freeze();
                state.phase = Phase::Stopped;
                state.epoch += 1;
                Ok(())
            }
            _ => Err(state.invalid("stop")),
        }
    }

    fn release(&self) {
        {
            let mut state = self.shared.state.lock();
            state.phase = Phase::Released;
            state.source = None;
            state.started_at = None;
            state.epoch += 1;
        }
        self.shared.listener.lock().take();
    }

    fn seek_to(&self, position_ms: u64) -> Result<()> {
        let mut state = self.shared.state.lock();
        match state.phase {
            Phase::Prepared | Phase::Started | Phase::Paused | Phase::Completed => {}
            _ => return Err(state.invalid("seek_to")),
        }

        state.base_position_ms = if state.duration_ms > 0 {
            position_ms.min(state.duration_ms)
        } else {
            position_ms
        };
        if state.phase == Phase::Completed {
            state.phase = Phase::Paused;
        }
        state.epoch += 1;
        if state.phase == Phase::Started {
            state.started_at = Some(Instant::now());
            self.schedule_completion(&state);
        }
        Ok(())
    }

    fn duration_ms(&self) -> u64 {
        let state = self.shared.state.lock();
        if state.phase.has_media() {
            state.duration_ms
        } else {
            0
        }
    }

    fn current_position_ms(&self) -> u64 {
        let state = self.shared.state.lock();
        if state.phase.has_media() {
            state.position_ms()
        } else {
            0
        }
    }

    fn is_playing(&self) -> bool {
        self.shared.state.lock().phase == Phase::Started
    }
}

fn hint_for(name: &Path) -> Hint {
    let mut hint = Hint::new();
    if let Some(extension) = name.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }
    hint
}

/// Duration of the first audio track in milliseconds, `0` when the container
/// does not declare one. Network sources are not fetched.
fn probe_duration_ms(source: BoundSource) -> std::result::Result<u64, SymphoniaError> {
    let (media_source, hint): (Box<dyn MediaSource>, Hint) = match source {
        BoundSource::Network => return Ok(0),
        BoundSource::Path(path) => (
            Box::new(File::open(&path)?) as Box<dyn MediaSource>,
            hint_for(&path),
        ),
        BoundSource::Slice {
            mut file,
            offset,
            length,
            name,
        } => {
            let hint = hint_for(Path::new(&name));
            if offset == 0 && file.metadata()?.len() == length {
                (Box::new(file) as Box<dyn MediaSource>, hint)
            } else {
                file.seek(SeekFrom::Start(offset))?;
                (
                    Box::new(ReadOnlySource::new(file.take(length))) as Box<dyn MediaSource>,
                    hint,
                )
            }
        }
    };

    let mss = MediaSourceStream::new(media_source, Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(SymphoniaError::Unsupported("no audio track"))?;

    let duration_ms = match (track.codec_params.n_frames, track.codec_params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => frames.saturating_mul(1000) / rate as u64,
        _ => 0,
    };
    Ok(duration_ms)
}

fn error_codes(err: &SymphoniaError) -> (i32, i32) {
    let extra = match err {
        SymphoniaError::IoError(_) => MEDIA_ERROR_IO,
        SymphoniaError::DecodeError(_) => MEDIA_ERROR_MALFORMED,
        SymphoniaError::Unsupported(_) => MEDIA_ERROR_UNSUPPORTED,
        _ => 0,
    };
    (MEDIA_ERROR_UNKNOWN, extra)
}
