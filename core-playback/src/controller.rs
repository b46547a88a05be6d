//! # Playback Controller
//!
//! Long-lived owner of at most one [`MediaEngine`]. Accepts play/pause/stop/
//! seek commands, validates and binds sources per
//! [`Origin`](crate::types::Origin), and publishes [`PlaybackStatus`]
//! snapshots on its event bus.
//!
//! ## State Machine
//!
//! ```text
//!            play                 pause
//!   STOP ───────────> PLAY ─────────────────> PAUSE
//!    ^                 │ ^                      │
//!    │      stop       │ └──── play (other) ────┤
//!    └─────────────────┘                        │
//!    ^                   play (same) => CONTINUE│
//!    └──────────────────── stop ────────────────┘
//! ```
//!
//! `CONTINUE` is a heartbeat: emitted on resume of the same track and by
//! every tick of [`PlaybackController::on_time_change`].
//!
//! ## Concurrency
//!
//! All controller state sits behind one mutex and every command mutates it in
//! a single critical section. Resolver I/O runs before the lock is taken.
//! Engine callbacks arrive on arbitrary threads; they are forwarded through a
//! channel to a pump task and dropped if the engine that raised them has since
//! been replaced (each loaded engine carries a generation number).

use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::source::{self, ResolvedSource};
use crate::time_change::TimeChangeStream;
use crate::types::{AudioRequest, PlayState, PlaybackStatus};
use bridge_traits::{EngineListener, MediaEngine, MediaEngineFactory, ResourceResolver};
use core_async::sync::{broadcast, mpsc, CancellationToken};
use core_runtime::config::{PlaybackSettings, PlayerConfig};
use core_runtime::events::EventBus;
use core_runtime::logging::redact_source;
use parking_lot::Mutex;
use std::mem;
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, trace, warn};

// ============================================================================
// Controller State
// ============================================================================

struct LoadedEngine {
    engine: Box<dyn MediaEngine>,
    generation: u64,
    /// Readiness has been reported; `start`/`pause` are valid from here on.
    prepared: bool,
    /// Start output as soon as readiness arrives. Cleared by `pause`.
    start_on_ready: bool,
}

enum EngineSlot {
    Absent,
    Loaded(LoadedEngine),
}

impl EngineSlot {
    fn engine(&self) -> Option<&dyn MediaEngine> {
        match self {
            EngineSlot::Loaded(loaded) => Some(loaded.engine.as_ref()),
            EngineSlot::Absent => None,
        }
    }

    /// The engine, if it is the one loaded under `generation`.
    fn current(&self, generation: u64) -> Option<&dyn MediaEngine> {
        match self {
            EngineSlot::Loaded(loaded) if loaded.generation == generation => {
                Some(loaded.engine.as_ref())
            }
            _ => None,
        }
    }

    fn current_mut(&mut self, generation: u64) -> Option<&mut LoadedEngine> {
        match self {
            EngineSlot::Loaded(loaded) if loaded.generation == generation => Some(loaded),
            _ => None,
        }
    }
}

/// What a play request does to the engine slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// No engine: construct one.
    Load,
    /// Tear down the current engine, then load.
    Reload,
    /// Same track, not playing: start the existing engine in place.
    Resume,
}

struct ControllerState {
    current_request: Option<AudioRequest>,
    previous_request: Option<AudioRequest>,
    is_playing: bool,
    duration_ms: u64,
    position_ms: u64,
    engine: EngineSlot,
    generation: u64,
    destroyed: bool,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            current_request: None,
            previous_request: None,
            is_playing: false,
            duration_ms: 0,
            position_ms: 0,
            engine: EngineSlot::Absent,
            generation: 0,
            destroyed: false,
        }
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(PlaybackError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn transition_for(&self, request: &AudioRequest) -> Transition {
        match self.engine {
            EngineSlot::Absent => Transition::Load,
            EngineSlot::Loaded(_) if self.is_playing => Transition::Reload,
            EngineSlot::Loaded(_) if self.previous_request.as_ref() != Some(request) => {
                Transition::Reload
            }
            EngineSlot::Loaded(_) => Transition::Resume,
        }
    }

    /// Snapshot from the cached duration/position.
    fn cached_status(&self, request: Option<AudioRequest>, state: PlayState) -> PlaybackStatus {
        PlaybackStatus::new(request, self.duration_ms, self.position_ms, state)
    }

    /// Snapshot from the live engine, falling back to cached values.
    fn live_status(&self, state: PlayState) -> PlaybackStatus {
        let (duration_ms, position_ms) = match self.engine.engine() {
            Some(engine) => (engine.duration_ms(), engine.current_position_ms()),
            None => (self.duration_ms, self.position_ms),
        };
        PlaybackStatus::new(self.current_request.clone(), duration_ms, position_ms, state)
    }

    /// Stop and release the loaded engine, if any. Emits nothing.
    fn tear_down(&mut self) {
        if let EngineSlot::Loaded(loaded) = mem::replace(&mut self.engine, EngineSlot::Absent) {
            if let Err(err) = loaded.engine.stop() {
                warn!(
                    generation = loaded.generation,
                    error = %err,
                    "Engine stop failed, releasing anyway"
                );
            }
            loaded.engine.release();
            debug!(generation = loaded.generation, "Engine released");
        }
        self.is_playing = false;
    }
}

// ============================================================================
// Engine Callbacks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineSignal {
    Prepared { generation: u64 },
    Completed { generation: u64 },
    Buffering { generation: u64, percent: u8 },
    Error { generation: u64, what: i32, extra: i32 },
}

/// Listener registered on each engine. Forwards callbacks to the pump task.
struct SignalForwarder {
    generation: u64,
    signals: mpsc::UnboundedSender<EngineSignal>,
}

impl SignalForwarder {
    fn forward(&self, signal: EngineSignal) {
        if self.signals.send(signal).is_err() {
            trace!(generation = self.generation, "Controller gone, dropping engine callback");
        }
    }
}

impl EngineListener for SignalForwarder {
    fn on_prepared(&self) {
        self.forward(EngineSignal::Prepared {
            generation: self.generation,
        });
    }

    fn on_completion(&self) {
        self.forward(EngineSignal::Completed {
            generation: self.generation,
        });
    }

    fn on_buffering_update(&self, percent: u8) {
        self.forward(EngineSignal::Buffering {
            generation: self.generation,
            percent,
        });
    }

    fn on_error(&self, what: i32, extra: i32) -> bool {
        self.forward(EngineSignal::Error {
            generation: self.generation,
            what,
            extra,
        });
        false
    }
}

async fn pump_signals(
    controller: Weak<PlaybackController>,
    mut signals: mpsc::UnboundedReceiver<EngineSignal>,
    shutdown: CancellationToken,
) {
    loop {
        let signal = core_async::select! {
            _ = shutdown.cancelled() => break,
            signal = signals.recv() => match signal {
                Some(signal) => signal,
                None => break,
            },
        };

        let Some(controller) = controller.upgrade() else {
            break;
        };
        controller.handle_signal(signal);
    }
    trace!("Engine signal pump stopped");
}

// ============================================================================
// Controller
// ============================================================================

/// Background audio playback controller.
///
/// # Example
///
/// ```ignore
/// use core_playback::{AudioRequest, PlaybackController};
/// use core_runtime::config::PlayerConfig;
/// use futures::StreamExt;
///
/// let controller = PlaybackController::new(PlayerConfig::builder().build()?);
/// controller.play(AudioRequest::url("https://cdn.example.com/a.mp3")).await?;
///
/// let mut ticks = controller.on_time_change();
/// while let Some(status) = ticks.next().await {
///     seek_bar.update(status.position_ms, status.duration_ms);
/// }
/// ```
pub struct PlaybackController {
    state: Mutex<ControllerState>,
    engine_factory: Arc<dyn MediaEngineFactory>,
    resolver: Arc<dyn ResourceResolver>,
    settings: PlaybackSettings,
    events: EventBus<PlayerEvent>,
    signals: mpsc::UnboundedSender<EngineSignal>,
    shutdown: CancellationToken,
}

impl PlaybackController {
    /// Creates a controller and spawns its engine-callback pump.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(config: PlayerConfig) -> Arc<Self> {
        let (signals, receiver) = mpsc::unbounded_channel();
        let controller = Arc::new(Self {
            state: Mutex::new(ControllerState::new()),
            engine_factory: config.engine_factory,
            resolver: config.resource_resolver,
            events: EventBus::new(config.settings.event_buffer_size),
            settings: config.settings,
            signals,
            shutdown: CancellationToken::new(),
        });

        core_async::spawn(pump_signals(
            Arc::downgrade(&controller),
            receiver,
            controller.shutdown.clone(),
        ));

        controller
    }

    /// Play `request`, loading it fresh or resuming it in place.
    ///
    /// Returns `PLAY` with duration and position 0 when a source was loaded
    /// (real values follow once the engine is ready), or `CONTINUE` when the
    /// same paused track resumed.
    ///
    /// # Errors
    ///
    /// - the origin-specific validation error if the source is invalid; the
    ///   engine is left untouched
    /// - [`PlaybackError::SourceBind`] if the engine refused the source
    /// - [`PlaybackError::Destroyed`] after [`destroy`](Self::destroy)
    #[instrument(
        skip(self, request),
        fields(origin = %request.origin(), source = %redact_source(request.path()))
    )]
    pub async fn play(&self, request: AudioRequest) -> Result<PlaybackStatus> {
        self.state.lock().ensure_alive()?;

        let resolved = source::resolve(&request, self.resolver.as_ref()).await;

        let mut state = self.state.lock();
        state.ensure_alive()?;
        state.previous_request = state.current_request.replace(request.clone());

        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(err) => {
                drop(state);
                warn!(error = %err, "Rejected audio source");
                self.publish(PlayerEvent::SourceRejected {
                    origin: request.origin(),
                    path: request.path().to_string(),
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        let transition = state.transition_for(&request);
        debug!(?transition, is_playing = state.is_playing, "Play transition");

        match transition {
            Transition::Resume => {
                if let EngineSlot::Loaded(loaded) = &mut state.engine {
                    if loaded.prepared {
                        loaded.engine.start()?;
                    } else {
                        // Still preparing; the readiness handler starts it.
                        loaded.start_on_ready = true;
                    }
                }
                state.is_playing = true;
                let status = state.live_status(PlayState::Continue);
                drop(state);
                self.emit_status(status.clone());
                return Ok(status);
            }
            Transition::Reload => state.tear_down(),
            Transition::Load => {}
        }

        self.load(&mut state, &request, resolved)?;
        state.is_playing = true;
        state.duration_ms = 0;
        state.position_ms = 0;
        let status = state.cached_status(Some(request), PlayState::Play);
        drop(state);

        self.emit_status(status.clone());
        Ok(status)
    }

    /// Pause the engine and capture its duration/position.
    ///
    /// The emitted `PAUSE` status carries `request` as given.
    #[instrument(skip(self, request), fields(origin = %request.origin()))]
    pub async fn pause(&self, request: AudioRequest) -> Result<PlaybackStatus> {
        let mut state = self.state.lock();
        state.ensure_alive()?;

        let captured = match &mut state.engine {
            EngineSlot::Loaded(loaded) => {
                loaded.start_on_ready = false;
                if loaded.prepared {
                    if let Err(err) = loaded.engine.pause() {
                        warn!(error = %err, "Engine pause failed");
                    }
                }
                Some((loaded.engine.duration_ms(), loaded.engine.current_position_ms()))
            }
            EngineSlot::Absent => None,
        };
        if let Some((duration_ms, position_ms)) = captured {
            state.duration_ms = duration_ms;
            state.position_ms = position_ms;
        }
        state.is_playing = false;

        let status = state.cached_status(Some(request), PlayState::Pause);
        drop(state);

        self.emit_status(status.clone());
        Ok(status)
    }

    /// Stop and release the engine.
    ///
    /// The `STOP` status reports the duration/position cached before the
    /// stop. Always leaves no engine loaded.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<PlaybackStatus> {
        let mut state = self.state.lock();
        state.ensure_alive()?;
        let status = Self::stop_locked(&mut state);
        drop(state);

        self.emit_status(status.clone());
        Ok(status)
    }

    /// Stop, then shut the controller down for good.
    ///
    /// Ends every time-change stream and the callback pump. Every later
    /// command, including another `destroy`, returns
    /// [`PlaybackError::Destroyed`].
    #[instrument(skip(self))]
    pub async fn destroy(&self) -> Result<PlaybackStatus> {
        let mut state = self.state.lock();
        state.ensure_alive()?;
        let status = Self::stop_locked(&mut state);
        state.destroyed = true;
        drop(state);

        self.emit_status(status.clone());
        self.shutdown.cancel();
        info!("Playback controller destroyed");
        Ok(status)
    }

    /// Seek the loaded engine. No-op without one.
    pub fn seek_to(&self, time_ms: u64) {
        let state = self.state.lock();
        if state.destroyed {
            debug!(time_ms, "Ignoring seek on destroyed controller");
            return;
        }
        match state.engine.engine() {
            Some(engine) => {
                if let Err(err) = engine.seek_to(time_ms) {
                    warn!(time_ms, error = %err, "Engine seek failed");
                }
            }
            None => trace!(time_ms, "Seek without a loaded engine"),
        }
    }

    /// Periodic `CONTINUE` snapshots, one per tick (first tick immediate).
    ///
    /// Each call returns an independent stream. Dropping it stops emission;
    /// it ends when the controller is destroyed or dropped.
    pub fn on_time_change(self: &Arc<Self>) -> TimeChangeStream {
        TimeChangeStream::new(
            Arc::downgrade(self),
            self.settings.tick_interval(),
            self.shutdown.clone(),
        )
    }

    /// Current snapshot, without emitting it.
    pub fn status(&self) -> PlaybackStatus {
        let state = self.state.lock();
        let play_state = match (&state.engine, state.is_playing) {
            (_, true) => PlayState::Play,
            (EngineSlot::Loaded(_), false) => PlayState::Pause,
            (EngineSlot::Absent, false) => PlayState::Stop,
        };
        state.live_status(play_state)
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().is_playing
    }

    /// Whether an engine is currently loaded.
    pub fn has_engine(&self) -> bool {
        matches!(self.state.lock().engine, EngineSlot::Loaded(_))
    }

    pub fn current_request(&self) -> Option<AudioRequest> {
        self.state.lock().current_request.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub(crate) fn time_snapshot(&self) -> PlaybackStatus {
        self.state.lock().live_status(PlayState::Continue)
    }

    fn stop_locked(state: &mut ControllerState) -> PlaybackStatus {
        state.tear_down();
        state.current_request = None;
        state.cached_status(None, PlayState::Stop)
    }

    /// Construct an engine, bind `source` and start preparation.
    ///
    /// On failure the half-built engine is released and the slot stays empty.
    fn load(
        &self,
        state: &mut ControllerState,
        request: &AudioRequest,
        source: ResolvedSource,
    ) -> Result<()> {
        let engine = self.engine_factory.create_engine()?;
        state.generation += 1;
        let generation = state.generation;

        let bound = engine.set_data_source(source.data_source()).and_then(|()| {
            engine.set_listener(Arc::new(SignalForwarder {
                generation,
                signals: self.signals.clone(),
            }));
            engine.prepare_async()
        });
        // Descriptors are closed as soon as the engine has bound them.
        drop(source);

        if let Err(err) = bound {
            engine.release();
            warn!(generation, error = %err, "Engine rejected source");
            return Err(PlaybackError::SourceBind {
                origin: request.origin(),
                path: request.path().to_string(),
                source: err,
            });
        }

        info!(generation, "Loaded audio source, preparing");
        state.engine = EngineSlot::Loaded(LoadedEngine {
            engine,
            generation,
            prepared: false,
            start_on_ready: true,
        });
        Ok(())
    }

    fn handle_signal(&self, signal: EngineSignal) {
        match signal {
            EngineSignal::Prepared { generation } => self.on_prepared(generation),
            EngineSignal::Completed { generation } => {
                let mut state = self.state.lock();
                if state.engine.current(generation).is_none() {
                    debug!(generation, "Ignoring completion from stale engine");
                    return;
                }
                state.is_playing = false;
                let request = state.current_request.clone();
                drop(state);

                info!(generation, "Playback completed");
                self.publish(PlayerEvent::Completed { request });
            }
            EngineSignal::Buffering {
                generation,
                percent,
            } => {
                if self.state.lock().engine.current(generation).is_none() {
                    return;
                }
                trace!(generation, percent, "Buffering");
                self.publish(PlayerEvent::Buffering { percent });
            }
            EngineSignal::Error {
                generation,
                what,
                extra,
            } => {
                if self.state.lock().engine.current(generation).is_none() {
                    debug!(generation, what, extra, "Ignoring error from stale engine");
                    return;
                }
                warn!(generation, what, extra, "Engine reported an error");
                self.publish(PlayerEvent::EngineError { what, extra });
            }
        }
    }

    fn on_prepared(&self, generation: u64) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(loaded) = state.engine.current_mut(generation) else {
            debug!(generation, "Ignoring readiness from stale engine");
            return;
        };
        loaded.prepared = true;

        if !loaded.start_on_ready {
            state.duration_ms = loaded.engine.duration_ms();
            state.position_ms = loaded.engine.current_position_ms();
            debug!(generation, duration_ms = state.duration_ms, "Engine ready while paused");
            return;
        }

        if let Err(err) = loaded.engine.start() {
            warn!(generation, error = %err, "Engine failed to start after preparation");
            return;
        }
        let duration_ms = loaded.engine.duration_ms();
        let position_ms = loaded.engine.current_position_ms();

        state.duration_ms = duration_ms;
        state.position_ms = position_ms;
        state.is_playing = true;
        let status = state.cached_status(state.current_request.clone(), PlayState::Play);
        drop(guard);

        debug!(generation, duration_ms, "Engine ready, playing");
        self.emit_status(status);
    }

    fn emit_status(&self, status: PlaybackStatus) {
        self.publish(PlayerEvent::Status(status));
    }

    fn publish(&self, event: PlayerEvent) {
        if self.events.emit(event).is_err() {
            trace!("No event subscribers");
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.state.get_mut().tear_down();
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PlaybackController")
            .field("current_request", &state.current_request)
            .field("is_playing", &state.is_playing)
            .field("has_engine", &matches!(state.engine, EngineSlot::Loaded(_)))
            .field("destroyed", &state.destroyed)
            .finish()
    }
}
