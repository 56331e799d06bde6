// Playback session: pairs the engine handle with the power hold and the render surface
//
// All mutation happens through `&mut self` on the owning (UI) context. Engine
// notifications are queued by the bridge and only applied in dispatch_pending().

use crate::bridge::{EngineEvent, EventQueue, NativeBridge, Notifier};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::power::{PowerHold, WakeLock};
use crate::state::{Command, SessionState};
use crate::surface::{AttachOutcome, Dimensions, SurfaceBinding, SurfaceToken};
use std::time::{Duration, Instant};

/// What the UI should reflect after engine events were applied
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Transport controls become usable (or not)
    ControlsEnabled(bool),
    /// Raw engine report; the position sync decides what is shown
    Position { position_ms: i64, duration_ms: i64 },
    /// Native media resolution, for layout
    MediaSize(Dimensions),
    /// Status text for the message label
    Message(String),
    /// Initialization or runtime failure reported by the engine
    Failed(SessionError),
}

/// Wall-clock span of the most recent playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTiming {
    NotPlayed,
    /// Still running since the last play command
    PlayingFor(Duration),
    /// From the last play command to end of stream or engine error
    EndedAfter(Duration),
}

/// One playback session
pub struct PlaybackSession<B: NativeBridge, L: WakeLock> {
    state: SessionState,
    bridge: B,
    power: PowerHold<L>,
    surface: SurfaceBinding,
    queue: EventQueue,
    config: SessionConfig,
    /// initialize() was accepted and finalize() has not run yet
    bridge_active: bool,
    last_message: Option<String>,
    played_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl<B: NativeBridge, L: WakeLock> PlaybackSession<B, L> {
    pub fn new(bridge: B, wake_lock: L, config: SessionConfig) -> Self {
        Self::with_queue(bridge, wake_lock, config, EventQueue::new())
    }

    /// Like [`PlaybackSession::new`], but `notifier` runs after every engine event is posted
    pub fn with_notifier(
        bridge: B,
        wake_lock: L,
        config: SessionConfig,
        notifier: Notifier,
    ) -> Self {
        Self::with_queue(bridge, wake_lock, config, EventQueue::with_notifier(notifier))
    }

    fn with_queue(bridge: B, wake_lock: L, config: SessionConfig, queue: EventQueue) -> Self {
        let power = PowerHold::new(wake_lock, config.wake_lock_tag.clone());
        Self {
            state: SessionState::Uninitialized,
            bridge,
            power,
            surface: SurfaceBinding::new(),
            queue,
            config,
            bridge_active: false,
            last_message: None,
            played_at: None,
            ended_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn surface(&self) -> &SurfaceBinding {
        &self.surface
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn power_held(&self) -> bool {
        self.power.is_held()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn set_state(&mut self, new_state: SessionState) {
        if self.state != new_state {
            log::debug!("Session state {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
        }
    }

    /// Keep the state in line with the binding after a bind or unbind, even a failed one
    fn sync_surface_state(&mut self) {
        match (self.state, self.surface.is_bound()) {
            (SessionState::Ready, true) => self.set_state(SessionState::SurfaceBound),
            (SessionState::SurfaceBound, false) => self.set_state(SessionState::Ready),
            _ => {}
        }
    }

    pub fn playback_timing(&self) -> PlaybackTiming {
        match (self.played_at, self.ended_at) {
            (None, _) => PlaybackTiming::NotPlayed,
            (Some(start), None) => PlaybackTiming::PlayingFor(start.elapsed()),
            (Some(start), Some(end)) => {
                PlaybackTiming::EndedAfter(end.saturating_duration_since(start))
            }
        }
    }

    fn remember(&mut self, message: String) -> Notice {
        self.last_message = Some(message.clone());
        Notice::Message(message)
    }

    /// Acquire the power hold and ask the engine to initialize.
    ///
    /// Readiness is reported later through [`EngineEvent::Ready`].
    pub fn start(&mut self) -> Result<()> {
        self.state.validate(Command::Start)?;

        self.power
            .acquire()
            .map_err(|e| SessionError::InitializationFailed(e.to_string()))?;

        let events = self.queue.open_generation();
        self.set_state(SessionState::Initializing);
        log::info!("Initializing engine (generation {})", events.generation());

        match self.bridge.initialize(events) {
            Ok(()) => {
                self.bridge_active = true;
                Ok(())
            }
            Err(e) => {
                log::error!("Engine refused to initialize: {}", e);
                self.queue.retire();
                self.set_state(SessionState::Uninitialized);
                Err(match e {
                    SessionError::InitializationFailed(_) => e,
                    other => SessionError::InitializationFailed(other.to_string()),
                })
            }
        }
    }

    pub fn play(&mut self) -> Result<()> {
        self.state.validate(Command::Play)?;
        self.bridge.play()?;
        self.played_at = Some(Instant::now());
        self.ended_at = None;
        self.set_state(SessionState::Playing);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.state.validate(Command::Pause)?;
        self.bridge.pause()?;
        self.set_state(SessionState::Paused);
        Ok(())
    }

    /// Seek without touching the play/pause state
    pub fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.state.validate(Command::Seek)?;
        log::debug!("Seeking to {} ms", position_ms);
        self.bridge.seek(position_ms)
    }

    pub fn attach_surface(&mut self, token: SurfaceToken, dims: Dimensions) -> Result<AttachOutcome> {
        self.state.validate(Command::AttachSurface)?;
        let result = self.surface.attach(&mut self.bridge, token, dims);
        self.sync_surface_state();
        result
    }

    /// Record new surface dimensions. Rejected when nothing is bound.
    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<Dimensions> {
        self.state.validate(Command::ResizeSurface)?;
        self.surface
            .resize(Dimensions::new(width, height))
            .ok_or_else(|| SessionError::invalid(Command::ResizeSurface.name(), self.state))
    }

    /// Release the bound surface, if any
    pub fn detach_surface(&mut self) -> Result<Option<SurfaceToken>> {
        self.state.validate(Command::DetachSurface)?;
        let result = self.surface.detach(&mut self.bridge);
        self.sync_surface_state();
        result
    }

    /// Hand a new pipeline description to the engine.
    ///
    /// The new pipeline starts stopped: the session drops back to Ready, or
    /// SurfaceBound while a surface stays bound.
    pub fn set_pipeline(&mut self, description: &str) -> Result<()> {
        if !self.state.has_live_handle() {
            return Err(SessionError::invalid("set pipeline", self.state));
        }
        self.bridge.set_pipeline(description)?;

        self.played_at = None;
        self.ended_at = None;
        self.set_state(SessionState::Ready);
        self.sync_surface_state();
        Ok(())
    }

    /// Tear the session down: unbind the surface, finalize the engine, release the power hold.
    ///
    /// Returns false when the session was already destroyed.
    pub fn shutdown(&mut self) -> Result<bool> {
        if self.state.is_terminal() {
            log::debug!("Session already destroyed");
            return Ok(false);
        }

        log::info!("Shutting down session from {:?}", self.state);
        self.set_state(SessionState::Finalizing);
        let mut first_error = None;

        // The engine must never see its window pulled after the pipeline is gone
        if let Err(e) = self.surface.detach(&mut self.bridge) {
            log::error!("Failed to unbind surface: {}", e);
            first_error.get_or_insert(e);
        }

        if self.bridge_active {
            self.bridge_active = false;
            if let Err(e) = self.bridge.finalize() {
                log::error!("Failed to finalize engine: {}", e);
                first_error.get_or_insert(e);
            }
        }

        self.queue.retire();

        if let Err(e) = self.power.release() {
            log::error!("Failed to release power hold: {}", e);
            first_error.get_or_insert(e);
        }

        self.set_state(SessionState::Destroyed);
        log::info!("Session destroyed");

        match first_error {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }

    /// Apply queued engine events on the calling (owner) context
    pub fn dispatch_pending(&mut self) -> Vec<Notice> {
        let generation = self.queue.generation();
        let events = self.queue.drain(self.config.events_per_pump);
        let mut notices = Vec::with_capacity(events.len());

        for event in events {
            // A failed initialization retires the queue; the rest of the batch is stale
            if self.queue.generation() != generation {
                break;
            }
            if let Some(notice) = self.handle_event(event) {
                notices.push(notice);
            }
        }

        notices
    }

    /// Whether engine events are waiting to be dispatched
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    fn handle_event(&mut self, event: EngineEvent) -> Option<Notice> {
        match event {
            EngineEvent::Ready => {
                if self.state != SessionState::Initializing {
                    log::warn!("Ignoring engine ready in state {:?}", self.state);
                    return None;
                }
                log::info!("Engine initialized");
                self.set_state(SessionState::Ready);
                Some(Notice::ControlsEnabled(true))
            }

            EngineEvent::PositionChanged {
                position_ms,
                duration_ms,
            } => {
                if !self.state.has_live_handle() {
                    return None;
                }
                Some(Notice::Position {
                    position_ms: position_ms.max(0),
                    duration_ms: duration_ms.max(0),
                })
            }

            EngineEvent::MediaSizeChanged { width, height } => {
                let dims = Dimensions::new(width, height);
                log::info!("Media size changed to {}", dims);
                self.surface.set_media_size(dims);
                Some(Notice::MediaSize(dims))
            }

            EngineEvent::Message(text) => Some(self.remember(text)),

            EngineEvent::Buffering(percent) => {
                let text = if percent < 100 {
                    format!("Buffering {}%", percent)
                } else {
                    "Buffering complete".to_string()
                };
                Some(self.remember(text))
            }

            EngineEvent::EndOfStream => {
                self.ended_at = Some(Instant::now());
                if self.state == SessionState::Playing {
                    self.set_state(SessionState::Paused);
                }
                Some(self.remember("End of stream".to_string()))
            }

            EngineEvent::Error(message) => self.handle_engine_error(message),
        }
    }

    fn handle_engine_error(&mut self, message: String) -> Option<Notice> {
        self.last_message = Some(message.clone());

        match self.state {
            SessionState::Initializing => {
                log::error!("Engine failed to initialize: {}", message);
                if self.bridge_active {
                    self.bridge_active = false;
                    if let Err(e) = self.bridge.finalize() {
                        log::error!("Failed to finalize engine after failed start: {}", e);
                    }
                }
                self.queue.retire();
                self.set_state(SessionState::Uninitialized);
                Some(Notice::Failed(SessionError::InitializationFailed(message)))
            }
            state if state.has_live_handle() => {
                log::error!("Engine error: {}", message);
                self.ended_at = Some(Instant::now());
                self.set_state(SessionState::Finalizing);
                Some(Notice::Failed(SessionError::EngineRuntimeError(message)))
            }
            state => {
                log::warn!("Ignoring engine error in state {:?}: {}", state, message);
                None
            }
        }
    }
}

impl<B: NativeBridge, L: WakeLock> Drop for PlaybackSession<B, L> {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            if let Err(e) = self.shutdown() {
                log::error!("Shutdown on drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, EngineHandle, RecordingBridge, RecordingWakeLock};

    type TestSession = PlaybackSession<RecordingBridge, RecordingWakeLock>;

    fn session(log: &CallLog) -> (TestSession, EngineHandle) {
        let bridge = RecordingBridge::new(log.clone());
        let engine = bridge.engine();
        let session = PlaybackSession::new(
            bridge,
            RecordingWakeLock::new(log.clone()),
            SessionConfig::default().with_wake_lock_tag("test"),
        );
        (session, engine)
    }

    fn ready_session(log: &CallLog) -> (TestSession, EngineHandle) {
        let (mut session, engine) = session(log);
        session.start().unwrap();
        engine.sender().ready();
        assert_eq!(session.dispatch_pending(), vec![Notice::ControlsEnabled(true)]);
        (session, engine)
    }

    #[test]
    fn test_start_acquires_power_then_initializes() {
        let log = CallLog::new();
        let (mut session, _engine) = session(&log);

        session.start().unwrap();

        assert_eq!(session.state(), SessionState::Initializing);
        assert!(session.power_held());
        assert_eq!(log.entries(), vec!["wake.acquire(test)", "bridge.initialize"]);
        assert!(session.start().unwrap_err().is_rejection());
    }

    #[test]
    fn test_transport_rejected_before_ready() {
        let log = CallLog::new();
        let (mut session, _engine) = session(&log);

        for state_before in [false, true] {
            if state_before {
                session.start().unwrap();
            }
            let before = session.state();
            assert!(session.play().unwrap_err().is_rejection());
            assert!(session.pause().unwrap_err().is_rejection());
            assert!(session.seek(1_000).unwrap_err().is_rejection());
            assert_eq!(session.state(), before);
        }

        assert_eq!(log.count("bridge.play"), 0);
        assert_eq!(log.count("bridge.pause"), 0);
    }

    #[test]
    fn test_play_pause_seek_cycle() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);

        session.play().unwrap();
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.play().unwrap_err().is_rejection());

        session.seek(2_500).unwrap();
        assert_eq!(session.state(), SessionState::Playing);

        session.pause().unwrap();
        assert_eq!(session.state(), SessionState::Paused);
        session.seek(500).unwrap();
        assert_eq!(session.state(), SessionState::Paused);

        session.play().unwrap();
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_surface_toggles_ready_and_bound() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);

        session
            .attach_surface(SurfaceToken(1), Dimensions::new(640, 480))
            .unwrap();
        assert_eq!(session.state(), SessionState::SurfaceBound);

        session.detach_surface().unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.detach_surface().unwrap(), None);
    }

    #[test]
    fn test_surface_independent_of_playback() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);
        session.play().unwrap();

        session
            .attach_surface(SurfaceToken(1), Dimensions::new(640, 480))
            .unwrap();
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.detach_surface().unwrap(), Some(SurfaceToken(1)));
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_attach_rejected_before_ready() {
        let log = CallLog::new();
        let (mut session, _engine) = session(&log);
        session.start().unwrap();

        let err = session
            .attach_surface(SurfaceToken(1), Dimensions::new(1, 1))
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(log.count("bridge.bind(surface#1)"), 0);
    }

    #[test]
    fn test_failed_unbind_returns_to_ready() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);
        session
            .attach_surface(SurfaceToken(1), Dimensions::new(640, 480))
            .unwrap();
        session.bridge_mut().fail_unbind = true;

        assert!(session.detach_surface().is_err());
        assert_eq!(session.surface().bound(), None);
        assert_eq!(session.state(), SessionState::Ready);

        assert_eq!(session.detach_surface().unwrap(), None);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_failed_replace_returns_to_ready() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);
        session
            .attach_surface(SurfaceToken(0xa), Dimensions::new(640, 480))
            .unwrap();
        session.bridge_mut().fail_bind = true;

        assert!(session
            .attach_surface(SurfaceToken(0xb), Dimensions::new(640, 480))
            .is_err());
        assert_eq!(session.surface().bound(), None);
        assert_eq!(session.state(), SessionState::Ready);

        session.bridge_mut().fail_bind = false;
        session
            .attach_surface(SurfaceToken(0xb), Dimensions::new(640, 480))
            .unwrap();
        assert_eq!(session.state(), SessionState::SurfaceBound);
    }

    #[test]
    fn test_pipeline_change_stops_playback() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);
        session
            .attach_surface(SurfaceToken(4), Dimensions::new(1, 1))
            .unwrap();
        session.play().unwrap();

        session.set_pipeline("videotestsrc ! autovideosink").unwrap();
        assert_eq!(session.state(), SessionState::SurfaceBound);
        assert_eq!(session.playback_timing(), PlaybackTiming::NotPlayed);

        session.detach_surface().unwrap();
        session.play().unwrap();
        session.set_pipeline("audiotestsrc ! autoaudiosink").unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        session.play().unwrap();
    }

    #[test]
    fn test_playback_timing() {
        let log = CallLog::new();
        let (mut session, engine) = ready_session(&log);
        assert_eq!(session.playback_timing(), PlaybackTiming::NotPlayed);

        session.play().unwrap();
        assert!(matches!(
            session.playback_timing(),
            PlaybackTiming::PlayingFor(_)
        ));

        engine.sender().post(EngineEvent::EndOfStream);
        session.dispatch_pending();
        let first = session.playback_timing();
        assert!(matches!(first, PlaybackTiming::EndedAfter(_)));
        assert_eq!(session.playback_timing(), first);

        session.play().unwrap();
        assert!(matches!(
            session.playback_timing(),
            PlaybackTiming::PlayingFor(_)
        ));
    }

    #[test]
    fn test_resize_before_media_size() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);

        assert!(session.resize_surface(10, 10).unwrap_err().is_rejection());

        session
            .attach_surface(SurfaceToken(0x5af), Dimensions::new(640, 480))
            .unwrap();
        let dims = session.resize_surface(1280, 720).unwrap();

        assert_eq!(dims, Dimensions::new(1280, 720));
        assert_eq!(
            session.surface().pending_dimensions(),
            Some(Dimensions::new(1280, 720))
        );
        assert_eq!(session.surface().bound(), Some(SurfaceToken(0x5af)));
        assert_eq!(session.surface().media_size(), None);
    }

    #[test]
    fn test_shutdown_order_from_every_state() {
        type Setup = fn(&mut TestSession, &EngineHandle);
        let setups: Vec<(&str, Setup)> = vec![
            ("uninitialized", |_, _| {}),
            ("initializing", |s, _| s.start().unwrap()),
            ("ready", |s, e| {
                s.start().unwrap();
                e.sender().ready();
                s.dispatch_pending();
            }),
            ("bound", |s, e| {
                s.start().unwrap();
                e.sender().ready();
                s.dispatch_pending();
                s.attach_surface(SurfaceToken(9), Dimensions::new(1, 1)).unwrap();
            }),
            ("playing", |s, e| {
                s.start().unwrap();
                e.sender().ready();
                s.dispatch_pending();
                s.attach_surface(SurfaceToken(9), Dimensions::new(1, 1)).unwrap();
                s.play().unwrap();
            }),
            ("paused", |s, e| {
                s.start().unwrap();
                e.sender().ready();
                s.dispatch_pending();
                s.attach_surface(SurfaceToken(9), Dimensions::new(1, 1)).unwrap();
                s.play().unwrap();
                s.pause().unwrap();
            }),
            ("faulted", |s, e| {
                s.start().unwrap();
                e.sender().ready();
                s.dispatch_pending();
                s.attach_surface(SurfaceToken(9), Dimensions::new(1, 1)).unwrap();
                e.sender().error("pipeline broke");
                s.dispatch_pending();
            }),
        ];

        for (name, setup) in setups {
            let log = CallLog::new();
            let (mut session, engine) = session(&log);
            setup(&mut session, &engine);
            log.clear();

            assert!(session.shutdown().unwrap(), "{}", name);
            assert_eq!(session.state(), SessionState::Destroyed);

            let unbind = log.position("bridge.unbind");
            let finalize = log.position("bridge.finalize");
            if let (Some(unbind), Some(finalize)) = (unbind, finalize) {
                assert!(unbind < finalize, "{}: {:?}", name, log.entries());
            }
            if let (Some(finalize), Some(release)) = (finalize, log.position("wake.release")) {
                assert!(finalize < release, "{}: {:?}", name, log.entries());
            }
            assert!(!session.power_held(), "{}", name);
        }
    }

    #[test]
    fn test_shutdown_twice_is_noop() {
        let log = CallLog::new();
        let (mut session, _engine) = ready_session(&log);
        session
            .attach_surface(SurfaceToken(3), Dimensions::new(1, 1))
            .unwrap();

        assert!(session.shutdown().unwrap());
        assert!(!session.shutdown().unwrap());

        assert_eq!(log.count("bridge.unbind"), 1);
        assert_eq!(log.count("bridge.finalize"), 1);
        assert_eq!(log.count("wake.release"), 1);
    }

    #[test]
    fn test_late_ready_after_shutdown_is_ignored() {
        let log = CallLog::new();
        let (mut session, engine) = session(&log);
        session.start().unwrap();
        let sender = engine.sender();

        session.shutdown().unwrap();
        sender.ready();

        assert!(session.dispatch_pending().is_empty());
        assert_eq!(session.state(), SessionState::Destroyed);
        assert_eq!(log.count("bridge.finalize"), 1);
    }

    #[test]
    fn test_sync_init_failure_allows_retry() {
        let log = CallLog::new();
        let (mut session, _engine) = session(&log);
        session.bridge_mut().fail_init = true;

        let err = session.start().unwrap_err();
        assert!(matches!(err, SessionError::InitializationFailed(_)));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.power_held());

        session.bridge_mut().fail_init = false;
        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Initializing);
        assert_eq!(log.count("wake.acquire(test)"), 1);
        assert_eq!(log.count("bridge.initialize"), 2);
    }

    #[test]
    fn test_async_init_failure_returns_to_uninitialized() {
        let log = CallLog::new();
        let (mut session, engine) = session(&log);
        session.start().unwrap();
        let first = engine.sender();
        first.error("no decoder");
        first.ready();

        let notices = session.dispatch_pending();
        assert_eq!(
            notices,
            vec![Notice::Failed(SessionError::InitializationFailed(
                "no decoder".into()
            ))]
        );
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(log.count("bridge.finalize"), 1);

        session.start().unwrap();
        first.ready();
        assert!(session.dispatch_pending().is_empty());
        engine.sender().ready();
        assert_eq!(session.dispatch_pending(), vec![Notice::ControlsEnabled(true)]);
    }

    #[test]
    fn test_runtime_error_leaves_only_teardown() {
        let log = CallLog::new();
        let (mut session, engine) = ready_session(&log);
        session.play().unwrap();

        engine.sender().error("Internal data stream error");
        let notices = session.dispatch_pending();
        assert_eq!(
            notices,
            vec![Notice::Failed(SessionError::EngineRuntimeError(
                "Internal data stream error".into()
            ))]
        );
        assert_eq!(session.state(), SessionState::Finalizing);
        assert!(session.play().unwrap_err().is_rejection());
        assert!(session.shutdown().unwrap());
    }

    #[test]
    fn test_status_events() {
        let log = CallLog::new();
        let (mut session, engine) = ready_session(&log);
        session.play().unwrap();
        let sender = engine.sender();

        sender.post(EngineEvent::Buffering(40));
        sender.post(EngineEvent::Buffering(100));
        sender.media_size_changed(1920, 1080);
        sender.post(EngineEvent::EndOfStream);

        assert_eq!(
            session.dispatch_pending(),
            vec![
                Notice::Message("Buffering 40%".into()),
                Notice::Message("Buffering complete".into()),
                Notice::MediaSize(Dimensions::new(1920, 1080)),
                Notice::Message("End of stream".into()),
            ]
        );
        assert_eq!(session.state(), SessionState::Paused);
        assert_eq!(session.last_message(), Some("End of stream"));
        assert_eq!(
            session.surface().media_size(),
            Some(Dimensions::new(1920, 1080))
        );
    }

    #[test]
    fn test_positions_ignored_without_handle() {
        let log = CallLog::new();
        let (mut session, engine) = session(&log);
        session.start().unwrap();
        engine.sender().position_changed(10, 20);
        assert!(session.dispatch_pending().is_empty());

        engine.sender().ready();
        engine.sender().position_changed(-5, 20);
        assert_eq!(
            session.dispatch_pending(),
            vec![
                Notice::ControlsEnabled(true),
                Notice::Position {
                    position_ms: 0,
                    duration_ms: 20
                }
            ]
        );
    }

    #[test]
    fn test_drop_runs_shutdown() {
        let log = CallLog::new();
        {
            let (mut session, _engine) = ready_session(&log);
            session
                .attach_surface(SurfaceToken(2), Dimensions::new(1, 1))
                .unwrap();
        }
        let entries = log.entries();
        let tail: Vec<_> = entries[entries.len() - 3..].to_vec();
        assert_eq!(tail, vec!["bridge.unbind", "bridge.finalize", "wake.release"]);
    }
}
