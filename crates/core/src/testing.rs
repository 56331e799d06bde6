// Recording test doubles shared by the unit tests

use crate::bridge::{EventSender, NativeBridge};
use crate::controller::Widgets;
use crate::error::{Result, SessionError};
use crate::power::WakeLock;
use crate::surface::SurfaceToken;
use parking_lot::Mutex;
use std::sync::Arc;

/// Ordered log of calls across several doubles
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries.lock().iter().position(|e| e == entry)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Bridge that records commands and exposes the engine-side sender
pub struct RecordingBridge {
    log: CallLog,
    sender: Arc<Mutex<Option<EventSender>>>,
    pub fail_init: bool,
    pub fail_bind: bool,
    pub fail_unbind: bool,
    pub fail_seek: bool,
    pub pipeline: Option<String>,
}

impl RecordingBridge {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            sender: Arc::new(Mutex::new(None)),
            fail_init: false,
            fail_bind: false,
            fail_unbind: false,
            fail_seek: false,
            pipeline: None,
        }
    }

    /// Handle used by tests to play the engine's part
    pub fn engine(&self) -> EngineHandle {
        EngineHandle {
            sender: self.sender.clone(),
        }
    }
}

impl NativeBridge for RecordingBridge {
    fn initialize(&mut self, events: EventSender) -> Result<()> {
        self.log.push("bridge.initialize");
        if self.fail_init {
            return Err(SessionError::InitializationFailed("no such element".into()));
        }
        *self.sender.lock() = Some(events);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.log.push("bridge.finalize");
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.log.push("bridge.play");
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.log.push("bridge.pause");
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.log.push(format!("bridge.seek({})", position_ms));
        if self.fail_seek {
            return Err(SessionError::Bridge("Seeking failed".into()));
        }
        Ok(())
    }

    fn bind_surface(&mut self, token: SurfaceToken) -> Result<()> {
        self.log.push(format!("bridge.bind({})", token));
        if self.fail_bind {
            return Err(SessionError::Bridge("window rejected".into()));
        }
        Ok(())
    }

    fn unbind_surface(&mut self) -> Result<()> {
        self.log.push("bridge.unbind");
        if self.fail_unbind {
            return Err(SessionError::Bridge("unbind refused".into()));
        }
        Ok(())
    }

    fn set_pipeline(&mut self, description: &str) -> Result<()> {
        self.log.push(format!("bridge.pipeline({})", description));
        self.pipeline = Some(description.to_string());
        Ok(())
    }
}

/// Engine side of a [`RecordingBridge`]
#[derive(Clone)]
pub struct EngineHandle {
    sender: Arc<Mutex<Option<EventSender>>>,
}

impl EngineHandle {
    pub fn sender(&self) -> EventSender {
        self.sender
            .lock()
            .clone()
            .expect("bridge was never initialized")
    }
}

pub struct RecordingWakeLock {
    log: CallLog,
}

impl RecordingWakeLock {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl WakeLock for RecordingWakeLock {
    fn acquire(&mut self, tag: &str) -> Result<()> {
        self.log.push(format!("wake.acquire({})", tag));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.log.push("wake.release");
        Ok(())
    }
}

/// Widget state as the user would see it
#[derive(Debug, Default)]
pub struct RecordingWidgets {
    pub controls_enabled: bool,
    pub message: String,
    pub time_label: String,
    pub progress: u64,
    pub progress_max: u64,
    pub media_size: Option<(u32, u32)>,
    pub layout_requests: usize,
}

impl Widgets for RecordingWidgets {
    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }

    fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    fn set_time_label(&mut self, label: &str) {
        self.time_label = label.to_string();
    }

    fn set_progress(&mut self, position_ms: u64, max_ms: u64) {
        self.progress = position_ms;
        self.progress_max = max_ms;
    }

    fn request_layout(&mut self, media_width: u32, media_height: u32) {
        self.media_size = Some((media_width, media_height));
        self.layout_requests += 1;
    }
}
