// Contract with the native playback engine
//
// Commands go straight to the engine. Notifications come back from engine
// threads through an EventSender and are only ever consumed by the owner of the
// EventQueue, which is the session on the UI context.

use crate::error::{Result, SessionError};
use crate::surface::SurfaceToken;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::Arc;

/// Hook run after every posted event so the host can schedule a drain on its UI thread
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Opaque handle to the native pipeline
///
/// All commands are fire-and-forget: a returned error only means the engine
/// refused the command outright. Results arrive later as [`EngineEvent`]s.
pub trait NativeBridge: Send {
    /// Start bringing up the pipeline. Completion is signalled with
    /// [`EngineEvent::Ready`] or [`EngineEvent::Error`] on `events`.
    fn initialize(&mut self, events: EventSender) -> Result<()>;

    /// Tear down the pipeline, also cancelling an initialization in flight
    fn finalize(&mut self) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn seek(&mut self, position_ms: u64) -> Result<()>;

    fn bind_surface(&mut self, token: SurfaceToken) -> Result<()>;

    fn unbind_surface(&mut self) -> Result<()>;

    /// Replace the pipeline description. Engines that run a fixed pipeline keep the default.
    fn set_pipeline(&mut self, description: &str) -> Result<()> {
        Err(SessionError::Bridge(format!(
            "pipeline replacement not supported: {}",
            description
        )))
    }
}

/// Notification from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Initialization complete
    Ready,

    /// Current position and duration. Engines may report negative values
    /// when the query fails; they are clamped to zero.
    PositionChanged { position_ms: i64, duration_ms: i64 },

    /// Native resolution of the media, pixel aspect already applied
    MediaSizeChanged { width: u32, height: u32 },

    /// Free-form status text
    Message(String),

    /// Buffering progress in percent
    Buffering(u8),

    /// Playback reached the end of the media
    EndOfStream,

    /// Asynchronous engine failure
    Error(String),
}

struct Envelope {
    generation: u64,
    event: EngineEvent,
}

/// Cloneable, thread-safe sending half handed to the engine
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Envelope>,
    generation: u64,
    notifier: Option<Notifier>,
}

impl EventSender {
    /// Post an event. Returns false once the owning queue is gone.
    pub fn post(&self, event: EngineEvent) -> bool {
        let delivered = self
            .tx
            .send(Envelope {
                generation: self.generation,
                event,
            })
            .is_ok();

        if delivered {
            if let Some(notify) = &self.notifier {
                notify();
            }
        }
        delivered
    }

    pub fn ready(&self) -> bool {
        self.post(EngineEvent::Ready)
    }

    pub fn position_changed(&self, position_ms: i64, duration_ms: i64) -> bool {
        self.post(EngineEvent::PositionChanged {
            position_ms,
            duration_ms,
        })
    }

    pub fn media_size_changed(&self, width: u32, height: u32) -> bool {
        self.post(EngineEvent::MediaSizeChanged { width, height })
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.post(EngineEvent::Error(message.into()))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("generation", &self.generation)
            .finish()
    }
}

/// Single-consumer event queue.
///
/// Not `Clone`: the receiving half stays with whoever owns the queue, so
/// engine notifications can only be applied from that owner's context.
pub struct EventQueue {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    generation: u64,
    notifier: Option<Notifier>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            generation: 0,
            notifier: None,
        }
    }

    pub fn with_notifier(notifier: Notifier) -> Self {
        Self {
            notifier: Some(notifier),
            ..Self::new()
        }
    }

    /// Open a new generation and hand out its sender.
    /// Senders from earlier generations keep working but their events are discarded.
    pub(crate) fn open_generation(&mut self) -> EventSender {
        self.generation += 1;
        EventSender {
            tx: self.tx.clone(),
            generation: self.generation,
            notifier: self.notifier.clone(),
        }
    }

    /// Invalidate every sender handed out so far and drop what is queued
    pub(crate) fn retire(&mut self) {
        self.generation += 1;
        let dropped = self.rx.try_iter().count();
        if dropped > 0 {
            log::debug!("[queue] discarded {} pending events", dropped);
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Take up to `budget` current-generation events.
    ///
    /// Consecutive position reports are collapsed to the newest one.
    pub(crate) fn drain(&self, budget: usize) -> Vec<EngineEvent> {
        let mut events: Vec<EngineEvent> = Vec::new();
        let mut taken = 0;

        while taken < budget {
            let envelope = match self.rx.try_recv() {
                Ok(envelope) => envelope,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };
            taken += 1;

            if envelope.generation != self.generation {
                log::debug!(
                    "[queue] dropping stale event {:?} (generation {} != {})",
                    envelope.event,
                    envelope.generation,
                    self.generation
                );
                continue;
            }

            let collapse = matches!(
                (events.last(), &envelope.event),
                (
                    Some(EngineEvent::PositionChanged { .. }),
                    EngineEvent::PositionChanged { .. }
                )
            );
            if collapse {
                events.pop();
            }
            events.push(envelope.event);
        }

        events
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
