// Core types for the PlayShim media player shim

pub mod bridge;
pub mod config;
pub mod controller;
pub mod error;
pub mod position;
pub mod power;
pub mod remote;
pub mod session;
pub mod state;
pub mod surface;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use bridge::{EngineEvent, EventQueue, EventSender, NativeBridge, Notifier};
pub use config::SessionConfig;
pub use controller::{UiController, Widgets};
pub use error::{Result, SessionError};
pub use position::{format_clock, PositionSync};
pub use power::{NoopWakeLock, PowerHold, WakeLock};
pub use remote::{ParseError, RemoteCommand};
pub use session::{Notice, PlaybackSession, PlaybackTiming};
pub use state::{Command, SessionState};
pub use surface::{AttachOutcome, Dimensions, SurfaceBinding, SurfaceToken};
