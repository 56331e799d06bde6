// Playback session state and command validity

use crate::error::{Result, SessionError};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Not started, or the last start attempt failed
    Uninitialized,
    /// Engine initialization requested, waiting for the ready event
    Initializing,
    /// Engine handle is live, no surface bound
    Ready,
    /// Engine handle is live and a surface is bound, playback not started yet
    SurfaceBound,
    /// Media is playing
    Playing,
    /// Media is paused
    Paused,
    /// Teardown in progress, or the engine reported a runtime error
    Finalizing,
    /// Terminal
    Destroyed,
}

/// Commands that are checked against the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Play,
    Pause,
    Seek,
    AttachSurface,
    ResizeSurface,
    DetachSurface,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Seek => "seek",
            Command::AttachSurface => "attach surface",
            Command::ResizeSurface => "resize surface",
            Command::DetachSurface => "detach surface",
        }
    }
}

impl SessionState {
    /// The engine handle exists and accepts transport commands
    pub fn has_live_handle(self) -> bool {
        matches!(
            self,
            SessionState::Ready
                | SessionState::SurfaceBound
                | SessionState::Playing
                | SessionState::Paused
        )
    }

    pub fn is_terminal(self) -> bool {
        self == SessionState::Destroyed
    }

    /// Whether the UI transport controls should be enabled in this state
    pub fn controls_enabled(self) -> bool {
        self.has_live_handle()
    }

    /// Check a command against the valid state set.
    ///
    /// Surface detach and resize are further checked against the binding itself.
    pub fn validate(self, command: Command) -> Result<()> {
        let allowed = match command {
            Command::Start => self == SessionState::Uninitialized,
            Command::Play => matches!(
                self,
                SessionState::Ready | SessionState::SurfaceBound | SessionState::Paused
            ),
            Command::Pause => self == SessionState::Playing,
            Command::Seek | Command::AttachSurface | Command::ResizeSurface => {
                self.has_live_handle()
            }
            // Whatever is bound must be releasable, even after an engine fault
            Command::DetachSurface => true,
        };

        if allowed {
            Ok(())
        } else {
            Err(SessionError::invalid(command.name(), self))
        }
    }

    /// Label used by the status report
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Uninitialized | SessionState::Initializing => "NULL",
            SessionState::Ready | SessionState::SurfaceBound => "READY",
            SessionState::Playing => "PLAYING",
            SessionState::Paused => "PAUSED",
            SessionState::Finalizing | SessionState::Destroyed => "NULL",
        }
    }
}
