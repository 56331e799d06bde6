// Error handling for playback sessions

use crate::state::SessionState;
use crate::surface::SurfaceToken;
use std::fmt;

/// Session error types
///
/// None of these are fatal to the hosting process. A failed command leaves the
/// session usable; only teardown is guaranteed to succeed after an engine error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The engine refused to start or reported an error before becoming ready
    InitializationFailed(String),

    /// Command issued outside its valid state set; state is unchanged
    InvalidStateTransition {
        op: &'static str,
        state: SessionState,
    },

    /// Attach requested while a different surface is bound.
    /// Resolved by an implicit detach, reported only through logs.
    SurfaceBindingConflict {
        bound: SurfaceToken,
        requested: SurfaceToken,
    },

    /// Asynchronous error reported by the engine
    EngineRuntimeError(String),

    /// A bridge command was rejected by the engine
    Bridge(String),
}

impl SessionError {
    pub(crate) fn invalid(op: &'static str, state: SessionState) -> Self {
        SessionError::InvalidStateTransition { op, state }
    }

    /// Whether the error is a plain state rejection
    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::InvalidStateTransition { .. })
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::InitializationFailed(msg) => {
                write!(f, "Initialization failed: {}", msg)
            }
            SessionError::InvalidStateTransition { op, state } => {
                write!(f, "Invalid state: cannot {} while {:?}", op, state)
            }
            SessionError::SurfaceBindingConflict { bound, requested } => write!(
                f,
                "Surface conflict: {} requested while {} is bound",
                requested, bound
            ),
            SessionError::EngineRuntimeError(msg) => write!(f, "Engine error: {}", msg),
            SessionError::Bridge(msg) => write!(f, "Bridge error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
