// Render surface binding

use crate::bridge::NativeBridge;
use crate::error::{Result, SessionError};
use std::fmt;

/// Opaque identity of a platform render target (native window pointer, view id, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceToken(pub u64);

impl fmt::Display for SurfaceToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "surface#{:x}", self.0)
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of an attach request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Surface bound, nothing was bound before
    Bound,
    /// Same surface already bound; no engine call made
    AlreadyBound,
    /// A different surface was unbound first
    Replaced { previous: SurfaceToken },
}

/// Pairs at most one live surface with the engine handle
#[derive(Debug, Default)]
pub struct SurfaceBinding {
    bound: Option<SurfaceToken>,
    pending: Option<Dimensions>,
    media_size: Option<Dimensions>,
}

impl SurfaceBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(&self) -> Option<SurfaceToken> {
        self.bound
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Surface size last reported by the surface provider
    pub fn pending_dimensions(&self) -> Option<Dimensions> {
        self.pending
    }

    /// Media resolution last reported by the engine
    pub fn media_size(&self) -> Option<Dimensions> {
        self.media_size
    }

    /// Bind `token`, implicitly unbinding a different surface first.
    /// The caller guarantees the engine handle is live.
    pub fn attach<B: NativeBridge + ?Sized>(
        &mut self,
        bridge: &mut B,
        token: SurfaceToken,
        dims: Dimensions,
    ) -> Result<AttachOutcome> {
        let outcome = match self.bound {
            Some(current) if current == token => {
                log::debug!("{} already bound", token);
                self.pending = Some(dims);
                return Ok(AttachOutcome::AlreadyBound);
            }
            Some(current) => {
                let conflict = SessionError::SurfaceBindingConflict {
                    bound: current,
                    requested: token,
                };
                log::info!("{}, detaching {} first", conflict, current);
                self.detach(bridge)?;
                AttachOutcome::Replaced { previous: current }
            }
            None => AttachOutcome::Bound,
        };

        bridge.bind_surface(token)?;
        self.bound = Some(token);
        self.pending = Some(dims);
        log::info!("Bound {} ({})", token, dims);
        Ok(outcome)
    }

    /// Record a new surface size. Returns `None` when nothing is bound.
    pub fn resize(&mut self, dims: Dimensions) -> Option<Dimensions> {
        let token = self.bound?;
        log::debug!("{} resized to {}", token, dims);
        self.pending = Some(dims);
        Some(dims)
    }

    /// Release the binding. No-op when nothing is bound.
    pub fn detach<B: NativeBridge + ?Sized>(
        &mut self,
        bridge: &mut B,
    ) -> Result<Option<SurfaceToken>> {
        let token = match self.bound.take() {
            Some(token) => token,
            None => return Ok(None),
        };
        self.pending = None;

        bridge.unbind_surface()?;
        log::info!("Unbound {}", token);
        Ok(Some(token))
    }

    pub(crate) fn set_media_size(&mut self, dims: Dimensions) {
        self.media_size = Some(dims);
    }
}
