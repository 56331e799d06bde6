// Device power hold for the span of a playback session

use crate::error::Result;

/// Platform wake lock
///
/// Implementations wrap the host's power manager. They are only driven through
/// [`PowerHold`], which guarantees acquire/release are never repeated.
pub trait WakeLock: Send {
    fn acquire(&mut self, tag: &str) -> Result<()>;

    fn release(&mut self) -> Result<()>;
}

/// Non reference-counted power hold.
///
/// Acquiring while held is a no-op; releasing while not held is a no-op.
pub struct PowerHold<L: WakeLock> {
    lock: L,
    tag: String,
    held: bool,
}

impl<L: WakeLock> PowerHold<L> {
    pub fn new(lock: L, tag: impl Into<String>) -> Self {
        Self {
            lock,
            tag: tag.into(),
            held: false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn acquire(&mut self) -> Result<()> {
        if self.held {
            log::debug!("Power hold '{}' already held", self.tag);
            return Ok(());
        }

        self.lock.acquire(&self.tag)?;
        self.held = true;
        log::info!("Power hold '{}' acquired", self.tag);
        Ok(())
    }

    pub fn release(&mut self) -> Result<()> {
        if !self.held {
            return Ok(());
        }

        // Mark released even if the platform call fails, so teardown never repeats it
        self.held = false;
        self.lock.release()?;
        log::info!("Power hold '{}' released", self.tag);
        Ok(())
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }
}

impl<L: WakeLock> Drop for PowerHold<L> {
    fn drop(&mut self) {
        if self.held {
            log::warn!("Power hold '{}' dropped while held, releasing", self.tag);
            if let Err(e) = self.release() {
                log::error!("Failed to release power hold: {}", e);
            }
        }
    }
}

/// Wake lock that does nothing, for hosts without power management
#[derive(Debug, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self, _tag: &str) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
