// Session configuration

/// Default wake lock tag, shown by the platform power manager
pub const DEFAULT_WAKE_LOCK_TAG: &str = "PlayShim";

/// Default number of engine events applied per pump
pub const DEFAULT_EVENTS_PER_PUMP: usize = 64;

/// Per-session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Tag passed to the platform wake lock
    pub wake_lock_tag: String,
    /// Upper bound of events applied by one drain, so a chatty engine cannot stall the UI
    pub events_per_pump: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wake_lock_tag: DEFAULT_WAKE_LOCK_TAG.to_string(),
            events_per_pump: DEFAULT_EVENTS_PER_PUMP,
        }
    }
}

impl SessionConfig {
    pub fn with_wake_lock_tag(mut self, tag: impl Into<String>) -> Self {
        self.wake_lock_tag = tag.into();
        self
    }

    pub fn with_events_per_pump(mut self, budget: usize) -> Self {
        self.events_per_pump = budget.max(1);
        self
    }
}
