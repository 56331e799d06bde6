// Reconciles engine position reports with the user-draggable progress control

const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Format milliseconds as `HH:MM:SS` on a UTC epoch.
///
/// Behaves like a time-of-day formatter: hours wrap at 24.
pub fn format_clock(ms: u64) -> String {
    let secs = (ms % MS_PER_DAY) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Position state behind the progress control
#[derive(Debug, Default, Clone)]
pub struct PositionSync {
    position_ms: u64,
    duration_ms: u64,
    duration_known: bool,
    dragging: bool,
    visible_ms: u64,
}

impl PositionSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last authoritative position: engine report, or the value of the last released drag
    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Value currently shown on the progress control
    pub fn visible_ms(&self) -> u64 {
        self.visible_ms
    }

    /// Maximum of the progress control
    pub fn visible_max_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Apply an engine report. Negative values count as zero.
    ///
    /// Returns true when the visible control follows the report, false while a
    /// drag is holding it.
    pub fn on_engine_position(&mut self, position_ms: i64, duration_ms: i64) -> bool {
        let position = position_ms.max(0) as u64;
        let duration = duration_ms.max(0) as u64;

        if !self.duration_known && duration > 0 {
            self.duration_ms = duration;
            self.duration_known = true;
        } else if self.duration_known && duration != self.duration_ms {
            log::debug!(
                "Ignoring duration change {} -> {} within the same media",
                self.duration_ms,
                duration
            );
        }

        self.position_ms = position;
        if self.dragging {
            return false;
        }

        self.visible_ms = position;
        true
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Follow the user's finger. Ignored when no drag is active.
    pub fn drag_to(&mut self, value_ms: u64) -> bool {
        if !self.dragging {
            return false;
        }

        self.visible_ms = if self.duration_known {
            value_ms.min(self.duration_ms)
        } else {
            value_ms
        };
        true
    }

    /// Finish the drag. Returns the position to seek to, once per drag.
    pub fn end_drag(&mut self) -> Option<u64> {
        if !self.dragging {
            return None;
        }

        self.dragging = false;
        self.position_ms = self.visible_ms;
        Some(self.visible_ms)
    }

    /// Forget the current media; the next report sets the duration again
    pub fn reset_media(&mut self) {
        *self = Self::default();
    }

    /// `"elapsed / total"` for the time label
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.visible_ms),
            format_clock(self.visible_max_ms())
        )
    }
}
