// UI controller: user input in, widget updates out
//
// Everything here runs on the UI context. Widgets are passed per call so hosts
// whose widget handles only live for the duration of a callback can use it.

use crate::bridge::NativeBridge;
use crate::error::Result;
use crate::position::PositionSync;
use crate::power::WakeLock;
use crate::remote::{self, RemoteCommand, REPLY_NOK, REPLY_OK};
use crate::session::{Notice, PlaybackSession};
use crate::state::SessionState;
use crate::surface::{Dimensions, SurfaceToken};

/// Widget intents emitted by the controller
pub trait Widgets {
    /// Enable or disable the play and pause buttons together
    fn set_controls_enabled(&mut self, enabled: bool);

    fn set_message(&mut self, message: &str);

    fn set_time_label(&mut self, label: &str);

    fn set_progress(&mut self, position_ms: u64, max_ms: u64);

    /// Media resolution changed; the video view should re-measure
    fn request_layout(&mut self, media_width: u32, media_height: u32);
}

/// Top-level orchestrator owning one playback session
pub struct UiController<B: NativeBridge, L: WakeLock> {
    session: PlaybackSession<B, L>,
    position: PositionSync,
    /// Surface that showed up before the engine was ready
    deferred_surface: Option<(SurfaceToken, Dimensions)>,
}

impl<B: NativeBridge, L: WakeLock> UiController<B, L> {
    pub fn new(session: PlaybackSession<B, L>) -> Self {
        Self {
            session,
            position: PositionSync::new(),
            deferred_surface: None,
        }
    }

    pub fn session(&self) -> &PlaybackSession<B, L> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PlaybackSession<B, L> {
        &mut self.session
    }

    pub fn position(&self) -> &PositionSync {
        &self.position
    }

    pub fn deferred_surface(&self) -> Option<SurfaceToken> {
        self.deferred_surface.map(|(token, _)| token)
    }

    /// Show a failed command. Plain rejections are only logged.
    fn report<T>(&self, widgets: &mut dyn Widgets, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_rejection() {
                log::debug!("[ui] {}", e);
            } else {
                log::warn!("[ui] {}", e);
                widgets.set_message(&e.to_string());
            }
        }
        result
    }

    /// Activation start: controls stay disabled until the engine is ready
    pub fn activate(&mut self, widgets: &mut dyn Widgets) -> Result<()> {
        widgets.set_controls_enabled(false);
        let result = self.session.start();
        self.report(widgets, result)
    }

    /// Activation teardown
    pub fn deactivate(&mut self, widgets: &mut dyn Widgets) -> Result<bool> {
        self.deferred_surface = None;
        let result = self.session.shutdown();
        widgets.set_controls_enabled(false);
        self.report(widgets, result)
    }

    pub fn on_play_pressed(&mut self, widgets: &mut dyn Widgets) -> Result<()> {
        let result = self.session.play();
        self.report(widgets, result)
    }

    pub fn on_pause_pressed(&mut self, widgets: &mut dyn Widgets) -> Result<()> {
        let result = self.session.pause();
        self.report(widgets, result)
    }

    pub fn on_drag_start(&mut self) {
        self.position.begin_drag();
    }

    /// Live label update while dragging; the engine is not involved
    pub fn on_drag_progress(&mut self, value_ms: u64, widgets: &mut dyn Widgets) {
        if self.position.drag_to(value_ms) {
            widgets.set_time_label(&self.position.time_label());
        }
    }

    /// Finish a drag and seek to where the user let go.
    ///
    /// Returns the seek target, or `None` when no drag was active.
    pub fn on_drag_release(&mut self, widgets: &mut dyn Widgets) -> Result<Option<u64>> {
        let target = match self.position.end_drag() {
            Some(target) => target,
            None => return Ok(None),
        };

        widgets.set_progress(self.position.visible_ms(), self.position.visible_max_ms());
        widgets.set_time_label(&self.position.time_label());
        let result = self.session.seek(target).map(|_| Some(target));
        self.report(widgets, result)
    }

    pub fn surface_created(&mut self, token: SurfaceToken) {
        log::debug!("[ui] {} created", token);
    }

    /// Surface provider `changed`: bind a new surface or resize the bound one
    pub fn surface_changed(
        &mut self,
        token: SurfaceToken,
        format: i32,
        width: u32,
        height: u32,
        widgets: &mut dyn Widgets,
    ) -> Result<()> {
        log::debug!(
            "[ui] {} changed to format {} width {} height {}",
            token,
            format,
            width,
            height
        );
        let dims = Dimensions::new(width, height);

        match self.session.state() {
            SessionState::Uninitialized | SessionState::Initializing => {
                log::info!("[ui] engine not ready, holding {} until it is", token);
                self.deferred_surface = Some((token, dims));
                Ok(())
            }
            _ if self.session.surface().bound() == Some(token) => {
                let result = self.session.resize_surface(width, height).map(|_| {
                    if let Some(media) = self.session.surface().media_size() {
                        widgets.request_layout(media.width, media.height);
                    }
                });
                self.report(widgets, result)
            }
            _ => {
                let result = self.session.attach_surface(token, dims).map(|_| ());
                self.report(widgets, result)
            }
        }
    }

    /// Surface provider `destroyed`: the binding must be gone before the surface is
    pub fn surface_destroyed(&mut self, token: SurfaceToken, widgets: &mut dyn Widgets) -> Result<()> {
        log::debug!("[ui] {} destroyed", token);
        if self.deferred_surface.map(|(t, _)| t) == Some(token) {
            self.deferred_surface = None;
        }
        if self.session.surface().bound() != Some(token) {
            return Ok(());
        }

        let result = self.session.detach_surface().map(|_| ());
        self.report(widgets, result)
    }

    /// Apply pending engine events to the widgets. Returns how many notices were rendered.
    pub fn pump(&mut self, widgets: &mut dyn Widgets) -> usize {
        let notices = self.session.dispatch_pending();
        let count = notices.len();
        for notice in notices {
            self.render(notice, widgets);
        }
        count
    }

    fn render(&mut self, notice: Notice, widgets: &mut dyn Widgets) {
        match notice {
            Notice::ControlsEnabled(enabled) => {
                widgets.set_controls_enabled(enabled);
                if enabled {
                    self.attach_deferred_surface(widgets);
                }
            }
            Notice::Position {
                position_ms,
                duration_ms,
            } => {
                if self.position.on_engine_position(position_ms, duration_ms) {
                    widgets.set_progress(self.position.visible_ms(), self.position.visible_max_ms());
                    widgets.set_time_label(&self.position.time_label());
                }
            }
            Notice::MediaSize(dims) => widgets.request_layout(dims.width, dims.height),
            Notice::Message(text) => widgets.set_message(&text),
            Notice::Failed(err) => {
                widgets.set_controls_enabled(false);
                widgets.set_message(&err.to_string());
            }
        }
    }

    fn attach_deferred_surface(&mut self, widgets: &mut dyn Widgets) {
        if let Some((token, dims)) = self.deferred_surface.take() {
            log::info!("[ui] attaching held {}", token);
            let result = self.session.attach_surface(token, dims);
            let _ = self.report(widgets, result);
        }
    }

    /// Execute one remote control line and produce the reply
    pub fn apply_remote_line(&mut self, line: &str, widgets: &mut dyn Widgets) -> String {
        match RemoteCommand::parse(line) {
            Ok(command) => self.apply_remote(command, widgets),
            Err(e) => {
                log::warn!("[remote] {}", e);
                REPLY_NOK.to_string()
            }
        }
    }

    pub fn apply_remote(&mut self, command: RemoteCommand, widgets: &mut dyn Widgets) -> String {
        log::debug!("[remote] {:?}", command);
        let result = match command {
            RemoteCommand::Stat => return self.status_report(),
            RemoteCommand::Bench => return remote::format_bench(self.session.playback_timing()),
            RemoteCommand::Play => self.on_play_pressed(widgets),
            RemoteCommand::Pause => self.on_pause_pressed(widgets),
            RemoteCommand::Seek(ms) => {
                let result = self.session.seek(ms);
                self.report(widgets, result)
            }
            RemoteCommand::SetPipeline(description) => {
                let result = self.session.set_pipeline(&description);
                if result.is_ok() {
                    self.position.reset_media();
                }
                self.report(widgets, result)
            }
        };

        match result {
            Ok(()) => REPLY_OK.to_string(),
            Err(_) => REPLY_NOK.to_string(),
        }
    }

    pub fn status_report(&self) -> String {
        let live = self.session.state().has_live_handle();
        let known = |ms: u64| if live { Some(ms) } else { None };
        remote::format_status(
            known(self.position.position_ms()),
            known(self.position.duration_ms()),
            self.session.state().label(),
            self.session.last_message(),
        )
    }
}
