// Host-supplied vtables and their adapters to the core traits
//
// Every callback receives the `user_data` pointer of its vtable. The host
// guarantees the pointer stays valid until `destroy` is called and that the
// callbacks may be invoked from the thread that drives the session API.

use crate::sink::PlayshimEventSink;
use playshim_core::{EventSender, NativeBridge, Result, SessionError, SurfaceToken, WakeLock, Widgets};
use std::ffi::CString;
use std::os::raw::{c_char, c_void};

pub type PlayshimStatusFn = extern "C" fn(user_data: *mut c_void) -> i32;
pub type PlayshimNotifyFn = extern "C" fn(user_data: *mut c_void);

/// Engine commands. A non-zero return means the engine refused the command.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlayshimEngineVTable {
    pub user_data: *mut c_void,
    /// Takes ownership of `sink` on success; the host releases it with
    /// `playshim_event_sink_release` once the engine stops posting.
    pub initialize: Option<extern "C" fn(user_data: *mut c_void, sink: *mut PlayshimEventSink) -> i32>,
    pub finalize: Option<PlayshimStatusFn>,
    pub play: Option<PlayshimStatusFn>,
    pub pause: Option<PlayshimStatusFn>,
    pub seek: Option<extern "C" fn(user_data: *mut c_void, position_ms: i64) -> i32>,
    pub bind_surface: Option<extern "C" fn(user_data: *mut c_void, surface: u64) -> i32>,
    pub unbind_surface: Option<PlayshimStatusFn>,
    /// Optional; engines with a fixed pipeline leave it null
    pub set_pipeline: Option<extern "C" fn(user_data: *mut c_void, description: *const c_char) -> i32>,
    pub destroy: Option<PlayshimNotifyFn>,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlayshimWakeLockVTable {
    pub user_data: *mut c_void,
    pub acquire: Option<extern "C" fn(user_data: *mut c_void, tag: *const c_char) -> i32>,
    pub release: Option<PlayshimStatusFn>,
    pub destroy: Option<PlayshimNotifyFn>,
}

/// UI intents. Strings are only valid for the duration of the call.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlayshimWidgetsVTable {
    pub user_data: *mut c_void,
    pub set_controls_enabled: Option<extern "C" fn(user_data: *mut c_void, enabled: bool)>,
    pub set_message: Option<extern "C" fn(user_data: *mut c_void, message: *const c_char)>,
    pub set_time_label: Option<extern "C" fn(user_data: *mut c_void, label: *const c_char)>,
    pub set_progress: Option<extern "C" fn(user_data: *mut c_void, position_ms: i64, max_ms: i64)>,
    pub request_layout: Option<extern "C" fn(user_data: *mut c_void, width: u32, height: u32)>,
    pub destroy: Option<PlayshimNotifyFn>,
}

/// Called from engine threads after every posted event, so the host can
/// schedule `playshim_session_pump` on its UI thread
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlayshimWakeCallback {
    pub user_data: *mut c_void,
    pub wake: Option<PlayshimNotifyFn>,
}

// Host pointers are opaque to us; thread affinity is the host's contract.
unsafe impl Send for PlayshimEngineVTable {}
unsafe impl Send for PlayshimWakeLockVTable {}
unsafe impl Send for PlayshimWidgetsVTable {}
unsafe impl Send for PlayshimWakeCallback {}
unsafe impl Sync for PlayshimWakeCallback {}

impl PlayshimWakeCallback {
    pub(crate) fn fire(&self) {
        if let Some(wake) = self.wake {
            wake(self.user_data);
        }
    }
}

/// Strings handed to the host never contain interior NULs
pub(crate) fn to_c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

fn missing(name: &str) -> SessionError {
    SessionError::Bridge(format!("{} not provided by host", name))
}

fn check(name: &str, code: i32) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(SessionError::Bridge(format!("{} failed with code {}", name, code)))
    }
}

/// [`NativeBridge`] backed by a host engine vtable
pub struct FfiBridge {
    vtable: PlayshimEngineVTable,
}

impl FfiBridge {
    pub fn new(vtable: PlayshimEngineVTable) -> Self {
        Self { vtable }
    }

    fn status(&self, name: &str, f: Option<PlayshimStatusFn>) -> Result<()> {
        let f = f.ok_or_else(|| missing(name))?;
        check(name, f(self.vtable.user_data))
    }
}

impl NativeBridge for FfiBridge {
    fn initialize(&mut self, events: EventSender) -> Result<()> {
        let initialize = self
            .vtable
            .initialize
            .ok_or_else(|| SessionError::InitializationFailed("initialize not provided by host".into()))?;

        let sink = PlayshimEventSink::into_raw(events);
        let code = initialize(self.vtable.user_data, sink);
        if code != 0 {
            // The host does not keep the sink on failure
            PlayshimEventSink::release(sink);
            return Err(SessionError::InitializationFailed(format!(
                "engine initialize returned {}",
                code
            )));
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.status("finalize", self.vtable.finalize)
    }

    fn play(&mut self) -> Result<()> {
        self.status("play", self.vtable.play)
    }

    fn pause(&mut self) -> Result<()> {
        self.status("pause", self.vtable.pause)
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        let seek = self.vtable.seek.ok_or_else(|| missing("seek"))?;
        let position = i64::try_from(position_ms).unwrap_or(i64::MAX);
        check("seek", seek(self.vtable.user_data, position))
    }

    fn bind_surface(&mut self, token: SurfaceToken) -> Result<()> {
        let bind = self.vtable.bind_surface.ok_or_else(|| missing("bind_surface"))?;
        check("bind_surface", bind(self.vtable.user_data, token.0))
    }

    fn unbind_surface(&mut self) -> Result<()> {
        self.status("unbind_surface", self.vtable.unbind_surface)
    }

    fn set_pipeline(&mut self, description: &str) -> Result<()> {
        let set_pipeline = self.vtable.set_pipeline.ok_or_else(|| missing("set_pipeline"))?;
        let description = to_c_string(description);
        check(
            "set_pipeline",
            set_pipeline(self.vtable.user_data, description.as_ptr()),
        )
    }
}

impl Drop for FfiBridge {
    fn drop(&mut self) {
        if let Some(destroy) = self.vtable.destroy {
            destroy(self.vtable.user_data);
        }
    }
}

/// [`WakeLock`] backed by a host vtable. A vtable without callbacks holds nothing.
pub struct FfiWakeLock {
    vtable: PlayshimWakeLockVTable,
}

impl FfiWakeLock {
    pub fn new(vtable: PlayshimWakeLockVTable) -> Self {
        Self { vtable }
    }
}

impl WakeLock for FfiWakeLock {
    fn acquire(&mut self, tag: &str) -> Result<()> {
        match self.vtable.acquire {
            Some(acquire) => {
                let tag = to_c_string(tag);
                check("wake lock acquire", acquire(self.vtable.user_data, tag.as_ptr()))
            }
            None => Ok(()),
        }
    }

    fn release(&mut self) -> Result<()> {
        match self.vtable.release {
            Some(release) => check("wake lock release", release(self.vtable.user_data)),
            None => Ok(()),
        }
    }
}

impl Drop for FfiWakeLock {
    fn drop(&mut self) {
        if let Some(destroy) = self.vtable.destroy {
            destroy(self.vtable.user_data);
        }
    }
}

/// [`Widgets`] backed by a host vtable; missing callbacks are skipped
pub struct FfiWidgets {
    vtable: PlayshimWidgetsVTable,
}

impl FfiWidgets {
    pub fn new(vtable: PlayshimWidgetsVTable) -> Self {
        Self { vtable }
    }
}

impl Widgets for FfiWidgets {
    fn set_controls_enabled(&mut self, enabled: bool) {
        if let Some(f) = self.vtable.set_controls_enabled {
            f(self.vtable.user_data, enabled);
        }
    }

    fn set_message(&mut self, message: &str) {
        if let Some(f) = self.vtable.set_message {
            let message = to_c_string(message);
            f(self.vtable.user_data, message.as_ptr());
        }
    }

    fn set_time_label(&mut self, label: &str) {
        if let Some(f) = self.vtable.set_time_label {
            let label = to_c_string(label);
            f(self.vtable.user_data, label.as_ptr());
        }
    }

    fn set_progress(&mut self, position_ms: u64, max_ms: u64) {
        if let Some(f) = self.vtable.set_progress {
            f(
                self.vtable.user_data,
                i64::try_from(position_ms).unwrap_or(i64::MAX),
                i64::try_from(max_ms).unwrap_or(i64::MAX),
            );
        }
    }

    fn request_layout(&mut self, media_width: u32, media_height: u32) {
        if let Some(f) = self.vtable.request_layout {
            f(self.vtable.user_data, media_width, media_height);
        }
    }
}

impl Drop for FfiWidgets {
    fn drop(&mut self) {
        if let Some(destroy) = self.vtable.destroy {
            destroy(self.vtable.user_data);
        }
    }
}
