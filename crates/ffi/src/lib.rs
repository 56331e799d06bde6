// C ABI for the PlayShim playback-session shim
//
// The host supplies the engine, wake lock and widgets as vtables and drives
// every `playshim_session_*` call from its UI thread. Engine threads only use
// the `playshim_post_*` entry points of the event sink they were given.
// Host callbacks must not call back into the session that invoked them.

pub mod host;
mod runtime;
pub mod sink;

pub use host::{
    PlayshimEngineVTable, PlayshimWakeCallback, PlayshimWakeLockVTable, PlayshimWidgetsVTable,
};
pub use sink::PlayshimEventSink;

use host::{FfiBridge, FfiWakeLock, FfiWidgets};
use playshim_core::{
    Notifier, PlaybackSession, Result, SessionConfig, SessionState, SurfaceToken, UiController,
};
use runtime::{SessionEntry, RUNTIME};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::Arc;

pub const PLAYSHIM_OK: i32 = 0;
pub const PLAYSHIM_ERROR: i32 = -1;
pub const PLAYSHIM_REJECTED: i32 = -2;

fn to_code<T>(result: Result<T>) -> i32 {
    match result {
        Ok(_) => PLAYSHIM_OK,
        Err(err) if err.is_rejection() => {
            log::debug!("FFI rejected: {}", err);
            PLAYSHIM_REJECTED
        }
        Err(err) => {
            log::error!("FFI error: {}", err);
            PLAYSHIM_ERROR
        }
    }
}

/// Run `f` on a registered session, or return `PLAYSHIM_ERROR` for an unknown id
fn with_session(id: i64, f: impl FnOnce(&mut SessionEntry) -> i32) -> i32 {
    match RUNTIME.get(id) {
        Some(entry) => f(&mut entry.lock()),
        None => PLAYSHIM_ERROR,
    }
}

fn state_code(state: SessionState) -> i32 {
    match state {
        SessionState::Uninitialized => 0,
        SessionState::Initializing => 1,
        SessionState::Ready => 2,
        SessionState::SurfaceBound => 3,
        SessionState::Playing => 4,
        SessionState::Paused => 5,
        SessionState::Finalizing => 6,
        SessionState::Destroyed => 7,
    }
}

// -------------------------------
// Runtime
// -------------------------------

/// Returns 0 on first initialization, 1 when already initialized
#[no_mangle]
pub extern "C" fn playshim_init() -> i32 {
    if RUNTIME.init() {
        0
    } else {
        1
    }
}

/// Shut down every session. Returns how many were shut down.
#[no_mangle]
pub extern "C" fn playshim_deinit() -> i32 {
    RUNTIME.deinit() as i32
}

// -------------------------------
// Session lifecycle
// -------------------------------

/// Register a session. `wake_lock_tag` and `wake` may be null.
///
/// Returns the session id, or -1 when the runtime is not initialized or the
/// engine or widgets vtable is missing.
#[no_mangle]
pub extern "C" fn playshim_session_create(
    engine: *const PlayshimEngineVTable,
    wake_lock: *const PlayshimWakeLockVTable,
    widgets: *const PlayshimWidgetsVTable,
    wake: *const PlayshimWakeCallback,
    wake_lock_tag: *const c_char,
) -> i64 {
    if !RUNTIME.is_initialized() {
        log::error!("playshim_init must be called before creating sessions");
        return -1;
    }

    let (engine, widgets) = match unsafe { (engine.as_ref(), widgets.as_ref()) } {
        (Some(engine), Some(widgets)) => (*engine, *widgets),
        _ => {
            log::error!("Engine and widgets vtables are required");
            return -1;
        }
    };
    let wake_lock = match unsafe { wake_lock.as_ref() } {
        Some(vtable) => *vtable,
        None => PlayshimWakeLockVTable {
            user_data: std::ptr::null_mut(),
            acquire: None,
            release: None,
            destroy: None,
        },
    };

    let mut config = SessionConfig::default();
    if !wake_lock_tag.is_null() {
        match unsafe { CStr::from_ptr(wake_lock_tag) }.to_str() {
            Ok(tag) => config = config.with_wake_lock_tag(tag),
            Err(_) => {
                log::error!("Wake lock tag is not valid UTF-8");
                return -1;
            }
        }
    }

    let bridge = FfiBridge::new(engine);
    let lock = FfiWakeLock::new(wake_lock);
    let session = match unsafe { wake.as_ref() } {
        Some(callback) => {
            let callback = *callback;
            let notifier: Notifier = Arc::new(move || callback.fire());
            PlaybackSession::with_notifier(bridge, lock, config, notifier)
        }
        None => PlaybackSession::new(bridge, lock, config),
    };

    RUNTIME.register(SessionEntry {
        controller: UiController::new(session),
        widgets: FfiWidgets::new(widgets),
    })
}

/// Acquire the power hold and start engine initialization
#[no_mangle]
pub extern "C" fn playshim_session_start(session_id: i64) -> i32 {
    with_session(session_id, |s| to_code(s.controller.activate(&mut s.widgets)))
}

/// Shut the session down and free it
#[no_mangle]
pub extern "C" fn playshim_session_destroy(session_id: i64) -> i32 {
    match RUNTIME.remove(session_id) {
        Some(entry) => {
            let mut entry = entry.lock();
            let SessionEntry { controller, widgets } = &mut *entry;
            to_code(controller.deactivate(widgets))
        }
        None => {
            log::error!("Invalid session id {}", session_id);
            PLAYSHIM_ERROR
        }
    }
}

#[no_mangle]
pub extern "C" fn playshim_session_state(session_id: i64) -> i32 {
    with_session(session_id, |s| state_code(s.controller.session().state()))
}

/// Apply queued engine events. Returns how many UI updates were rendered.
#[no_mangle]
pub extern "C" fn playshim_session_pump(session_id: i64) -> i32 {
    with_session(session_id, |s| s.controller.pump(&mut s.widgets) as i32)
}

// -------------------------------
// User input
// -------------------------------

#[no_mangle]
pub extern "C" fn playshim_session_play(session_id: i64) -> i32 {
    with_session(session_id, |s| to_code(s.controller.on_play_pressed(&mut s.widgets)))
}

#[no_mangle]
pub extern "C" fn playshim_session_pause(session_id: i64) -> i32 {
    with_session(session_id, |s| to_code(s.controller.on_pause_pressed(&mut s.widgets)))
}

#[no_mangle]
pub extern "C" fn playshim_session_drag_start(session_id: i64) -> i32 {
    with_session(session_id, |s| {
        s.controller.on_drag_start();
        PLAYSHIM_OK
    })
}

#[no_mangle]
pub extern "C" fn playshim_session_drag_progress(session_id: i64, value_ms: i64) -> i32 {
    with_session(session_id, |s| {
        s.controller
            .on_drag_progress(value_ms.max(0) as u64, &mut s.widgets);
        PLAYSHIM_OK
    })
}

/// Ends a drag with a single seek to the released value
#[no_mangle]
pub extern "C" fn playshim_session_drag_release(session_id: i64) -> i32 {
    with_session(session_id, |s| to_code(s.controller.on_drag_release(&mut s.widgets)))
}

// -------------------------------
// Surface provider
// -------------------------------

#[no_mangle]
pub extern "C" fn playshim_session_surface_created(session_id: i64, surface: u64) -> i32 {
    with_session(session_id, |s| {
        s.controller.surface_created(SurfaceToken(surface));
        PLAYSHIM_OK
    })
}

#[no_mangle]
pub extern "C" fn playshim_session_surface_changed(
    session_id: i64,
    surface: u64,
    format: i32,
    width: u32,
    height: u32,
) -> i32 {
    with_session(session_id, |s| {
        to_code(s.controller.surface_changed(
            SurfaceToken(surface),
            format,
            width,
            height,
            &mut s.widgets,
        ))
    })
}

/// Must be called before the host releases the surface
#[no_mangle]
pub extern "C" fn playshim_session_surface_destroyed(session_id: i64, surface: u64) -> i32 {
    with_session(session_id, |s| {
        to_code(
            s.controller
                .surface_destroyed(SurfaceToken(surface), &mut s.widgets),
        )
    })
}

// -------------------------------
// Remote control
// -------------------------------

/// Execute one remote command line and write the NUL-terminated reply into
/// `reply`, truncated to `reply_len - 1` bytes.
///
/// Returns the full reply length (like `snprintf`), or -1 on bad arguments.
#[no_mangle]
pub extern "C" fn playshim_session_remote_command(
    session_id: i64,
    line: *const c_char,
    reply: *mut c_char,
    reply_len: usize,
) -> i32 {
    if line.is_null() {
        return PLAYSHIM_ERROR;
    }
    let line = match unsafe { CStr::from_ptr(line) }.to_str() {
        Ok(line) => line.to_owned(),
        Err(_) => {
            log::error!("Remote command is not valid UTF-8");
            return PLAYSHIM_ERROR;
        }
    };

    with_session(session_id, |s| {
        let answer = s.controller.apply_remote_line(&line, &mut s.widgets);
        write_reply(&answer, reply, reply_len);
        answer.len() as i32
    })
}

fn write_reply(answer: &str, reply: *mut c_char, reply_len: usize) {
    if reply.is_null() || reply_len == 0 {
        return;
    }
    let count = answer.len().min(reply_len - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(answer.as_ptr() as *const c_char, reply, count);
        *reply.add(count) = 0;
    }
}
