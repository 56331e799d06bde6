// Engine event entry points, callable from any engine thread
//
// A sink is handed to the engine in `initialize`. Posting never touches the
// session registry, so engine threads cannot block on the UI.

use playshim_core::{EngineEvent, EventSender};
use std::ffi::CStr;
use std::os::raw::c_char;

/// Opaque sending half of a session's event queue
pub struct PlayshimEventSink {
    sender: EventSender,
}

impl PlayshimEventSink {
    pub(crate) fn into_raw(sender: EventSender) -> *mut PlayshimEventSink {
        Box::into_raw(Box::new(PlayshimEventSink { sender }))
    }

    pub(crate) fn release(sink: *mut PlayshimEventSink) {
        if !sink.is_null() {
            drop(unsafe { Box::from_raw(sink) });
        }
    }
}

fn post(sink: *const PlayshimEventSink, event: EngineEvent) -> i32 {
    let sink = match unsafe { sink.as_ref() } {
        Some(sink) => sink,
        None => {
            log::error!("[sink] event posted to a null sink: {:?}", event);
            return -1;
        }
    };

    if sink.sender.post(event) {
        0
    } else {
        log::debug!("[sink] session is gone, event dropped");
        -1
    }
}

fn text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Release a sink the engine no longer posts to
#[no_mangle]
pub extern "C" fn playshim_event_sink_release(sink: *mut PlayshimEventSink) {
    PlayshimEventSink::release(sink);
}

#[no_mangle]
pub extern "C" fn playshim_post_ready(sink: *const PlayshimEventSink) -> i32 {
    post(sink, EngineEvent::Ready)
}

#[no_mangle]
pub extern "C" fn playshim_post_position(
    sink: *const PlayshimEventSink,
    position_ms: i64,
    duration_ms: i64,
) -> i32 {
    post(
        sink,
        EngineEvent::PositionChanged {
            position_ms,
            duration_ms,
        },
    )
}

#[no_mangle]
pub extern "C" fn playshim_post_media_size(
    sink: *const PlayshimEventSink,
    width: u32,
    height: u32,
) -> i32 {
    post(sink, EngineEvent::MediaSizeChanged { width, height })
}

#[no_mangle]
pub extern "C" fn playshim_post_message(sink: *const PlayshimEventSink, message: *const c_char) -> i32 {
    post(sink, EngineEvent::Message(text(message)))
}

/// `percent` is clamped to 0..=100
#[no_mangle]
pub extern "C" fn playshim_post_buffering(sink: *const PlayshimEventSink, percent: i32) -> i32 {
    post(sink, EngineEvent::Buffering(percent.clamp(0, 100) as u8))
}

#[no_mangle]
pub extern "C" fn playshim_post_eos(sink: *const PlayshimEventSink) -> i32 {
    post(sink, EngineEvent::EndOfStream)
}

#[no_mangle]
pub extern "C" fn playshim_post_error(sink: *const PlayshimEventSink, message: *const c_char) -> i32 {
    post(sink, EngineEvent::Error(text(message)))
}
