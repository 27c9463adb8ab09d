// ffi.rs - C entry points for embedding interpreters

//! C surface for the audio bindings.
//!
//! One process-wide [`Oal`] instance backs these functions. Handles cross
//! the boundary as opaque pointers created with `Box::into_raw`; the
//! matching `_free` function takes ownership back. Functions returning
//! `c_int` use 0 for success and [`OalError::status`] otherwise, and leave a
//! message for [`oal_last_error_message`].

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::path::Path;

use libc::{c_char, c_float, c_int, c_uint, size_t};
use parking_lot::Mutex;

use crate::config::load_config;
use crate::oal::binding::{Oal, PcmInfo, PlaybackParams};
use crate::oal::error::{InitError, OalError};
use crate::oal::handle::{BufferHandle, SourceHandle};

pub const OAL_OK: c_int = 0;
pub const OAL_ERR_NULL: c_int = -9;

static OAL: Mutex<Option<Oal>> = Mutex::new(None);

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

fn set_last_error(msg: &str) {
    let msg = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = msg);
}

fn fail(err: OalError) -> c_int {
    crate::log_debug!("oal ffi: {}", err);
    set_last_error(&err.to_string());
    err.status()
}

fn null_arg(name: &str) -> c_int {
    set_last_error(&format!("null {} pointer", name));
    OAL_ERR_NULL
}

fn status(result: Result<(), OalError>) -> c_int {
    match result {
        Ok(()) => OAL_OK,
        Err(e) => fail(e),
    }
}

/// Initialize audio. `config_path` may be null for defaults.
///
/// The default device needs the `playback` feature. Without it, hosts must
/// select the null device (`device = null` in the config file, or
/// `OAL_DEVICE=null`), otherwise this returns the init status.
///
/// Calling again while initialized succeeds without reopening the device.
#[no_mangle]
pub extern "C" fn oal_initialize(config_path: *const c_char) -> c_int {
    let mut slot = OAL.lock();
    if slot.is_some() {
        return OAL_OK;
    }

    let path = if config_path.is_null() {
        None
    } else {
        match unsafe { CStr::from_ptr(config_path) }.to_str() {
            Ok(s) => Some(s),
            Err(_) => {
                return fail(InitError::Context("config path is not UTF-8".into()).into());
            }
        }
    };

    let config = match load_config(path.map(Path::new)) {
        Ok(config) => config,
        Err(e) => return fail(InitError::Context(format!("{:#}", e)).into()),
    };

    match Oal::initialize(&config) {
        Ok(oal) => {
            *slot = Some(oal);
            OAL_OK
        }
        Err(e) => fail(e),
    }
}

/// Destroy the context and close the device. Outstanding handles stay
/// valid pointers but their operations fail until freed.
#[no_mangle]
pub extern "C" fn oal_shutdown() {
    if let Some(oal) = OAL.lock().take() {
        oal.shutdown();
    }
}

fn with_oal<T>(f: impl FnOnce(&Oal) -> Result<T, OalError>) -> Result<T, OalError> {
    match OAL.lock().as_ref() {
        Some(oal) => f(oal),
        None => Err(InitError::Context("audio is not initialized".into()).into()),
    }
}

#[no_mangle]
pub extern "C" fn oal_create_source(out: *mut *mut SourceHandle) -> c_int {
    if out.is_null() {
        return null_arg("out");
    }
    match with_oal(Oal::create_source) {
        Ok(source) => {
            unsafe {
                *out = Box::into_raw(Box::new(source));
            }
            OAL_OK
        }
        Err(e) => fail(e),
    }
}

#[no_mangle]
pub extern "C" fn oal_create_bufferid(out: *mut *mut BufferHandle) -> c_int {
    if out.is_null() {
        return null_arg("out");
    }
    match with_oal(Oal::create_bufferid) {
        Ok(buffer) => {
            unsafe {
                *out = Box::into_raw(Box::new(buffer));
            }
            OAL_OK
        }
        Err(e) => fail(e),
    }
}

/// Upload `size` bytes of PCM from `data` into `buffer`
#[no_mangle]
pub extern "C" fn oal_buffer_bind(
    buffer: *const BufferHandle,
    format: c_uint,
    data: *const u8,
    size: size_t,
    frequency: c_uint,
) -> c_int {
    let Some(buffer) = (unsafe { buffer.as_ref() }) else {
        return null_arg("buffer");
    };
    let data: &[u8] = if size == 0 {
        &[]
    } else if data.is_null() {
        return null_arg("data");
    } else {
        unsafe { std::slice::from_raw_parts(data, size) }
    };

    let pcm = PcmInfo {
        format,
        data,
        size,
        frequency,
    };
    status(with_oal(|oal| oal.buffer_bind(buffer, &pcm)).map_err(lost_if_uninit))
}

/// Bind `buffer` to `source` and apply the playback parameters
#[no_mangle]
pub extern "C" fn oal_source_set(
    source: *const SourceHandle,
    buffer: *const BufferHandle,
    pitch: c_float,
    pan: c_float,
    gain: c_float,
    looping: c_int,
) -> c_int {
    let Some(source) = (unsafe { source.as_ref() }) else {
        return null_arg("source");
    };
    let Some(buffer) = (unsafe { buffer.as_ref() }) else {
        return null_arg("buffer");
    };

    let params = PlaybackParams {
        pitch,
        pan,
        gain,
        looping: looping != 0,
    };
    status(
        with_oal(|oal| oal.source_set(source, buffer, params).map(|_| ()))
            .map_err(lost_if_uninit),
    )
}

// A handle outliving oal_shutdown talks to a dead context.
fn lost_if_uninit(err: OalError) -> OalError {
    match err {
        OalError::Init(_) => OalError::ContextLost,
        other => other,
    }
}

macro_rules! transport {
    ($name:ident, $method:ident) => {
        #[no_mangle]
        pub extern "C" fn $name(source: *const SourceHandle) {
            if let Some(source) = unsafe { source.as_ref() } {
                source.$method();
            }
        }
    };
}

transport!(oal_source_play, play);
transport!(oal_source_pause, pause);
transport!(oal_source_stop, stop);
transport!(oal_source_rewind, rewind);

#[no_mangle]
pub extern "C" fn oal_source_clear(source: *const SourceHandle) -> c_int {
    match unsafe { source.as_ref() } {
        Some(source) => status(source.clear()),
        None => null_arg("source"),
    }
}

/// Native `AL_SOURCE_STATE` value, or 0 when it cannot be queried
#[no_mangle]
pub extern "C" fn oal_source_state(source: *const SourceHandle) -> c_uint {
    unsafe { source.as_ref() }
        .and_then(|source| source.state().ok())
        .map(|state| state as c_uint)
        .unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn oal_source_id(source: *const SourceHandle) -> c_uint {
    unsafe { source.as_ref() }.map(SourceHandle::id).unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn oal_buffer_id(buffer: *const BufferHandle) -> c_uint {
    unsafe { buffer.as_ref() }.map(BufferHandle::id).unwrap_or(0)
}

/// Release a source handle. The pointer is invalid afterwards.
#[no_mangle]
pub extern "C" fn oal_source_free(source: *mut SourceHandle) -> c_int {
    if source.is_null() {
        return OAL_OK;
    }
    let source = unsafe { Box::from_raw(source) };
    if !source.context().is_current() {
        // Context already gone; nothing native left to free.
        drop(source);
        return OAL_OK;
    }
    status((*source).release())
}

/// Release a buffer handle. The pointer is invalid afterwards, even when
/// a bound source defers the native deletion.
#[no_mangle]
pub extern "C" fn oal_buffer_free(buffer: *mut BufferHandle) -> c_int {
    if buffer.is_null() {
        return OAL_OK;
    }
    let buffer = unsafe { Box::from_raw(buffer) };
    if !buffer.context().is_current() {
        drop(buffer);
        return OAL_OK;
    }
    status((*buffer).release())
}

/// Message for the last failing call on this thread. Valid until the next
/// failing call on the same thread.
#[no_mangle]
pub extern "C" fn oal_last_error_message() -> *const c_char {
    LAST_ERROR.with(|slot| slot.borrow().as_ptr())
}
