//! C entry points
//!
//! `CreateContext`, `DestroyContext`, `MakeCurrent`, `SwapBuffers`,
//! `GetDisplayWidth`, `GetDisplayHeight` and `GetProcAddress` for C (or
//! cgo) callers that link the cdylib. State lives in a thread-local
//! manager, matching EGL's per-thread current context.

#![allow(non_snake_case)]

use std::cell::RefCell;
use std::ffi::{c_void, CStr};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::sync::Once;

use log::{error, warn};

use crate::config::Config;
use crate::context::VideoCoreSurface;
use crate::error::{status, PigletError, Result};
use crate::symbols::SymbolResolver;

thread_local! {
    static SURFACE: RefCell<Option<VideoCoreSurface>> = const { RefCell::new(None) };
    static SYMBOLS: SymbolResolver = SymbolResolver::new();
}

static LOGGER: Once = Once::new();

/// Install a stderr logger for C callers (`RUST_LOG`, default "warn").
///
/// Runs once per process; a logger the host already installed is kept.
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .try_init();
    });
}

/// Create the rendering context on display 0. Returns 0 on success, -1 on failure.
#[no_mangle]
pub extern "C" fn CreateContext() -> c_int {
    init_logging();
    let result = SURFACE.with(|cell| -> Result<()> {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(VideoCoreSurface::load(&Config::load())?);
        }
        match slot.as_mut() {
            Some(surface) => surface.create(),
            None => Err(PigletError::NotCreated),
        }
    });
    if let Err(e) = &result {
        error!("CreateContext: {}", e);
    }
    status(&result)
}

/// Destroy the rendering context. Returns 0 on success, -1 on failure.
#[no_mangle]
pub extern "C" fn DestroyContext() -> c_int {
    init_logging();
    let result = SURFACE.with(|cell| match cell.borrow_mut().as_mut() {
        Some(surface) => surface.destroy(),
        None => Err(PigletError::NotCreated),
    });
    if let Err(e) = &result {
        error!("DestroyContext: {}", e);
    }
    status(&result)
}

/// Make the context current on the calling thread; failures (and calls
/// before CreateContext) are logged only
#[no_mangle]
pub extern "C" fn MakeCurrent() {
    init_logging();
    SURFACE.with(|cell| match cell.borrow().as_ref() {
        Some(surface) => {
            let _ = surface.make_current();
        }
        None => warn!("MakeCurrent: {}", PigletError::NotCreated),
    });
}

/// Present the back buffer; failures (and calls before CreateContext) are
/// logged only
#[no_mangle]
pub extern "C" fn SwapBuffers() {
    init_logging();
    SURFACE.with(|cell| match cell.borrow().as_ref() {
        Some(surface) => {
            let _ = surface.swap_buffers();
        }
        None => warn!("SwapBuffers: {}", PigletError::NotCreated),
    });
}

/// Display width in pixels, 0 before CreateContext
#[no_mangle]
pub extern "C" fn GetDisplayWidth() -> c_int {
    SURFACE.with(|cell| cell.borrow().as_ref().map_or(0, |s| s.width() as c_int))
}

/// Display height in pixels, 0 before CreateContext
#[no_mangle]
pub extern "C" fn GetDisplayHeight() -> c_int {
    SURFACE.with(|cell| cell.borrow().as_ref().map_or(0, |s| s.height() as c_int))
}

/// Address of a GL / EGL function exported by the process, or null
///
/// # Safety
/// `name` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn GetProcAddress(name: *const c_char) -> *mut c_void {
    if name.is_null() {
        return ptr::null_mut();
    }
    match CStr::from_ptr(name).to_str() {
        Ok(name) => SYMBOLS.with(|symbols| symbols.resolve(name)),
        Err(_) => ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_before_create() {
        assert_eq!(GetDisplayWidth(), 0);
        assert_eq!(GetDisplayHeight(), 0);
    }

    #[test]
    fn test_destroy_without_create_fails() {
        assert_eq!(DestroyContext(), -1);
    }

    #[test]
    fn test_per_frame_calls_without_context_do_nothing() {
        MakeCurrent();
        SwapBuffers();
        assert_eq!(GetDisplayWidth(), 0);
        assert!(SURFACE.with(|cell| cell.borrow().is_none()));
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
        assert!(LOGGER.is_completed());
        warn!("logger installed");
    }

    #[test]
    fn test_get_proc_address() {
        let found = unsafe { GetProcAddress(b"malloc\0".as_ptr() as *const c_char) };
        assert!(!found.is_null());

        let missing =
            unsafe { GetProcAddress(b"piglet_missing_symbol\0".as_ptr() as *const c_char) };
        assert!(missing.is_null());

        assert!(unsafe { GetProcAddress(ptr::null()) }.is_null());
        assert!(unsafe { GetProcAddress(b"\0".as_ptr() as *const c_char) }.is_null());
    }
}
