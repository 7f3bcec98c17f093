//! bcm_host loaded at runtime
//!
//! Entry points are resolved once at load time and called through plain
//! function pointers.

use std::ffi::c_void;
use std::ptr;

use libloading::Library;
use log::debug;

use super::{Compositor, DisplayHandle, ElementHandle, UpdateHandle, VcRect};
use crate::constants::DISPMANX_PROTECTION_NONE;
use crate::error::Result;
use crate::loader;

type HostInitFn = unsafe extern "C" fn();
type DisplaySizeFn = unsafe extern "C" fn(u16, *mut u32, *mut u32) -> i32;
type DisplayOpenFn = unsafe extern "C" fn(u32) -> u32;
type UpdateStartFn = unsafe extern "C" fn(i32) -> u32;
type ElementAddFn = unsafe extern "C" fn(
    u32,           // update
    u32,           // display
    i32,           // layer
    *const VcRect, // dest_rect
    u32,           // src resource
    *const VcRect, // src_rect
    u32,           // protection
    *mut c_void,   // alpha
    *mut c_void,   // clamp
    i32,           // transform
) -> u32;
type UpdateSubmitSyncFn = unsafe extern "C" fn(u32) -> i32;
type ElementRemoveFn = unsafe extern "C" fn(u32, u32) -> i32;
type DisplayCloseFn = unsafe extern "C" fn(u32) -> i32;

/// bcm_host / DispManX entry points
pub struct BcmHost {
    host_init: HostInitFn,
    display_size: DisplaySizeFn,
    display_open: DisplayOpenFn,
    update_start: UpdateStartFn,
    element_add: ElementAddFn,
    update_submit_sync: UpdateSubmitSyncFn,
    element_remove: ElementRemoveFn,
    display_close: DisplayCloseFn,
    /// Owns the code behind the function pointers above
    _lib: Library,
}

impl BcmHost {
    /// Load bcm_host from the first loadable candidate
    pub fn load<S: AsRef<str>>(candidates: &[S]) -> Result<Self> {
        let lib = loader::open_first(candidates, "bcm_host library", false)?;

        let host = unsafe {
            Self {
                host_init: loader::symbol(&lib, "bcm_host_init")?,
                display_size: loader::symbol(&lib, "graphics_get_display_size")?,
                display_open: loader::symbol(&lib, "vc_dispmanx_display_open")?,
                update_start: loader::symbol(&lib, "vc_dispmanx_update_start")?,
                element_add: loader::symbol(&lib, "vc_dispmanx_element_add")?,
                update_submit_sync: loader::symbol(&lib, "vc_dispmanx_update_submit_sync")?,
                element_remove: loader::symbol(&lib, "vc_dispmanx_element_remove")?,
                display_close: loader::symbol(&lib, "vc_dispmanx_display_close")?,
                _lib: lib,
            }
        };
        debug!("bcm_host entry points resolved");
        Ok(host)
    }
}

impl Compositor for BcmHost {
    fn host_init(&self) {
        unsafe { (self.host_init)() }
    }

    fn display_size(&self, display: u16) -> std::result::Result<(u32, u32), i32> {
        let mut width = 0u32;
        let mut height = 0u32;
        let ret = unsafe { (self.display_size)(display, &mut width, &mut height) };
        if ret < 0 {
            Err(ret)
        } else {
            Ok((width, height))
        }
    }

    fn display_open(&self, device: u32) -> DisplayHandle {
        DisplayHandle(unsafe { (self.display_open)(device) })
    }

    fn update_start(&self, priority: i32) -> UpdateHandle {
        UpdateHandle(unsafe { (self.update_start)(priority) })
    }

    fn element_add(
        &self,
        update: UpdateHandle,
        display: DisplayHandle,
        layer: i32,
        dest: &VcRect,
        src: &VcRect,
    ) -> ElementHandle {
        let element = unsafe {
            (self.element_add)(
                update.0,
                display.0,
                layer,
                dest,
                0,
                src,
                DISPMANX_PROTECTION_NONE,
                ptr::null_mut(),
                ptr::null_mut(),
                0,
            )
        };
        ElementHandle(element)
    }

    fn update_submit_sync(&self, update: UpdateHandle) -> i32 {
        unsafe { (self.update_submit_sync)(update.0) }
    }

    fn element_remove(&self, update: UpdateHandle, element: ElementHandle) -> i32 {
        unsafe { (self.element_remove)(update.0, element.0) }
    }

    fn display_close(&self, display: DisplayHandle) -> i32 {
        unsafe { (self.display_close)(display.0) }
    }
}
