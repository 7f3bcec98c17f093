//! DispManX compositor
//!
//! The VideoCore compositor shows the EGL surface through a single
//! full-screen element. [`Compositor`] covers the handful of bcm_host
//! calls the lifecycle needs.

pub mod bcm_host;

pub use bcm_host::BcmHost;

use crate::constants::{DISPMANX_NO_HANDLE, FIXED_POINT_SHIFT};

/// DISPMANX_DISPLAY_HANDLE_T
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayHandle(pub u32);

/// DISPMANX_UPDATE_HANDLE_T
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateHandle(pub u32);

/// DISPMANX_ELEMENT_HANDLE_T
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElementHandle(pub u32);

impl DisplayHandle {
    pub fn is_valid(self) -> bool {
        self.0 != DISPMANX_NO_HANDLE
    }
}

impl UpdateHandle {
    pub fn is_valid(self) -> bool {
        self.0 != DISPMANX_NO_HANDLE
    }
}

impl ElementHandle {
    pub fn is_valid(self) -> bool {
        self.0 != DISPMANX_NO_HANDLE
    }
}

/// VC_RECT_T
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VcRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl VcRect {
    /// Destination rectangle covering a `width`x`height` display, in pixels
    pub fn full_screen(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }

    /// Source rectangle of the same size in 16.16 fixed point
    ///
    /// The compositor reads source rectangles as 16.16; the dimensions are
    /// shifted left by 16 bits with the same bit pattern the C API expects.
    pub fn fixed_point(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: (width << FIXED_POINT_SHIFT) as i32,
            height: (height << FIXED_POINT_SHIFT) as i32,
        }
    }
}

/// EGL_DISPMANX_WINDOW_T, the native window handed to eglCreateWindowSurface
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispmanxWindow {
    pub element: ElementHandle,
    pub width: i32,
    pub height: i32,
}

impl DispmanxWindow {
    pub fn new(element: ElementHandle, width: u32, height: u32) -> Self {
        Self {
            element,
            width: width as i32,
            height: height as i32,
        }
    }
}

/// bcm_host / DispManX operations used by the surface lifecycle
pub trait Compositor {
    /// bcm_host_init
    fn host_init(&self);

    /// graphics_get_display_size; Err carries the negative status
    fn display_size(&self, display: u16) -> Result<(u32, u32), i32>;

    /// vc_dispmanx_display_open
    fn display_open(&self, device: u32) -> DisplayHandle;

    /// vc_dispmanx_update_start
    fn update_start(&self, priority: i32) -> UpdateHandle;

    /// vc_dispmanx_element_add with no source resource, no protection,
    /// no alpha, no clamp and no transform
    fn element_add(
        &self,
        update: UpdateHandle,
        display: DisplayHandle,
        layer: i32,
        dest: &VcRect,
        src: &VcRect,
    ) -> ElementHandle;

    /// vc_dispmanx_update_submit_sync; blocks until applied
    fn update_submit_sync(&self, update: UpdateHandle) -> i32;

    /// vc_dispmanx_element_remove
    fn element_remove(&self, update: UpdateHandle, element: ElementHandle) -> i32;

    /// vc_dispmanx_display_close
    fn display_close(&self, display: DisplayHandle) -> i32;
}
