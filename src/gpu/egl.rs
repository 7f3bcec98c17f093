//! Rendering backend abstraction
//!
//! The lifecycle in [`crate::context`] talks to EGL only through
//! [`RenderBackend`], so the real VideoCore EGL and test doubles are
//! interchangeable.

use std::fmt;

use crate::dispmanx::DispmanxWindow;

/// EGL error code as reported by eglGetError
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EglError {
    code: i32,
}

impl EglError {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    /// Raw EGL error code
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Symbolic name (e.g. "EGL_BAD_MATCH")
    pub fn name(&self) -> &'static str {
        error_string(self.code)
    }
}

impl fmt::Display for EglError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for EglError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.name(), self.code)
    }
}

impl std::error::Error for EglError {}

/// Symbolic name of an EGL error code
pub fn error_string(code: i32) -> &'static str {
    match code {
        0x3000 => "EGL_SUCCESS",
        0x3001 => "EGL_NOT_INITIALIZED",
        0x3002 => "EGL_BAD_ACCESS",
        0x3003 => "EGL_BAD_ALLOC",
        0x3004 => "EGL_BAD_ATTRIBUTE",
        0x3005 => "EGL_BAD_CONFIG",
        0x3006 => "EGL_BAD_CONTEXT",
        0x3007 => "EGL_BAD_CURRENT_SURFACE",
        0x3008 => "EGL_BAD_DISPLAY",
        0x3009 => "EGL_BAD_MATCH",
        0x300A => "EGL_BAD_NATIVE_PIXMAP",
        0x300B => "EGL_BAD_NATIVE_WINDOW",
        0x300C => "EGL_BAD_PARAMETER",
        0x300D => "EGL_BAD_SURFACE",
        0x300E => "EGL_CONTEXT_LOST",
        _ => "UNKNOWN",
    }
}

/// EGL operations used by the surface lifecycle
///
/// Handles are opaque `Copy` values; the backend never owns them; the
/// lifecycle releases each one exactly once.
pub trait RenderBackend {
    type Display: Copy + fmt::Debug;
    type Config: Copy + fmt::Debug;
    type Context: Copy + fmt::Debug;
    type Surface: Copy + fmt::Debug;

    /// eglGetDisplay(EGL_DEFAULT_DISPLAY); None for EGL_NO_DISPLAY
    fn default_display(&self) -> Option<Self::Display>;

    /// eglInitialize; returns the (major, minor) EGL version
    fn initialize(&self, display: Self::Display) -> Result<(i32, i32), EglError>;

    /// eglChooseConfig with a single requested config
    fn choose_config(
        &self,
        display: Self::Display,
        attributes: &[i32],
    ) -> Result<Option<Self::Config>, EglError>;

    fn bind_api(&self, api: u32) -> Result<(), EglError>;

    fn create_context(
        &self,
        display: Self::Display,
        config: Self::Config,
        attributes: &[i32],
    ) -> Result<Self::Context, EglError>;

    /// eglCreateWindowSurface over a DispManX native window
    ///
    /// # Safety
    /// `window` must stay at the same address and alive until the returned
    /// surface has been destroyed.
    unsafe fn create_window_surface(
        &self,
        display: Self::Display,
        config: Self::Config,
        window: *mut DispmanxWindow,
    ) -> Result<Self::Surface, EglError>;

    /// eglMakeCurrent; all None releases the current binding
    fn make_current(
        &self,
        display: Self::Display,
        draw: Option<Self::Surface>,
        read: Option<Self::Surface>,
        context: Option<Self::Context>,
    ) -> Result<(), EglError>;

    fn swap_buffers(&self, display: Self::Display, surface: Self::Surface) -> Result<(), EglError>;

    fn destroy_surface(&self, display: Self::Display, surface: Self::Surface) -> Result<(), EglError>;

    fn destroy_context(&self, display: Self::Display, context: Self::Context) -> Result<(), EglError>;

    fn terminate(&self, display: Self::Display) -> Result<(), EglError>;

    /// eglQueryString, diagnostics only
    fn query_string(&self, display: Self::Display, name: i32) -> Option<String>;
}
