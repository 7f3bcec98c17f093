//! Error types
//!
//! Every creation/teardown step of the rendering surface maps to one variant,
//! so callers can tell which backend call gave up.

use std::os::raw::c_int;

use thiserror::Error;

use crate::gpu::egl::EglError;

/// Errors reported by the surface lifecycle
#[derive(Debug, Error)]
pub enum PigletError {
    /// eglGetDisplay returned EGL_NO_DISPLAY
    #[error("no EGL display available")]
    DisplayUnavailable,

    #[error("failed to initialize EGL: {0}")]
    BackendInitFailed(EglError),

    /// eglChooseConfig failed or matched nothing (error is None when it just matched nothing)
    #[error("no matching EGL config{}", .0.map(|e| format!(": {}", e)).unwrap_or_default())]
    NoMatchingConfig(Option<EglError>),

    #[error("failed to bind OpenGL ES API: {0}")]
    ApiBindFailed(EglError),

    #[error("failed to create EGL context: {0}")]
    ContextCreationFailed(EglError),

    /// graphics_get_display_size returned a negative status
    #[error("failed to query display size (status {0})")]
    DisplaySizeQueryFailed(i32),

    #[error("failed to create window surface: {0}")]
    SurfaceCreationFailed(EglError),

    #[error("failed to make context current: {0}")]
    MakeCurrentFailed(EglError),

    #[error("failed to swap buffers: {0}")]
    SwapFailed(EglError),

    /// vc_dispmanx_display_open returned DISPMANX_NO_HANDLE
    #[error("failed to open compositor display {0}")]
    CompositorOpenFailed(u32),

    /// vc_dispmanx_element_add returned DISPMANX_NO_HANDLE
    #[error("failed to add compositor element")]
    ElementAddFailed,

    /// vc_dispmanx_update_start returned DISPMANX_NO_HANDLE
    #[error("failed to start compositor update")]
    UpdateStartFailed,

    #[error("failed to submit compositor update (status {0})")]
    UpdateSubmitFailed(i32),

    #[error("failed to remove element from display (status {0})")]
    ElementRemovalFailed(i32),

    #[error("failed to close compositor display (status {0})")]
    DisplayCloseFailed(i32),

    #[error("failed to load {what}: {reason}")]
    LibraryLoad { what: String, reason: String },

    #[error("rendering context already created")]
    AlreadyCreated,

    #[error("rendering context not created")]
    NotCreated,

    #[error("invalid symbol name {0:?}")]
    InvalidSymbolName(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PigletError>;

/// C status code for a lifecycle result: 0 on success, -1 on any failure
pub fn status(result: &Result<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(status(&Ok(())), 0);
        assert_eq!(status(&Err(PigletError::DisplayUnavailable)), -1);
        assert_eq!(status(&Err(PigletError::DisplayCloseFailed(3))), -1);
    }

    #[test]
    fn test_messages_name_egl_error() {
        let err = PigletError::SurfaceCreationFailed(EglError::new(0x300B));
        assert_eq!(
            err.to_string(),
            "failed to create window surface: EGL_BAD_NATIVE_WINDOW"
        );

        let none = PigletError::NoMatchingConfig(None);
        assert_eq!(none.to_string(), "no matching EGL config");
        let bad = PigletError::NoMatchingConfig(Some(EglError::new(0x3004)));
        assert_eq!(bad.to_string(), "no matching EGL config: EGL_BAD_ATTRIBUTE");
    }
}
