//! Global constants for piglet
//!
//! EGL attribute requests, DispManX values and default library names
//! in one place instead of scattered magic numbers.

use khronos_egl as egl;

// ============================================================================
// EGL Requests
// ============================================================================

/// Config request: RGBA8888, 16-bit depth, window-drawable
pub const CONFIG_ATTRIBUTES: [egl::Int; 13] = [
    egl::RED_SIZE,
    8,
    egl::GREEN_SIZE,
    8,
    egl::BLUE_SIZE,
    8,
    egl::ALPHA_SIZE,
    8,
    egl::DEPTH_SIZE,
    16,
    egl::SURFACE_TYPE,
    egl::WINDOW_BIT,
    egl::NONE,
];

/// Context request: OpenGL ES 2.0
pub const CONTEXT_ATTRIBUTES: [egl::Int; 3] = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];

/// Client API bound before context creation
pub const CLIENT_API: egl::Enum = egl::OPENGL_ES_API;

// ============================================================================
// DispManX
// ============================================================================

/// Invalid handle returned by vc_dispmanx_* on failure
pub const DISPMANX_NO_HANDLE: u32 = 0;

/// Status returned by vc_dispmanx_* on success
pub const DISPMANX_SUCCESS: i32 = 0;

/// No content protection on the element
pub const DISPMANX_PROTECTION_NONE: u32 = 0;

/// Priority passed to vc_dispmanx_update_start
pub const DISPMANX_UPDATE_PRIORITY: i32 = 0;

/// Source rectangles are 16.16 fixed point
pub const FIXED_POINT_SHIFT: u32 = 16;

// ============================================================================
// Default Library Names
// ============================================================================

/// bcm_host candidates (Raspberry Pi OS firmware userland)
pub const DEFAULT_BCM_HOST_LIBRARIES: &[&str] = &["libbcm_host.so", "/opt/vc/lib/libbcm_host.so"];

/// EGL candidates, Broadcom names first
pub const DEFAULT_EGL_LIBRARIES: &[&str] = &[
    "libbrcmEGL.so",
    "/opt/vc/lib/libbrcmEGL.so",
    "libEGL.so",
];

/// GLES 2 candidates, Broadcom names first
pub const DEFAULT_GLES_LIBRARIES: &[&str] = &[
    "libbrcmGLESv2.so",
    "/opt/vc/lib/libbrcmGLESv2.so",
    "libGLESv2.so",
];
