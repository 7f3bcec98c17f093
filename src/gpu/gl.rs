//! OpenGL ES helpers

/// Symbolic name of a glGetError code
pub fn error_string(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "NO_ERROR",
        glow::INVALID_ENUM => "INVALID_ENUM",
        glow::INVALID_VALUE => "INVALID_VALUE",
        glow::INVALID_OPERATION => "INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        _ => "UNKNOWN",
    }
}
