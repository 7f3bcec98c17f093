//! GPU context management
//!
//! Handles:
//! - EGL backend abstraction (display, config, context, surface)
//! - VideoCore EGL loaded at runtime
//! - OpenGL ES error names

pub mod backend;
pub mod egl;
pub mod gl;

pub use backend::EglBackend;
pub use egl::{EglError, RenderBackend};
