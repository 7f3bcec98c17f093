//! piglet - OpenGL ES 2.0 on the Raspberry Pi VideoCore compositor
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          Application (GLES 2.0)          │
//! ├──────────────────────────────────────────┤
//! │  DisplaySurfaceManager (create/destroy)  │
//! │        ↓                     ↓           │
//! │  EGL (khronos-egl)    bcm_host/DispManX  │
//! │        ↓                     ↓           │
//! │      VideoCore GPU  →  full-screen layer │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Native libraries are opened at runtime; nothing links against the
//! Broadcom userland at build time.

pub mod config;
pub mod constants;
pub mod context;
pub mod dispmanx;
pub mod error;
pub mod ffi;
pub mod gpu;
mod loader;
pub mod symbols;

pub use config::Config;
pub use context::{DisplaySurfaceManager, EglInfo, GraphicsContext, VideoCoreSurface};
pub use dispmanx::{Compositor, DispmanxWindow, DisplayHandle, ElementHandle, UpdateHandle, VcRect};
pub use error::{status, PigletError, Result};
pub use gpu::{EglError, RenderBackend};
pub use symbols::SymbolResolver;
