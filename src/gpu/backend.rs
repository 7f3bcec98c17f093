//! VideoCore EGL backend
//!
//! EGL 1.4 loaded at runtime through khronos-egl. The GLES library is opened
//! alongside it (globally) so GL entry points resolve from the process image.

use std::ffi::c_void;

use khronos_egl as egl;
use libloading::Library;
use log::debug;

use super::egl::{EglError, RenderBackend};
use crate::config::LibraryConfig;
use crate::dispmanx::DispmanxWindow;
use crate::error::{PigletError, Result};
use crate::loader;

/// EGL instance type (dynamic loading, Broadcom EGL is 1.4)
type EglInstance = egl::Instance<egl::Dynamic<Library, egl::EGL1_4>>;

fn egl_error(e: egl::Error) -> EglError {
    EglError::new(egl::Int::from(e))
}

/// EGL backend over the VideoCore driver
pub struct EglBackend {
    instance: EglInstance,
    /// Kept open for the lifetime of the backend (GL symbols)
    _gles: Library,
}

impl EglBackend {
    /// Load EGL and GLES from the configured candidates
    pub fn load(libraries: &LibraryConfig) -> Result<Self> {
        // GLES first: the Broadcom EGL expects it in the process already
        let gles = loader::open_first(&libraries.gles, "GLES library", true)?;
        let lib = loader::open_first(&libraries.egl, "EGL library", true)?;

        let instance: EglInstance = unsafe {
            egl::DynamicInstance::<egl::EGL1_4>::load_required_from(lib).map_err(|e| {
                PigletError::LibraryLoad {
                    what: "EGL 1.4 entry points".to_string(),
                    reason: e.to_string(),
                }
            })?
        };
        debug!("EGL instance created");

        Ok(Self {
            instance,
            _gles: gles,
        })
    }
}

impl RenderBackend for EglBackend {
    type Display = egl::Display;
    type Config = egl::Config;
    type Context = egl::Context;
    type Surface = egl::Surface;

    fn default_display(&self) -> Option<egl::Display> {
        unsafe { self.instance.get_display(egl::DEFAULT_DISPLAY) }
    }

    fn initialize(&self, display: egl::Display) -> std::result::Result<(i32, i32), EglError> {
        self.instance.initialize(display).map_err(egl_error)
    }

    fn choose_config(
        &self,
        display: egl::Display,
        attributes: &[i32],
    ) -> std::result::Result<Option<egl::Config>, EglError> {
        self.instance
            .choose_first_config(display, attributes)
            .map_err(egl_error)
    }

    fn bind_api(&self, api: u32) -> std::result::Result<(), EglError> {
        self.instance.bind_api(api).map_err(egl_error)
    }

    fn create_context(
        &self,
        display: egl::Display,
        config: egl::Config,
        attributes: &[i32],
    ) -> std::result::Result<egl::Context, EglError> {
        self.instance
            .create_context(display, config, None, attributes)
            .map_err(egl_error)
    }

    unsafe fn create_window_surface(
        &self,
        display: egl::Display,
        config: egl::Config,
        window: *mut DispmanxWindow,
    ) -> std::result::Result<egl::Surface, EglError> {
        self.instance
            .create_window_surface(display, config, window as *mut c_void, None)
            .map_err(egl_error)
    }

    fn make_current(
        &self,
        display: egl::Display,
        draw: Option<egl::Surface>,
        read: Option<egl::Surface>,
        context: Option<egl::Context>,
    ) -> std::result::Result<(), EglError> {
        self.instance
            .make_current(display, draw, read, context)
            .map_err(egl_error)
    }

    fn swap_buffers(
        &self,
        display: egl::Display,
        surface: egl::Surface,
    ) -> std::result::Result<(), EglError> {
        self.instance
            .swap_buffers(display, surface)
            .map_err(egl_error)
    }

    fn destroy_surface(
        &self,
        display: egl::Display,
        surface: egl::Surface,
    ) -> std::result::Result<(), EglError> {
        self.instance
            .destroy_surface(display, surface)
            .map_err(egl_error)
    }

    fn destroy_context(
        &self,
        display: egl::Display,
        context: egl::Context,
    ) -> std::result::Result<(), EglError> {
        self.instance
            .destroy_context(display, context)
            .map_err(egl_error)
    }

    fn terminate(&self, display: egl::Display) -> std::result::Result<(), EglError> {
        self.instance.terminate(display).map_err(egl_error)
    }

    fn query_string(&self, display: egl::Display, name: i32) -> Option<String> {
        self.instance
            .query_string(Some(display), name)
            .ok()
            .map(|s| s.to_string_lossy().into_owned())
    }
}
