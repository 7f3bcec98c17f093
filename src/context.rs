//! Rendering surface lifecycle
//!
//! bcm_host + EGL + DispManX setup for one full-screen OpenGL ES 2.0 surface:
//!
//! ```text
//! bcm_host_init → eglGetDisplay → eglInitialize → eglChooseConfig
//!   → eglBindAPI → eglCreateContext → graphics_get_display_size
//!   → DispManX element (display 0, layer 0) → eglCreateWindowSurface
//!   → eglMakeCurrent
//! ```
//!
//! Teardown walks the same chain backwards.

use std::ffi::c_void;

use khronos_egl as egl;
use log::{debug, error, info, warn};

use crate::config::{Config, DisplayConfig};
use crate::constants::{
    CLIENT_API, CONFIG_ATTRIBUTES, CONTEXT_ATTRIBUTES, DISPMANX_SUCCESS, DISPMANX_UPDATE_PRIORITY,
};
use crate::dispmanx::{BcmHost, Compositor, DispmanxWindow, DisplayHandle, ElementHandle, VcRect};
use crate::error::{PigletError, Result};
use crate::gpu::egl::{EglError, RenderBackend};
use crate::gpu::EglBackend;
use crate::symbols::SymbolResolver;

/// Log a failing backend call with its symbolic error code
fn report(call: &str, e: EglError) -> EglError {
    error!("{} failed: {}", call, e);
    e
}

/// Handles of one live rendering surface
///
/// Exists only when every step of creation succeeded; dropping it releases
/// nothing (teardown is explicit, see [`DisplaySurfaceManager::destroy`]).
pub struct GraphicsContext<R: RenderBackend> {
    display: R::Display,
    context: R::Context,
    surface: R::Surface,
    compositor_display: DisplayHandle,
    element: ElementHandle,
    /// Native window read by EGL; must outlive `surface`
    window: Box<DispmanxWindow>,
    width: u32,
    height: u32,
}

impl<R: RenderBackend> GraphicsContext<R> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// DispManX element the surface is bound to
    pub fn element(&self) -> ElementHandle {
        self.element
    }

    /// Native window descriptor handed to EGL
    pub fn window(&self) -> &DispmanxWindow {
        &self.window
    }
}

/// Resources acquired so far during creation (for rollback)
struct Acquired<R: RenderBackend> {
    /// Initialized EGL display
    display: Option<R::Display>,
    context: Option<R::Context>,
    compositor_display: Option<DisplayHandle>,
    element: Option<ElementHandle>,
    surface: Option<R::Surface>,
}

impl<R: RenderBackend> Acquired<R> {
    fn new() -> Self {
        Self {
            display: None,
            context: None,
            compositor_display: None,
            element: None,
            surface: None,
        }
    }
}

/// EGL vendor strings, diagnostics only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EglInfo {
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub client_apis: Option<String>,
}

/// Owner of the full-screen rendering surface
///
/// Holds the platform backends and at most one [`GraphicsContext`].
/// EGL's current context is per thread, so a manager must stay on the
/// thread that created it (it is neither `Send` nor `Sync` for the real
/// backends).
pub struct DisplaySurfaceManager<C: Compositor, R: RenderBackend> {
    compositor: C,
    backend: R,
    display: DisplayConfig,
    rollback_on_failure: bool,
    symbols: SymbolResolver,
    context: Option<GraphicsContext<R>>,
}

/// Surface manager over the real VideoCore libraries
pub type VideoCoreSurface = DisplaySurfaceManager<BcmHost, EglBackend>;

impl VideoCoreSurface {
    /// Load bcm_host, EGL and GLES as configured
    pub fn load(config: &Config) -> Result<Self> {
        let compositor = BcmHost::load(&config.libraries.bcm_host)?;
        let backend = EglBackend::load(&config.libraries)?;
        Ok(Self::new(compositor, backend, config))
    }
}

impl<C: Compositor, R: RenderBackend> DisplaySurfaceManager<C, R> {
    pub fn new(compositor: C, backend: R, config: &Config) -> Self {
        Self {
            compositor,
            backend,
            display: config.display.clone(),
            rollback_on_failure: config.lifecycle.rollback_on_failure,
            symbols: SymbolResolver::new(),
            context: None,
        }
    }

    /// Create the context, the compositor element and the window surface,
    /// and make them current.
    ///
    /// On failure no later step runs. Resources acquired before the failing
    /// step are released unless `lifecycle.rollback_on_failure` is off.
    pub fn create(&mut self) -> Result<()> {
        if self.context.is_some() {
            warn!("Rendering context already created");
            return Err(PigletError::AlreadyCreated);
        }

        let mut window = Box::<DispmanxWindow>::default();
        let mut acquired = Acquired::new();

        match self.bring_up(&mut acquired, &mut window) {
            Ok(context) => {
                self.context = Some(context);
                Ok(())
            }
            Err(e) => {
                let surface_alive = if self.rollback_on_failure {
                    self.roll_back(acquired)
                } else {
                    warn!("Context creation failed; acquired resources left allocated");
                    acquired.surface.is_some()
                };
                if surface_alive {
                    // EGL still references the native window
                    std::mem::forget(window);
                }
                Err(e)
            }
        }
    }

    fn bring_up(
        &self,
        acquired: &mut Acquired<R>,
        window: &mut Box<DispmanxWindow>,
    ) -> Result<GraphicsContext<R>> {
        debug!("bcm_host init");
        self.compositor.host_init();

        let display = self.backend.default_display().ok_or_else(|| {
            error!("eglGetDisplay returned EGL_NO_DISPLAY");
            PigletError::DisplayUnavailable
        })?;
        debug!("eglGetDisplay: {:?}", display);

        let (major, minor) = self
            .backend
            .initialize(display)
            .map_err(|e| PigletError::BackendInitFailed(report("eglInitialize", e)))?;
        acquired.display = Some(display);
        debug!("eglInitialize: EGL {}.{}", major, minor);

        let config = match self.backend.choose_config(display, &CONFIG_ATTRIBUTES) {
            Ok(Some(config)) => config,
            Ok(None) => {
                error!("eglChooseConfig matched no config");
                return Err(PigletError::NoMatchingConfig(None));
            }
            Err(e) => {
                return Err(PigletError::NoMatchingConfig(Some(report(
                    "eglChooseConfig",
                    e,
                ))))
            }
        };
        debug!("eglChooseConfig: {:?}", config);

        self.backend
            .bind_api(CLIENT_API)
            .map_err(|e| PigletError::ApiBindFailed(report("eglBindAPI", e)))?;
        debug!("eglBindAPI: OpenGL ES");

        let context = self
            .backend
            .create_context(display, config, &CONTEXT_ATTRIBUTES)
            .map_err(|e| PigletError::ContextCreationFailed(report("eglCreateContext", e)))?;
        acquired.context = Some(context);
        debug!("eglCreateContext: {:?}", context);

        let (width, height) = self
            .compositor
            .display_size(self.display.number)
            .map_err(|status| {
                error!("graphics_get_display_size failed: status {}", status);
                PigletError::DisplaySizeQueryFailed(status)
            })?;
        info!("Display {}: {}x{}", self.display.number, width, height);

        let dest_rect = VcRect::full_screen(width, height);
        let src_rect = VcRect::fixed_point(width, height);

        let compositor_display = self.compositor.display_open(u32::from(self.display.number));
        if !compositor_display.is_valid() {
            error!("vc_dispmanx_display_open({}) failed", self.display.number);
            return Err(PigletError::CompositorOpenFailed(u32::from(self.display.number)));
        }
        acquired.compositor_display = Some(compositor_display);

        let update = self.compositor.update_start(DISPMANX_UPDATE_PRIORITY);
        if !update.is_valid() {
            error!("vc_dispmanx_update_start failed");
            return Err(PigletError::UpdateStartFailed);
        }
        let element = self.compositor.element_add(
            update,
            compositor_display,
            self.display.layer,
            &dest_rect,
            &src_rect,
        );
        let status = self.compositor.update_submit_sync(update);
        if !element.is_valid() {
            error!("vc_dispmanx_element_add failed");
            return Err(PigletError::ElementAddFailed);
        }
        acquired.element = Some(element);
        if status != DISPMANX_SUCCESS {
            error!("vc_dispmanx_update_submit_sync failed: status {}", status);
            return Err(PigletError::UpdateSubmitFailed(status));
        }
        debug!("DispManX element {:?} on layer {}", element, self.display.layer);

        **window = DispmanxWindow::new(element, width, height);
        let window_ptr: *mut DispmanxWindow = &mut **window;

        // window is heap-allocated and moves into the GraphicsContext,
        // which outlives the surface
        let surface = unsafe {
            self.backend
                .create_window_surface(display, config, window_ptr)
                .map_err(|e| {
                    PigletError::SurfaceCreationFailed(report("eglCreateWindowSurface", e))
                })?
        };
        acquired.surface = Some(surface);
        debug!("eglCreateWindowSurface: {:?}", surface);

        self.backend
            .make_current(display, Some(surface), Some(surface), Some(context))
            .map_err(|e| PigletError::MakeCurrentFailed(report("eglMakeCurrent", e)))?;
        debug!("eglMakeCurrent");

        let egl_info = self.query_egl_info(display);
        info!(
            "EGL {} {} ({})",
            egl_info.vendor.as_deref().unwrap_or("?"),
            egl_info.version.as_deref().unwrap_or("?"),
            egl_info.client_apis.as_deref().unwrap_or("?")
        );
        info!("Rendering context created: {}x{}", width, height);

        Ok(GraphicsContext {
            display,
            context,
            surface,
            compositor_display,
            element,
            window: std::mem::take(window),
            width,
            height,
        })
    }

    /// Release whatever a failed creation acquired, newest first.
    ///
    /// Returns true if a window surface is still alive afterwards.
    fn roll_back(&self, acquired: Acquired<R>) -> bool {
        let Some(display) = acquired.display else {
            return false;
        };
        warn!("Rolling back partial context creation");

        let mut surface_alive = false;
        if let Some(surface) = acquired.surface {
            if let Err(e) = self.backend.destroy_surface(display, surface) {
                warn!("Rollback: eglDestroySurface failed: {}", e);
                surface_alive = true;
            }
        }

        if let Some(element) = acquired.element {
            let update = self.compositor.update_start(DISPMANX_UPDATE_PRIORITY);
            if update.is_valid() {
                let status = self.compositor.element_remove(update, element);
                if status != DISPMANX_SUCCESS {
                    warn!("Rollback: vc_dispmanx_element_remove failed: status {}", status);
                }
                let status = self.compositor.update_submit_sync(update);
                if status != DISPMANX_SUCCESS {
                    warn!("Rollback: vc_dispmanx_update_submit_sync failed: status {}", status);
                }
            } else {
                warn!("Rollback: vc_dispmanx_update_start failed; element left on screen");
            }
        }

        if let Some(compositor_display) = acquired.compositor_display {
            let status = self.compositor.display_close(compositor_display);
            if status != DISPMANX_SUCCESS {
                warn!("Rollback: vc_dispmanx_display_close failed: status {}", status);
            }
        }

        if let Some(context) = acquired.context {
            if let Err(e) = self.backend.destroy_context(display, context) {
                warn!("Rollback: eglDestroyContext failed: {}", e);
            }
        }

        if let Err(e) = self.backend.terminate(display) {
            warn!("Rollback: eglTerminate failed: {}", e);
        }
        surface_alive
    }

    /// Release the surface, the compositor element and the context.
    ///
    /// Starting the update, element removal, update submission, display
    /// close and unbinding the context stop the teardown at the first
    /// failure; the manager is left without a context either way. If the
    /// surface cannot be destroyed its native window is leaked.
    pub fn destroy(&mut self) -> Result<()> {
        let context = self.context.take().ok_or(PigletError::NotCreated)?;
        self.tear_down(context)
    }

    fn tear_down(&self, ctx: GraphicsContext<R>) -> Result<()> {
        let GraphicsContext {
            display,
            context,
            surface,
            compositor_display,
            element,
            window,
            ..
        } = ctx;

        if let Err(e) = self.backend.destroy_surface(display, surface) {
            report("eglDestroySurface", e);
            // surface still alive and reading the window
            std::mem::forget(window);
        }

        let update = self.compositor.update_start(DISPMANX_UPDATE_PRIORITY);
        if !update.is_valid() {
            error!("vc_dispmanx_update_start failed");
            return Err(PigletError::UpdateStartFailed);
        }
        let status = self.compositor.element_remove(update, element);
        if status != DISPMANX_SUCCESS {
            error!("vc_dispmanx_element_remove failed: status {}", status);
            return Err(PigletError::ElementRemovalFailed(status));
        }

        let status = self.compositor.update_submit_sync(update);
        if status != DISPMANX_SUCCESS {
            error!("vc_dispmanx_update_submit_sync failed: status {}", status);
            return Err(PigletError::UpdateSubmitFailed(status));
        }

        let status = self.compositor.display_close(compositor_display);
        if status != DISPMANX_SUCCESS {
            error!("vc_dispmanx_display_close failed: status {}", status);
            return Err(PigletError::DisplayCloseFailed(status));
        }

        self.backend
            .make_current(display, None, None, None)
            .map_err(|e| PigletError::MakeCurrentFailed(report("eglMakeCurrent", e)))?;

        if let Err(e) = self.backend.destroy_context(display, context) {
            report("eglDestroyContext", e);
        }

        if let Err(e) = self.backend.terminate(display) {
            report("eglTerminate", e);
        }

        info!("Rendering context destroyed");
        Ok(())
    }

    /// Bind the surface and context to the calling thread again
    pub fn make_current(&self) -> Result<()> {
        let ctx = self.context.as_ref().ok_or(PigletError::NotCreated)?;
        self.backend
            .make_current(ctx.display, Some(ctx.surface), Some(ctx.surface), Some(ctx.context))
            .map_err(|e| PigletError::MakeCurrentFailed(report("eglMakeCurrent", e)))
    }

    /// Present the back buffer
    pub fn swap_buffers(&self) -> Result<()> {
        let ctx = self.context.as_ref().ok_or(PigletError::NotCreated)?;
        self.backend
            .swap_buffers(ctx.display, ctx.surface)
            .map_err(|e| PigletError::SwapFailed(report("eglSwapBuffers", e)))
    }

    /// Display width in pixels, 0 without a context
    pub fn width(&self) -> u32 {
        self.context.as_ref().map_or(0, |c| c.width)
    }

    /// Display height in pixels, 0 without a context
    pub fn height(&self) -> u32 {
        self.context.as_ref().map_or(0, |c| c.height)
    }

    pub fn display_size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn is_created(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&GraphicsContext<R>> {
        self.context.as_ref()
    }

    /// GL / EGL entry point by name, null if the process does not export it
    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        self.symbols.resolve(name) as *const c_void
    }

    /// Vendor strings of the live display
    pub fn egl_info(&self) -> Option<EglInfo> {
        self.context
            .as_ref()
            .map(|ctx| self.query_egl_info(ctx.display))
    }

    fn query_egl_info(&self, display: R::Display) -> EglInfo {
        EglInfo {
            vendor: self.backend.query_string(display, egl::VENDOR),
            version: self.backend.query_string(display, egl::VERSION),
            client_apis: self.backend.query_string(display, egl::CLIENT_APIS),
        }
    }
}

impl<C: Compositor, R: RenderBackend> Drop for DisplaySurfaceManager<C, R> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            if let Err(e) = self.tear_down(context) {
                warn!("Teardown on drop failed: {}", e);
            }
        }
    }
}
