// SPDX-License-Identifier: GPL-3.0-only

use crate::{
    backend::Bootstrap,
    config,
    gl::{ContextHandle, GlPlatform, SurfaceHandle},
    input::{InputSource, RawInputEvent},
    video::{
        ApiVersion, Display, DisplayMode, DisplayRegistry, VideoBackend, VideoError, Window,
        WindowFlags, WindowId, WmInfo, WmSubsystem,
    },
};
use std::{
    collections::{HashMap, VecDeque},
    ffi::c_void,
    path::Path,
};
use tracing::{debug, warn};

pub static BOOTSTRAP: Bootstrap = Bootstrap {
    name: "fbdev",
    description: "Linux framebuffer video driver",
    available,
    create,
};

fn available() -> bool {
    true
}

fn create() -> anyhow::Result<Box<dyn VideoBackend>> {
    let backend = FbdevBackend::new(Box::new(crate::gl::headless::HeadlessGl::new()));
    #[cfg(feature = "input-evdev")]
    let backend = backend.with_input(Box::new(crate::input::evdev::EvdevInput::new()));
    Ok(Box::new(backend))
}

/// Driver state for a window. Holds nothing besides the rendering surface.
struct WindowData {
    surface: Option<SurfaceHandle>,
}

/// Video backend for a fixed-mode framebuffer panel. Display and window
/// handling collapse to the one mode the hardware is wired for; rendering
/// and input are forwarded to the external collaborators.
pub struct FbdevBackend {
    platform: Box<dyn GlPlatform>,
    input: Option<Box<dyn InputSource>>,
    windows: HashMap<WindowId, WindowData>,
    gl_loaded: bool,
}

impl FbdevBackend {
    /// The default bootstrap wires in the built-in headless platform. Hosts
    /// with a real EGL stack construct the backend around their own.
    pub fn new(platform: Box<dyn GlPlatform>) -> FbdevBackend {
        FbdevBackend {
            platform,
            input: None,
            windows: HashMap::new(),
            gl_loaded: false,
        }
    }

    pub fn with_input(mut self, input: Box<dyn InputSource>) -> FbdevBackend {
        self.input = Some(input);
        self
    }

    fn surface_for(&self, id: WindowId) -> Option<SurfaceHandle> {
        self.windows.get(&id).and_then(|data| data.surface)
    }
}

impl VideoBackend for FbdevBackend {
    fn name(&self) -> &'static str {
        BOOTSTRAP.name
    }

    fn init(&mut self, displays: &mut DisplayRegistry) -> Result<(), VideoError> {
        for index in 0..config::DISPLAY_COUNT {
            let name = format!("FB-{}", index);
            displays.add_display(Display::new(name, config::FIXED_MODE));
        }
        if let Some(input) = self.input.as_mut() {
            input.init()?;
        }
        debug!(mode = ?config::FIXED_MODE, "Registered fixed framebuffer mode");
        Ok(())
    }

    fn quit(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.quit();
        }
    }

    fn display_modes(&self, display: &Display) -> Vec<DisplayMode> {
        // Only one display mode available, the current one
        vec![display.current_mode()]
    }

    fn set_display_mode(
        &mut self,
        _display: &Display,
        _mode: &DisplayMode,
    ) -> Result<(), VideoError> {
        // The panel stays in its fixed mode. Requests are accepted and ignored.
        Ok(())
    }

    fn create_window(&mut self, window: &mut Window) -> Result<(), VideoError> {
        // Windows have one size for now
        window.set_size(config::FIXED_MODE.size);
        // Rendering goes through GLES whether the client asked for it or not
        window.insert_flags(WindowFlags::OPENGL | WindowFlags::SHOWN);

        if !self.gl_loaded {
            self.gl_load_library(None)?;
        }
        let surface = self
            .platform
            .create_surface(window)
            .map_err(VideoError::Surface)?;
        self.windows.insert(
            window.id(),
            WindowData {
                surface: Some(surface),
            },
        );

        // One window, it always has focus
        window.insert_flags(WindowFlags::INPUT_FOCUS | WindowFlags::MOUSE_FOCUS);
        Ok(())
    }

    fn destroy_window(&mut self, window: &mut Window) {
        if let Some(data) = self.windows.remove(&window.id()) {
            if let Some(surface) = data.surface {
                self.platform.destroy_surface(surface);
            }
        }
    }

    fn wm_info(&self, _window: &Window, requested: ApiVersion) -> Result<WmInfo, VideoError> {
        if requested.major <= config::DRIVER_VERSION.major {
            Ok(WmInfo {
                subsystem: WmSubsystem::Framebuffer,
                version: config::DRIVER_VERSION,
            })
        } else {
            Err(VideoError::VersionMismatch {
                requested,
                supported: config::DRIVER_VERSION,
            })
        }
    }

    fn gl_load_library(&mut self, path: Option<&Path>) -> Result<(), VideoError> {
        self.platform.load_library(path)?;
        self.gl_loaded = true;
        Ok(())
    }

    fn gl_proc_address(&mut self, name: &str) -> Result<*const c_void, VideoError> {
        Ok(self.platform.proc_address(name)?)
    }

    fn gl_unload_library(&mut self) {
        self.platform.unload_library();
        self.gl_loaded = false;
    }

    fn gl_create_context(&mut self, window: &Window) -> Result<ContextHandle, VideoError> {
        let surface = self.surface_for(window.id());
        Ok(self.platform.create_context(surface)?)
    }

    fn gl_make_current(
        &mut self,
        window: Option<&Window>,
        context: Option<ContextHandle>,
    ) -> Result<(), VideoError> {
        let surface = window.and_then(|window| self.surface_for(window.id()));
        Ok(self.platform.make_current(surface, context)?)
    }

    fn gl_set_swap_interval(&mut self, interval: i32) -> Result<(), VideoError> {
        Ok(self.platform.set_swap_interval(interval)?)
    }

    fn gl_swap_interval(&self) -> i32 {
        self.platform.swap_interval()
    }

    fn gl_swap_window(&mut self, window: &Window) -> Result<(), VideoError> {
        let surface = self
            .surface_for(window.id())
            .ok_or(VideoError::UnknownWindow(window.id()))?;
        Ok(self.platform.swap_buffers(surface)?)
    }

    fn gl_delete_context(&mut self, context: ContextHandle) {
        self.platform.delete_context(context);
    }

    fn pump_events(&mut self, queue: &mut VecDeque<RawInputEvent>) {
        if let Some(input) = self.input.as_mut() {
            if let Err(err) = input.poll(queue) {
                warn!(?err, "Failed to poll for input events");
            }
        }
    }
}
