// SPDX-License-Identifier: GPL-3.0-only

use crate::gl::{ContextHandle, GlError};
use crate::input::{InputError, RawInputEvent};
use std::{collections::VecDeque, ffi::c_void, fmt, path::Path};
use tracing::{debug, info};

pub mod display;
pub mod window;

pub use display::{Display, DisplayMode, DisplayRegistry, PixelFormat};
pub use window::{NativeWindowHandle, Window, WindowFlags, WindowId};

/// Version of the driver interface, compared by the window-manager-info
/// query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Which windowing subsystem a backend drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmSubsystem {
    Framebuffer,
}

/// Answer of the window-manager-info query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmInfo {
    pub subsystem: WmSubsystem,
    pub version: ApiVersion,
}

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("the video subsystem has not been initialized")]
    Uninitialized,
    #[error("operation `{0}` is not supported by this video backend")]
    Unsupported(&'static str),
    #[error("no display with index {0}")]
    UnknownDisplay(usize),
    #[error("no window with id {0:?}")]
    UnknownWindow(WindowId),
    #[error("application expects video interface {requested}, backend provides {supported}")]
    VersionMismatch {
        requested: ApiVersion,
        supported: ApiVersion,
    },
    #[error("could not create GLES window surface")]
    Surface(#[source] GlError),
    #[error(transparent)]
    Gl(#[from] GlError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Capability interface every video backend fills in. Slots a target has no
/// use for keep their default no-op bodies.
pub trait VideoBackend {
    fn name(&self) -> &'static str;

    /// Register displays with the host and bring up optional collaborators.
    fn init(&mut self, displays: &mut DisplayRegistry) -> Result<(), VideoError>;
    fn quit(&mut self);

    fn display_modes(&self, display: &Display) -> Vec<DisplayMode> {
        display.modes().to_vec()
    }
    fn set_display_mode(
        &mut self,
        display: &Display,
        mode: &DisplayMode,
    ) -> Result<(), VideoError>;

    fn create_window(&mut self, window: &mut Window) -> Result<(), VideoError>;
    fn create_window_from(
        &mut self,
        _window: &mut Window,
        _handle: NativeWindowHandle,
    ) -> Result<(), VideoError> {
        Err(VideoError::Unsupported("create_window_from"))
    }
    fn destroy_window(&mut self, window: &mut Window);

    fn set_window_title(&mut self, _window: &Window) {}
    fn set_window_icon(&mut self, _window: &Window, _icon: &[u8]) {}
    /// Apply a position request to the window record, if the target can.
    fn set_window_position(&mut self, _window: &mut Window, _position: (i32, i32)) {}
    /// Apply a size request to the window record, if the target can.
    fn set_window_size(&mut self, _window: &mut Window, _size: (u32, u32)) {}
    fn show_window(&mut self, _window: &Window) {}
    fn hide_window(&mut self, _window: &Window) {}
    fn raise_window(&mut self, _window: &Window) {}
    fn maximize_window(&mut self, _window: &Window) {}
    fn minimize_window(&mut self, _window: &Window) {}
    fn restore_window(&mut self, _window: &Window) {}
    fn set_window_grab(&mut self, _window: &Window, _grabbed: bool) {}

    fn wm_info(&self, window: &Window, requested: ApiVersion) -> Result<WmInfo, VideoError>;

    fn gl_load_library(&mut self, path: Option<&Path>) -> Result<(), VideoError>;
    fn gl_proc_address(&mut self, name: &str) -> Result<*const c_void, VideoError>;
    fn gl_unload_library(&mut self);
    fn gl_create_context(&mut self, window: &Window) -> Result<ContextHandle, VideoError>;
    fn gl_make_current(
        &mut self,
        window: Option<&Window>,
        context: Option<ContextHandle>,
    ) -> Result<(), VideoError>;
    fn gl_set_swap_interval(&mut self, interval: i32) -> Result<(), VideoError>;
    fn gl_swap_interval(&self) -> i32;
    fn gl_swap_window(&mut self, window: &Window) -> Result<(), VideoError>;
    fn gl_delete_context(&mut self, context: ContextHandle);

    /// Per-frame hook. Forwards pending input events into the host queue.
    fn pump_events(&mut self, queue: &mut VecDeque<RawInputEvent>);
}

/// The host-facing video subsystem. Owns the backend picked at startup, the
/// display registry and the window table, and forwards every operation.
pub struct Video {
    backend: Box<dyn VideoBackend>,
    displays: DisplayRegistry,
    windows: Vec<Window>,
    events: VecDeque<RawInputEvent>,
    pointer_focus: Option<WindowId>,
    keyboard_focus: Option<WindowId>,
    next_window: u32,
    initialized: bool,
}

impl Video {
    pub fn new(backend: Box<dyn VideoBackend>) -> Video {
        Video {
            backend,
            displays: DisplayRegistry::default(),
            windows: Vec::new(),
            events: VecDeque::new(),
            pointer_focus: None,
            keyboard_focus: None,
            next_window: 1,
            initialized: false,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_init(&self) -> Result<(), VideoError> {
        if self.initialized {
            Ok(())
        } else {
            Err(VideoError::Uninitialized)
        }
    }

    fn find(windows: &[Window], id: WindowId) -> Result<&Window, VideoError> {
        windows
            .iter()
            .find(|window| window.id() == id)
            .ok_or(VideoError::UnknownWindow(id))
    }

    fn grant_focus(&mut self, window: &Window) {
        if window.flags().contains(WindowFlags::MOUSE_FOCUS) {
            self.pointer_focus = Some(window.id());
        }
        if window.flags().contains(WindowFlags::INPUT_FOCUS) {
            self.keyboard_focus = Some(window.id());
        }
    }

    pub fn init(&mut self) -> Result<(), VideoError> {
        if self.initialized {
            return Ok(());
        }
        self.backend.init(&mut self.displays)?;
        self.initialized = true;
        info!(backend = self.backend.name(), "Video backend initialized");
        Ok(())
    }

    pub fn quit(&mut self) {
        if !self.initialized {
            return;
        }
        for mut window in self.windows.drain(..) {
            self.backend.destroy_window(&mut window);
        }
        self.backend.quit();
        self.displays.clear();
        self.events.clear();
        self.pointer_focus = None;
        self.keyboard_focus = None;
        self.initialized = false;
        debug!("Video subsystem shut down");
    }

    pub fn displays(&self) -> Result<&[Display], VideoError> {
        self.ensure_init()?;
        Ok(self.displays.displays())
    }

    pub fn display(&self, index: usize) -> Result<&Display, VideoError> {
        self.ensure_init()?;
        self.displays
            .get(index)
            .ok_or(VideoError::UnknownDisplay(index))
    }

    pub fn display_modes(&self, index: usize) -> Result<Vec<DisplayMode>, VideoError> {
        let display = self.display(index)?;
        Ok(self.backend.display_modes(display))
    }

    pub fn current_display_mode(&self, index: usize) -> Result<DisplayMode, VideoError> {
        Ok(self.display(index)?.current_mode())
    }

    pub fn set_display_mode(
        &mut self,
        index: usize,
        mode: &DisplayMode,
    ) -> Result<(), VideoError> {
        self.ensure_init()?;
        let display = self
            .displays
            .get(index)
            .ok_or(VideoError::UnknownDisplay(index))?;
        self.backend.set_display_mode(display, mode)
    }

    pub fn create_window(&mut self, title: &str) -> Result<WindowId, VideoError> {
        self.ensure_init()?;
        let id = WindowId::new(self.next_window);
        self.next_window += 1;
        let mut window = Window::new(id, title);
        self.backend.create_window(&mut window)?;
        self.grant_focus(&window);
        self.windows.push(window);
        Ok(id)
    }

    pub fn create_window_from(
        &mut self,
        title: &str,
        handle: NativeWindowHandle,
    ) -> Result<WindowId, VideoError> {
        self.ensure_init()?;
        let id = WindowId::new(self.next_window);
        self.next_window += 1;
        let mut window = Window::new(id, title);
        self.backend.create_window_from(&mut window, handle)?;
        self.grant_focus(&window);
        self.windows.push(window);
        Ok(id)
    }

    pub fn destroy_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let index = self
            .windows
            .iter()
            .position(|window| window.id() == id)
            .ok_or(VideoError::UnknownWindow(id))?;
        let mut window = self.windows.remove(index);
        self.backend.destroy_window(&mut window);
        if self.pointer_focus == Some(id) {
            self.pointer_focus = None;
        }
        if self.keyboard_focus == Some(id) {
            self.keyboard_focus = None;
        }
        Ok(())
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|window| window.id() == id)
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn pointer_focus(&self) -> Option<WindowId> {
        self.pointer_focus
    }

    pub fn keyboard_focus(&self) -> Option<WindowId> {
        self.keyboard_focus
    }

    pub fn set_window_title(&mut self, id: WindowId, title: &str) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = self
            .windows
            .iter_mut()
            .find(|window| window.id() == id)
            .ok_or(VideoError::UnknownWindow(id))?;
        window.set_title(title);
        self.backend.set_window_title(window);
        Ok(())
    }

    pub fn set_window_icon(&mut self, id: WindowId, icon: &[u8]) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.set_window_icon(window, icon);
        Ok(())
    }

    pub fn set_window_position(
        &mut self,
        id: WindowId,
        position: (i32, i32),
    ) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = self
            .windows
            .iter_mut()
            .find(|window| window.id() == id)
            .ok_or(VideoError::UnknownWindow(id))?;
        self.backend.set_window_position(window, position);
        Ok(())
    }

    pub fn set_window_size(&mut self, id: WindowId, size: (u32, u32)) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = self
            .windows
            .iter_mut()
            .find(|window| window.id() == id)
            .ok_or(VideoError::UnknownWindow(id))?;
        self.backend.set_window_size(window, size);
        Ok(())
    }

    pub fn show_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.show_window(window);
        Ok(())
    }

    pub fn hide_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.hide_window(window);
        Ok(())
    }

    pub fn raise_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.raise_window(window);
        Ok(())
    }

    pub fn maximize_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.maximize_window(window);
        Ok(())
    }

    pub fn minimize_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.minimize_window(window);
        Ok(())
    }

    pub fn restore_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.restore_window(window);
        Ok(())
    }

    pub fn set_window_grab(&mut self, id: WindowId, grabbed: bool) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = self
            .windows
            .iter_mut()
            .find(|window| window.id() == id)
            .ok_or(VideoError::UnknownWindow(id))?;
        if grabbed {
            window.insert_flags(WindowFlags::GRABBED);
        } else {
            window.remove_flags(WindowFlags::GRABBED);
        }
        self.backend.set_window_grab(window, grabbed);
        Ok(())
    }

    pub fn wm_info(&self, id: WindowId, requested: ApiVersion) -> Result<WmInfo, VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.wm_info(window, requested)
    }

    pub fn gl_load_library(&mut self, path: Option<&Path>) -> Result<(), VideoError> {
        self.ensure_init()?;
        self.backend.gl_load_library(path)
    }

    pub fn gl_proc_address(&mut self, name: &str) -> Result<*const c_void, VideoError> {
        self.ensure_init()?;
        self.backend.gl_proc_address(name)
    }

    pub fn gl_unload_library(&mut self) {
        if self.initialized {
            self.backend.gl_unload_library();
        }
    }

    pub fn gl_create_context(&mut self, id: WindowId) -> Result<ContextHandle, VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.gl_create_context(window)
    }

    pub fn gl_make_current(
        &mut self,
        window: Option<WindowId>,
        context: Option<ContextHandle>,
    ) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = match window {
            Some(id) => Some(Self::find(&self.windows, id)?),
            None => None,
        };
        self.backend.gl_make_current(window, context)
    }

    pub fn gl_set_swap_interval(&mut self, interval: i32) -> Result<(), VideoError> {
        self.ensure_init()?;
        self.backend.gl_set_swap_interval(interval)
    }

    pub fn gl_swap_interval(&self) -> i32 {
        self.backend.gl_swap_interval()
    }

    pub fn gl_swap_window(&mut self, id: WindowId) -> Result<(), VideoError> {
        self.ensure_init()?;
        let window = Self::find(&self.windows, id)?;
        self.backend.gl_swap_window(window)
    }

    pub fn gl_delete_context(&mut self, context: ContextHandle) -> Result<(), VideoError> {
        self.ensure_init()?;
        self.backend.gl_delete_context(context);
        Ok(())
    }

    /// Per-frame hook of the host main loop. Does nothing before init.
    pub fn pump_events(&mut self) {
        if !self.initialized {
            return;
        }
        self.backend.pump_events(&mut self.events);
    }

    pub fn poll_event(&mut self) -> Option<RawInputEvent> {
        self.events.pop_front()
    }
}

impl Drop for Video {
    fn drop(&mut self) {
        self.quit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    struct Calls {
        quits: usize,
        destroyed: usize,
        pumps: usize,
    }

    struct TestBackend {
        calls: Rc<RefCell<Calls>>,
    }

    impl VideoBackend for TestBackend {
        fn name(&self) -> &'static str {
            "test"
        }

        fn init(&mut self, displays: &mut DisplayRegistry) -> Result<(), VideoError> {
            displays.add_display(Display::new("TEST-0", config::FIXED_MODE));
            Ok(())
        }

        fn quit(&mut self) {
            self.calls.borrow_mut().quits += 1;
        }

        fn set_display_mode(
            &mut self,
            _display: &Display,
            _mode: &DisplayMode,
        ) -> Result<(), VideoError> {
            Ok(())
        }

        fn create_window(&mut self, window: &mut Window) -> Result<(), VideoError> {
            window.set_size(config::FIXED_MODE.size);
            window.insert_flags(
                WindowFlags::OPENGL
                    | WindowFlags::SHOWN
                    | WindowFlags::INPUT_FOCUS
                    | WindowFlags::MOUSE_FOCUS,
            );
            Ok(())
        }

        fn destroy_window(&mut self, _window: &mut Window) {
            self.calls.borrow_mut().destroyed += 1;
        }

        fn wm_info(
            &self,
            _window: &Window,
            requested: ApiVersion,
        ) -> Result<WmInfo, VideoError> {
            Ok(WmInfo {
                subsystem: WmSubsystem::Framebuffer,
                version: requested,
            })
        }

        fn gl_load_library(&mut self, _path: Option<&Path>) -> Result<(), VideoError> {
            Ok(())
        }

        fn gl_proc_address(&mut self, name: &str) -> Result<*const c_void, VideoError> {
            Err(GlError::MissingSymbol(name.to_string()).into())
        }

        fn gl_unload_library(&mut self) {}

        fn gl_create_context(&mut self, _window: &Window) -> Result<ContextHandle, VideoError> {
            Ok(ContextHandle::new(1))
        }

        fn gl_make_current(
            &mut self,
            _window: Option<&Window>,
            _context: Option<ContextHandle>,
        ) -> Result<(), VideoError> {
            Ok(())
        }

        fn gl_set_swap_interval(&mut self, _interval: i32) -> Result<(), VideoError> {
            Ok(())
        }

        fn gl_swap_interval(&self) -> i32 {
            0
        }

        fn gl_swap_window(&mut self, _window: &Window) -> Result<(), VideoError> {
            Ok(())
        }

        fn gl_delete_context(&mut self, _context: ContextHandle) {}

        fn pump_events(&mut self, queue: &mut VecDeque<RawInputEvent>) {
            self.calls.borrow_mut().pumps += 1;
            queue.push_back(RawInputEvent {
                ty: 1,
                code: 30,
                value: 1,
            });
        }
    }

    fn video() -> (Video, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        (
            Video::new(Box::new(TestBackend {
                calls: calls.clone(),
            })),
            calls,
        )
    }

    #[test]
    fn operations_require_init() {
        let (mut video, _) = video();
        assert!(matches!(
            video.create_window("kiosk"),
            Err(VideoError::Uninitialized)
        ));
        assert!(matches!(video.displays(), Err(VideoError::Uninitialized)));
    }

    #[test]
    fn init_registers_displays_once() {
        let (mut video, _) = video();
        video.init().unwrap();
        assert_eq!(video.displays().unwrap().len(), 1);
        video.init().unwrap();
        assert_eq!(video.displays().unwrap().len(), 1);
    }

    #[test]
    fn new_windows_are_focused() {
        let (mut video, _) = video();
        video.init().unwrap();
        let id = video.create_window("kiosk").unwrap();
        assert_eq!(video.pointer_focus(), Some(id));
        assert_eq!(video.keyboard_focus(), Some(id));
        assert_eq!(video.window(id).unwrap().size(), config::FIXED_MODE.size);
    }

    #[test]
    fn destroy_clears_focus() {
        let (mut video, _) = video();
        video.init().unwrap();
        let id = video.create_window("kiosk").unwrap();
        video.destroy_window(id).unwrap();
        assert_eq!(video.pointer_focus(), None);
        assert_eq!(video.keyboard_focus(), None);
        assert!(matches!(
            video.destroy_window(id),
            Err(VideoError::UnknownWindow(_))
        ));
    }

    #[test]
    fn geometry_requests_are_forwarded_not_applied() {
        let (mut video, _) = video();
        video.init().unwrap();
        let id = video.create_window("kiosk").unwrap();
        video.set_window_size(id, (640, 480)).unwrap();
        video.set_window_position(id, (10, 10)).unwrap();
        // the backend left both requests unapplied
        assert_eq!(video.window(id).unwrap().size(), config::FIXED_MODE.size);
        assert_eq!(video.window(id).unwrap().position(), (0, 0));
    }

    #[test]
    fn quit_tears_down_windows() {
        let (mut video, calls) = video();
        video.init().unwrap();
        video.create_window("kiosk").unwrap();
        video.quit();
        assert_eq!(calls.borrow().destroyed, 1);
        assert_eq!(calls.borrow().quits, 1);
        assert!(!video.is_initialized());
    }

    #[test]
    fn pump_fills_the_event_queue() {
        let (mut video, calls) = video();
        video.pump_events();
        assert_eq!(calls.borrow().pumps, 0);
        video.init().unwrap();
        video.pump_events();
        assert_eq!(calls.borrow().pumps, 1);
        assert!(video.poll_event().is_some());
        assert!(video.poll_event().is_none());
    }
}
