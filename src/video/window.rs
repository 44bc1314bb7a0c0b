// SPDX-License-Identifier: GPL-3.0-only

use bitflags::bitflags;
use std::ffi::c_void;

bitflags! {
    /// Window state bits. Backends force the bits their target supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        const FULLSCREEN = 1 << 0;
        const OPENGL = 1 << 1;
        const SHOWN = 1 << 2;
        const BORDERLESS = 1 << 3;
        const INPUT_FOCUS = 1 << 4;
        const MOUSE_FOCUS = 1 << 5;
        const GRABBED = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(u32);

impl WindowId {
    pub(crate) fn new(raw: u32) -> WindowId {
        WindowId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A foreign window handle, as handed to `create_window_from`.
#[derive(Debug, Clone, Copy)]
pub struct NativeWindowHandle(pub *const c_void);

/// Host-side window record. Backends adjust size and flags through the
/// mutable reference they get during creation.
#[derive(Debug)]
pub struct Window {
    id: WindowId,
    title: String,
    size: (u32, u32),
    position: (i32, i32),
    flags: WindowFlags,
}

impl Window {
    pub(crate) fn new(id: WindowId, title: impl Into<String>) -> Window {
        Window {
            id,
            title: title.into(),
            size: (0, 0),
            position: (0, 0),
            flags: WindowFlags::empty(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_size(&mut self, size: (u32, u32)) {
        self.size = size;
    }

    pub fn set_position(&mut self, position: (i32, i32)) {
        self.position = position;
    }

    pub fn insert_flags(&mut self, flags: WindowFlags) {
        self.flags |= flags;
    }

    pub fn remove_flags(&mut self, flags: WindowFlags) {
        self.flags &= !flags;
    }
}
