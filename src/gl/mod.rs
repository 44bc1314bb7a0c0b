// SPDX-License-Identifier: GPL-3.0-only

use crate::video::Window;
use std::{ffi::c_void, path::Path};

pub mod headless;

/// Opaque handle to a rendering surface owned by the graphics platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub fn new(raw: u64) -> SurfaceHandle {
        SurfaceHandle(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a rendering context owned by the graphics platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(u64);

impl ContextHandle {
    pub fn new(raw: u64) -> ContextHandle {
        ContextHandle(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GlError {
    #[error("failed to load the graphics library: {0}")]
    LibraryLoad(String),
    #[error("the graphics library has not been loaded")]
    NotLoaded,
    #[error("no such symbol: {0}")]
    MissingSymbol(String),
    #[error("failed to create a rendering surface: {0}")]
    SurfaceCreation(String),
    #[error("failed to create a rendering context: {0}")]
    ContextCreation(String),
    #[error("unknown rendering surface")]
    UnknownSurface,
    #[error("unknown rendering context")]
    UnknownContext,
}

/// The external graphics-context collaborator. The video layer only forwards
/// to it; surface and context resources stay owned by the platform and are
/// released through the explicit destroy calls.
pub trait GlPlatform {
    /// Load the underlying client library. `None` picks the platform default.
    fn load_library(&mut self, path: Option<&Path>) -> Result<(), GlError>;
    fn proc_address(&self, name: &str) -> Result<*const c_void, GlError>;
    fn unload_library(&mut self);

    fn create_surface(&mut self, window: &Window) -> Result<SurfaceHandle, GlError>;
    fn destroy_surface(&mut self, surface: SurfaceHandle);

    fn create_context(&mut self, surface: Option<SurfaceHandle>)
        -> Result<ContextHandle, GlError>;
    fn make_current(
        &mut self,
        surface: Option<SurfaceHandle>,
        context: Option<ContextHandle>,
    ) -> Result<(), GlError>;
    fn delete_context(&mut self, context: ContextHandle);

    fn swap_buffers(&mut self, surface: SurfaceHandle) -> Result<(), GlError>;
    fn set_swap_interval(&mut self, interval: i32) -> Result<(), GlError>;
    fn swap_interval(&self) -> i32;
}
