// SPDX-License-Identifier: GPL-3.0-only

use super::{ContextHandle, GlError, GlPlatform, SurfaceHandle};
use crate::video::Window;
use std::{collections::HashSet, ffi::c_void, path::Path};
use tracing::debug;

/// Graphics platform without a GPU behind it. Hands out handles and keeps
/// the bookkeeping a real EGL stack would; used for tests and headless runs.
#[derive(Debug, Default)]
pub struct HeadlessGl {
    loaded: bool,
    next_handle: u64,
    surfaces: HashSet<SurfaceHandle>,
    contexts: HashSet<ContextHandle>,
    bound: Option<(Option<SurfaceHandle>, ContextHandle)>,
    swap_interval: i32,
}

impl HeadlessGl {
    pub fn new() -> HeadlessGl {
        HeadlessGl::default()
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }
}

impl GlPlatform for HeadlessGl {
    fn load_library(&mut self, path: Option<&Path>) -> Result<(), GlError> {
        debug!(?path, "Loading headless graphics stack");
        self.loaded = true;
        Ok(())
    }

    fn proc_address(&self, name: &str) -> Result<*const c_void, GlError> {
        if !self.loaded {
            return Err(GlError::NotLoaded);
        }
        // nothing to hand out without a real client library
        Err(GlError::MissingSymbol(name.to_string()))
    }

    fn unload_library(&mut self) {
        self.loaded = false;
        self.surfaces.clear();
        self.contexts.clear();
        self.bound = None;
    }

    fn create_surface(&mut self, window: &Window) -> Result<SurfaceHandle, GlError> {
        if !self.loaded {
            return Err(GlError::NotLoaded);
        }
        let surface = SurfaceHandle::new(self.next());
        debug!(window = ?window.id(), ?surface, "Created surface");
        self.surfaces.insert(surface);
        Ok(surface)
    }

    fn destroy_surface(&mut self, surface: SurfaceHandle) {
        self.surfaces.remove(&surface);
        if matches!(self.bound, Some((Some(bound), _)) if bound == surface) {
            self.bound = None;
        }
    }

    fn create_context(
        &mut self,
        surface: Option<SurfaceHandle>,
    ) -> Result<ContextHandle, GlError> {
        if !self.loaded {
            return Err(GlError::NotLoaded);
        }
        if let Some(surface) = surface {
            if !self.surfaces.contains(&surface) {
                return Err(GlError::UnknownSurface);
            }
        }
        let context = ContextHandle::new(self.next());
        self.contexts.insert(context);
        Ok(context)
    }

    fn make_current(
        &mut self,
        surface: Option<SurfaceHandle>,
        context: Option<ContextHandle>,
    ) -> Result<(), GlError> {
        if let Some(surface) = surface {
            if !self.surfaces.contains(&surface) {
                return Err(GlError::UnknownSurface);
            }
        }
        match context {
            Some(context) if !self.contexts.contains(&context) => Err(GlError::UnknownContext),
            Some(context) => {
                self.bound = Some((surface, context));
                Ok(())
            }
            None => {
                self.bound = None;
                Ok(())
            }
        }
    }

    fn delete_context(&mut self, context: ContextHandle) {
        self.contexts.remove(&context);
        if matches!(self.bound, Some((_, bound)) if bound == context) {
            self.bound = None;
        }
    }

    fn swap_buffers(&mut self, surface: SurfaceHandle) -> Result<(), GlError> {
        if !self.surfaces.contains(&surface) {
            return Err(GlError::UnknownSurface);
        }
        Ok(())
    }

    fn set_swap_interval(&mut self, interval: i32) -> Result<(), GlError> {
        self.swap_interval = interval;
        Ok(())
    }

    fn swap_interval(&self) -> i32 {
        self.swap_interval
    }
}
