// SPDX-License-Identifier: GPL-3.0-only

//! A small pluggable video layer: a capability interface for video device
//! backends, a fixed-mode Linux framebuffer backend, and the collaborator
//! seams it forwards to (graphics-context platform, input source).

pub mod backend;
pub mod config;
pub mod gl;
pub mod input;
pub mod logger;
pub mod video;
