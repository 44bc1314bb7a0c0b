// SPDX-License-Identifier: GPL-3.0-only

use std::collections::VecDeque;

#[cfg(feature = "input-evdev")]
pub mod evdev;

/// An untranslated input event. Interpreting it is the host's business, this
/// layer only moves events along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputEvent {
    pub ty: u16,
    pub code: u16,
    pub value: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to enumerate input devices: {0}")]
    Enumerate(std::io::Error),
    #[error("failed to read input events: {0}")]
    Poll(#[from] std::io::Error),
}

/// Event source polled once per frame by the video backend.
pub trait InputSource {
    fn init(&mut self) -> Result<(), InputError>;
    /// Drain pending events into `queue`, returning how many were moved.
    fn poll(&mut self, queue: &mut VecDeque<RawInputEvent>) -> Result<usize, InputError>;
    fn quit(&mut self);
}
