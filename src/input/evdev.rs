// SPDX-License-Identifier: GPL-3.0-only

use super::{InputError, InputSource, RawInputEvent};
use std::{
    collections::VecDeque,
    io,
    os::unix::io::{AsRawFd, RawFd},
    path::PathBuf,
};
use tracing::{debug, info, warn};

/// Polls every readable evdev node under `/dev/input`. Events are passed
/// through untranslated.
pub struct EvdevInput {
    devices: Vec<(PathBuf, evdev::Device)>,
}

impl EvdevInput {
    pub fn new() -> EvdevInput {
        EvdevInput {
            devices: Vec::new(),
        }
    }
}

impl Default for EvdevInput {
    fn default() -> EvdevInput {
        EvdevInput::new()
    }
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl InputSource for EvdevInput {
    fn init(&mut self) -> Result<(), InputError> {
        for (path, device) in evdev::enumerate() {
            if let Err(err) = set_nonblocking(device.as_raw_fd()) {
                warn!(?err, path = %path.display(), "Skipping input device");
                continue;
            }
            debug!(
                path = %path.display(),
                name = device.name().unwrap_or("?"),
                "Polling input device"
            );
            self.devices.push((path, device));
        }
        if self.devices.is_empty() {
            // running headless, or without permission on /dev/input
            info!("No readable input devices");
        }
        Ok(())
    }

    fn poll(&mut self, queue: &mut VecDeque<RawInputEvent>) -> Result<usize, InputError> {
        let mut moved = 0;
        self.devices
            .retain_mut(|(path, device)| match device.fetch_events() {
                Ok(events) => {
                    for event in events {
                        queue.push_back(RawInputEvent {
                            ty: event.event_type().0,
                            code: event.code(),
                            value: event.value(),
                        });
                        moved += 1;
                    }
                    true
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => true,
                Err(err) => {
                    warn!(?err, path = %path.display(), "Dropping input device");
                    false
                }
            });
        Ok(moved)
    }

    fn quit(&mut self) {
        self.devices.clear();
    }
}
