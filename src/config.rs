// SPDX-License-Identifier: GPL-3.0-only

use crate::video::{ApiVersion, DisplayMode, PixelFormat};

/// Environment variable naming the backend to use, bypassing probe order.
pub const BACKEND_ENV: &str = "VIDEO_BACKEND";

/// The single mode the framebuffer target drives. There is no negotiation,
/// the panel is wired for exactly this timing.
pub const FIXED_MODE: DisplayMode = DisplayMode {
    size: (320, 240),
    refresh: 60_000,
    format: PixelFormat::Rgb565,
};

/// Displays a backend registers. A single fixed panel for now.
pub const DISPLAY_COUNT: usize = 1;

/// Version of the driver interface. The window-manager-info query gates
/// callers on the major version only.
pub const DRIVER_VERSION: ApiVersion = ApiVersion { major: 1, minor: 0 };
