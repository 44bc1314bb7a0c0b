// SPDX-License-Identifier: GPL-3.0-only

use crate::{config, video::VideoBackend};
use anyhow::{anyhow, Context, Result};
use std::env;
use tracing::{info, warn};

pub mod fbdev;

/// Registration record for a compiled-in video backend.
pub struct Bootstrap {
    pub name: &'static str,
    pub description: &'static str,
    pub available: fn() -> bool,
    pub create: fn() -> Result<Box<dyn VideoBackend>>,
}

/// Every backend this build knows about, in probe order.
pub static BOOTSTRAPS: &[&Bootstrap] = &[&fbdev::BOOTSTRAP];

pub fn create_backend_by_name(name: &str) -> Result<Box<dyn VideoBackend>> {
    let bootstrap = BOOTSTRAPS
        .iter()
        .find(|bootstrap| bootstrap.name == name)
        .ok_or_else(|| anyhow!("There is no video backend named {}", name))?;
    if !(bootstrap.available)() {
        anyhow::bail!("Video backend {} is not available", name);
    }
    info!("Using {} ({})", bootstrap.name, bootstrap.description);
    (bootstrap.create)().with_context(|| format!("Failed to create the {} backend", name))
}

/// Pick a backend honoring the `VIDEO_BACKEND` override, falling back to the
/// first available bootstrap.
pub fn create_backend_auto() -> Result<Box<dyn VideoBackend>> {
    match env::var(config::BACKEND_ENV) {
        Ok(name) => create_backend_by_name(&name),
        Err(_) => {
            for bootstrap in BOOTSTRAPS {
                if (bootstrap.available)() {
                    return create_backend_by_name(bootstrap.name);
                }
                warn!("Video backend {} unavailable, skipping", bootstrap.name);
            }
            Err(anyhow!("No available video backend"))
        }
    }
}
