// SPDX-License-Identifier: GPL-3.0-only

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

pub fn init_logger() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            if cfg!(debug_assertions) {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            }
            .into(),
        )
        .from_env_lossy();

    // journald is not around in every session, containers and test runners miss it
    let journald = tracing_journald::layer().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(journald)
        .with(filter)
        .try_init()
        .with_context(|| "Failed to initialize the logger")?;
    log_panics::init();

    info!("Version: {}", std::env!("CARGO_PKG_VERSION"));
    Ok(())
}
