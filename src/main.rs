// SPDX-License-Identifier: GPL-3.0-only

use anyhow::{Context, Result};
use calloop::{
    timer::{TimeoutAction, Timer},
    EventLoop,
};
use clap_lex::RawArgs;
use std::{process, time::Duration};
use tracing::{debug, error, info, warn};
use video_hal::{
    backend, config, logger,
    video::{Video, WindowId},
};

// evdev type/code of the key that ends a kiosk session
const EV_KEY: u16 = 0x01;
const KEY_ESC: u16 = 1;

struct Kiosk {
    video: Video,
    window: WindowId,
    should_stop: bool,
}

fn main() {
    if let Err(err) = main_inner() {
        error!("Error occured in main(): {}", err);
        process::exit(1);
    }
}

fn main_inner() -> Result<()> {
    let raw_args = RawArgs::from_args();
    let mut cursor = raw_args.cursor();

    // Parse the arguments
    while let Some(arg) = raw_args.next_os(&mut cursor) {
        match arg.to_str() {
            Some("--help") | Some("-h") => {
                print_help(env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            Some("--version") | Some("-V") => {
                println!("video-hal {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            _ => {}
        }
    }

    // setup logger
    logger::init_logger()?;
    info!("Video layer starting up!");

    // init backend and subsystem
    let backend = backend::create_backend_auto()?;
    let mut video = Video::new(backend);
    video
        .init()
        .with_context(|| "Failed to initialize the video backend")?;

    // one fullscreen window with a current rendering context
    let window = video
        .create_window("kiosk")
        .with_context(|| "Failed to create the kiosk window")?;
    let context = video
        .gl_create_context(window)
        .with_context(|| "Failed to create a rendering context")?;
    video
        .gl_make_current(Some(window), Some(context))
        .with_context(|| "Failed to make the rendering context current")?;

    // init event loop
    let mut event_loop = EventLoop::try_new().with_context(|| "Failed to initialize event loop")?;
    // refresh is in millihertz
    let frame = Duration::from_micros(1_000_000_000 / u64::from(config::FIXED_MODE.refresh));
    event_loop
        .handle()
        .insert_source(Timer::from_duration(frame), move |_, _, kiosk: &mut Kiosk| {
            kiosk.video.pump_events();
            while let Some(event) = kiosk.video.poll_event() {
                debug!(?event, "Input event");
                if event.ty == EV_KEY && event.code == KEY_ESC && event.value != 0 {
                    kiosk.should_stop = true;
                }
            }
            if let Err(err) = kiosk.video.gl_swap_window(kiosk.window) {
                warn!(?err, "Failed to swap buffers");
            }
            TimeoutAction::ToDuration(frame)
        })
        .map_err(|_| anyhow::anyhow!("Failed to insert the frame timer"))?;

    let mut kiosk = Kiosk {
        video,
        window,
        should_stop: false,
    };
    let signal = event_loop.get_signal();

    // run the event loop
    event_loop.run(None, &mut kiosk, |kiosk| {
        if kiosk.should_stop {
            info!("Shutting down");
            signal.stop();
            signal.wakeup();
        }
    })?;

    let Kiosk {
        mut video, window, ..
    } = kiosk;
    video.gl_delete_context(context)?;
    video.destroy_window(window)?;
    video.quit();

    Ok(())
}

fn print_help(version: &str) {
    println!(
        r#"video-hal {version}

Fixed-mode kiosk host for the pluggable video layer.

Options:
  -h, --help     Show this message
  -V, --version  Show the version of video-hal

Environment:
  VIDEO_BACKEND  Name of the video backend to use (default: first available)"#
    );
}
