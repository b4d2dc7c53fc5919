mod app;
mod config;
mod face;
mod gfx;
mod hw;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use app::App;
use config::Config;
use gfx::draw::NullBackend;
use hw::NoInputs;
use log::{error, info};

/// Set by the SIGTERM/SIGINT handlers; the frame loop polls it.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting oculi...");

    let config = Config::load().unwrap_or_default();
    info!(
        "Config: cyclops={} tracking={} autoblink={} pupil_chan={} joystick=({}, {})",
        config.cyclops,
        config.tracking,
        config.autoblink,
        config.pupil_chan,
        config.joystick_x_chan,
        config.joystick_y_chan
    );

    install_signal_handlers();

    // The ADC driver and GPIO buttons plug in here when the sensor bonnet
    // is wired up; without them every source runs autonomously.
    let mut app = App::new(config, None, Box::new(NoInputs));
    let mut backend = NullBackend::default();

    let frame_budget = Duration::from_millis(1000 / app.config.fps_cap.max(1) as u64);

    info!("Starting main loop...");
    while !SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
        if let Err(e) = app.frame(&mut backend) {
            // The prop runs unattended: log, back off, keep going
            error!("frame failed: {e:#}");
            std::thread::sleep(Duration::from_secs(10));
            continue;
        }
        std::thread::sleep(frame_budget);
    }

    info!(
        "Shutting down after {} frames ({} iris rebuilds, {} lid rebuilds)",
        app.frames(),
        backend.iris_rebuilds,
        backend.lid_rebuilds
    );
    Ok(())
}
