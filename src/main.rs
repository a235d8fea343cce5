//! # bumpview
//!
//! Haptic parallax-mapping demo. A textured, bump-mapped plane is shown from two
//! cameras side by side while a haptic thread renders contact forces against it.
//!
//! ## Usage:
//! ```bash
//! cargo run --release
//! RUST_LOG=bumpview=debug cargo run     # per-frame diagnostics
//! BUMPVIEW_DEVICE=none cargo run        # run without the simulated device
//! ```

use std::process::ExitCode;
use std::time::Duration;

use bumpview::{app::BumpviewApp, config::AppConfig, error::AppError};
use log::error;

const DEFAULT_LOG_FILTER: &str = "bumpview=info,wgpu_core=warn";

fn print_banner() {
    println!("-----------------------------------");
    println!("bumpview - haptic parallax mapping");
    println!("-----------------------------------");
    println!();
    println!("Keyboard Options:");
    println!();
    println!("[e] - Increase displacement");
    println!("[r] - Decrease displacement");
    println!("[y] - Increase height correction");
    println!("[t] - Decrease height correction");
    println!("[w/s] - Move camera along x");
    println!("[a/d] - Move camera along y");
    println!("[z/x] - Move camera along z");
    println!("[u] - Print camera pose");
    println!("[f] - Toggle fullscreen");
    println!("[m] - Toggle display mirroring");
    println!("[q] - Exit application");
    println!();
    println!("Drag with the left mouse button to rotate the first view.");
    println!();
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env();
    BumpviewApp::new(config)?.run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    print_banner();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            if err.delays_exit() {
                std::thread::sleep(Duration::from_secs(1));
            }
            // -1 is reported as 255 by the OS
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
