//! piglet demo - full-screen OpenGL ES 2.0 on the VideoCore compositor
//!
//! Creates the rendering context, clears the screen in a slowly cycling
//! color and presents every frame until interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use log::{debug, info, warn};

use piglet::gpu::gl::error_string as gl_error_string;
use piglet::{Config, VideoCoreSurface};

/// Global flag for shutdown requested via signal (SIGTERM/SIGINT/SIGHUP)
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn shutdown_signal_handler(_signo: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

/// Set up signal handlers for graceful shutdown (call once at startup)
fn setup_signal_handlers() {
    unsafe {
        libc::signal(
            libc::SIGTERM,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGINT,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGHUP,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
    }
}

fn print_help() {
    println!(
        r#"piglet {} - OpenGL ES 2.0 on the Raspberry Pi VideoCore compositor

USAGE:
    piglet [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    -n, --frames N          Stop after N frames (default: run until interrupted)
    --print-config          Print the effective configuration as TOML

CONFIG FILE:
    $PIGLET_CONFIG, ~/.config/piglet/config.toml or /etc/piglet/config.toml

LOGGING:
    RUST_LOG=debug piglet   Log every EGL / DispManX call"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Value following `--frames` / `-n`
fn parse_frames(args: &[String]) -> Result<Option<u64>> {
    let Some(pos) = args.iter().position(|a| a == "--frames" || a == "-n") else {
        return Ok(None);
    };
    let value = args
        .get(pos + 1)
        .ok_or_else(|| anyhow!("--frames requires a value"))?;
    let frames = value
        .parse::<u64>()
        .with_context(|| format!("Invalid frame count: {}", value))?;
    Ok(Some(frames))
}

/// Clear color for time `t` (seconds): a slow walk around the hue circle
fn cycle_color(t: f32) -> [f32; 3] {
    let phase = std::f32::consts::TAU / 3.0;
    [
        0.5 + 0.5 * (t * 0.5).sin(),
        0.5 + 0.5 * (t * 0.5 + phase).sin(),
        0.5 + 0.5 * (t * 0.5 + 2.0 * phase).sin(),
    ]
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("piglet {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = Config::load();

    if args.iter().any(|a| a == "--print-config") {
        print!("{}", cfg.to_toml_string()?);
        return Ok(());
    }

    let max_frames = parse_frames(&args)?;

    setup_signal_handlers();

    let mut surface = VideoCoreSurface::load(&cfg).context("Failed to load VideoCore libraries")?;
    surface
        .create()
        .context("Failed to create rendering context")?;

    let (width, height) = surface.display_size();
    info!("Display size: {}x{}", width, height);

    let gl = unsafe { glow::Context::from_loader_function(|name| surface.get_proc_address(name)) };

    unsafe {
        info!("OpenGL ES: {}", gl.get_parameter_string(glow::VERSION));
        info!("Renderer: {}", gl.get_parameter_string(glow::RENDERER));
        info!("Vendor: {}", gl.get_parameter_string(glow::VENDOR));
        info!(
            "GLSL: {}",
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION)
        );
        gl.viewport(0, 0, width as i32, height as i32);
    }

    let start = Instant::now();
    let mut frames: u64 = 0;

    while !SHUTDOWN_REQUESTED.load(Ordering::Relaxed) {
        if max_frames.is_some_and(|max| frames >= max) {
            break;
        }

        let [r, g, b] = cycle_color(start.elapsed().as_secs_f32());
        unsafe {
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            let err = gl.get_error();
            if err != glow::NO_ERROR {
                warn!("glClear failed: {}", gl_error_string(err));
            }
        }

        if let Err(e) = surface.swap_buffers() {
            warn!("{}", e);
        }
        frames += 1;
    }

    let elapsed = start.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        debug!("{} frames in {:.1}s ({:.1} fps)", frames, elapsed, frames as f64 / elapsed);
    }

    surface
        .destroy()
        .context("Failed to destroy rendering context")?;
    info!("piglet exiting");
    Ok(())
}
