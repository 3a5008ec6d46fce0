//! `neckos-cli` – run the neck motion controller against a simulated
//! stepper bank.
//!
//! This binary is the development harness for the wire protocol: it boots a
//! [`Controller`] on six simulated steppers, runs the brute homing sequence,
//! and then feeds it command lines from stdin exactly as the serial or
//! Bluetooth transport would on the real rig.  Health responses are printed
//! back to stdout.
//!
//! ```text
//! $ echo 'X10,Y-5,Z15,H30|HEALTH' | neckos
//! ```
//!
//! `neckos --loopback` instead drives the producer pipeline over a scripted
//! head sweep and feeds every emitted wire command straight into the
//! controller – the full sensor→command→motion path with no hardware.

mod config;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use neckos_attitude::Vec3;
use neckos_controller::Controller;
use neckos_hal::StepperBank;
use neckos_teleop::{DeviceSample, TeleopSession};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set NECKOS_LOG_FORMAT=json to emit newline-delimited JSON logs.
    // User-facing output (health responses, banner) still uses println!.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("NECKOS_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  Default config written to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => warn!(error = %e, "could not write default config"),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    if std::env::args().any(|a| a == "--loopback") {
        run_loopback(&cfg);
        return;
    }

    // ── Shared shutdown flag / Ctrl-C handler ─────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping command intake …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Controller on a simulated bank ────────────────────────────────────
    let mut controller = Controller::new(StepperBank::sim(), cfg.controller, Instant::now());
    info!("boot homing started (brute)");

    // ── Stdin reader thread ───────────────────────────────────────────────
    // Stands in for the serial/Bluetooth transports of the real rig; lines
    // are handed to the cooperative loop below over a channel so homing can
    // keep ticking while the reader blocks.
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        use std::io::BufRead;
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    // ── Cooperative control loop ──────────────────────────────────────────
    let mut homing_was_busy = true;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let now = Instant::now();
        controller.tick(now);

        if homing_was_busy && !controller.homing_busy() {
            info!(positions = ?controller.bank().positions(), "homing complete");
        }
        homing_was_busy = controller.homing_busy();

        match rx.recv_timeout(Duration::from_millis(25)) {
            Ok(line) => {
                for response in controller.handle_line(&line, Instant::now()) {
                    println!("{response}");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                // stdin closed: finish any in-flight homing, then exit.
                if !controller.homing_busy() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(25));
            }
        }
    }

    println!(
        "  {} Final positions: {:?}",
        "✓".green().bold(),
        controller.bank().positions()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Loopback demo
// ─────────────────────────────────────────────────────────────────────────────

/// Drive a scripted head sweep through the producer pipeline and feed each
/// emitted wire command into the controller, end to end.
fn run_loopback(cfg: &config::Config) {
    println!("  {} producer → wire → controller loopback\n", "▶".bold());

    let t0 = Instant::now();
    let mut controller = Controller::new(StepperBank::sim(), cfg.controller, t0);
    // Let the boot homing finish before teleoperating.
    controller.tick(t0 + Duration::from_millis(2300));
    controller.tick(t0 + Duration::from_millis(4900));

    let mut session = TeleopSession::new(cfg.teleop);

    // A slow look-around: yaw sweep with a nod halfway through, sampled at
    // the cadence of a typical deviceorientation event stream.
    let mut clock = t0 + Duration::from_secs(5);
    for i in 0..120 {
        let phase = i as f32 / 120.0;
        let sample = DeviceSample {
            alpha_deg: 30.0 * (phase * std::f32::consts::TAU).sin(),
            beta_deg: 10.0 * (phase * 2.0 * std::f32::consts::TAU).sin(),
            gamma_deg: 0.0,
            compass_deg: None,
            linear_accel: Vec3::zero(),
        };
        clock += Duration::from_millis(33);
        if let Some(line) = session.on_device_sample(&sample, clock) {
            controller.handle_line(&line, clock);
            println!("  {} {:>28}  →  {:?}", "wire".dimmed(), line, controller.bank().positions());
        }
    }

    println!(
        "\n  {} Final positions: {:?}",
        "✓".green().bold(),
        controller.bank().positions()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   _  __        __   ____  ____"#.bold().cyan());
    println!("{}", r#"  / |/ /__ ____/ /__/ __ \/ __/"#.bold().cyan());
    println!("{}", r#" /    / -_) __/  '_/ /_/ /\ \  "#.bold().cyan());
    println!("{}", r#"/_/|_/\__/\__/_/\_\\____/___/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "NeckOS".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Stewart-style neck motion controller");
    println!();
}
