//! Railcreator: demo entry point.
//!
//! Loads a rail plan, wires the devices and runs the tick loop against
//! simulated boards. Input pins are pressed and released on a fixed
//! cadence so the wiring can be watched in the log.
//!
//! ```text
//! railcreator <plan.json> [config.json]
//! ```
//!
//! `RUST_LOG` selects the log level (default `info`).

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{error, info};

use railcreator::adapters::log_sink::LogEventSink;
use railcreator::adapters::simulated::SimulatedBoards;
use railcreator::app::service::RailService;
use railcreator::config::RailConfig;
use railcreator::pins::MappedPin;
use railcreator::plan::RailPlan;

/// Ticks between simulated press/release flips on every input pin.
const PRESS_PERIOD_TICKS: u64 = 100;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Railcreator v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let mut args = std::env::args().skip(1);
    let Some(plan_path) = args.next().map(PathBuf::from) else {
        bail!("usage: railcreator <plan.json> [config.json]");
    };
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => RailConfig::default(),
    };
    info!("Config: {:?}", config);

    // ── 1. Build the layout ───────────────────────────────────
    let plan = RailPlan::from_file(&plan_path)
        .with_context(|| format!("loading plan {}", plan_path.display()))?;

    let mut sink = LogEventSink::new();
    let mut service = RailService::new(config.clone());
    service
        .load_plan(&plan, &mut sink)
        .context("building layout from plan")?;
    info!("{}", service);

    let inputs = input_pins(&service);
    info!("Driving {} simulated input(s)", inputs.len());

    // ── 2. Tick loop ──────────────────────────────────────────
    let mut hw = SimulatedBoards::new().with_real_delays();
    let interval = Duration::from_millis(u64::from(config.tick_interval_ms));
    let mut pressed = false;

    loop {
        let tick = service.tick_count();
        if config.run_ticks.is_some_and(|limit| tick >= limit) {
            break;
        }

        if tick > 0 && tick % PRESS_PERIOD_TICKS == 0 {
            pressed = !pressed;
            for mapped in &inputs {
                hw.set_level(&mapped.board, mapped.pin, u8::from(pressed));
            }
        }

        if let Err(e) = service.tick(&mut hw, &mut sink) {
            if config.stop_on_tick_error {
                error!("Stopping after tick {}: {}", service.tick_count(), e);
                return Err(e).context("tick failed");
            }
        }

        thread::sleep(interval);
    }

    info!(
        "Finished after {} ticks ({} pin writes)",
        service.tick_count(),
        hw.writes().len()
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<RailConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    Ok(RailConfig::from_json(&json)?)
}

/// Pins of every input-only device in the layout.
fn input_pins(service: &RailService) -> Vec<MappedPin> {
    service
        .devices()
        .keys()
        .filter(|key| {
            service
                .devices()
                .kind(key.as_str())
                .is_some_and(|kind| !kind.is_runnable())
        })
        .filter_map(|key| service.pins().resolve(key).ok())
        .collect()
}
