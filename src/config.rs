//! Runtime configuration
//!
//! Tunables for the tick loop. Values can be overridden from a JSON file;
//! missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    // --- Timing ---
    /// Tick interval (milliseconds); 10..50 ms is sufficient for push buttons
    pub tick_interval_ms: u32,
    /// Ceiling for recipe start/stop delays (milliseconds)
    pub max_actuation_delay_ms: u32,

    // --- Loop ---
    /// Stop after this many ticks; `None` runs forever
    pub run_ticks: Option<u64>,
    /// Abort the loop on the first failing tick instead of logging it
    pub stop_on_tick_error: bool,

    // --- Diagnostics ---
    /// Log the pin mapping table after the plan is loaded
    pub dump_mappings_on_start: bool,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 10,
            max_actuation_delay_ms: 1_000,

            // Loop
            run_ticks: None,
            stop_on_tick_error: false,

            // Diagnostics
            dump_mappings_on_start: true,
        }
    }
}

impl RailConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Plan(format!("config: {e}")))
    }
}
