//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing rail events to the `log` facade.
//! Whatever logger the binary installs decides where they end up.

use log::{info, warn};

use crate::app::events::RailEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RailEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RailEvent) {
        match event {
            RailEvent::PlanLoaded { boards, devices } => {
                info!("PLAN  | boards={} devices={}", boards, devices);
            }
            RailEvent::OutputChanged { device, from, to } => {
                info!("OUT   | {} {:?} -> {:?}", device, from, to);
            }
            RailEvent::TickFailed { tick, error } => {
                warn!("TICK  | #{} failed: {}", tick, error);
            }
        }
    }
}
