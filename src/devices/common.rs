//! Shared on/off/defective state machine for output devices.
//!
//! ```text
//!            switch_on (not defective)
//!   ┌─────┐ ─────────────────────────▶ ┌────┐
//!   │ Off │                             │ On │
//!   └─────┘ ◀───────────────────────── └────┘
//!     │  ▲        switch_off / make_defective
//!     │  │ repair
//!     ▼  │
//!   ┌───────────┐
//!   │ Defective │  (switch_off still allowed, switch_on refused)
//!   └───────────┘
//! ```
//!
//! `make_defective` always passes through `switch_off`, so On and
//! Defective are never set together.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use super::visitors::VisitorCache;
use crate::app::ports::RailHardware;
use crate::error::{DeviceError, Result};
use crate::naming::DeviceKey;

/// Start/stop actuation delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    pub start_ms: u32,
    pub stop_ms: u32,
}

impl Timing {
    pub const fn new(start_ms: u32, stop_ms: u32) -> Self {
        Self { start_ms, stop_ms }
    }

    /// Limit both delays to `max_ms`.
    pub fn clamped(self, max_ms: u32) -> Self {
        if self.start_ms > max_ms || self.stop_ms > max_ms {
            warn!(
                "Actuation delay {}/{} ms limited to {} ms",
                self.start_ms, self.stop_ms, max_ms
            );
        }
        Self {
            start_ms: self.start_ms.min(max_ms),
            stop_ms: self.stop_ms.min(max_ms),
        }
    }
}

/// Observable state of an output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Off,
    On,
    Defective,
}

#[derive(Debug)]
pub struct CommonOutput {
    name: String,
    key: DeviceKey,
    label: &'static str,
    timing: Timing,
    on: bool,
    defective: bool,
    visitors: VisitorCache,
}

impl CommonOutput {
    pub fn new(name: &str, key: DeviceKey, label: &'static str, timing: Timing) -> Self {
        Self {
            name: name.to_owned(),
            key,
            label,
            timing,
            on: false,
            defective: false,
            visitors: VisitorCache::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &DeviceKey {
        &self.key
    }

    /// Device family, e.g. "lamp".
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_defective(&self) -> bool {
        self.defective
    }

    pub fn state(&self) -> OutputState {
        match (self.defective, self.on) {
            (true, _) => OutputState::Defective,
            (false, true) => OutputState::On,
            (false, false) => OutputState::Off,
        }
    }

    /// Gate for every switch-on path.
    pub fn ensure_operable(&self) -> Result<()> {
        if self.defective {
            return Err(DeviceError::Defective(self.name.clone()).into());
        }
        Ok(())
    }

    pub fn wait_start(&self, hw: &mut dyn RailHardware) {
        hw.delay_ms(self.timing.start_ms);
    }

    pub fn wait_stop(&self, hw: &mut dyn RailHardware) {
        hw.delay_ms(self.timing.stop_ms);
    }

    pub fn set_on(&mut self, on: bool) {
        if self.on != on {
            debug!("{} '{}' -> {}", self.label, self.name, if on { "on" } else { "off" });
        }
        self.on = on;
    }

    pub(crate) fn mark_defective(&mut self) {
        self.defective = true;
        warn!("{} '{}' marked defective", self.label, self.name);
    }

    pub fn repair(&mut self) -> Result<()> {
        if self.on {
            return Err(DeviceError::CannotRepairWhileOn(self.name.clone()).into());
        }
        self.defective = false;
        Ok(())
    }

    // ── Visitors ──────────────────────────────────────────────

    /// Change detection on the on/off state, for downstream devices.
    pub fn observe(&mut self, visitor: &DeviceKey) -> bool {
        self.visitors.observe(visitor, self.on)
    }

    pub fn forget_visitor(&mut self, visitor: &DeviceKey) {
        self.visitors.forget(visitor);
    }

    pub fn visitor_count(&self) -> usize {
        self.visitors.len()
    }
}
