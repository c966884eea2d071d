//! Application service: the hexagonal core.
//!
//! [`RailService`] owns the pin allocator and the device directory. It is
//! the whole-system entry point: boards and devices are added from
//! recipes, wiring is resolved once, and `tick` runs every device. All I/O
//! flows through port traits injected at call sites.
//!
//! ```text
//!  RailHardware ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  (pins + delay)   │        RailService        │
//!                   │ PinAllocator · Directory  │
//!                   └──────────────────────────┘
//! ```

use core::fmt;
use std::collections::BTreeSet;

use log::{info, warn};

use crate::config::RailConfig;
use crate::devices::{Actuator, DeviceDirectory, Inputer, OutputState, Runnable};
use crate::error::{DeviceError, Result};
use crate::naming::DeviceKey;
use crate::pins::{Board, BoardType, PinAllocator, PinCapability};
use crate::plan::{BoardRecipe, DeviceRecipe, RailPlan};

use super::commands::RailCommand;
use super::events::RailEvent;
use super::ports::{EventSink, RailHardware};

// ───────────────────────────────────────────────────────────────
// RailService
// ───────────────────────────────────────────────────────────────

pub struct RailService {
    config: RailConfig,
    pins: PinAllocator,
    devices: DeviceDirectory,
    tick_count: u64,
}

impl RailService {
    pub fn new(config: RailConfig) -> Self {
        let devices = DeviceDirectory::new().with_max_delay(config.max_actuation_delay_ms);
        Self {
            config,
            pins: PinAllocator::new(),
            devices,
            tick_count: 0,
        }
    }

    // ── Configuration ─────────────────────────────────────────

    pub fn add_board(&mut self, recipe: &BoardRecipe) -> Result<()> {
        let board_type: BoardType = recipe.board_type.parse()?;
        self.pins
            .add_board(Board::from_type(&recipe.name, recipe.chip_address, board_type))
    }

    pub fn add_device(&mut self, recipe: &DeviceRecipe) -> Result<DeviceKey> {
        self.devices.add_device(&mut self.pins, recipe)
    }

    pub fn remove_device(&mut self, name: &str) -> Result<()> {
        self.devices.remove_device(&mut self.pins, name)
    }

    pub fn connect_now(&mut self) -> Result<()> {
        self.devices.connect_now()
    }

    /// Add every board, then every device, then resolve the wiring.
    pub fn load_plan(&mut self, plan: &RailPlan, sink: &mut impl EventSink) -> Result<()> {
        for board in &plan.boards {
            self.add_board(board)?;
        }
        for device in &plan.devices {
            self.add_device(device)?;
        }
        self.connect_now()?;
        sink.emit(&RailEvent::PlanLoaded {
            boards: plan.boards.len(),
            devices: plan.devices.len(),
        });
        if self.config.dump_mappings_on_start {
            info!("Pin mappings:\n{}", self.pins);
        }
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run every device once. Output transitions are emitted as events;
    /// a failure is emitted and returned, and the next tick starts over.
    pub fn tick(&mut self, hw: &mut impl RailHardware, sink: &mut impl EventSink) -> Result<()> {
        self.tick_count += 1;
        let before = self.devices.output_states();
        let result = self.devices.run(hw);
        self.emit_changes(&before, sink);

        if let Err(error) = &result {
            warn!("Tick {} failed: {}", self.tick_count, error);
            sink.emit(&RailEvent::TickFailed {
                tick: self.tick_count,
                error: error.clone(),
            });
        }
        result
    }

    fn emit_changes(&self, before: &[(DeviceKey, OutputState)], sink: &mut impl EventSink) {
        for (device, to) in self.devices.output_states() {
            let from = before
                .iter()
                .find(|(key, _)| key == &device)
                .map_or(OutputState::Off, |(_, state)| *state);
            if from != to {
                sink.emit(&RailEvent::OutputChanged { device, from, to });
            }
        }
    }

    // ── Command dispatch ──────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: RailCommand,
        hw: &mut impl RailHardware,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let before = self.devices.output_states();
        let result = match &cmd {
            RailCommand::SwitchOn(name) => self.with_actuator(name, |a| a.switch_on(hw)),
            RailCommand::SwitchOff(name) => self.with_actuator(name, |a| a.switch_off(hw)),
            RailCommand::MakeDefective(name) => {
                self.with_actuator(name, |a| a.make_defective(hw))
            }
            RailCommand::Repair(name) => self.with_actuator(name, |a| a.repair()),
        };
        self.emit_changes(&before, sink);
        if let Err(e) = &result {
            warn!("Command {:?} failed: {}", cmd, e);
        }
        result
    }

    pub fn make_defective(&mut self, name: &str, hw: &mut impl RailHardware) -> Result<()> {
        self.with_actuator(name, |a| a.make_defective(hw))
    }

    pub fn repair(&mut self, name: &str) -> Result<()> {
        self.with_actuator(name, |a| a.repair())
    }

    fn with_actuator<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut dyn Actuator) -> Result<T>,
    ) -> Result<T> {
        let device = self.devices.runnable(name).ok_or_else(|| {
            if self.devices.contains(name) {
                DeviceError::NotAnOutput(name.to_owned())
            } else {
                DeviceError::NotFound(name.to_owned())
            }
        })?;
        let mut device = device
            .try_borrow_mut()
            .map_err(|_| DeviceError::NotFound(name.to_owned()))?;
        f(device.actuator_mut())
    }

    // ── Introspection ─────────────────────────────────────────

    pub fn free_pins(&self, board: &str, capability: PinCapability) -> Result<BTreeSet<u8>> {
        self.pins.free_pins(board, capability)
    }

    pub fn used_pins(&self, board: &str) -> Result<BTreeSet<u8>> {
        self.pins.used_pins(board)
    }

    /// State of an output device.
    pub fn output_state(&self, name: &str) -> Result<OutputState> {
        self.with_actuator(name, |a| Ok(a.state()))
    }

    /// Logical value of any device, input or output.
    pub fn is_on(&self, name: &str) -> Result<bool> {
        let device = self
            .devices
            .input(name)
            .ok_or_else(|| DeviceError::NotFound(name.to_owned()))?;
        let on = device
            .try_borrow()
            .map(|d| d.is_on())
            .map_err(|_| DeviceError::NotFound(name.to_owned()))?;
        Ok(on)
    }

    pub fn pins(&self) -> &PinAllocator {
        &self.pins
    }

    pub fn devices(&self) -> &DeviceDirectory {
        &self.devices
    }

    pub fn config(&self) -> &RailConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Diagnostic dump of boards and pin mappings.
impl fmt::Display for RailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pins)
    }
}
