//! Rail devices and the capability traits they are wired through.
//!
//! ```text
//!   Button / ToggleButton ──(Inputer)──▶ Runner<Lamp|Turnout|TwoLightSignal>
//!                                         │  (Runnable = Inputer + run)
//!                                         └──(Inputer)──▶ further Runners
//! ```
//!
//! | Device          | Pins            | Role                            |
//! |-----------------|-----------------|---------------------------------|
//! | `Button`        | 1 input         | level input                     |
//! | `ToggleButton`  | 1 input         | flips on each press             |
//! | `Lamp`          | 1 output        | sustained output                |
//! | `Turnout`       | branch + main   | pulsed solenoid pair            |
//! | `TwoLightSignal`| pass + stop     | complementary lights            |
//!
//! Devices never own hardware. Every call that touches a pin takes the
//! [`RailHardware`] bundle as a parameter.

use std::cell::RefCell;
use std::rc::Rc;

use crate::app::ports::RailHardware;
use crate::error::Result;
use crate::naming::DeviceKey;

mod button;
mod common;
mod directory;
mod lamp;
mod runner;
mod signal;
mod toggle_button;
mod turnout;
mod visitors;

pub use button::Button;
pub use common::{CommonOutput, OutputState, Timing};
pub use directory::{DeviceDirectory, DeviceKind};
pub use lamp::Lamp;
pub use runner::Runner;
pub use signal::TwoLightSignal;
pub use toggle_button::ToggleButton;
pub use turnout::Turnout;
pub use visitors::VisitorCache;

/// Shared handle to anything that can feed a downstream device.
pub type SharedInput = Rc<RefCell<dyn Inputer>>;

/// Shared handle to a wired output device.
pub type SharedRunnable = Rc<RefCell<dyn Runnable>>;

// ───────────────────────────────────────────────────────────────
// Capability traits
// ───────────────────────────────────────────────────────────────

/// A boolean source with per-consumer change detection.
pub trait Inputer {
    /// Human-readable name as given in the recipe.
    fn name(&self) -> &str;

    fn key(&self) -> &DeviceKey;

    /// Read the current value and report whether it differs from what
    /// `visitor` saw last time. A visitor's first look always reports a
    /// change. Other visitors are unaffected.
    fn state_changed(&mut self, visitor: &DeviceKey, hw: &mut dyn RailHardware) -> Result<bool>;

    fn is_on(&self) -> bool;

    /// Drop the cached value for `visitor`.
    fn forget_visitor(&mut self, visitor: &DeviceKey);

    /// Per-tick update for inputs with internal state.
    fn sample(&mut self, _hw: &mut dyn RailHardware) -> Result<()> {
        Ok(())
    }
}

/// Bistable output with fault simulation.
pub trait Actuator {
    fn common(&self) -> &CommonOutput;

    fn common_mut(&mut self) -> &mut CommonOutput;

    /// Fails with `Defective` while defective; otherwise waits the start
    /// delay and drives the output.
    fn switch_on(&mut self, hw: &mut dyn RailHardware) -> Result<()>;

    /// Always permitted.
    fn switch_off(&mut self, hw: &mut dyn RailHardware) -> Result<()>;

    /// Switch off, then refuse switch-on until repaired. A failed switch-off
    /// leaves the device operable.
    fn make_defective(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        self.switch_off(hw)?;
        self.common_mut().mark_defective();
        Ok(())
    }

    fn repair(&mut self) -> Result<()> {
        self.common_mut().repair()
    }

    fn state(&self) -> OutputState {
        self.common().state()
    }
}

/// An output that is wired to one upstream input and evaluated once per tick.
pub trait Runnable: Inputer {
    /// Wire `upstream`; `inverted` flips the command it produces.
    fn connect(&mut self, upstream: SharedInput, inverted: bool) -> Result<()>;

    /// Poll the upstream and actuate when it changed (or on the first run).
    fn run(&mut self, hw: &mut dyn RailHardware) -> Result<()>;

    /// Unwire and evict this device from the upstream's visitor cache.
    fn release_input(&mut self);

    fn upstream_key(&self) -> Option<&DeviceKey>;

    fn actuator(&self) -> &dyn Actuator;

    fn actuator_mut(&mut self) -> &mut dyn Actuator;
}
