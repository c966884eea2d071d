//! Turnout: two solenoids, pulsed.
//!
//! ```text
//!   =CHOO-CHOO>=====\\=====   on:  branch route (diverging)
//!   =CHOO-CHOO>============   off: main route
//! ```
//!
//! Each solenoid is energised for the start (branch) or stop (main) delay
//! and then released. "On" means the last command went to the branch
//! route; neither pin stays high afterwards.

use super::common::{CommonOutput, Timing};
use super::Actuator;
use crate::app::ports::RailHardware;
use crate::error::Result;
use crate::naming::DeviceKey;
use crate::pins::{OutputLine, PinAllocator};

#[derive(Debug)]
pub struct Turnout {
    common: CommonOutput,
    branch: OutputLine,
    main: OutputLine,
}

impl Turnout {
    /// Reserve the branch pin under the device name and the main pin
    /// under "<name> main". `None` picks any free output.
    pub fn new(
        alloc: &mut PinAllocator,
        name: &str,
        board: &str,
        branch_pin: Option<u8>,
        main_pin: Option<u8>,
        timing: Timing,
    ) -> Result<Self> {
        let key = DeviceKey::new(name)?;
        let branch = OutputLine::reserve(alloc, board, branch_pin, &key)?;
        let main_key = key.with_suffix("main")?;
        let main = match OutputLine::reserve(alloc, board, main_pin, &main_key) {
            Ok(line) => line,
            Err(e) => {
                alloc.release_pin(&key)?;
                return Err(e);
            }
        };
        Ok(Self {
            common: CommonOutput::new(name, key, "turnout", timing),
            branch,
            main,
        })
    }
}

impl Actuator for Turnout {
    fn common(&self) -> &CommonOutput {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonOutput {
        &mut self.common
    }

    fn switch_on(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        self.common.ensure_operable()?;
        self.branch.write(hw, true)?;
        self.common.wait_start(hw);
        self.branch.write(hw, false)?;
        self.common.set_on(true);
        Ok(())
    }

    fn switch_off(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        self.main.write(hw, true)?;
        self.common.wait_stop(hw);
        self.main.write(hw, false)?;
        self.common.set_on(false);
        Ok(())
    }
}
