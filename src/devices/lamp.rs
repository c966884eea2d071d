//! Lamp: one sustained output.

use super::common::{CommonOutput, Timing};
use super::Actuator;
use crate::app::ports::RailHardware;
use crate::error::Result;
use crate::naming::DeviceKey;
use crate::pins::{OutputLine, PinAllocator};

#[derive(Debug)]
pub struct Lamp {
    common: CommonOutput,
    line: OutputLine,
}

impl Lamp {
    pub fn new(
        alloc: &mut PinAllocator,
        name: &str,
        board: &str,
        pin: Option<u8>,
        timing: Timing,
    ) -> Result<Self> {
        let key = DeviceKey::new(name)?;
        let line = OutputLine::reserve(alloc, board, pin, &key)?;
        Ok(Self {
            common: CommonOutput::new(name, key, "lamp", timing),
            line,
        })
    }
}

impl Actuator for Lamp {
    fn common(&self) -> &CommonOutput {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonOutput {
        &mut self.common
    }

    fn switch_on(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        self.common.ensure_operable()?;
        self.common.wait_start(hw);
        self.line.write(hw, true)?;
        self.common.set_on(true);
        Ok(())
    }

    fn switch_off(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        self.common.wait_stop(hw);
        self.line.write(hw, false)?;
        self.common.set_on(false);
        Ok(())
    }
}
