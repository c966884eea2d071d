//! Two-light signal: "pass" (green) and "stop" (red), never lit together.
//!
//! Switching on releases the stop light before the pass light is set;
//! switching off does the reverse. The stop light is mapped under
//! "<name> stop".

use super::common::{CommonOutput, Timing};
use super::Actuator;
use crate::app::ports::RailHardware;
use crate::error::Result;
use crate::naming::DeviceKey;
use crate::pins::{OutputLine, PinAllocator};

#[derive(Debug)]
pub struct TwoLightSignal {
    common: CommonOutput,
    pass: OutputLine,
    stop: OutputLine,
}

impl TwoLightSignal {
    pub fn new(
        alloc: &mut PinAllocator,
        name: &str,
        board: &str,
        pass_pin: Option<u8>,
        stop_pin: Option<u8>,
        timing: Timing,
    ) -> Result<Self> {
        let key = DeviceKey::new(name)?;
        let pass = OutputLine::reserve(alloc, board, pass_pin, &key)?;
        let stop_key = key.with_suffix("stop")?;
        let stop = match OutputLine::reserve(alloc, board, stop_pin, &stop_key) {
            Ok(line) => line,
            Err(e) => {
                alloc.release_pin(&key)?;
                return Err(e);
            }
        };
        Ok(Self {
            common: CommonOutput::new(name, key, "signal", timing),
            pass,
            stop,
        })
    }
}

impl Actuator for TwoLightSignal {
    fn common(&self) -> &CommonOutput {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonOutput {
        &mut self.common
    }

    fn switch_on(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        self.common.ensure_operable()?;
        self.common.wait_start(hw);
        self.stop.write(hw, false)?;
        self.pass.write(hw, true)?;
        self.common.set_on(true);
        Ok(())
    }

    fn switch_off(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        self.common.wait_stop(hw);
        self.pass.write(hw, false)?;
        self.stop.write(hw, true)?;
        self.common.set_on(false);
        Ok(())
    }
}
