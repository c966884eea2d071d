//! Toggle button: each press (raw low→high edge) flips the device state.
//!
//! The raw pin is sampled once per tick by [`Inputer::sample`]; downstream
//! devices only see the toggle bit. Whether a downstream device observes
//! a press in the same tick therefore depends on whether it runs after
//! the toggle button's sample.

use log::debug;

use super::Inputer;
use super::visitors::VisitorCache;
use crate::app::ports::RailHardware;
use crate::error::Result;
use crate::naming::DeviceKey;
use crate::pins::{InputLine, PinAllocator};

#[derive(Debug)]
pub struct ToggleButton {
    name: String,
    line: InputLine,
    raw: bool,
    toggled: bool,
    visitors: VisitorCache,
}

impl ToggleButton {
    pub fn new(alloc: &mut PinAllocator, name: &str, board: &str, pin: Option<u8>) -> Result<Self> {
        let key = DeviceKey::new(name)?;
        let line = InputLine::reserve(alloc, board, pin, &key)?;
        Ok(Self {
            name: name.to_owned(),
            line,
            raw: false,
            toggled: false,
            visitors: VisitorCache::new(),
        })
    }
}

impl Inputer for ToggleButton {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> &DeviceKey {
        self.line.key()
    }

    fn state_changed(&mut self, visitor: &DeviceKey, _hw: &mut dyn RailHardware) -> Result<bool> {
        Ok(self.visitors.observe(visitor, self.toggled))
    }

    fn is_on(&self) -> bool {
        self.toggled
    }

    fn forget_visitor(&mut self, visitor: &DeviceKey) {
        self.visitors.forget(visitor);
    }

    fn sample(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        let now = self.line.read(hw)?;
        if now && !self.raw {
            self.toggled = !self.toggled;
            debug!("toggle button '{}' -> {}", self.name, self.toggled);
        }
        self.raw = now;
        Ok(())
    }
}
