//! Momentary push button: the input level is the device state.

use super::Inputer;
use super::visitors::VisitorCache;
use crate::app::ports::RailHardware;
use crate::error::Result;
use crate::naming::DeviceKey;
use crate::pins::{InputLine, PinAllocator};

#[derive(Debug)]
pub struct Button {
    name: String,
    line: InputLine,
    pressed: bool,
    visitors: VisitorCache,
}

impl Button {
    /// Reserve the input pin (`None` = any free readable pin) and build the button.
    pub fn new(alloc: &mut PinAllocator, name: &str, board: &str, pin: Option<u8>) -> Result<Self> {
        let key = DeviceKey::new(name)?;
        let line = InputLine::reserve(alloc, board, pin, &key)?;
        Ok(Self {
            name: name.to_owned(),
            line,
            pressed: false,
            visitors: VisitorCache::new(),
        })
    }
}

impl Inputer for Button {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> &DeviceKey {
        self.line.key()
    }

    fn state_changed(&mut self, visitor: &DeviceKey, hw: &mut dyn RailHardware) -> Result<bool> {
        self.pressed = self.line.read(hw)?;
        Ok(self.visitors.observe(visitor, self.pressed))
    }

    fn is_on(&self) -> bool {
        self.pressed
    }

    fn forget_visitor(&mut self, visitor: &DeviceKey) {
        self.visitors.forget(visitor);
    }
}
