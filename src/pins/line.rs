//! Logical input/output lines on top of allocated pins.
//!
//! A line is what a device holds after reserving its pin: board id, pin
//! number and whether the electrical level is negated. Devices always
//! read and write logical values; negation is applied here.

use super::allocator::PinAllocator;
use super::board::PinCapability;
use crate::app::ports::ChipDriver;
use crate::error::{PinError, Result};
use crate::naming::DeviceKey;

/// Map `key` to `pin` (or to any free pin serving `wanted`) and check
/// that the mapped pin can serve `wanted`. On a mismatch the mapping is
/// rolled back.
fn reserve(
    alloc: &mut PinAllocator,
    board: &str,
    pin: Option<u8>,
    key: &DeviceKey,
    wanted: PinCapability,
) -> Result<(u8, bool)> {
    match pin {
        Some(nr) => alloc.map_pin(board, nr, key)?,
        None => {
            alloc.map_pin_next_free(board, wanted, key)?;
        }
    }
    let mapped = alloc.resolve(key)?;
    if !mapped.capability.serves(wanted) {
        alloc.release_pin(key)?;
        return Err(PinError::WrongCapability {
            name: key.to_string(),
            capability: mapped.capability,
            wanted,
        }
        .into());
    }
    Ok((mapped.pin, mapped.capability.inverted()))
}

// ── Input ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    key: DeviceKey,
    board: String,
    pin: u8,
    inverted: bool,
}

impl InputLine {
    /// Reserve a readable binary pin for `key`.
    pub fn reserve(
        alloc: &mut PinAllocator,
        board: &str,
        pin: Option<u8>,
        key: &DeviceKey,
    ) -> Result<Self> {
        let (pin, inverted) = reserve(alloc, board, pin, key, PinCapability::BinaryR)?;
        Ok(Self {
            key: key.clone(),
            board: board.to_owned(),
            pin,
            inverted,
        })
    }

    /// Logical level: any non-zero raw value is high.
    pub fn read(&self, hw: &mut (impl ChipDriver + ?Sized)) -> Result<bool> {
        let raw = hw.read_pin(&self.board, self.pin)?;
        Ok((raw > 0) != self.inverted)
    }

    pub fn key(&self) -> &DeviceKey {
        &self.key
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

// ── Output ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    key: DeviceKey,
    board: String,
    pin: u8,
    inverted: bool,
}

impl OutputLine {
    /// Reserve a writable binary pin for `key`.
    pub fn reserve(
        alloc: &mut PinAllocator,
        board: &str,
        pin: Option<u8>,
        key: &DeviceKey,
    ) -> Result<Self> {
        let (pin, inverted) = reserve(alloc, board, pin, key, PinCapability::BinaryW)?;
        Ok(Self {
            key: key.clone(),
            board: board.to_owned(),
            pin,
            inverted,
        })
    }

    pub fn write(&self, hw: &mut (impl ChipDriver + ?Sized), on: bool) -> Result<()> {
        let level = u8::from(on != self.inverted);
        hw.write_pin(&self.board, self.pin, level)?;
        Ok(())
    }

    pub fn key(&self) -> &DeviceKey {
        &self.key
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}
