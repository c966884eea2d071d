//! Mock hardware adapter for integration tests.
//!
//! Records every pin read, pin write and delay so tests can assert on the
//! full bus history without touching a real chip.

use std::collections::HashMap;

use embedded_hal::delay::DelayNs;
use railcreator::app::events::RailEvent;
use railcreator::app::ports::{ChipDriver, EventSink};
use railcreator::error::HardwareError;

// ── Bus operation record ──────────────────────────────────────

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Read { board: String, pin: u8 },
    Write { board: String, pin: u8, value: u8 },
    DelayMs(u32),
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    pub ops: Vec<BusOp>,
    levels: HashMap<(String, u8), u8>,
    failing: Option<(String, u8)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, board: &str, pin: u8, value: u8) {
        self.levels.insert((board.to_owned(), pin), value);
    }

    pub fn fail_on(&mut self, board: &str, pin: u8) {
        self.failing = Some((board.to_owned(), pin));
    }

    pub fn clear_fault(&mut self) {
        self.failing = None;
    }

    /// Values written to one pin, oldest first.
    pub fn writes(&self, board: &str, pin: u8) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Write { board: b, pin: p, value } if b == board && *p == pin => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BusOp::Write { .. }))
            .count()
    }

    pub fn total_delay_ms(&self) -> u64 {
        self.ops
            .iter()
            .map(|op| match op {
                BusOp::DelayMs(ms) => u64::from(*ms),
                _ => 0,
            })
            .sum()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    fn check(&self, board: &str, pin: u8) -> Result<(), HardwareError> {
        match &self.failing {
            Some((b, p)) if b == board && *p == pin => {
                Err(HardwareError::new(board, pin, "bus timeout"))
            }
            _ => Ok(()),
        }
    }
}

impl ChipDriver for MockHardware {
    fn read_pin(&mut self, board: &str, pin: u8) -> Result<u8, HardwareError> {
        self.check(board, pin)?;
        self.ops.push(BusOp::Read {
            board: board.to_owned(),
            pin,
        });
        Ok(self
            .levels
            .get(&(board.to_owned(), pin))
            .copied()
            .unwrap_or(0))
    }

    fn write_pin(&mut self, board: &str, pin: u8, value: u8) -> Result<(), HardwareError> {
        self.check(board, pin)?;
        self.ops.push(BusOp::Write {
            board: board.to_owned(),
            pin,
            value,
        });
        self.levels.insert((board.to_owned(), pin), value);
        Ok(())
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, ns: u32) {
        if ns > 0 {
            self.ops.push(BusOp::DelayMs(ns / 1_000_000));
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            self.ops.push(BusOp::DelayMs(ms));
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<RailEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RailEvent::OutputChanged { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &RailEvent) {
        self.events.push(event.clone());
    }
}
