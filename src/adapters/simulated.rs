//! In-memory chip driver.
//!
//! Implements [`ChipDriver`] and [`DelayNs`] on a register map keyed by
//! (board, pin). Every write is journaled and every requested delay is
//! summed, so tests can assert on the exact pin traffic a tick produced
//! without sleeping. Individual pins can be made to fail to exercise the
//! hardware error path.
//!
//! With [`with_real_delays`](SimulatedBoards::with_real_delays) the
//! delays also sleep, which is what the demo binary uses.

use std::collections::BTreeMap;

use embedded_hal::delay::DelayNs;

use super::time::StdDelay;
use crate::app::ports::ChipDriver;
use crate::error::HardwareError;

/// One journaled pin write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinWrite {
    pub board: String,
    pub pin: u8,
    pub value: u8,
}

#[derive(Debug, Default)]
pub struct SimulatedBoards {
    levels: BTreeMap<(String, u8), u8>,
    faults: BTreeMap<(String, u8), String>,
    writes: Vec<PinWrite>,
    reads: usize,
    delayed_ns: u64,
    realtime: Option<StdDelay>,
}

impl SimulatedBoards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for real on every delay, in addition to counting it.
    pub fn with_real_delays(mut self) -> Self {
        self.realtime = Some(StdDelay::new());
        self
    }

    // ── Stimulus ──────────────────────────────────────────────

    /// Drive the raw level seen by the next read of `pin`.
    pub fn set_level(&mut self, board: &str, pin: u8, value: u8) {
        self.levels.insert((board.to_owned(), pin), value);
    }

    /// Make every access to `pin` fail with `reason` until cleared.
    pub fn inject_fault(&mut self, board: &str, pin: u8, reason: &str) {
        self.faults
            .insert((board.to_owned(), pin), reason.to_owned());
    }

    pub fn clear_fault(&mut self, board: &str, pin: u8) {
        self.faults.remove(&(board.to_owned(), pin));
    }

    // ── Observation ───────────────────────────────────────────

    /// Current raw level of `pin` (0 if never written).
    pub fn level(&self, board: &str, pin: u8) -> u8 {
        self.levels
            .get(&(board.to_owned(), pin))
            .copied()
            .unwrap_or(0)
    }

    pub fn writes(&self) -> &[PinWrite] {
        &self.writes
    }

    /// Values written to one pin, oldest first.
    pub fn writes_to(&self, board: &str, pin: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|w| w.board == board && w.pin == pin)
            .map(|w| w.value)
            .collect()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn read_count(&self) -> usize {
        self.reads
    }

    /// Sum of all requested delays, in whole milliseconds.
    pub fn delayed_ms(&self) -> u64 {
        self.delayed_ns / 1_000_000
    }

    fn check_fault(&self, board: &str, pin: u8) -> Result<(), HardwareError> {
        match self.faults.get(&(board.to_owned(), pin)) {
            Some(reason) => Err(HardwareError::new(board, pin, reason.clone())),
            None => Ok(()),
        }
    }
}

impl ChipDriver for SimulatedBoards {
    fn read_pin(&mut self, board: &str, pin: u8) -> Result<u8, HardwareError> {
        self.check_fault(board, pin)?;
        self.reads += 1;
        Ok(self.level(board, pin))
    }

    fn write_pin(&mut self, board: &str, pin: u8, value: u8) -> Result<(), HardwareError> {
        self.check_fault(board, pin)?;
        self.levels.insert((board.to_owned(), pin), value);
        self.writes.push(PinWrite {
            board: board.to_owned(),
            pin,
            value,
        });
        Ok(())
    }
}

impl DelayNs for SimulatedBoards {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns += u64::from(ns);
        if let Some(delay) = self.realtime.as_mut() {
            delay.delay_ns(ns);
        }
    }
}
