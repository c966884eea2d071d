//! Host delay adapter.
//!
//! Implements [`DelayNs`] with `std::thread::sleep`, so actuation delays
//! block the tick thread for real. Used by the demo binary and by
//! [`HalHardware`](super::hardware::HalHardware) when no board-specific delay
//! provider is available.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocking delay on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl StdDelay {
    pub fn new() -> Self {
        Self
    }
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        if ns > 0 {
            std::thread::sleep(Duration::from_nanos(u64::from(ns)));
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(u64::from(ms)));
        }
    }
}
