//! Hardware adapter: bridges `embedded-hal` digital pins to the chip driver port.
//!
//! Each (board, pin) pair the rail plan uses is bound to one HAL pin:
//! inputs to an [`InputPin`], outputs to an [`OutputPin`]. Reads and
//! writes are routed by that binding; an unbound pair or a write to an
//! input is reported as a [`HardwareError`]. Delays go to the wrapped
//! [`DelayNs`] provider.
//!
//! This is the only module that touches real GPIO; any HAL that
//! implements the `embedded-hal` 1.0 digital traits plugs in here.

use std::collections::BTreeMap;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use log::debug;

use crate::app::ports::ChipDriver;
use crate::error::HardwareError;

enum Binding<I, O> {
    Input(I),
    Output(O),
}

/// Concrete adapter that combines HAL pins and a delay behind the port traits.
pub struct HalHardware<I, O, D> {
    pins: BTreeMap<(String, u8), Binding<I, O>>,
    delay: D,
}

impl<I: InputPin, O: OutputPin, D: DelayNs> HalHardware<I, O, D> {
    pub fn new(delay: D) -> Self {
        Self {
            pins: BTreeMap::new(),
            delay,
        }
    }

    pub fn bind_input(&mut self, board: &str, pin: u8, line: I) {
        debug!("HAL input bound to {}:{}", board, pin);
        self.pins
            .insert((board.to_owned(), pin), Binding::Input(line));
    }

    pub fn bind_output(&mut self, board: &str, pin: u8, line: O) {
        debug!("HAL output bound to {}:{}", board, pin);
        self.pins
            .insert((board.to_owned(), pin), Binding::Output(line));
    }

    fn binding(&mut self, board: &str, pin: u8) -> Result<&mut Binding<I, O>, HardwareError> {
        self.pins
            .get_mut(&(board.to_owned(), pin))
            .ok_or_else(|| HardwareError::new(board, pin, "no HAL pin bound"))
    }
}

// ── ChipDriver implementation ─────────────────────────────────

impl<I: InputPin, O: OutputPin, D: DelayNs> ChipDriver for HalHardware<I, O, D> {
    fn read_pin(&mut self, board: &str, pin: u8) -> Result<u8, HardwareError> {
        match self.binding(board, pin)? {
            Binding::Input(line) => line
                .is_high()
                .map(u8::from)
                .map_err(|e| HardwareError::new(board, pin, format!("{:?}", e.kind()))),
            Binding::Output(_) => Err(HardwareError::new(board, pin, "pin is bound as output")),
        }
    }

    fn write_pin(&mut self, board: &str, pin: u8, value: u8) -> Result<(), HardwareError> {
        match self.binding(board, pin)? {
            Binding::Output(line) => {
                let result = if value > 0 {
                    line.set_high()
                } else {
                    line.set_low()
                };
                result.map_err(|e| HardwareError::new(board, pin, format!("{:?}", e.kind())))
            }
            Binding::Input(_) => Err(HardwareError::new(board, pin, "pin is bound as input")),
        }
    }
}

// ── DelayNs implementation ────────────────────────────────────

impl<I, O, D: DelayNs> DelayNs for HalHardware<I, O, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
