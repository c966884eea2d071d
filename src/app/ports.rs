//! Port traits: the hexagonal boundary between the rail core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RailService (domain)
//! ```
//!
//! Driven adapters (chip drivers, delay providers, event sinks) implement
//! these traits. The [`RailService`](super::service::RailService) and every
//! device receive them at call sites, so the domain core never owns
//! hardware.

use embedded_hal::delay::DelayNs;

use crate::error::HardwareError;

// ───────────────────────────────────────────────────────────────
// Chip driver port (driven adapter: domain ↔ board pins)
// ───────────────────────────────────────────────────────────────

/// Register-level access to board pins. Values are single bytes; binary
/// pins use 0 and 1.
///
/// Errors are passed through to the tick caller unchanged.
pub trait ChipDriver {
    fn read_pin(&mut self, board: &str, pin: u8) -> Result<u8, HardwareError>;

    fn write_pin(&mut self, board: &str, pin: u8, value: u8) -> Result<(), HardwareError>;
}

// ───────────────────────────────────────────────────────────────
// Hardware bundle
// ───────────────────────────────────────────────────────────────

/// Everything a device needs during a tick: pin access plus the blocking
/// delay used for start/stop actuation timing.
///
/// Blanket-implemented, so any `ChipDriver + DelayNs` qualifies.
pub trait RailHardware: ChipDriver + DelayNs {}

impl<T: ChipDriver + DelayNs + ?Sized> RailHardware for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The service emits structured [`RailEvent`](super::events::RailEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RailEvent);
}
