//! Outbound rail events.
//!
//! The [`RailService`](super::service::RailService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.

use crate::devices::OutputState;
use crate::error::Error;
use crate::naming::DeviceKey;

/// Structured events emitted by the rail core.
#[derive(Debug, Clone, PartialEq)]
pub enum RailEvent {
    /// A rail plan was applied and wired.
    PlanLoaded { boards: usize, devices: usize },

    /// An output device changed state during a tick or command.
    OutputChanged {
        device: DeviceKey,
        from: OutputState,
        to: OutputState,
    },

    /// A tick stopped at the first failing device.
    TickFailed { tick: u64, error: Error },
}
