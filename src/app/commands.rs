//! Inbound commands addressed to a single output device by name.
//!
//! These bypass the wiring graph: they act on the device's actuator
//! directly, exactly like an operator at the control desk would.

/// Commands the [`RailService`](super::service::RailService) can execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RailCommand {
    /// Switch the named output on.
    SwitchOn(String),

    /// Switch the named output off.
    SwitchOff(String),

    /// Simulate a fault: switch off, then refuse switch-on until repaired.
    MakeDefective(String),

    /// Clear a simulated fault (only while off).
    Repair(String),
}
