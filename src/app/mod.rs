//! Application core: rail domain orchestration, zero owned I/O.
//!
//! The [`service`] owns pin allocation and the device graph. All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer testable against simulated boards.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
