//! Unified error types for the rail layout core.
//!
//! A single `Error` enum that every subsystem converts into, so board
//! setup, wiring and the per-tick run all report through one type.
//! Variants carry the board or device name they refer to; the chip
//! driver's message is kept verbatim inside [`HardwareError`].

use core::fmt;

use crate::pins::PinCapability;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Board registration or pin mapping failed.
    Pin(PinError),
    /// A device could not be wired or run because of its connection.
    Wiring(WiringError),
    /// A device refused a command or could not be created.
    Device(DeviceError),
    /// The chip driver failed to read or write a pin.
    Hardware(HardwareError),
    /// A rail plan or config document could not be parsed.
    Plan(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin(e) => write!(f, "pin: {e}"),
            Self::Wiring(e) => write!(f, "wiring: {e}"),
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Plan(msg) => write!(f, "plan: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Pin registry / allocation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// A board with this id is already registered.
    BoardExists(String),
    /// No board with this id is registered.
    UnknownBoard(String),
    /// The board does not declare this pin number.
    UnknownPin { board: String, pin: u8 },
    /// The pin is already owned by another device.
    PinAlreadyMapped { board: String, pin: u8, owner: String },
    /// The device name already owns a different pin.
    NameAlreadyMapped { name: String, board: String, pin: u8 },
    /// No unowned pin of the requested capability is left on the board.
    NoFreePin { board: String, capability: PinCapability },
    /// The device name has no pin mapping.
    NotMapped(String),
    /// The mapped pin cannot serve the requested direction.
    WrongCapability { name: String, capability: PinCapability, wanted: PinCapability },
    /// A device name normalized to an empty key.
    EmptyName,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardExists(board) => write!(f, "board '{board}' already exists"),
            Self::UnknownBoard(board) => write!(f, "unknown board '{board}'"),
            Self::UnknownPin { board, pin } => write!(f, "board '{board}' has no pin {pin}"),
            Self::PinAlreadyMapped { board, pin, owner } => {
                write!(f, "pin {pin} of board '{board}' already mapped to '{owner}'")
            }
            Self::NameAlreadyMapped { name, board, pin } => {
                write!(f, "'{name}' already mapped to pin {pin} of board '{board}'")
            }
            Self::NoFreePin { board, capability } => {
                write!(f, "no free {capability} pin left on board '{board}'")
            }
            Self::NotMapped(name) => write!(f, "'{name}' is not mapped"),
            Self::WrongCapability { name, capability, wanted } => {
                write!(f, "pin of '{name}' is {capability}, needs {wanted}")
            }
            Self::EmptyName => write!(f, "device name is empty"),
        }
    }
}

impl From<PinError> for Error {
    fn from(e: PinError) -> Self {
        Self::Pin(e)
    }
}

// ---------------------------------------------------------------------------
// Wiring errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringError {
    /// The device already has an upstream input.
    AlreadyConnected { device: String, upstream: String },
    /// The device would be wired to itself.
    CircularMapping(String),
    /// The device was run without an upstream input.
    NotConnected(String),
    /// A pending connection names a device that does not exist.
    TargetNotFound { device: String, target: String },
}

impl fmt::Display for WiringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyConnected { device, upstream } => {
                write!(f, "'{device}' is already connected to '{upstream}'")
            }
            Self::CircularMapping(device) => write!(f, "circular mapping blocked for '{device}'"),
            Self::NotConnected(device) => write!(f, "'{device}' can't run without an input"),
            Self::TargetNotFound { device, target } => {
                write!(f, "'{device}' connects to unknown device '{target}'")
            }
        }
    }
}

impl From<WiringError> for Error {
    fn from(e: WiringError) -> Self {
        Self::Wiring(e)
    }
}

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Switch-on refused while the device is defective.
    Defective(String),
    /// Repair refused while the device is on.
    CannotRepairWhileOn(String),
    /// A device with the same key is already registered.
    NameInUse(String),
    /// The recipe names a device type that does not exist.
    UnknownType(String),
    /// No device with this key is registered.
    NotFound(String),
    /// The device has no actuator (input-only device).
    NotAnOutput(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defective(name) => {
                write!(f, "'{name}' is defective, repair before switching on")
            }
            Self::CannotRepairWhileOn(name) => write!(f, "'{name}' can only be repaired when off"),
            Self::NameInUse(name) => write!(f, "name '{name}' already in use"),
            Self::UnknownType(kind) => write!(f, "unknown device type '{kind}'"),
            Self::NotFound(name) => write!(f, "no device '{name}'"),
            Self::NotAnOutput(name) => write!(f, "'{name}' is an input-only device"),
        }
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// Failure reported by the chip driver for one board pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareError {
    pub board: String,
    pub pin: u8,
    pub reason: String,
}

impl HardwareError {
    pub fn new(board: &str, pin: u8, reason: impl Into<String>) -> Self {
        Self {
            board: board.to_owned(),
            pin,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "board '{}' pin {}: {}", self.board, self.pin, self.reason)
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
