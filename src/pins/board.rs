//! Board pin tables.
//!
//! A board declares its pins once at construction; the table is immutable
//! afterwards. Board type `Typ2` carries one PCA9501 chip:
//!
//! | Board pin | Chip pin | Capability | Notes                         |
//! |-----------|----------|------------|-------------------------------|
//! | 0–3       | GPIO 0–3 | Binary     | amplified (IRLZ34N), ~2 A     |
//! | 4–7       | GPIO 4–7 | Binary     | max. 20 mA                    |
//! | 8–15      | EE 0–7   | Memory     | EEPROM cells                  |

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use crate::error::Error;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Broad class of a pin, independent of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinKind {
    Binary,
    Analog,
    Memory,
}

/// What a pin can do. The `R`/`W` suffix restricts direction; `N` marks
/// a binary line whose electrical level is the negation of its logic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinCapability {
    Binary,
    BinaryR,
    BinaryW,
    NBinary,
    NBinaryR,
    NBinaryW,
    Analog,
    AnalogR,
    AnalogW,
    Memory,
    MemoryR,
    MemoryW,
}

impl PinCapability {
    pub const fn kind(self) -> PinKind {
        match self {
            Self::Binary
            | Self::BinaryR
            | Self::BinaryW
            | Self::NBinary
            | Self::NBinaryR
            | Self::NBinaryW => PinKind::Binary,
            Self::Analog | Self::AnalogR | Self::AnalogW => PinKind::Analog,
            Self::Memory | Self::MemoryR | Self::MemoryW => PinKind::Memory,
        }
    }

    pub const fn readable(self) -> bool {
        !matches!(
            self,
            Self::BinaryW | Self::NBinaryW | Self::AnalogW | Self::MemoryW
        )
    }

    pub const fn writable(self) -> bool {
        !matches!(
            self,
            Self::BinaryR | Self::NBinaryR | Self::AnalogR | Self::MemoryR
        )
    }

    pub const fn inverted(self) -> bool {
        matches!(self, Self::NBinary | Self::NBinaryR | Self::NBinaryW)
    }

    /// Whether a pin declared as `self` can serve a request for `wanted`.
    ///
    /// Kinds must match and every direction `wanted` asks for must be
    /// available. Negation is transparent to the requester.
    pub fn serves(self, wanted: Self) -> bool {
        self.kind() == wanted.kind()
            && (!wanted.readable() || self.readable())
            && (!wanted.writable() || self.writable())
    }
}

impl fmt::Display for PinCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Binary => "binary",
            Self::BinaryR => "binary-r",
            Self::BinaryW => "binary-w",
            Self::NBinary => "negated binary",
            Self::NBinaryR => "negated binary-r",
            Self::NBinaryW => "negated binary-w",
            Self::Analog => "analog",
            Self::AnalogR => "analog-r",
            Self::AnalogW => "analog-w",
            Self::Memory => "memory",
            Self::MemoryR => "memory-r",
            Self::MemoryW => "memory-w",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Pin / Board
// ---------------------------------------------------------------------------

/// One declared pin of a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub chip_id: String,
    pub chip_pin: u8,
    pub capability: PinCapability,
}

impl Pin {
    pub fn new(chip_id: &str, chip_pin: u8, capability: PinCapability) -> Self {
        Self {
            chip_id: chip_id.to_owned(),
            chip_pin,
            capability,
        }
    }
}

/// Supported board layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardType {
    /// Single PCA9501: 8 GPIO plus EEPROM.
    Typ2,
}

const TYP2_CHIP_ID: &str = "PCA9501.GPIO.Mem";
const TYP2_GPIO_COUNT: u8 = 8;
const TYP2_EEPROM_CELLS: u8 = 8;

impl BoardType {
    /// Default pin table for this board type.
    pub fn pins(self) -> BTreeMap<u8, Pin> {
        match self {
            Self::Typ2 => {
                let gpio = (0..TYP2_GPIO_COUNT)
                    .map(|nr| (nr, Pin::new(TYP2_CHIP_ID, nr, PinCapability::Binary)));
                let eeprom = (0..TYP2_EEPROM_CELLS).map(|cell| {
                    (
                        TYP2_GPIO_COUNT + cell,
                        Pin::new(TYP2_CHIP_ID, cell, PinCapability::Memory),
                    )
                });
                gpio.chain(eeprom).collect()
            }
        }
    }
}

impl FromStr for BoardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Typ2" => Ok(Self::Typ2),
            other => Err(Error::Plan(format!("unknown board type '{other}'"))),
        }
    }
}

/// A named collection of declared pins behind one chip address.
#[derive(Debug, Clone)]
pub struct Board {
    id: String,
    chip_address: u8,
    pins: BTreeMap<u8, Pin>,
}

impl Board {
    pub fn new(id: &str, chip_address: u8, pins: BTreeMap<u8, Pin>) -> Self {
        Self {
            id: id.to_owned(),
            chip_address,
            pins,
        }
    }

    pub fn from_type(id: &str, chip_address: u8, board_type: BoardType) -> Self {
        Self::new(id, chip_address, board_type.pins())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chip_address(&self) -> u8 {
        self.chip_address
    }

    pub fn pin(&self, nr: u8) -> Option<&Pin> {
        self.pins.get(&nr)
    }

    pub fn pins(&self) -> impl Iterator<Item = (u8, &Pin)> {
        self.pins.iter().map(|(nr, pin)| (*nr, pin))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "board '{}' @0x{:02x}, {} pins",
            self.id,
            self.chip_address,
            self.pins.len()
        )
    }
}
