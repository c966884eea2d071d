//! Name ↔ pin bookkeeping.
//!
//! Two invariants are held here and nowhere else:
//!
//! - a (board, pin) pair has at most one owner;
//! - a device key owns at most one (board, pin) pair.
//!
//! Both indexes are updated together by `map_pin`, `map_pin_next_free` and
//! `release_pin`. Nothing in this module talks to hardware.

use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use super::board::{Board, PinCapability};
use crate::error::{PinError, Result};
use crate::naming::DeviceKey;

/// Resolved mapping of a device key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPin {
    pub board: String,
    pub pin: u8,
    pub capability: PinCapability,
}

#[derive(Debug, Default)]
pub struct PinAllocator {
    boards: BTreeMap<String, Board>,
    by_name: BTreeMap<DeviceKey, (String, u8)>,
    by_pin: BTreeMap<(String, u8), DeviceKey>,
}

impl PinAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Boards ────────────────────────────────────────────────

    /// Register a board and its pin table.
    pub fn add_board(&mut self, board: Board) -> Result<()> {
        if self.boards.contains_key(board.id()) {
            return Err(PinError::BoardExists(board.id().to_owned()).into());
        }
        info!("Board added: {}", board);
        self.boards.insert(board.id().to_owned(), board);
        Ok(())
    }

    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.get(id)
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.values()
    }

    fn require_board(&self, id: &str) -> Result<&Board> {
        self.boards
            .get(id)
            .ok_or_else(|| PinError::UnknownBoard(id.to_owned()).into())
    }

    // ── Mapping ───────────────────────────────────────────────

    /// Give `pin` of `board` to `name`.
    ///
    /// Mapping a name again to the pin it already owns is a no-op.
    pub fn map_pin(&mut self, board: &str, pin: u8, name: &DeviceKey) -> Result<()> {
        if self.require_board(board)?.pin(pin).is_none() {
            return Err(PinError::UnknownPin {
                board: board.to_owned(),
                pin,
            }
            .into());
        }
        if let Some((owned_board, owned_pin)) = self.by_name.get(name) {
            if owned_board == board && *owned_pin == pin {
                return Ok(());
            }
            return Err(PinError::NameAlreadyMapped {
                name: name.to_string(),
                board: owned_board.clone(),
                pin: *owned_pin,
            }
            .into());
        }
        if let Some(owner) = self.by_pin.get(&(board.to_owned(), pin)) {
            return Err(PinError::PinAlreadyMapped {
                board: board.to_owned(),
                pin,
                owner: owner.to_string(),
            }
            .into());
        }
        self.insert(board, pin, name);
        Ok(())
    }

    /// Give any free pin of `board` able to serve `capability` to `name`.
    /// Returns the chosen pin number.
    pub fn map_pin_next_free(
        &mut self,
        board: &str,
        capability: PinCapability,
        name: &DeviceKey,
    ) -> Result<u8> {
        if let Some((owned_board, owned_pin)) = self.by_name.get(name) {
            return Err(PinError::NameAlreadyMapped {
                name: name.to_string(),
                board: owned_board.clone(),
                pin: *owned_pin,
            }
            .into());
        }
        let pin = self
            .free_pins(board, capability)?
            .into_iter()
            .next()
            .ok_or_else(|| PinError::NoFreePin {
                board: board.to_owned(),
                capability,
            })?;
        self.insert(board, pin, name);
        Ok(pin)
    }

    fn insert(&mut self, board: &str, pin: u8, name: &DeviceKey) {
        debug!("Mapped '{}' to pin {} of board '{}'", name, pin, board);
        self.by_name
            .insert(name.clone(), (board.to_owned(), pin));
        self.by_pin.insert((board.to_owned(), pin), name.clone());
    }

    /// Drop the mapping of `name`, making its pin available again.
    pub fn release_pin(&mut self, name: &DeviceKey) -> Result<MappedPin> {
        let mapped = self.resolve(name)?;
        self.by_name.remove(name);
        self.by_pin.remove(&(mapped.board.clone(), mapped.pin));
        debug!("Released '{}' from pin {} of board '{}'", name, mapped.pin, mapped.board);
        Ok(mapped)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Board, pin and declared capability owned by `name`.
    pub fn resolve(&self, name: &DeviceKey) -> Result<MappedPin> {
        let (board, pin) = self
            .by_name
            .get(name)
            .ok_or_else(|| PinError::NotMapped(name.to_string()))?;
        let capability = self
            .require_board(board)?
            .pin(*pin)
            .map(|p| p.capability)
            .ok_or_else(|| PinError::UnknownPin {
                board: board.clone(),
                pin: *pin,
            })?;
        Ok(MappedPin {
            board: board.clone(),
            pin: *pin,
            capability,
        })
    }

    pub fn find_owner(&self, board: &str, pin: u8) -> Option<&DeviceKey> {
        self.by_pin.get(&(board.to_owned(), pin))
    }

    /// Unowned pins of `board` that can serve `capability`.
    pub fn free_pins(&self, board: &str, capability: PinCapability) -> Result<BTreeSet<u8>> {
        let declared = self.require_board(board)?;
        Ok(declared
            .pins()
            .filter(|(_, pin)| pin.capability.serves(capability))
            .map(|(nr, _)| nr)
            .filter(|nr| !self.by_pin.contains_key(&(board.to_owned(), *nr)))
            .collect())
    }

    /// Owned pins of `board`.
    pub fn used_pins(&self, board: &str) -> Result<BTreeSet<u8>> {
        self.require_board(board)?;
        Ok(self
            .by_pin
            .keys()
            .filter(|(b, _)| b == board)
            .map(|(_, nr)| *nr)
            .collect())
    }

    pub fn mapping_count(&self) -> usize {
        self.by_name.len()
    }
}

/// Diagnostic dump: boards first, then every mapping sorted by key.
impl fmt::Display for PinAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------ Boards ------")?;
        for board in self.boards.values() {
            writeln!(f, "{board}")?;
        }
        writeln!(f, "------ Mappings ------")?;
        for (name, (board, pin)) in &self.by_name {
            writeln!(f, "{name} -> {board}:{pin}")?;
        }
        Ok(())
    }
}
