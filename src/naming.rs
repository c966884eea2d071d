//! Device key canonicalization.
//!
//! Human-readable device names ("Lamp 1", "signal  north") are reduced to
//! one key form that both the pin allocator and the device directory use
//! as their map key: lower-cased, whitespace runs collapsed to a single
//! `_`, leading and trailing whitespace dropped.

use core::fmt;

use crate::error::{PinError, Result};

/// Canonical key of a device or of one of its pins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey(String);

impl DeviceKey {
    /// Canonicalize `name`. Fails when nothing but whitespace is left.
    pub fn new(name: &str) -> Result<Self> {
        let key = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_");
        if key.is_empty() {
            return Err(PinError::EmptyName.into());
        }
        Ok(Self(key))
    }

    /// Key for an auxiliary pin of a device, e.g. the stop light of a signal.
    pub fn with_suffix(&self, suffix: &str) -> Result<Self> {
        Self::new(&format!("{} {suffix}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeviceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
