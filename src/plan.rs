//! Rail plan: declarative board and device recipes.
//!
//! A plan is a JSON document with two lists:
//!
//! ```json
//! {
//!   "boards":  [{ "name": "B1", "type": "Typ2", "chipAddress": 4 }],
//!   "devices": [{ "name": "Btn", "type": "Button", "boardId": "B1", "primaryPin": 4 },
//!               { "name": "L1", "type": "Lamp", "boardId": "B1", "primaryPin": 0,
//!                 "startDelayMs": 50, "connectTo": "Btn" }]
//! }
//! ```
//!
//! A missing pin means "any free pin". Delays are in milliseconds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecipe {
    pub name: String,
    #[serde(rename = "type")]
    pub board_type: String,
    #[serde(default)]
    pub chip_address: u8,
}

impl BoardRecipe {
    pub fn new(name: &str, board_type: &str, chip_address: u8) -> Self {
        Self {
            name: name.to_owned(),
            board_type: board_type.to_owned(),
            chip_address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecipe {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub board_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_pin: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_pin: Option<u8>,
    #[serde(default)]
    pub start_delay_ms: u32,
    #[serde(default)]
    pub stop_delay_ms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_to: Option<String>,
    #[serde(default)]
    pub inverted: bool,
}

impl DeviceRecipe {
    pub fn new(name: &str, device_type: &str, board_id: &str) -> Self {
        Self {
            name: name.to_owned(),
            device_type: device_type.to_owned(),
            board_id: board_id.to_owned(),
            primary_pin: None,
            secondary_pin: None,
            start_delay_ms: 0,
            stop_delay_ms: 0,
            connect_to: None,
            inverted: false,
        }
    }

    pub fn on_pin(mut self, pin: u8) -> Self {
        self.primary_pin = Some(pin);
        self
    }

    pub fn secondary_pin(mut self, pin: u8) -> Self {
        self.secondary_pin = Some(pin);
        self
    }

    pub fn delays(mut self, start_ms: u32, stop_ms: u32) -> Self {
        self.start_delay_ms = start_ms;
        self.stop_delay_ms = stop_ms;
        self
    }

    pub fn connect_to(mut self, target: &str) -> Self {
        self.connect_to = Some(target.to_owned());
        self
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailPlan {
    #[serde(default)]
    pub boards: Vec<BoardRecipe>,
    #[serde(default)]
    pub devices: Vec<DeviceRecipe>,
}

impl RailPlan {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Plan(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Plan(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Plan(e.to_string()))
    }
}
