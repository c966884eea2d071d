//! Railcreator library.
//!
//! Pin allocation and device orchestration for model-railroad layouts:
//! boards declare pins, devices reserve them by name, and the device graph
//! is evaluated once per tick against an injected chip driver.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod devices;
pub mod error;
pub mod naming;
pub mod pins;
pub mod plan;

pub use error::{Error, Result};
