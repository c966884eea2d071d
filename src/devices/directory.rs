//! Device directory: builds devices from recipes, indexes them by key and
//! runs them once per tick.
//!
//! Devices are kept in registration order, and a tick visits them in that
//! order: input-only devices are sampled, runnable devices are run. An
//! upstream registered before its downstream therefore propagates within
//! the same tick, otherwise one tick later.
//!
//! Removing a device detaches every runnable it fed. A detached device
//! keeps its last output, is skipped by [`DeviceDirectory::run`] and is
//! wired again by [`DeviceDirectory::connect_now`] once a device with the
//! removed key is registered.

use core::str::FromStr;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use log::{debug, info, warn};

use super::{
    Actuator, Button, Lamp, OutputState, Runnable, Runner, SharedInput, SharedRunnable, Timing,
    ToggleButton, Turnout, TwoLightSignal,
};
use crate::app::ports::RailHardware;
use crate::error::{DeviceError, Error, Result, WiringError};
use crate::naming::DeviceKey;
use crate::pins::PinAllocator;
use crate::plan::DeviceRecipe;

// ── Device kinds ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Button,
    ToggleButton,
    Lamp,
    Turnout,
    TwoLightSignal,
}

impl DeviceKind {
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Lamp | Self::Turnout | Self::TwoLightSignal)
    }

    /// Pin-mapping suffix of the second pin, if the device has one.
    const fn secondary_suffix(self) -> Option<&'static str> {
        match self {
            Self::Turnout => Some("main"),
            Self::TwoLightSignal => Some("stop"),
            _ => None,
        }
    }
}

impl FromStr for DeviceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Button" => Ok(Self::Button),
            "ToggleButton" => Ok(Self::ToggleButton),
            "Lamp" => Ok(Self::Lamp),
            "Turnout" => Ok(Self::Turnout),
            "TwoLightsSignal" | "TwoLightSignal" => Ok(Self::TwoLightSignal),
            other => Err(DeviceError::UnknownType(other.to_owned()).into()),
        }
    }
}

// ── Registry entries ──────────────────────────────────────────

enum Handle {
    Input(SharedInput),
    Runnable {
        runnable: SharedRunnable,
        input: SharedInput,
    },
}

impl Handle {
    fn runnable<R: Runnable + 'static>(device: R) -> Self {
        let shared = Rc::new(RefCell::new(device));
        Self::Runnable {
            runnable: shared.clone(),
            input: shared,
        }
    }

    fn as_input(&self) -> SharedInput {
        match self {
            Self::Input(input) | Self::Runnable { input, .. } => input.clone(),
        }
    }
}

struct Entry {
    key: DeviceKey,
    kind: DeviceKind,
    handle: Handle,
    pins: Vec<DeviceKey>,
}

struct PendingConnection {
    target: DeviceKey,
    inverted: bool,
}

// ── Directory ─────────────────────────────────────────────────

#[derive(Default)]
pub struct DeviceDirectory {
    entries: Vec<Entry>,
    pending: BTreeMap<DeviceKey, PendingConnection>,
    detached: BTreeSet<DeviceKey>,
    max_delay_ms: Option<u32>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit recipe delays to `max_ms`.
    pub fn with_max_delay(mut self, max_ms: u32) -> Self {
        self.max_delay_ms = Some(max_ms);
        self
    }

    fn position(&self, key: &DeviceKey) -> Option<usize> {
        self.entries.iter().position(|e| &e.key == key)
    }

    /// Device and pin-mapping keys share one namespace.
    fn key_in_use(&self, alloc: &PinAllocator, key: &DeviceKey) -> bool {
        alloc.resolve(key).is_ok() || self.entries.iter().any(|e| e.pins.contains(key))
    }

    /// Build the device described by `recipe`, reserving its pins, and
    /// remember its `connect_to` reference for [`connect_now`](Self::connect_now).
    pub fn add_device(&mut self, alloc: &mut PinAllocator, recipe: &DeviceRecipe) -> Result<DeviceKey> {
        let key = DeviceKey::new(&recipe.name)?;
        let kind: DeviceKind = recipe.device_type.parse()?;
        let mut pins = vec![key.clone()];
        if let Some(suffix) = kind.secondary_suffix() {
            pins.push(key.with_suffix(suffix)?);
        }
        if pins.iter().any(|pin| self.key_in_use(alloc, pin)) {
            return Err(DeviceError::NameInUse(recipe.name.clone()).into());
        }
        let target = recipe
            .connect_to
            .as_deref()
            .map(DeviceKey::new)
            .transpose()?;

        let mut timing = Timing::new(recipe.start_delay_ms, recipe.stop_delay_ms);
        if let Some(max) = self.max_delay_ms {
            timing = timing.clamped(max);
        }
        let board = recipe.board_id.as_str();
        let name = recipe.name.as_str();
        let (primary, secondary) = (recipe.primary_pin, recipe.secondary_pin);

        let handle = match kind {
            DeviceKind::Button => Handle::Input(Rc::new(RefCell::new(Button::new(
                alloc, name, board, primary,
            )?))),
            DeviceKind::ToggleButton => Handle::Input(Rc::new(RefCell::new(
                ToggleButton::new(alloc, name, board, primary)?,
            ))),
            DeviceKind::Lamp => {
                Handle::runnable(Runner::new(Lamp::new(alloc, name, board, primary, timing)?))
            }
            DeviceKind::Turnout => Handle::runnable(Runner::new(Turnout::new(
                alloc, name, board, primary, secondary, timing,
            )?)),
            DeviceKind::TwoLightSignal => Handle::runnable(Runner::new(TwoLightSignal::new(
                alloc, name, board, primary, secondary, timing,
            )?)),
        };

        match target {
            Some(target) if kind.is_runnable() => {
                self.pending.insert(
                    key.clone(),
                    PendingConnection {
                        target,
                        inverted: recipe.inverted,
                    },
                );
            }
            Some(target) => {
                warn!("Input device '{}' can't connect to '{}', ignored", key, target);
            }
            None => {}
        }

        info!("Device added: {:?} '{}' on board '{}'", kind, key, board);
        self.entries.push(Entry {
            key: key.clone(),
            kind,
            handle,
            pins,
        });
        Ok(key)
    }

    /// Resolve every pending connection. Devices already wired to their
    /// target are skipped, so this may be called again after adding devices.
    /// Detached devices whose target is still missing are left alone.
    pub fn connect_now(&mut self) -> Result<()> {
        for entry in &self.entries {
            let Handle::Runnable { runnable, .. } = &entry.handle else {
                continue;
            };
            let Some(pending) = self.pending.get(&entry.key) else {
                continue;
            };
            let mut device = runnable
                .try_borrow_mut()
                .map_err(|_| WiringError::CircularMapping(entry.key.to_string()))?;
            if device.upstream_key() == Some(&pending.target) {
                continue;
            }
            let upstream = self
                .entries
                .iter()
                .find(|e| e.key == pending.target)
                .map(|e| e.handle.as_input());
            let Some(upstream) = upstream else {
                if self.detached.contains(&entry.key) {
                    continue;
                }
                return Err(WiringError::TargetNotFound {
                    device: entry.key.to_string(),
                    target: pending.target.to_string(),
                }
                .into());
            };
            device.connect(upstream, pending.inverted)?;
            self.detached.remove(&entry.key);
        }
        Ok(())
    }

    /// One tick: sample inputs and run runnables in registration order,
    /// stopping at the first error.
    pub fn run(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        for entry in &self.entries {
            let busy = || WiringError::CircularMapping(entry.key.to_string());
            match &entry.handle {
                Handle::Input(input) => input.try_borrow_mut().map_err(|_| busy())?.sample(hw)?,
                Handle::Runnable { .. } if self.detached.contains(&entry.key) => {
                    debug!("'{}' is detached, skipped", entry.key);
                }
                Handle::Runnable { runnable, .. } => {
                    runnable.try_borrow_mut().map_err(|_| busy())?.run(hw)?;
                }
            }
        }
        Ok(())
    }

    /// Remove a device: its own input and every connection it feeds are
    /// released (evicting visitor keys), then its pins are freed. The
    /// downstream devices stay registered but detached.
    ///
    /// Nothing is changed unless every step can succeed.
    pub fn remove_device(&mut self, alloc: &mut PinAllocator, name: &str) -> Result<()> {
        let key = DeviceKey::new(name)?;
        let idx = self
            .position(&key)
            .ok_or_else(|| DeviceError::NotFound(name.to_owned()))?;
        for pin in &self.entries[idx].pins {
            alloc.resolve(pin)?;
        }

        let mut downstream = Vec::new();
        for other in &self.entries {
            if let Handle::Runnable { runnable, .. } = &other.handle {
                let device = runnable
                    .try_borrow()
                    .map_err(|_| WiringError::CircularMapping(other.key.to_string()))?;
                if other.key != key && device.upstream_key() == Some(&key) {
                    downstream.push((other.key.clone(), runnable.clone()));
                }
            }
        }

        for (other, runnable) in downstream {
            if let Ok(mut device) = runnable.try_borrow_mut() {
                device.release_input();
            }
            warn!("'{}' detached, its input '{}' was removed", other, key);
            self.detached.insert(other);
        }
        let entry = self.entries.remove(idx);
        if let Handle::Runnable { runnable, .. } = &entry.handle {
            if let Ok(mut device) = runnable.try_borrow_mut() {
                device.release_input();
            }
        }
        for pin in &entry.pins {
            alloc.release_pin(pin)?;
        }
        self.pending.remove(&key);
        self.detached.remove(&key);
        info!("Device removed: '{}'", key);
        Ok(())
    }

    /// Whether `name` lost its input to a removal and waits for it to return.
    pub fn is_detached(&self, name: &str) -> bool {
        DeviceKey::new(name).is_ok_and(|key| self.detached.contains(&key))
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn contains(&self, name: &str) -> bool {
        DeviceKey::new(name).is_ok_and(|key| self.position(&key).is_some())
    }

    pub fn kind(&self, name: &str) -> Option<DeviceKind> {
        let key = DeviceKey::new(name).ok()?;
        self.position(&key).map(|idx| self.entries[idx].kind)
    }

    pub fn input(&self, name: &str) -> Option<SharedInput> {
        let key = DeviceKey::new(name).ok()?;
        self.position(&key).map(|idx| self.entries[idx].handle.as_input())
    }

    pub fn runnable(&self, name: &str) -> Option<SharedRunnable> {
        let key = DeviceKey::new(name).ok()?;
        match &self.entries[self.position(&key)?].handle {
            Handle::Runnable { runnable, .. } => Some(runnable.clone()),
            Handle::Input(_) => None,
        }
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &DeviceKey> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Current state of every output device, in registration order.
    pub fn output_states(&self) -> Vec<(DeviceKey, OutputState)> {
        self.entries
            .iter()
            .filter_map(|e| match &e.handle {
                Handle::Runnable { runnable, .. } => runnable
                    .try_borrow()
                    .ok()
                    .map(|device| (e.key.clone(), device.actuator().state())),
                Handle::Input(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
