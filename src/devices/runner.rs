//! Wiring of one output device to its upstream input.
//!
//! [`Runner`] wraps an [`Actuator`] and makes it [`Runnable`]: it holds at
//! most one upstream connection, polls it once per tick under its own
//! visitor key and only actuates when the upstream changed (or on its
//! very first run). A runner is itself an [`Inputer`] on its on/off state,
//! so outputs can be chained.

use log::{debug, info, warn};

use super::{Actuator, Inputer, Runnable, SharedInput};
use crate::app::ports::RailHardware;
use crate::error::{Error, Result, WiringError};
use crate::naming::DeviceKey;

struct Connection {
    upstream: SharedInput,
    upstream_key: DeviceKey,
    inverted: bool,
}

pub struct Runner<A: Actuator> {
    actuator: A,
    input: Option<Connection>,
    first_run: bool,
}

impl<A: Actuator> Runner<A> {
    pub fn new(actuator: A) -> Self {
        Self {
            actuator,
            input: None,
            first_run: true,
        }
    }

    pub fn inner(&self) -> &A {
        &self.actuator
    }

}

impl<A: Actuator> Inputer for Runner<A> {
    fn name(&self) -> &str {
        self.actuator.common().name()
    }

    fn key(&self) -> &DeviceKey {
        self.actuator.common().key()
    }

    fn state_changed(&mut self, visitor: &DeviceKey, _hw: &mut dyn RailHardware) -> Result<bool> {
        Ok(self.actuator.common_mut().observe(visitor))
    }

    fn is_on(&self) -> bool {
        self.actuator.common().is_on()
    }

    fn forget_visitor(&mut self, visitor: &DeviceKey) {
        self.actuator.common_mut().forget_visitor(visitor);
    }
}

impl<A: Actuator> Runnable for Runner<A> {
    fn connect(&mut self, upstream: SharedInput, inverted: bool) -> Result<()> {
        if let Some(conn) = &self.input {
            return Err(WiringError::AlreadyConnected {
                device: self.name().to_owned(),
                upstream: conn.upstream_key.to_string(),
            }
            .into());
        }
        // A failed borrow means `upstream` is this very device.
        let upstream_key = match upstream.try_borrow() {
            Ok(up) => up.key().clone(),
            Err(_) => return Err(WiringError::CircularMapping(self.name().to_owned()).into()),
        };
        if &upstream_key == self.key() {
            return Err(WiringError::CircularMapping(self.name().to_owned()).into());
        }
        info!(
            "Connected '{}' to '{}'{}",
            self.key(),
            upstream_key,
            if inverted { " (inverted)" } else { "" }
        );
        self.input = Some(Connection {
            upstream,
            upstream_key,
            inverted,
        });
        Ok(())
    }

    fn run(&mut self, hw: &mut dyn RailHardware) -> Result<()> {
        let Some(conn) = &self.input else {
            return Err(WiringError::NotConnected(self.name().to_owned()).into());
        };
        let inverted = conn.inverted;
        let (changed, upstream_on) = {
            let mut up = conn
                .upstream
                .try_borrow_mut()
                .map_err(|_| WiringError::CircularMapping(self.name().to_owned()))?;
            let changed = up.state_changed(self.actuator.common().key(), hw)?;
            (changed, up.is_on())
        };
        if !changed && !self.first_run {
            return Ok(());
        }
        self.first_run = false;
        debug!(
            "'{}' input changed, upstream on={} inverted={}",
            self.key(),
            upstream_on,
            inverted
        );
        let result = if upstream_on != inverted {
            self.actuator.switch_on(hw)
        } else {
            self.actuator.switch_off(hw)
        };
        // A failed write is retried next tick even if the input holds still.
        if let Err(Error::Hardware(e)) = &result {
            warn!("'{}' actuation failed, retrying next tick: {}", self.key(), e);
            self.first_run = true;
        }
        result
    }

    fn release_input(&mut self) {
        if let Some(conn) = self.input.take() {
            if let Ok(mut up) = conn.upstream.try_borrow_mut() {
                up.forget_visitor(self.actuator.common().key());
            }
            self.first_run = true;
            info!("Released input '{}' of '{}'", conn.upstream_key, self.key());
        }
    }

    fn upstream_key(&self) -> Option<&DeviceKey> {
        self.input.as_ref().map(|c| &c.upstream_key)
    }

    fn actuator(&self) -> &dyn Actuator {
        &self.actuator
    }

    fn actuator_mut(&mut self) -> &mut dyn Actuator {
        &mut self.actuator
    }
}
