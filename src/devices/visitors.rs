//! Per-consumer change cache.

use std::collections::HashMap;

use crate::naming::DeviceKey;

/// Last value each downstream consumer observed on one input.
#[derive(Debug, Default, Clone)]
pub struct VisitorCache {
    seen: HashMap<DeviceKey, bool>,
}

impl VisitorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `visitor`; true when it differs from the last
    /// observation or this is the visitor's first.
    pub fn observe(&mut self, visitor: &DeviceKey, value: bool) -> bool {
        self.seen.insert(visitor.clone(), value) != Some(value)
    }

    pub fn forget(&mut self, visitor: &DeviceKey) {
        self.seen.remove(visitor);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
