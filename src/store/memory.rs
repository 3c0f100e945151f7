// CLASSIFICATION: COMMUNITY
// Filename: memory.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! In-memory variable store.
//!
//! Records every primitive call so callers can assert which operations
//! reached the store, and supports injected failures per variable.

use std::cell::RefCell;
use std::collections::BTreeMap;

use log::debug;

use super::{StoreError, VariableAttributes, VariableName, VariableStore};
use crate::namespace::NamespaceId;

/// A primitive call observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Exists(NamespaceId, String),
    Set(NamespaceId, String),
    Delete(NamespaceId, String),
}

/// Value and attributes held for one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVariable {
    pub data: Vec<u8>,
    pub attributes: VariableAttributes,
}

type Key = (NamespaceId, Vec<u16>);

/// Map-backed [`VariableStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    vars: BTreeMap<Key, StoredVariable>,
    faults: BTreeMap<Key, StoreError>,
    ops: RefCell<Vec<StoreOp>>,
    capacity: Option<usize>,
}

fn key(namespace: &NamespaceId, name: &str) -> Option<Key> {
    VariableName::from_ascii(name)
        .ok()
        .map(|n| (*namespace, n.as_ucs2().to_vec()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total payload bytes the store will hold.
    pub fn with_capacity_limit(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    /// Seed a variable without recording an operation.
    pub fn insert(&mut self, namespace: NamespaceId, name: &str, data: &[u8]) {
        if let Some(k) = key(&namespace, name) {
            self.vars.insert(
                k,
                StoredVariable {
                    data: data.to_vec(),
                    attributes: super::NVRAM_ATTRIBUTES,
                },
            );
        }
    }

    /// Make every set or delete of `(namespace, name)` fail with `error`.
    pub fn fail_on(&mut self, namespace: NamespaceId, name: &str, error: StoreError) {
        if let Some(k) = key(&namespace, name) {
            self.faults.insert(k, error);
        }
    }

    pub fn get(&self, namespace: &NamespaceId, name: &str) -> Option<&StoredVariable> {
        key(namespace, name).and_then(|k| self.vars.get(&k))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Operations recorded so far, oldest first.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    fn record(&self, op: StoreOp) {
        debug!("[nvram] store op {op:?}");
        self.ops.borrow_mut().push(op);
    }

    fn used_bytes(&self) -> usize {
        self.vars.values().map(|v| v.data.len()).sum()
    }
}

impl VariableStore for MemoryStore {
    fn exists(&self, namespace: &NamespaceId, name: &VariableName) -> bool {
        self.record(StoreOp::Exists(*namespace, name.to_string()));
        self.vars
            .contains_key(&(*namespace, name.as_ucs2().to_vec()))
    }

    fn set(
        &mut self,
        namespace: &NamespaceId,
        name: &VariableName,
        data: &[u8],
        attributes: VariableAttributes,
    ) -> Result<(), StoreError> {
        self.record(StoreOp::Set(*namespace, name.to_string()));
        let k = (*namespace, name.as_ucs2().to_vec());
        if let Some(err) = self.faults.get(&k) {
            return Err(*err);
        }
        if data.is_empty() {
            return self.vars.remove(&k).map(|_| ()).ok_or(StoreError::NotFound);
        }
        if attributes.is_empty() {
            return Err(StoreError::InvalidParameter);
        }
        if let Some(limit) = self.capacity {
            let replaced = self.vars.get(&k).map_or(0, |v| v.data.len());
            if self.used_bytes() - replaced + data.len() > limit {
                return Err(StoreError::OutOfResources);
            }
        }
        self.vars.insert(
            k,
            StoredVariable {
                data: data.to_vec(),
                attributes,
            },
        );
        Ok(())
    }

    fn delete(&mut self, namespace: &NamespaceId, name: &VariableName) -> Result<(), StoreError> {
        self.record(StoreOp::Delete(*namespace, name.to_string()));
        let k = (*namespace, name.as_ucs2().to_vec());
        if let Some(err) = self.faults.get(&k) {
            return Err(*err);
        }
        self.vars.remove(&k).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
