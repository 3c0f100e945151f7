// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · NVRAM store interface
// Author: Lukas Bower
// Date Modified: 2026-10-18
//
// ─────────────────────────────────────────────────────────────
// Persistent variable store boundary
//
// The platform store is external. This module only describes
// the primitives the gateway consumes and the encoding it
// expects for variable names.
//
// ## Sub-modules
// * `memory` – in-memory store used for host runs and tests.
// ─────────────────────────────────────────────────────────────

use bitflags::bitflags;
use thiserror::Error;

use crate::error::NvramError;
use crate::namespace::NamespaceId;

pub mod memory;
pub use memory::{MemoryStore, StoreOp, StoredVariable};

bitflags! {
    /// Attribute bits attached to a stored variable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VariableAttributes: u32 {
        const NON_VOLATILE = 0x0000_0001;
        const BOOTSERVICE_ACCESS = 0x0000_0002;
        const RUNTIME_ACCESS = 0x0000_0004;
    }
}

/// Attribute set used for every variable the gateway writes.
pub const NVRAM_ATTRIBUTES: VariableAttributes = VariableAttributes::NON_VOLATILE
    .union(VariableAttributes::BOOTSERVICE_ACCESS)
    .union(VariableAttributes::RUNTIME_ACCESS);

/// Failures reported by store primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("write protected")]
    WriteProtected,
    #[error("out of resources")]
    OutOfResources,
    #[error("security violation")]
    SecurityViolation,
    #[error("device error")]
    DeviceError,
    #[error("invalid parameter")]
    InvalidParameter,
}

/// Variable name in the store's native encoding: NUL-terminated UCS-2.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableName {
    ucs2: Vec<u16>,
    ascii: String,
}

impl VariableName {
    /// Convert a configuration name. Fails when the buffer cannot be
    /// reserved or the name holds non-ASCII bytes or an embedded NUL.
    ///
    /// Stricter than the firmware's byte widening, which only fails on
    /// allocation: a non-ASCII name is refused rather than widened into a
    /// name nobody can look up.
    pub fn from_ascii(name: &str) -> Result<Self, NvramError> {
        if !name.is_ascii() || name.contains('\0') {
            return Err(NvramError::AllocationFailure(name.escape_debug().to_string()));
        }

        let mut ucs2 = Vec::new();
        ucs2.try_reserve_exact(name.len() + 1)
            .map_err(|_| NvramError::AllocationFailure(name.to_string()))?;
        ucs2.extend(name.bytes().map(u16::from));
        ucs2.push(0);

        Ok(Self {
            ucs2,
            ascii: name.to_string(),
        })
    }

    /// UCS-2 code units including the terminating NUL.
    pub fn as_ucs2(&self) -> &[u16] {
        &self.ucs2
    }

    /// The name as it appeared in configuration.
    pub fn as_str(&self) -> &str {
        &self.ascii
    }
}

impl std::fmt::Display for VariableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.ascii)
    }
}

/// Primitives the gateway needs from the platform variable store.
pub trait VariableStore {
    /// Whether `(namespace, name)` currently holds a value.
    fn exists(&self, namespace: &NamespaceId, name: &VariableName) -> bool;

    /// Create or replace a variable. An empty `data` deletes it, and
    /// fails with [`StoreError::NotFound`] when nothing was stored.
    fn set(
        &mut self,
        namespace: &NamespaceId,
        name: &VariableName,
        data: &[u8],
        attributes: VariableAttributes,
    ) -> Result<(), StoreError>;

    /// Remove a variable. [`StoreError::NotFound`] counts as success for
    /// callers that only need the variable gone.
    fn delete(&mut self, namespace: &NamespaceId, name: &VariableName) -> Result<(), StoreError>;
}
