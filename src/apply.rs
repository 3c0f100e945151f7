// CLASSIFICATION: COMMUNITY
// Filename: apply.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18
//
// ─────────────────────────────────────────────────────────────
// NVRAM write and block appliers
//
// Writes are additive only: a variable already present in the
// store is never overwritten. Blocks are unconditional deletes
// for every namespace whose text resolves. Neither path aborts
// early; every failure is logged and processing moves on.
//
// # Public API
// * [`apply_write`] – one policy-checked, create-if-absent write.
// * [`apply_blocks`] – delete every listed variable.
// * [`apply_adds`] – unrestricted add-list application.
// * [`ApplyReport`] – tallies for diagnostics.
// ─────────────────────────────────────────────────────────────

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::config::{BlockMap, Payload, VariableMap};
use crate::legacy::LegacyOutcome;
use crate::namespace::{resolve, NamespaceId};
use crate::policy::{is_permitted, PermissionEntry};
use crate::store::{StoreError, VariableName, VariableStore, NVRAM_ATTRIBUTES};

/// Result of a single [`apply_write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    SkippedDenied,
    SkippedExists,
    FailedNameConversion,
    FailedStoreWrite,
}

/// Result of a single block-list delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete; equivalent to success.
    Absent,
    FailedNameConversion,
    FailedStoreDelete,
}

/// Counters gathered while applying configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub written: usize,
    pub denied: usize,
    pub existing: usize,
    pub failed_writes: usize,
    pub deleted: usize,
    pub failed_deletes: usize,
    pub skipped_namespaces: usize,
    pub legacy: Option<LegacyOutcome>,
}

impl ApplyReport {
    pub fn record_write(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::SkippedDenied => self.denied += 1,
            WriteOutcome::SkippedExists => self.existing += 1,
            WriteOutcome::FailedNameConversion | WriteOutcome::FailedStoreWrite => {
                self.failed_writes += 1
            }
        }
    }

    pub fn record_delete(&mut self, outcome: DeleteOutcome) {
        match outcome {
            DeleteOutcome::Deleted | DeleteOutcome::Absent => self.deleted += 1,
            DeleteOutcome::FailedNameConversion | DeleteOutcome::FailedStoreDelete => {
                self.failed_deletes += 1
            }
        }
    }

    /// Fold another report's counters into this one.
    pub fn absorb(&mut self, other: ApplyReport) {
        self.written += other.written;
        self.denied += other.denied;
        self.existing += other.existing;
        self.failed_writes += other.failed_writes;
        self.deleted += other.deleted;
        self.failed_deletes += other.failed_deletes;
        self.skipped_namespaces += other.skipped_namespaces;
        if other.legacy.is_some() {
            self.legacy = other.legacy;
        }
    }
}

/// Write `payload` to `(namespace, name)` if permitted and currently absent.
///
/// A denied write never touches the store, not even an existence query.
pub fn apply_write<S: VariableStore + ?Sized>(
    store: &mut S,
    namespace: &NamespaceId,
    name: &str,
    payload: &[u8],
    permission: Option<&PermissionEntry>,
) -> WriteOutcome {
    if !is_permitted(permission, name) {
        info!("[nvram] Setting NVRAM {namespace}:{name} is not permitted");
        return WriteOutcome::SkippedDenied;
    }

    let native = match VariableName::from_ascii(name) {
        Ok(native) => native,
        Err(e) => {
            warn!("[nvram] {e}");
            return WriteOutcome::FailedNameConversion;
        }
    };

    if store.exists(namespace, &native) {
        info!("[nvram] Setting NVRAM {namespace}:{name} - ignored, exists");
        return WriteOutcome::SkippedExists;
    }

    match store.set(namespace, &native, payload, NVRAM_ATTRIBUTES) {
        Ok(()) => {
            info!("[nvram] Setting NVRAM {namespace}:{name} - written ({} bytes)", payload.len());
            WriteOutcome::Written
        }
        Err(e) => {
            warn!("[nvram] Setting NVRAM {namespace}:{name} - {e}");
            WriteOutcome::FailedStoreWrite
        }
    }
}

/// Apply every `(name, payload)` of one resolved namespace.
pub(crate) fn apply_namespace<S: VariableStore + ?Sized>(
    store: &mut S,
    namespace: &NamespaceId,
    vars: &BTreeMap<String, Payload>,
    permission: Option<&PermissionEntry>,
    report: &mut ApplyReport,
) {
    for (name, payload) in vars {
        let outcome = apply_write(store, namespace, name, payload.as_bytes(), permission);
        debug!("[nvram] {namespace}:{name} -> {outcome:?}");
        report.record_write(outcome);
    }
}

fn delete_one<S: VariableStore + ?Sized>(
    store: &mut S,
    namespace: &NamespaceId,
    name: &str,
) -> DeleteOutcome {
    let native = match VariableName::from_ascii(name) {
        Ok(native) => native,
        Err(e) => {
            warn!("[nvram] {e}");
            return DeleteOutcome::FailedNameConversion;
        }
    };

    match store.delete(namespace, &native) {
        Ok(()) => {
            info!("[nvram] Deleting NVRAM {namespace}:{name} - deleted");
            DeleteOutcome::Deleted
        }
        Err(StoreError::NotFound) => {
            info!("[nvram] Deleting NVRAM {namespace}:{name} - not found");
            DeleteOutcome::Absent
        }
        Err(e) => {
            warn!("[nvram] Deleting NVRAM {namespace}:{name} - {e}");
            DeleteOutcome::FailedStoreDelete
        }
    }
}

/// Delete every listed variable. Namespaces whose text does not resolve are
/// skipped as a whole; no other failure stops processing.
pub fn apply_blocks<S: VariableStore + ?Sized>(store: &mut S, block: &BlockMap) -> ApplyReport {
    let mut report = ApplyReport::default();
    for (text, names) in block {
        let Ok(namespace) = resolve(text) else {
            report.skipped_namespaces += 1;
            continue;
        };
        for name in names {
            report.record_delete(delete_one(store, &namespace, name));
        }
    }
    report
}

/// Apply the configuration add-list with no declared policy.
pub fn apply_adds<S: VariableStore + ?Sized>(store: &mut S, add: &VariableMap) -> ApplyReport {
    let mut report = ApplyReport::default();
    for (text, vars) in add {
        let Ok(namespace) = resolve(text) else {
            report.skipped_namespaces += 1;
            continue;
        };
        apply_namespace(store, &namespace, vars, None, &mut report);
    }
    report
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::VENDOR_NAMESPACE;
    use crate::store::{MemoryStore, StoreOp};

    const NS: &str = "4D1FDA02-38C7-4A6A-9CC6-4BCCA8B30102";

    #[test]
    fn writes_absent_variable() {
        let mut store = MemoryStore::new();
        let outcome = apply_write(&mut store, &VENDOR_NAMESPACE, "boot-args", b"-v", None);
        assert_eq!(outcome, WriteOutcome::Written);
        let stored = store.get(&VENDOR_NAMESPACE, "boot-args").unwrap();
        assert_eq!(stored.data, b"-v");
        assert_eq!(stored.attributes, NVRAM_ATTRIBUTES);
    }

    #[test]
    fn never_overwrites_existing() {
        let mut store = MemoryStore::new();
        store.insert(VENDOR_NAMESPACE, "boot-args", b"os-value");
        let allow_all = PermissionEntry::new(["*"]);
        for permission in [None, Some(&allow_all)] {
            let outcome =
                apply_write(&mut store, &VENDOR_NAMESPACE, "boot-args", b"cfg", permission);
            assert_eq!(outcome, WriteOutcome::SkippedExists);
        }
        assert_eq!(store.get(&VENDOR_NAMESPACE, "boot-args").unwrap().data, b"os-value");
        assert!(!store.ops().iter().any(|op| matches!(op, StoreOp::Set(..))));
    }

    #[test]
    fn denial_does_not_touch_store() {
        let mut store = MemoryStore::new();
        let entry = PermissionEntry::new(["BootArgs"]);
        let outcome = apply_write(&mut store, &VENDOR_NAMESPACE, "Other", b"y", Some(&entry));
        assert_eq!(outcome, WriteOutcome::SkippedDenied);
        assert!(store.ops().is_empty());
    }

    #[test]
    fn conversion_failure_is_reported() {
        let mut store = MemoryStore::new();
        let outcome = apply_write(&mut store, &VENDOR_NAMESPACE, "naïve", b"y", None);
        assert_eq!(outcome, WriteOutcome::FailedNameConversion);
        assert!(store.ops().is_empty());
    }

    #[test]
    fn store_failure_does_not_stop_namespace() {
        let mut store = MemoryStore::new();
        store.fail_on(VENDOR_NAMESPACE, "a", StoreError::WriteProtected);
        let mut add = VariableMap::new();
        let vars = add.entry(NS.to_string()).or_default();
        vars.insert("a".into(), Payload::from(b"1".as_slice()));
        vars.insert("b".into(), Payload::from(b"2".as_slice()));

        let report = apply_adds(&mut store, &add);
        assert_eq!(report.failed_writes, 1);
        assert_eq!(report.written, 1);
        assert!(store.get(&VENDOR_NAMESPACE, "b").is_some());
    }

    #[test]
    fn block_is_idempotent() {
        let mut store = MemoryStore::new();
        store.insert(VENDOR_NAMESPACE, "a", b"1");
        store.insert(VENDOR_NAMESPACE, "keep", b"2");
        let mut block = BlockMap::new();
        block.insert(NS.into(), vec!["a".into(), "missing".into()]);

        let first = apply_blocks(&mut store, &block);
        assert_eq!(first.deleted, 2);
        assert_eq!(first.failed_deletes, 0);
        let after_first = store.len();

        let second = apply_blocks(&mut store, &block);
        assert_eq!(second.failed_deletes, 0);
        assert_eq!(store.len(), after_first);
        assert!(store.get(&VENDOR_NAMESPACE, "keep").is_some());
    }

    #[test]
    fn block_continues_after_failure() {
        let mut store = MemoryStore::new();
        store.insert(VENDOR_NAMESPACE, "locked", b"1");
        store.insert(VENDOR_NAMESPACE, "open", b"2");
        store.fail_on(VENDOR_NAMESPACE, "locked", StoreError::WriteProtected);
        let mut block = BlockMap::new();
        block.insert(NS.into(), vec!["locked".into(), "open".into()]);
        block.insert("not-a-guid".into(), vec!["open".into()]);

        let report = apply_blocks(&mut store, &block);
        assert_eq!(report.failed_deletes, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.skipped_namespaces, 1);
        assert!(store.get(&VENDOR_NAMESPACE, "locked").is_some());
        assert!(store.get(&VENDOR_NAMESPACE, "open").is_none());
    }

    #[test]
    fn absorb_sums_counters() {
        let mut total = ApplyReport::default();
        total.record_write(WriteOutcome::Written);
        let mut other = ApplyReport::default();
        other.record_write(WriteOutcome::SkippedDenied);
        other.record_delete(DeleteOutcome::Absent);
        total.absorb(other);
        assert_eq!((total.written, total.denied, total.deleted), (1, 1, 1));
    }

    #[test]
    fn empty_payload_is_not_stored() {
        let mut store = MemoryStore::new();
        let outcome = apply_write(&mut store, &VENDOR_NAMESPACE, "empty", b"", None);
        assert_eq!(outcome, WriteOutcome::FailedStoreWrite);
        assert!(store.is_empty());
    }

    #[test]
    fn block_name_conversion_failure_is_isolated() {
        let mut store = MemoryStore::new();
        store.insert(VENDOR_NAMESPACE, "a", b"1");
        let mut block = BlockMap::new();
        block.insert(NS.into(), vec!["naïve".into(), "bad\0name".into(), "a".into()]);

        let report = apply_blocks(&mut store, &block);
        assert_eq!(report.failed_deletes, 2);
        assert_eq!(report.deleted, 1);
        assert!(store.is_empty());
        assert_eq!(store.ops().len(), 1);
    }
}
