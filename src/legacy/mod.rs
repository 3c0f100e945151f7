// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · NVRAM legacy compatibility loader
// Author: Lukas Bower
// Date Modified: 2026-10-18
//
// ─────────────────────────────────────────────────────────────
// Legacy NVRAM replay
//
// Platforms without working native NVRAM keep their variables
// in a versioned file on the boot volume. The loader reads it,
// rejects any unsupported version outright, and replays only
// declared namespaces through the policy-checked write path.
//
// ## Sub-modules
// * `json`    – `serde_json` decoding of the file.
// * `storage` – boot volume readers.
// ─────────────────────────────────────────────────────────────

use log::{info, warn};

use crate::apply::{apply_namespace, ApplyReport};
use crate::config::VariableMap;
use crate::error::NvramError;
use crate::namespace::resolve_with_policy;
use crate::policy::DeclaredTable;
use crate::store::VariableStore;

pub mod json;
pub mod storage;

pub use json::JsonLegacyParser;
pub use storage::{DirStorage, FileStorage, MemoryStorage};

/// Only container version this loader accepts.
pub const SUPPORTED_VERSION: u32 = 1;

/// Legacy file location relative to the storage root.
pub const LEGACY_NVRAM_PATH: &str = "nvram.json";

/// Largest legacy file the loader will read.
pub const LEGACY_NVRAM_MAX_SIZE: usize = 1024 * 1024;

/// Decoded legacy document. Owned by a single load and dropped before it
/// returns.
#[derive(Debug, Clone, Default)]
pub struct LegacyContainer {
    pub version: u32,
    pub add: VariableMap,
}

/// Structured decoder turning raw bytes into a [`LegacyContainer`].
pub trait LegacyParser {
    fn parse(&self, bytes: &[u8]) -> Result<LegacyContainer, NvramError>;
}

/// How a legacy load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyOutcome {
    /// No readable legacy file.
    Absent,
    /// Document malformed or of an unsupported version; nothing applied.
    Rejected,
    /// Declared namespaces were replayed.
    Applied,
}

fn check_version(container: &LegacyContainer) -> Result<(), NvramError> {
    if container.version == SUPPORTED_VERSION {
        Ok(())
    } else {
        Err(NvramError::VersionMismatch {
            found: container.version,
            expected: SUPPORTED_VERSION,
        })
    }
}

/// Replay an already-read legacy document.
pub fn replay_legacy<S: VariableStore + ?Sized>(
    store: &mut S,
    bytes: &[u8],
    parser: &dyn LegacyParser,
    declared: &DeclaredTable,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    let container = match parser.parse(bytes).and_then(|c| check_version(&c).map(|()| c)) {
        Ok(container) => container,
        Err(e) => {
            warn!("[nvram] Incompatible nvram data - {e}");
            report.legacy = Some(LegacyOutcome::Rejected);
            return report;
        }
    };

    for (text, vars) in &container.add {
        let (namespace, permission) = match resolve_with_policy(text, Some(declared)) {
            Ok(resolved) => resolved,
            Err(_) => {
                report.skipped_namespaces += 1;
                continue;
            }
        };
        apply_namespace(store, &namespace, vars, permission, &mut report);
    }

    report.legacy = Some(LegacyOutcome::Applied);
    report
}

/// Read [`LEGACY_NVRAM_PATH`] from `storage` and replay it. A missing or
/// oversized file is not an error.
pub fn load_legacy<S: VariableStore + ?Sized>(
    store: &mut S,
    storage: &dyn FileStorage,
    parser: &dyn LegacyParser,
    declared: &DeclaredTable,
) -> ApplyReport {
    match storage.read_file(LEGACY_NVRAM_PATH, LEGACY_NVRAM_MAX_SIZE) {
        Ok(bytes) => replay_legacy(store, &bytes, parser, declared),
        Err(e) => {
            info!("[nvram] Invalid nvram data - {e}");
            ApplyReport {
                legacy: Some(LegacyOutcome::Absent),
                ..ApplyReport::default()
            }
        }
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::VENDOR_NAMESPACE;
    use crate::policy::PermissionEntry;
    use crate::store::MemoryStore;

    const NS: &str = "4D1FDA02-38C7-4A6A-9CC6-4BCCA8B30102";

    fn declared(names: &[&str]) -> DeclaredTable {
        let mut table = DeclaredTable::new();
        table.insert(NS.to_string(), PermissionEntry::new(names.iter().copied()));
        table
    }

    #[test]
    fn missing_file_is_absent() {
        let mut store = MemoryStore::new();
        let report = load_legacy(
            &mut store,
            &MemoryStorage::new(),
            &JsonLegacyParser,
            &declared(&["*"]),
        );
        assert_eq!(report.legacy, Some(LegacyOutcome::Absent));
        assert!(store.ops().is_empty());
    }

    #[test]
    fn oversized_file_is_absent() {
        let big = vec![b' '; LEGACY_NVRAM_MAX_SIZE + 1];
        let storage = MemoryStorage::new().with_file(LEGACY_NVRAM_PATH, big);
        let mut store = MemoryStore::new();
        let report = load_legacy(&mut store, &storage, &JsonLegacyParser, &declared(&["*"]));
        assert_eq!(report.legacy, Some(LegacyOutcome::Absent));
    }

    #[test]
    fn replays_declared_namespace() {
        let doc = format!(r#"{{"Version":1,"Add":{{"{NS}":{{"a":"01","b":"02"}}}}}}"#);
        let mut store = MemoryStore::new();
        let report = replay_legacy(&mut store, doc.as_bytes(), &JsonLegacyParser, &declared(&["*"]));
        assert_eq!(report.legacy, Some(LegacyOutcome::Applied));
        assert_eq!(report.written, 2);
        assert_eq!(store.get(&VENDOR_NAMESPACE, "b").unwrap().data, [2]);
    }

    #[test]
    fn version_mismatch_rejects_everything() {
        for version in ["0", "2"] {
            let doc = format!(r#"{{"Version":{version},"Add":{{"{NS}":{{"a":"01"}}}}}}"#);
            let mut store = MemoryStore::new();
            let report =
                replay_legacy(&mut store, doc.as_bytes(), &JsonLegacyParser, &declared(&["*"]));
            assert_eq!(report.legacy, Some(LegacyOutcome::Rejected));
            assert!(store.ops().is_empty());
        }
    }

    #[test]
    fn undeclared_and_malformed_namespaces_are_skipped() {
        let doc = format!(
            r#"{{"Version":1,"Add":{{
                "8BE4DF61-93CA-11D2-AA0D-00E098032B8C":{{"a":"01"}},
                "bogus":{{"a":"01"}},
                "{NS}":{{"a":"01"}}
            }}}}"#
        );
        let mut store = MemoryStore::new();
        let report = replay_legacy(&mut store, doc.as_bytes(), &JsonLegacyParser, &declared(&["a"]));
        assert_eq!(report.skipped_namespaces, 2);
        assert_eq!(report.written, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn repeated_namespace_rejects_whole_document() {
        let doc = format!(r#"{{"Version":1,"Add":{{"{NS}":{{"a":"01"}},"{NS}":{{"b":"02"}}}}}}"#);
        let mut store = MemoryStore::new();
        let report = replay_legacy(&mut store, doc.as_bytes(), &JsonLegacyParser, &declared(&["*"]));
        assert_eq!(report.legacy, Some(LegacyOutcome::Rejected));
        assert_eq!(report.written, 0);
        assert!(store.ops().is_empty());
    }

    #[test]
    fn malformed_document_writes_nothing() {
        let doc = format!(r#"{{"Version":1,"Add":{{"{NS}":{{"a":"01"}}"#);
        let mut store = MemoryStore::new();
        let report = replay_legacy(&mut store, doc.as_bytes(), &JsonLegacyParser, &declared(&["*"]));
        assert_eq!(report.legacy, Some(LegacyOutcome::Rejected));
        assert!(store.ops().is_empty());
    }
}
