// CLASSIFICATION: COMMUNITY
// Filename: support.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Boot-time entry point sequencing the NVRAM gateway.
//!
//! Order: legacy replay (when enabled and a volume is present), block-list,
//! add-list, version stamp. Blocks run before adds so a variable named in
//! both ends up holding the add-list value. No step aborts the next.

use log::{info, warn};

use crate::apply::{apply_adds, apply_blocks, ApplyReport};
use crate::config::GlobalConfig;
use crate::legacy::{load_legacy, FileStorage, JsonLegacyParser, LegacyParser};
use crate::store::VariableStore;
use crate::version::{current_version_string, report_version};

/// Apply `config` to `store` with the default legacy parser and this
/// build's version string.
pub fn run<S: VariableStore + ?Sized>(
    store: &mut S,
    storage: Option<&dyn FileStorage>,
    config: &GlobalConfig,
) -> ApplyReport {
    let version = match current_version_string() {
        Ok(version) => Some(version),
        Err(e) => {
            warn!("[nvram] Cannot build version string - {e}");
            None
        }
    };
    run_with(store, storage, &JsonLegacyParser, config, version.as_deref())
}

/// Apply `config` with explicit collaborators. A `None` version skips the
/// stamp.
pub fn run_with<S: VariableStore + ?Sized>(
    store: &mut S,
    storage: Option<&dyn FileStorage>,
    parser: &dyn LegacyParser,
    config: &GlobalConfig,
    version: Option<&str>,
) -> ApplyReport {
    let nvram = &config.nvram;
    let mut report = ApplyReport::default();

    if nvram.legacy.use_legacy {
        match storage {
            Some(storage) => {
                report.absorb(load_legacy(store, storage, parser, &nvram.legacy.legacy));
            }
            None => info!("[nvram] Legacy NVRAM requested without a boot volume"),
        }
    }

    report.absorb(apply_blocks(store, &nvram.block));
    report.absorb(apply_adds(store, &nvram.add));

    if let Some(version) = version {
        if let Err(e) = report_version(store, config, version) {
            warn!("[nvram] Failed to expose version - {e}");
        }
    }

    info!(
        "[nvram] Applied: {} written, {} denied, {} existing, {} failed, {} deleted",
        report.written, report.denied, report.existing, report.failed_writes, report.deleted
    );
    report
}
