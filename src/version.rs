// CLASSIFICATION: COMMUNITY
// Filename: version.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Cosmetic version stamp, `TTT-XYZ-YYYY-MM-DD`.

use chrono::{NaiveDate, Utc};
use log::info;

use crate::config::{ExposeFlags, GlobalConfig};
use crate::error::NvramError;
use crate::namespace::VENDOR_NAMESPACE;
use crate::store::{VariableName, VariableStore, NVRAM_ATTRIBUTES};

/// Variable receiving the version string under [`VENDOR_NAMESPACE`].
pub const VERSION_VARIABLE_NAME: &str = "boot-version";

/// Three-letter build target of this binary.
pub fn build_target() -> &'static str {
    if cfg!(debug_assertions) {
        "DBG"
    } else {
        "REL"
    }
}

/// Assemble the version string. `target` must be three uppercase letters
/// and `version` must be `X.Y.Z` with single-digit components.
pub fn version_string(target: &str, version: &str, date: NaiveDate) -> Result<String, NvramError> {
    if target.len() != 3 || !target.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(NvramError::InvalidFormat(format!("build target {target:?}")));
    }

    let digits: Vec<char> = version.split('.').filter_map(single_digit).collect();
    if digits.len() != 3 || version.split('.').count() != 3 {
        return Err(NvramError::InvalidFormat(format!("version {version:?}")));
    }

    Ok(format!(
        "{target}-{}{}{}-{}",
        digits[0],
        digits[1],
        digits[2],
        date.format("%Y-%m-%d")
    ))
}

fn single_digit(part: &str) -> Option<char> {
    let mut chars = part.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => Some(c),
        _ => None,
    }
}

/// Version string for this build, dated today.
pub fn current_version_string() -> Result<String, NvramError> {
    version_string(
        build_target(),
        env!("CARGO_PKG_VERSION"),
        Utc::now().date_naive(),
    )
}

/// Log `version` and, if the configuration exposes it, store it under
/// [`VERSION_VARIABLE_NAME`]. Returns whether the variable was written.
///
/// Unlike configuration writes this replaces any existing value.
pub fn report_version<S: VariableStore + ?Sized>(
    store: &mut S,
    config: &GlobalConfig,
    version: &str,
) -> Result<bool, NvramError> {
    info!("[nvram] Current version is {version}");

    if !config
        .misc
        .security
        .expose_sensitive_data
        .contains(ExposeFlags::VERSION)
    {
        return Ok(false);
    }

    let name = VariableName::from_ascii(VERSION_VARIABLE_NAME)?;
    store.set(&VENDOR_NAMESPACE, &name, version.as_bytes(), NVRAM_ATTRIBUTES)?;
    Ok(true)
}
