// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Boot configuration consumed by the NVRAM gateway.
//!
//! Keys follow the firmware's PascalCase layout:
//!
//! ```toml
//! [Nvram.Add."7C436110-AB2A-4BBB-A880-FE41995C9F82"]
//! boot-args = "2d76"          # hex payload
//!
//! [Nvram.Block]
//! "7C436110-AB2A-4BBB-A880-FE41995C9F82" = ["boot-args"]
//!
//! [Nvram.Legacy]
//! UseLegacy = true
//!
//! [Nvram.Legacy.Legacy]
//! "7C436110-AB2A-4BBB-A880-FE41995C9F82" = ["*"]
//!
//! [Misc.Security]
//! ExposeSensitiveData = 2
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer};

use crate::error::NvramError;
use crate::policy::DeclaredTable;

/// Opaque variable payload, written as a hex string in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        hex::decode(text.trim())
            .map(Payload)
            .map_err(serde::de::Error::custom)
    }
}

/// Namespace text → variable name → payload.
pub type VariableMap = BTreeMap<String, BTreeMap<String, Payload>>;

/// Namespace text → variable names to delete.
pub type BlockMap = BTreeMap<String, Vec<String>>;

bitflags! {
    /// Bits of `Misc.Security.ExposeSensitiveData`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExposeFlags: u32 {
        const BOOT_PATH = 0x1;
        const VERSION = 0x2;
    }
}

impl Default for ExposeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

fn expose_from_bits<'de, D>(deserializer: D) -> Result<ExposeFlags, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(ExposeFlags::from_bits_retain)
}

/// `Nvram.Legacy` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LegacySection {
    /// Replay the legacy `nvram.json` file before block/add processing.
    pub use_legacy: bool,
    /// Declared namespaces the legacy file may write, with their allowlists.
    pub legacy: DeclaredTable,
}

/// `Nvram` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NvramConfig {
    pub add: VariableMap,
    pub block: BlockMap,
    pub legacy: LegacySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SecurityConfig {
    #[serde(deserialize_with = "expose_from_bits")]
    pub expose_sensitive_data: ExposeFlags,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MiscConfig {
    pub security: SecurityConfig,
}

/// Top-level boot configuration. Missing sections default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GlobalConfig {
    pub nvram: NvramConfig,
    pub misc: MiscConfig,
}

impl GlobalConfig {
    /// Decode configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, NvramError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and decode a TOML configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text)?)
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const APPLE: &str = "7C436110-AB2A-4BBB-A880-FE41995C9F82";

    #[test]
    fn empty_document_defaults() {
        let cfg = GlobalConfig::from_toml_str("").unwrap();
        assert!(cfg.nvram.add.is_empty());
        assert!(cfg.nvram.block.is_empty());
        assert!(!cfg.nvram.legacy.use_legacy);
        assert!(cfg.misc.security.expose_sensitive_data.is_empty());
    }

    #[test]
    fn parses_full_layout() {
        let text = format!(
            r#"
[Nvram.Add."{APPLE}"]
boot-args = "2d76"
csr-active-config = "00000000"

[Nvram.Block]
"{APPLE}" = ["boot-args", "csr-active-config"]

[Nvram.Legacy]
UseLegacy = true

[Nvram.Legacy.Legacy]
"{APPLE}" = ["*"]

[Misc.Security]
ExposeSensitiveData = 3
"#
        );
        let cfg = GlobalConfig::from_toml_str(&text).unwrap();
        let vars = &cfg.nvram.add[APPLE];
        assert_eq!(vars["boot-args"].as_bytes(), b"-v");
        assert_eq!(vars["csr-active-config"].as_bytes(), &[0, 0, 0, 0]);
        assert_eq!(cfg.nvram.block[APPLE].len(), 2);
        assert!(cfg.nvram.legacy.use_legacy);
        assert!(cfg.nvram.legacy.legacy[APPLE].allows("anything"));
        assert!(cfg
            .misc
            .security
            .expose_sensitive_data
            .contains(ExposeFlags::VERSION));
    }

    #[test]
    fn bad_hex_payload_is_a_decode_error() {
        let text = format!("[Nvram.Add.\"{APPLE}\"]\nboot-args = \"zz\"\n");
        assert!(matches!(
            GlobalConfig::from_toml_str(&text),
            Err(NvramError::Config(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[Nvram.Legacy]\nUseLegacy = true\n").unwrap();
        let cfg = GlobalConfig::load(&path).unwrap();
        assert!(cfg.nvram.legacy.use_legacy);
        assert!(GlobalConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
