// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Error taxonomy shared by the NVRAM gateway.
//!
//! None of these abort the boot sequence. Each failure is contained to the
//! smallest unit it affects and reported through the `log` facade.

use thiserror::Error;

use crate::store::StoreError;

/// Errors produced while resolving, matching and applying NVRAM requests.
#[derive(Debug, Error)]
pub enum NvramError {
    /// Malformed namespace text or legacy container.
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    /// Namespace absent from the declared policy table.
    #[error("namespace {0} is not declared")]
    NotDeclared(String),
    /// Legacy container carries an unsupported format version.
    #[error("incompatible nvram data, version {found} vs {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    /// The variable store rejected a set or delete.
    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreError),
    /// Variable name could not be converted to the store encoding.
    #[error("failed to convert variable name {0}")]
    AllocationFailure(String),
    /// Configuration document could not be decoded.
    #[error("config decode error: {0}")]
    Config(#[from] toml::de::Error),
    /// File-backed helper failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
