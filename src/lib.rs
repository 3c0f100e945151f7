// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower

//! Policy-enforcing gateway between boot configuration and the platform
//! NVRAM variable store.
//!
//! Configuration may only create variables that are absent, only inside
//! namespaces it resolves, and, on the legacy path, only names the declared
//! policy allows. Every failure is contained and logged; boot continues.

#![forbid(unsafe_code)]

/// Error taxonomy.
pub mod error;

/// Namespace identifier parsing and resolution.
pub mod namespace;

/// Allowlist matching.
pub mod policy;

/// Variable store interface and in-memory store.
pub mod store;

/// Additive write and block appliers.
pub mod apply;

/// Legacy `nvram.json` replay.
pub mod legacy;

/// Boot configuration surface.
pub mod config;

/// Version string stamp.
pub mod version;

/// Boot entry point.
pub mod support;

pub use apply::{apply_blocks, apply_write, ApplyReport, WriteOutcome};
pub use config::GlobalConfig;
pub use error::NvramError;
pub use namespace::{resolve, resolve_with_policy, NamespaceId};
pub use policy::{is_permitted, PermissionEntry};
pub use store::{MemoryStore, VariableStore};
pub use support::{run, run_with};
