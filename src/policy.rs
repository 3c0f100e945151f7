// CLASSIFICATION: COMMUNITY
// Filename: policy.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Allowlist matching for NVRAM writes.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Token granting a namespace full write access when it leads the list.
pub const WILDCARD: &str = "*";

/// Ordered list of variable names a namespace may write.
///
/// Only a wildcard at index 0 grants full access. A wildcard anywhere else
/// is compared literally like any other name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PermissionEntry(Vec<String>);

impl PermissionEntry {
    /// Build an entry from names in order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Whether `name` may be written under this entry.
    pub fn allows(&self, name: &str) -> bool {
        match self.0.first() {
            None => false,
            Some(first) if first == WILDCARD => true,
            Some(_) => self.0.iter().any(|allowed| allowed == name),
        }
    }
}

/// Declared namespaces (verbatim text) and their permission entries.
pub type DeclaredTable = BTreeMap<String, PermissionEntry>;

/// Decide whether `name` may be written. `None` is the unrestricted context.
pub fn is_permitted(entry: Option<&PermissionEntry>, name: &str) -> bool {
    entry.map_or(true, |entry| entry.allows(name))
}
