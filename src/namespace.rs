// CLASSIFICATION: COMMUNITY
// Filename: namespace.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18
//
// ─────────────────────────────────────────────────────────────
// NVRAM namespace resolver
//
// Converts the canonical hyphenated text form of a variable
// namespace (`XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`) into its
// 16-byte binary form and optionally looks it up in a declared
// policy table.
//
// # Public API
// * [`NamespaceId`] – 128-bit namespace identifier.
// * [`resolve`] – text → [`NamespaceId`].
// * [`resolve_with_policy`] – text → identifier plus declared entry.
// ─────────────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use log::{info, warn};

use crate::error::NvramError;
use crate::policy::{DeclaredTable, PermissionEntry};

/// Length of the canonical textual form.
pub const GUID_STRING_LENGTH: usize = 36;

const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// 128-bit namespace identifier in firmware byte order.
///
/// The first three fields are stored little-endian, the trailing eight
/// bytes verbatim, matching the in-memory layout the variable store uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId([u8; 16]);

/// Vendor namespace holding the gateway's own variables.
pub const VENDOR_NAMESPACE: NamespaceId = NamespaceId::from_fields(
    0x4D1F_DA02,
    0x38C7,
    0x4A6A,
    [0x9C, 0xC6, 0x4B, 0xCC, 0xA8, 0xB3, 0x01, 0x02],
);

impl NamespaceId {
    /// Wrap raw bytes already in firmware order.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Build an identifier from its four textual fields.
    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        let a = data1.to_le_bytes();
        let b = data2.to_le_bytes();
        let c = data3.to_le_bytes();
        Self([
            a[0], a[1], a[2], a[3], b[0], b[1], c[0], c[1], data4[0], data4[1], data4[2],
            data4[3], data4[4], data4[5], data4[6], data4[7],
        ])
    }

    /// Raw bytes in firmware order.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parse the canonical text form. Any length other than
    /// [`GUID_STRING_LENGTH`] is rejected before decoding starts.
    pub fn parse(text: &str) -> Result<Self, NvramError> {
        if text.len() != GUID_STRING_LENGTH {
            return Err(NvramError::InvalidFormat(format!(
                "namespace {text:?} has length {}, expected {GUID_STRING_LENGTH}",
                text.len()
            )));
        }

        let raw = text.as_bytes();
        if HYPHENS.iter().any(|&pos| raw[pos] != b'-') {
            return Err(NvramError::InvalidFormat(format!(
                "namespace {text:?} is not hyphenated canonically"
            )));
        }

        let decode = |range: std::ops::Range<usize>, out: &mut [u8]| {
            hex::decode_to_slice(&raw[range], out).map_err(|e| {
                NvramError::InvalidFormat(format!("namespace {text:?}: {e}"))
            })
        };

        let mut data1 = [0u8; 4];
        let mut data2 = [0u8; 2];
        let mut data3 = [0u8; 2];
        let mut data4 = [0u8; 8];
        decode(0..8, &mut data1)?;
        decode(9..13, &mut data2)?;
        decode(14..18, &mut data3)?;
        decode(19..23, &mut data4[..2])?;
        decode(24..36, &mut data4[2..])?;

        Ok(Self::from_fields(
            u32::from_be_bytes(data1),
            u16::from_be_bytes(data2),
            u16::from_be_bytes(data3),
            data4,
        ))
    }

    fn data1(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    fn data2(&self) -> u16 {
        u16::from_le_bytes([self.0[4], self.0[5]])
    }

    fn data3(&self) -> u16 {
        u16::from_le_bytes([self.0[6], self.0[7]])
    }
}

impl FromStr for NamespaceId {
    type Err = NvramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{}-{}",
            self.data1(),
            self.data2(),
            self.data3(),
            hex::encode_upper(&self.0[8..10]),
            hex::encode_upper(&self.0[10..16]),
        )
    }
}

impl fmt::Debug for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamespaceId({self})")
    }
}

/// Resolve namespace text without consulting any policy.
pub fn resolve(text: &str) -> Result<NamespaceId, NvramError> {
    NamespaceId::parse(text).map_err(|e| {
        warn!("[nvram] Failed to convert NVRAM GUID {text} - {e}");
        e
    })
}

/// Resolve namespace text and, when a declared table is supplied, look the
/// text up verbatim (byte-exact, case-sensitive) in it.
///
/// Without a table the returned entry is `None`, meaning unrestricted.
/// With a table, an undeclared namespace yields [`NvramError::NotDeclared`],
/// which callers treat as "skip this namespace".
pub fn resolve_with_policy<'t>(
    text: &str,
    declared: Option<&'t DeclaredTable>,
) -> Result<(NamespaceId, Option<&'t PermissionEntry>), NvramError> {
    let id = resolve(text)?;
    let Some(table) = declared else {
        return Ok((id, None));
    };

    match table.get(text) {
        Some(entry) => Ok((id, Some(entry))),
        None => {
            info!("[nvram] Ignoring NVRAM GUID {text}");
            Err(NvramError::NotDeclared(text.to_string()))
        }
    }
}
