// CLASSIFICATION: COMMUNITY
// Filename: json.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! JSON decoding of the legacy NVRAM document.
//!
//! ```json
//! { "Version": 1, "Add": { "<namespace>": { "<name>": "<hex>" } } }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::{LegacyContainer, LegacyParser};
use crate::config::{Payload, VariableMap};
use crate::error::NvramError;

/// Object decoded into a map, rejecting repeated keys instead of letting
/// the last occurrence win.
struct UniqueMap<V>(BTreeMap<String, V>);

impl<V> Default for UniqueMap<V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

struct UniqueMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueMapVisitor<V> {
    type Value = UniqueMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with unique keys")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if map.contains_key(&key) {
                return Err(A::Error::custom(format!("duplicate key {key:?}")));
            }
            map.insert(key, value);
        }
        Ok(UniqueMap(map))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueMap<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct NvramDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    add: UniqueMap<UniqueMap<Payload>>,
}

/// [`LegacyParser`] for `nvram.json`, backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLegacyParser;

impl LegacyParser for JsonLegacyParser {
    fn parse(&self, bytes: &[u8]) -> Result<LegacyContainer, NvramError> {
        let doc: NvramDocument = serde_json::from_slice(bytes)
            .map_err(|e| NvramError::InvalidFormat(format!("nvram document: {e}")))?;
        Ok(LegacyContainer {
            version: doc.version,
            add: doc
                .add
                .0
                .into_iter()
                .map(|(ns, vars)| (ns, vars.0))
                .collect::<VariableMap>(),
        })
    }
}
