//! Configuration value model
//!
//! Evaluated attribute values are represented as a closed [`ConfigValue`] enum
//! and rendered to a single canonical string with [`canonicalize`], so nested
//! defaults (lists of objects, objects holding lists, ...) all display the same
//! way regardless of how the source file was formatted.

mod number;

pub use number::Number;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DocError, Result};

/// A literal value from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConfigValue {
    Str(String),
    Num(Number),
    Bool(bool),
    /// Lists, sets and tuples. Order and length are significant.
    Seq(Vec<ConfigValue>),
    /// Objects and maps. Keys iterate in byte-wise ascending order.
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn string(value: impl Into<String>) -> Self {
        ConfigValue::Str(value.into())
    }

    /// Builds a map, rejecting duplicate keys.
    pub fn map<K, I>(entries: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigValue)>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            let key = key.into();
            if map.contains_key(&key) {
                return Err(DocError::UnrepresentableValue(format!(
                    "duplicate key in object: {}",
                    key
                )));
            }
            map.insert(key, value);
        }
        Ok(ConfigValue::Map(map))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Str(_) => "string",
            ConfigValue::Num(_) => "number",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Seq(_) => "sequence",
            ConfigValue::Map(_) => "map",
        }
    }
}

/// Renders a value to its canonical display form.
///
/// Strings are emitted verbatim, numbers in exact decimal notation, sequences
/// as `[a, b]` and maps as `{k=v, ...}` with keys sorted.
pub fn canonicalize(value: &ConfigValue) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &ConfigValue, out: &mut String) {
    match value {
        ConfigValue::Str(s) => out.push_str(s),
        ConfigValue::Num(n) => out.push_str(&n.to_string()),
        ConfigValue::Bool(true) => out.push_str("true"),
        ConfigValue::Bool(false) => out.push_str("false"),
        ConfigValue::Seq(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        ConfigValue::Map(entries) => {
            out.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push('=');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonicalize(self))
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Num(Number::from(value))
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Num(Number::from(i64::from(value)))
    }
}
