//! Typed property values.
//!
//! Value table entries are a `(tag, payload)` pair. The payload is always an
//! `f64`; its meaning depends on the tag:
//!
//! | Tag | Type    | Payload                      |
//! |-----|---------|------------------------------|
//! | 0   | String  | index into the string table  |
//! | 1   | Number  | the number itself            |
//! | 2   | Boolean | 0 for false, anything else true |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MalformedTile;

use super::reader::{RawValue, TileReader};

// =============================================================================
// ValueTag
// =============================================================================

/// Type tag of a value table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueTag {
    String = 0,
    Number = 1,
    Boolean = 2,
}

impl ValueTag {
    /// Create a ValueTag from its numeric value.
    ///
    /// Returns `None` for unknown tags.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ValueTag::String),
            1 => Some(ValueTag::Number),
            2 => Some(ValueTag::Boolean),
            _ => None,
        }
    }
}

// =============================================================================
// Value
// =============================================================================

/// A decoded property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve value table entry `index` into a typed [`Value`].
pub fn resolve(reader: &TileReader, index: usize) -> Result<Value, MalformedTile> {
    let raw = reader.raw_value(index)?;
    decode_raw(reader, index, raw)
}

fn decode_raw(reader: &TileReader, index: usize, raw: RawValue) -> Result<Value, MalformedTile> {
    let tag = ValueTag::from_u8(raw.tag).ok_or(MalformedTile::UnknownValueTag(raw.tag))?;
    match tag {
        ValueTag::String => {
            let string_index = string_ref(raw.payload)
                .ok_or(MalformedTile::InvalidStringRef { index })?;
            Ok(Value::String(reader.string(string_index)?.to_string()))
        }
        ValueTag::Number => Ok(Value::Number(raw.payload)),
        ValueTag::Boolean => Ok(Value::Boolean(raw.payload != 0.0)),
    }
}

/// Interpret a string payload as a table index.
fn string_ref(payload: f64) -> Option<usize> {
    if payload.is_finite() && payload >= 0.0 && payload.fract() == 0.0 {
        Some(payload as usize)
    } else {
        None
    }
}
