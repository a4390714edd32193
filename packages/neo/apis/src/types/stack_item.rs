//! VM stack items carried by notifications.

use alloy_primitives::I256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;

/// A VM stack item in its JSON representation, `{"type": .., "value": ..}`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStackItem")]
pub enum StackItem {
    /// The null item.
    Any,
    /// A boolean.
    Boolean(bool),
    /// An arbitrary precision integer, bounded here to 256 bits.
    Integer(I256),
    /// An immutable byte string.
    ByteString(Vec<u8>),
    /// A mutable byte buffer.
    Buffer(Vec<u8>),
    /// An array of items.
    Array(Vec<StackItem>),
    /// A struct, compared by value.
    Struct(Vec<StackItem>),
    /// A map of primitive keys to items.
    Map(Vec<(StackItem, StackItem)>),
    /// A script position.
    Pointer(u64),
    /// An opaque interop handle.
    InteropInterface,
}

impl StackItem {
    /// Returns the integer value, only for `Integer` items.
    #[must_use]
    pub const fn as_integer(&self) -> Option<I256> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the raw bytes of a `ByteString` or `Buffer`.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteString(bytes) | Self::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the elements of an `Array` or `Struct`.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) | Self::Struct(items) => Some(items),
            _ => None,
        }
    }

    /// The wire name of the item type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::ByteString(_) => "ByteString",
            Self::Buffer(_) => "Buffer",
            Self::Array(_) => "Array",
            Self::Struct(_) => "Struct",
            Self::Map(_) => "Map",
            Self::Pointer(_) => "Pointer",
            Self::InteropInterface => "InteropInterface",
        }
    }
}

#[derive(Deserialize)]
struct RawStackItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
struct RawMapEntry {
    key: RawStackItem,
    value: RawStackItem,
}

impl TryFrom<RawStackItem> for StackItem {
    type Error = String;

    fn try_from(raw: RawStackItem) -> Result<Self, Self::Error> {
        let item = match raw.kind.as_str() {
            "Any" => Self::Any,
            "InteropInterface" => Self::InteropInterface,
            "Boolean" => Self::Boolean(
                raw.value
                    .as_bool()
                    .ok_or_else(|| format!("invalid Boolean value: {}", raw.value))?,
            ),
            "Integer" => Self::Integer(parse_integer(&raw.value)?),
            "ByteString" => Self::ByteString(parse_base64(&raw.value)?),
            "Buffer" => Self::Buffer(parse_base64(&raw.value)?),
            "Array" => Self::Array(parse_items(raw.value)?),
            "Struct" => Self::Struct(parse_items(raw.value)?),
            "Map" => {
                let entries: Vec<RawMapEntry> =
                    serde_json::from_value(raw.value).map_err(|e| e.to_string())?;
                Self::Map(
                    entries
                        .into_iter()
                        .map(|entry| Ok((entry.key.try_into()?, entry.value.try_into()?)))
                        .collect::<Result<_, String>>()?,
                )
            }
            "Pointer" => Self::Pointer(
                raw.value
                    .as_u64()
                    .ok_or_else(|| format!("invalid Pointer value: {}", raw.value))?,
            ),
            other => return Err(format!("unknown stack item type: {other}")),
        };
        Ok(item)
    }
}

fn parse_integer(value: &Value) -> Result<I256, String> {
    match value {
        Value::String(s) => I256::from_dec_str(s).map_err(|e| format!("invalid Integer {s}: {e}")),
        Value::Number(n) => I256::from_dec_str(&n.to_string()).map_err(|e| e.to_string()),
        other => Err(format!("invalid Integer value: {other}")),
    }
}

fn parse_base64(value: &Value) -> Result<Vec<u8>, String> {
    match value {
        Value::String(s) => STANDARD.decode(s).map_err(|e| e.to_string()),
        Value::Null => Ok(Vec::new()),
        other => Err(format!("invalid byte string value: {other}")),
    }
}

fn parse_items(value: Value) -> Result<Vec<StackItem>, String> {
    let raw: Vec<RawStackItem> = serde_json::from_value(value).map_err(|e| e.to_string())?;
    raw.into_iter().map(StackItem::try_from).collect()
}
