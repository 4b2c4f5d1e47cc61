//! A dynamic, schema-less value tree.
//!
//! Most callers have a concrete Rust type in mind and drive a
//! [`crate::Serialize`]/[`crate::Deserialize`] impl written for it. `Value`
//! is for the other case — round-trip property tests that generate
//! arbitrary shapes, and any caller that genuinely does not know the shape
//! ahead of time. It covers the scalar and homogeneous-container value
//! kinds; `struct` and `variant` are not represented here since those need
//! a declared field set or tag a dynamic tree doesn't carry.

use crate::{
    Deserialize, Introspect, MapAccess, SeqAccess, SerdeError, Serialize, SerializeMap,
    SerializeSeq, Serializer,
};
use eventide_value::ValueKind;

/// A dynamically-typed value covering every scalar and homogeneous
/// container [`ValueKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The none marker.
    None,
    /// A boolean leaf.
    Bool(bool),
    /// A signed-integer leaf.
    Int(i64),
    /// An unsigned-integer leaf.
    Uint(u64),
    /// A float leaf. `NaN`/`±inf` round-trip as [`Value::None`] through any
    /// back-end that applies the none-on-non-finite policy.
    Float(f64),
    /// A single-character leaf.
    Char(char),
    /// A UTF-8 string leaf.
    Str(String),
    /// An opaque byte-span leaf.
    Bytes(Vec<u8>),
    /// A homogeneous or heterogeneous sequence.
    Seq(Vec<Value>),
    /// A key/value map. Stored as an ordered `Vec` rather than a sorted map
    /// so deserializing a map with two equal keys can still be observed and
    /// rejected by the producing back-end instead of silently collapsing.
    Map(Vec<(String, Value)>),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        match self {
            Self::None => serializer.serialize_none(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_int(*v),
            Self::Uint(v) => serializer.serialize_uint(*v),
            Self::Float(v) => serializer.serialize_float(*v),
            Self::Char(v) => serializer.serialize_char(*v),
            Self::Str(v) => serializer.serialize_str(v),
            Self::Bytes(v) => serializer.serialize_bytes(v),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<D: Introspect> Deserialize<D> for Value {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        match deserializer.value_kind()? {
            ValueKind::None => {
                deserializer.deserialize_none()?;
                Ok(Self::None)
            }
            ValueKind::Bool => Ok(Self::Bool(deserializer.deserialize_bool()?)),
            ValueKind::Int => Ok(Self::Int(deserializer.deserialize_int()?)),
            ValueKind::Uint => Ok(Self::Uint(deserializer.deserialize_uint()?)),
            ValueKind::Float => Ok(Self::Float(deserializer.deserialize_float()?)),
            ValueKind::Char => Ok(Self::Char(deserializer.deserialize_char()?)),
            ValueKind::Str => Ok(Self::Str(deserializer.deserialize_str()?)),
            ValueKind::Bytes => Ok(Self::Bytes(deserializer.deserialize_bytes()?)),
            ValueKind::Seq | ValueKind::Tuple => {
                let mut seq = deserializer.deserialize_seq()?;
                let mut items = Vec::new();
                while seq.has_next()? {
                    items.push(seq.deserialize_element()?);
                }
                Ok(Self::Seq(items))
            }
            ValueKind::Map | ValueKind::Struct => {
                let mut map = deserializer.deserialize_map()?;
                let mut entries = Vec::new();
                while let Some(key) = map.next_key()? {
                    entries.push((key, map.deserialize_value()?));
                }
                Ok(Self::Map(entries))
            }
            ValueKind::Variant => Err(SerdeError::InvalidType),
        }
    }
}
