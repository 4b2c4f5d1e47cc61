//! eventide-json
//!
//! A [`eventide_serde::Serializer`]/[`eventide_serde::Deserializer`] pair
//! implemented directly over [`serde_json::Value`]. This is the back-end the
//! language-server dispatcher actually instantiates: request/notification
//! params arrive as `serde_json::Value` off the wire and are handed to a
//! handler through the same visitor contract the FlexBuffers back-end
//! implements, and a handler's result travels back out through it.
//!
//! JSON has no native byte-span type, so `bytes` leaves round-trip as
//! base64-encoded strings, the same convention `serde_json` users reach for
//! when they need `Vec<u8>` on the wire without inflating it to a JSON array
//! of numbers.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use base64::Engine as _;
use eventide_serde::{
    Deserialize, Deserializer, Introspect, MapAccess, SeqAccess, SerdeError, Serialize,
    SerializeMap, SerializeSeq, SerializeStruct, SerializeTuple, Serializer, StructAccess,
    TupleAccess,
};
use eventide_value::ValueKind;
use serde_json::{Map, Number, Value};

fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn base64_decode(s: &str) -> Result<Vec<u8>, SerdeError> {
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|_| SerdeError::InvalidType)
}

/// Serialize `value` into a [`serde_json::Value`].
///
/// # Errors
/// Propagates whatever [`SerdeError`] `value`'s [`Serialize`] impl returns.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, SerdeError> {
    value.serialize(JsonSerializer)
}

/// Deserialize `T` from a [`serde_json::Value`].
///
/// # Errors
/// Propagates whatever [`SerdeError`] `T`'s [`Deserialize`] impl returns.
pub fn from_value<T: for<'a> Deserialize<JsonDeserializer<'a>>>(
    value: &Value,
) -> Result<T, SerdeError> {
    T::deserialize(&JsonDeserializer(value))
}

/// Builds a [`serde_json::Value`] from a [`Serialize`] impl.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    type Ok = Value;
    type SerializeSeq = JsonSeqBuilder;
    type SerializeTuple = JsonSeqBuilder;
    type SerializeMap = JsonMapBuilder;
    type SerializeStruct = JsonMapBuilder;

    fn serialize_none(self) -> Result<Value, SerdeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, SerdeError> {
        value.serialize(JsonSerializer)
    }

    fn serialize_bool(self, v: bool) -> Result<Value, SerdeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_int(self, v: i64) -> Result<Value, SerdeError> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_uint(self, v: u64) -> Result<Value, SerdeError> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_float(self, v: f64) -> Result<Value, SerdeError> {
        match Number::from_f64(v) {
            Some(n) => Ok(Value::Number(n)),
            None => Ok(Value::Null),
        }
    }

    fn serialize_char(self, v: char) -> Result<Value, SerdeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, SerdeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, SerdeError> {
        Ok(Value::String(base64_encode(v)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<JsonSeqBuilder, SerdeError> {
        Ok(JsonSeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<JsonSeqBuilder, SerdeError> {
        Ok(JsonSeqBuilder {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<JsonMapBuilder, SerdeError> {
        Ok(JsonMapBuilder::default())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<JsonMapBuilder, SerdeError> {
        Ok(JsonMapBuilder::default())
    }

    fn serialize_variant<T: Serialize + ?Sized>(
        self,
        tag: &str,
        value: &T,
    ) -> Result<Value, SerdeError> {
        let mut map = Map::new();
        map.insert(tag.to_string(), value.serialize(JsonSerializer)?);
        Ok(Value::Object(map))
    }
}

/// In-progress sequence/tuple frame for [`JsonSerializer`].
#[derive(Debug, Default)]
pub struct JsonSeqBuilder {
    items: Vec<Value>,
}

impl SerializeSeq for JsonSeqBuilder {
    type Ok = Value;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.items.push(value.serialize(JsonSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerdeError> {
        Ok(Value::Array(self.items))
    }
}

impl SerializeTuple for JsonSeqBuilder {
    type Ok = Value;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, SerdeError> {
        SerializeSeq::end(self)
    }
}

/// In-progress map/struct frame for [`JsonSerializer`].
///
/// Keys are tracked in a side `Vec` purely to detect duplicates in
/// declaration order before they collapse silently inside the `Map`.
#[derive(Debug, Default)]
pub struct JsonMapBuilder {
    seen_keys: std::collections::HashSet<String>,
    entries: Map<String, Value>,
}

impl SerializeMap for JsonMapBuilder {
    type Ok = Value;

    fn serialize_entry<K: Serialize + ?Sized, V: Serialize + ?Sized>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), SerdeError> {
        let key = match key.serialize(JsonSerializer)? {
            Value::String(key) => key,
            _ => return Err(SerdeError::InvalidKey),
        };
        if !self.seen_keys.insert(key.clone()) {
            return Err(SerdeError::DuplicateKeys);
        }
        self.entries.insert(key, value.serialize(JsonSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerdeError> {
        Ok(Value::Object(self.entries))
    }
}

impl SerializeStruct for JsonMapBuilder {
    type Ok = Value;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        if !self.seen_keys.insert(name.to_string()) {
            return Err(SerdeError::DuplicateKeys);
        }
        self.entries
            .insert(name.to_string(), value.serialize(JsonSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerdeError> {
        SerializeMap::end(self)
    }
}

/// A read-only view over one node of a [`serde_json::Value`] tree.
#[derive(Debug, Clone, Copy)]
pub struct JsonDeserializer<'a>(pub &'a Value);

impl<'a> JsonDeserializer<'a> {
    /// Wrap `value` as the root node to deserialize from.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }
}

impl<'a> Deserializer for JsonDeserializer<'a> {
    type SeqAccess = JsonSeqCursor<'a>;
    type TupleAccess = JsonSeqCursor<'a>;
    type MapAccess = JsonMapCursor<'a>;
    type StructAccess = JsonMapCursor<'a>;

    fn deserialize_none(&self) -> Result<bool, SerdeError> {
        Ok(self.0.is_null())
    }

    fn deserialize_bool(&self) -> Result<bool, SerdeError> {
        self.0.as_bool().ok_or(SerdeError::InvalidType)
    }

    fn deserialize_int(&self) -> Result<i64, SerdeError> {
        self.0.as_i64().ok_or(SerdeError::InvalidType)
    }

    fn deserialize_uint(&self) -> Result<u64, SerdeError> {
        self.0.as_u64().ok_or(SerdeError::InvalidType)
    }

    fn deserialize_float(&self) -> Result<f64, SerdeError> {
        self.0.as_f64().ok_or(SerdeError::InvalidType)
    }

    fn deserialize_char(&self) -> Result<char, SerdeError> {
        let s = self.0.as_str().ok_or(SerdeError::InvalidType)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(SerdeError::InvalidChar),
        }
    }

    fn deserialize_str(&self) -> Result<String, SerdeError> {
        self.0
            .as_str()
            .map(str::to_string)
            .ok_or(SerdeError::InvalidType)
    }

    fn deserialize_bytes(&self) -> Result<Vec<u8>, SerdeError> {
        let s = self.0.as_str().ok_or(SerdeError::InvalidType)?;
        base64_decode(s)
    }

    fn deserialize_seq(&self) -> Result<JsonSeqCursor<'a>, SerdeError> {
        let items = self.0.as_array().ok_or(SerdeError::InvalidType)?;
        Ok(JsonSeqCursor { items, idx: 0 })
    }

    fn deserialize_tuple(&self, _len: usize) -> Result<JsonSeqCursor<'a>, SerdeError> {
        self.deserialize_seq()
    }

    fn deserialize_map(&self) -> Result<JsonMapCursor<'a>, SerdeError> {
        let entries = self.0.as_object().ok_or(SerdeError::InvalidType)?;
        Ok(JsonMapCursor {
            keys: entries.keys().cloned().collect(),
            entries,
            idx: 0,
        })
    }

    fn deserialize_struct(
        &self,
        _name: &'static str,
        _len: usize,
    ) -> Result<JsonMapCursor<'a>, SerdeError> {
        self.deserialize_map()
    }
}

impl<'a> Introspect for JsonDeserializer<'a> {
    fn value_kind(&self) -> Result<ValueKind, SerdeError> {
        Ok(match self.0 {
            Value::Null => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_i64() => ValueKind::Int,
            Value::Number(n) if n.is_u64() => ValueKind::Uint,
            Value::Number(_) => ValueKind::Float,
            Value::String(_) => ValueKind::Str,
            Value::Array(_) => ValueKind::Seq,
            Value::Object(_) => ValueKind::Map,
        })
    }
}

/// Cursor over an in-progress sequence/tuple read from a JSON array.
#[derive(Debug)]
pub struct JsonSeqCursor<'a> {
    items: &'a [Value],
    idx: usize,
}

impl<'a> SeqAccess for JsonSeqCursor<'a> {
    type Node = JsonDeserializer<'a>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        Ok(self.idx < self.items.len())
    }

    fn deserialize_element<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        let item = self.items.get(self.idx).ok_or(SerdeError::InvalidState)?;
        self.idx += 1;
        T::deserialize(&JsonDeserializer(item))
    }

    fn skip_element(&mut self) -> Result<(), SerdeError> {
        if self.idx < self.items.len() {
            self.idx += 1;
            Ok(())
        } else {
            Err(SerdeError::InvalidState)
        }
    }
}

impl<'a> TupleAccess for JsonSeqCursor<'a> {
    type Node = JsonDeserializer<'a>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        SeqAccess::has_next(self)
    }

    fn deserialize_element<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        SeqAccess::deserialize_element(self)
    }

    fn skip_element(&mut self) -> Result<(), SerdeError> {
        SeqAccess::skip_element(self)
    }
}

/// Cursor over an in-progress map/struct read from a JSON object.
///
/// `serde_json::Map` preserves insertion order (with the `preserve_order`
/// feature) or sorts by key otherwise; either way this cursor just walks
/// whatever order the map reports, which is enough since unknown keys are
/// surfaced through `next_key` for the caller to skip.
pub struct JsonMapCursor<'a> {
    entries: &'a Map<String, Value>,
    keys: Vec<String>,
    idx: usize,
}

impl<'a> MapAccess for JsonMapCursor<'a> {
    type Node = JsonDeserializer<'a>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        Ok(self.idx < self.keys.len())
    }

    fn next_key(&mut self) -> Result<Option<String>, SerdeError> {
        Ok(self.keys.get(self.idx).cloned())
    }

    fn deserialize_value<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        let key = self.keys.get(self.idx).ok_or(SerdeError::InvalidState)?;
        let value = self.entries.get(key).ok_or(SerdeError::InvalidState)?;
        self.idx += 1;
        T::deserialize(&JsonDeserializer(value))
    }

    fn skip_value(&mut self) -> Result<(), SerdeError> {
        if self.idx < self.keys.len() {
            self.idx += 1;
            Ok(())
        } else {
            Err(SerdeError::InvalidState)
        }
    }
}

impl<'a> StructAccess for JsonMapCursor<'a> {
    type Node = JsonDeserializer<'a>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        MapAccess::has_next(self)
    }

    fn next_key(&mut self) -> Result<Option<String>, SerdeError> {
        MapAccess::next_key(self)
    }

    fn deserialize_value<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        MapAccess::deserialize_value(self)
    }

    fn skip_value(&mut self) -> Result<(), SerdeError> {
        MapAccess::skip_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_primitives() {
        let value = to_value(&42i64).unwrap();
        assert_eq!(value, serde_json::json!(42));
        let back: i64 = from_value(&value).unwrap();
        assert_eq!(back, 42);
    }

    #[test]
    fn round_trips_seq() {
        let items = vec![1i64, 2, 3];
        let value = to_value(&items).unwrap();
        let back: Vec<i64> = from_value(&value).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn round_trips_map() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("a".to_string(), 1i64);
        map.insert("b".to_string(), 2i64);
        let value = to_value(&map).unwrap();
        let back: std::collections::BTreeMap<String, i64> = from_value(&value).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn bytes_round_trip_through_base64() {
        let bytes = eventide_serde::ByteBuf::from(vec![1u8, 2, 3, 255]);
        let value = to_value(&bytes).unwrap();
        assert!(value.is_string());
        let back: eventide_serde::ByteBuf = from_value(&value).unwrap();
        assert_eq!(back.0, vec![1u8, 2, 3, 255]);
    }

    #[test]
    fn non_finite_float_becomes_null() {
        let value = to_value(&f64::NAN).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn duplicate_struct_fields_are_rejected() {
        struct Dup;
        impl Serialize for Dup {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
                let mut s = serializer.serialize_struct("Dup", 2)?;
                s.serialize_field("id", &1i64)?;
                s.serialize_field("id", &2i64)?;
                s.end()
            }
        }
        let err = Dup.serialize(JsonSerializer).unwrap_err();
        assert_eq!(err, SerdeError::DuplicateKeys);
    }

    #[test]
    fn forward_compatible_struct_drops_unknown_field() {
        let value = serde_json::json!({"id": 7, "name": "alice", "extra": 99});
        #[derive(Debug, PartialEq)]
        struct Person {
            id: i64,
            name: String,
        }
        impl<D: Deserializer> Deserialize<D> for Person {
            fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
                let mut fields = deserializer.deserialize_struct("Person", 2)?;
                let mut id = None;
                let mut name = None;
                while let Some(key) = fields.next_key()? {
                    match key.as_str() {
                        "id" => id = Some(fields.deserialize_value()?),
                        "name" => name = Some(fields.deserialize_value()?),
                        _ => fields.skip_value()?,
                    }
                }
                Ok(Person {
                    id: id.ok_or(SerdeError::InvalidState)?,
                    name: name.ok_or(SerdeError::InvalidState)?,
                })
            }
        }
        let person: Person = from_value(&value).unwrap();
        assert_eq!(
            person,
            Person {
                id: 7,
                name: "alice".to_string(),
            }
        );
    }
}
