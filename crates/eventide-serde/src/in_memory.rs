//! A [`Value`]-backed [`Serializer`]/[`Deserializer`] pair.
//!
//! Neither back-end touches a byte buffer; writing produces a [`Value`]
//! directly and reading walks one. It exists for this crate's own unit
//! tests and for anyone who wants to drive a `Serialize`/`Deserialize` impl
//! without committing to a wire format yet, the same role the ecosystem's
//! `serde_value` crate plays for real `serde`.

use crate::{
    Deserialize, Deserializer, Introspect, MapAccess, SeqAccess, SerdeError, Serialize,
    SerializeMap, SerializeSeq, SerializeStruct, SerializeTuple, Serializer, StructAccess,
    TupleAccess, Value,
};
use eventide_value::ValueKind;

/// Builds a [`Value`] from a [`Serialize`] impl.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type SerializeSeq = ValueSeqBuilder;
    type SerializeTuple = ValueSeqBuilder;
    type SerializeMap = ValueMapBuilder;
    type SerializeStruct = ValueMapBuilder;

    fn serialize_none(self) -> Result<Value, SerdeError> {
        Ok(Value::None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, SerdeError> {
        value.serialize(ValueSerializer)
    }

    fn serialize_bool(self, v: bool) -> Result<Value, SerdeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_int(self, v: i64) -> Result<Value, SerdeError> {
        Ok(Value::Int(v))
    }

    fn serialize_uint(self, v: u64) -> Result<Value, SerdeError> {
        Ok(Value::Uint(v))
    }

    fn serialize_float(self, v: f64) -> Result<Value, SerdeError> {
        if v.is_finite() {
            Ok(Value::Float(v))
        } else {
            Ok(Value::None)
        }
    }

    fn serialize_char(self, v: char) -> Result<Value, SerdeError> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value, SerdeError> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, SerdeError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ValueSeqBuilder, SerdeError> {
        Ok(ValueSeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<ValueSeqBuilder, SerdeError> {
        Ok(ValueSeqBuilder {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<ValueMapBuilder, SerdeError> {
        Ok(ValueMapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<ValueMapBuilder, SerdeError> {
        Ok(ValueMapBuilder {
            entries: Vec::with_capacity(len),
        })
    }

    fn serialize_variant<T: Serialize + ?Sized>(
        self,
        tag: &str,
        value: &T,
    ) -> Result<Value, SerdeError> {
        Ok(Value::Map(vec![(
            tag.to_string(),
            value.serialize(ValueSerializer)?,
        )]))
    }
}

/// In-progress sequence/tuple frame for [`ValueSerializer`].
#[derive(Debug, Default)]
pub struct ValueSeqBuilder {
    items: Vec<Value>,
}

impl SerializeSeq for ValueSeqBuilder {
    type Ok = Value;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerdeError> {
        Ok(Value::Seq(self.items))
    }
}

impl SerializeTuple for ValueSeqBuilder {
    type Ok = Value;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerdeError> {
        Ok(Value::Seq(self.items))
    }
}

/// In-progress map/struct frame for [`ValueSerializer`].
#[derive(Debug, Default)]
pub struct ValueMapBuilder {
    entries: Vec<(String, Value)>,
}

impl SerializeMap for ValueMapBuilder {
    type Ok = Value;

    fn serialize_entry<K: Serialize + ?Sized, V: Serialize + ?Sized>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), SerdeError> {
        let key = match key.serialize(ValueSerializer)? {
            Value::Str(key) => key,
            _ => return Err(SerdeError::InvalidKey),
        };
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, SerdeError> {
        check_no_duplicate_keys(&self.entries)?;
        Ok(Value::Map(self.entries))
    }
}

impl SerializeStruct for ValueMapBuilder {
    type Ok = Value;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        self.entries
            .push((name.to_string(), value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, SerdeError> {
        check_no_duplicate_keys(&self.entries)?;
        Ok(Value::Map(self.entries))
    }
}

fn check_no_duplicate_keys(entries: &[(String, Value)]) -> Result<(), SerdeError> {
    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    for (key, _) in entries {
        if !seen.insert(key.as_str()) {
            return Err(SerdeError::DuplicateKeys);
        }
    }
    Ok(())
}

/// A read-only view over one node of a [`Value`] tree.
#[derive(Debug, Clone, Copy)]
pub struct ValueDeserializer<'a>(pub &'a Value);

impl<'a> ValueDeserializer<'a> {
    /// Wrap `value` as the root node to deserialize from.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }
}

impl<'a> Deserializer for ValueDeserializer<'a> {
    type SeqAccess = ValueSeqCursor<'a>;
    type TupleAccess = ValueSeqCursor<'a>;
    type MapAccess = ValueMapCursor<'a>;
    type StructAccess = ValueMapCursor<'a>;

    fn deserialize_none(&self) -> Result<bool, SerdeError> {
        Ok(matches!(self.0, Value::None))
    }

    fn deserialize_bool(&self) -> Result<bool, SerdeError> {
        match self.0 {
            Value::Bool(v) => Ok(*v),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_int(&self) -> Result<i64, SerdeError> {
        match self.0 {
            Value::Int(v) => Ok(*v),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_uint(&self) -> Result<u64, SerdeError> {
        match self.0 {
            Value::Uint(v) => Ok(*v),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_float(&self) -> Result<f64, SerdeError> {
        match self.0 {
            Value::Float(v) => Ok(*v),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_char(&self) -> Result<char, SerdeError> {
        match self.0 {
            Value::Char(v) => Ok(*v),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_str(&self) -> Result<String, SerdeError> {
        match self.0 {
            Value::Str(v) => Ok(v.clone()),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_bytes(&self) -> Result<Vec<u8>, SerdeError> {
        match self.0 {
            Value::Bytes(v) => Ok(v.clone()),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_seq(&self) -> Result<ValueSeqCursor<'a>, SerdeError> {
        match self.0 {
            Value::Seq(items) => Ok(ValueSeqCursor { items, idx: 0 }),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_tuple(&self, _len: usize) -> Result<ValueSeqCursor<'a>, SerdeError> {
        self.deserialize_seq()
    }

    fn deserialize_map(&self) -> Result<ValueMapCursor<'a>, SerdeError> {
        match self.0 {
            Value::Map(entries) => Ok(ValueMapCursor { entries, idx: 0 }),
            _ => Err(SerdeError::InvalidType),
        }
    }

    fn deserialize_struct(
        &self,
        _name: &'static str,
        _len: usize,
    ) -> Result<ValueMapCursor<'a>, SerdeError> {
        self.deserialize_map()
    }
}

impl Introspect for ValueDeserializer<'_> {
    fn value_kind(&self) -> Result<ValueKind, SerdeError> {
        Ok(match self.0 {
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Uint(_) => ValueKind::Uint,
            Value::Float(_) => ValueKind::Float,
            Value::Char(_) => ValueKind::Char,
            Value::Str(_) => ValueKind::Str,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Seq(_) => ValueKind::Seq,
            Value::Map(_) => ValueKind::Map,
        })
    }
}

/// Cursor over an in-progress sequence/tuple read from a [`Value`] tree.
#[derive(Debug)]
pub struct ValueSeqCursor<'a> {
    items: &'a [Value],
    idx: usize,
}

impl<'a> SeqAccess for ValueSeqCursor<'a> {
    type Node = ValueDeserializer<'a>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        Ok(self.idx < self.items.len())
    }

    fn deserialize_element<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        let item = self.items.get(self.idx).ok_or(SerdeError::InvalidState)?;
        self.idx += 1;
        T::deserialize(&ValueDeserializer(item))
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

impl<'a> TupleAccess for ValueSeqCursor<'a> {
    type Node = ValueDeserializer<'a>;

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

/// Cursor over an in-progress map/struct read from a [`Value`] tree.
#[derive(Debug)]
pub struct ValueMapCursor<'a> {
    entries: &'a [(String, Value)],
    idx: usize,
}

impl<'a> MapAccess for ValueMapCursor<'a> {
    type Node = ValueDeserializer<'a>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        Ok(self.idx < self.entries.len())
    }

    fn next_key(&mut self) -> Result<Option<String>, SerdeError> {
        Ok(self.entries.get(self.idx).map(|(key, _)| key.clone()))
    }

    fn deserialize_value<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        let (_, value) = self.entries.get(self.idx).ok_or(SerdeError::InvalidState)?;
        self.idx += 1;
        T::deserialize(&ValueDeserializer(value))
    }

    fn skip_value(&mut self) -> Result<(), SerdeError> {
        if self.idx < self.entries.len() {
            self.idx += 1;
            Ok(())
        } else {
            Err(SerdeError::InvalidState)
        }
    }
}

impl<'a> StructAccess for ValueMapCursor<'a> {
    type Node = ValueDeserializer<'a>;

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
        let value = 42i64.serialize(ValueSerializer).unwrap();
        assert_eq!(value, Value::Int(42));
        let back = i64::deserialize(&ValueDeserializer::new(&value)).unwrap();
        assert_eq!(back, 42);
    }

    #[test]
    fn round_trips_seq() {
        let items = vec![1i64, 2, 3];
        let value = items.serialize(ValueSerializer).unwrap();
        let back: Vec<i64> = Deserialize::deserialize(&ValueDeserializer::new(&value)).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn round_trips_map() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("a".to_string(), 1i64);
        map.insert("b".to_string(), 2i64);
        let value = map.serialize(ValueSerializer).unwrap();
        let back: std::collections::BTreeMap<String, i64> =
            Deserialize::deserialize(&ValueDeserializer::new(&value)).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn non_finite_float_becomes_none() {
        let value = f64::NAN.serialize(ValueSerializer).unwrap();
        assert_eq!(value, Value::None);
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
        let err = Dup.serialize(ValueSerializer).unwrap_err();
        assert_eq!(err, SerdeError::DuplicateKeys);
    }

    #[test]
    fn dynamic_value_round_trips_through_itself() {
        let original = Value::Map(vec![
            ("a".to_string(), Value::Seq(vec![Value::Int(1), Value::Bool(true)])),
            ("b".to_string(), Value::None),
        ]);
        let written = original.serialize(ValueSerializer).unwrap();
        let read = Value::deserialize(&ValueDeserializer::new(&written)).unwrap();
        assert_eq!(read, original);
    }
}
