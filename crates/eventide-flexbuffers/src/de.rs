use eventide_serde::{Deserialize, Deserializer, Introspect, MapAccess, SeqAccess, SerdeError, StructAccess, TupleAccess};
use eventide_value::ValueKind;
use flexbuffers::FlexBufferType as Ty;

/// A read-only view over one node of a parsed FlexBuffers document.
///
/// Reading never mutates anything: `flexbuffers::Reader` is itself a cheap,
/// `Clone`-able view into the original byte slice, so this type just wraps
/// one and forwards to it after checking the node's tag matches what the
/// caller asked for.
#[derive(Debug, Clone)]
pub struct FlexDeserializer<'de>(flexbuffers::Reader<&'de [u8]>);

impl<'de> FlexDeserializer<'de> {
    /// Parse `buffer` and return a deserializer positioned at its root.
    ///
    /// # Errors
    /// Returns [`SerdeError::InvalidBuffer`] if `buffer` is not a
    /// well-formed FlexBuffers document.
    pub fn from_slice(buffer: &'de [u8]) -> Result<Self, SerdeError> {
        let reader = flexbuffers::Reader::get_root(buffer).map_err(|_| SerdeError::InvalidBuffer)?;
        Ok(Self(reader))
    }

    fn require(&self, ty: Ty) -> Result<(), SerdeError> {
        if self.0.flexbuffer_type() == ty {
            Ok(())
        } else {
            Err(SerdeError::InvalidType)
        }
    }
}

/// Parse a value of type `T` from a complete FlexBuffers document.
///
/// # Errors
/// Propagates [`SerdeError::InvalidBuffer`] for a malformed document, or
/// whatever [`SerdeError`] `T`'s [`Deserialize`] impl returns for a
/// well-formed document whose shape does not match `T`.
///
/// This does not and cannot raise [`SerdeError::RootNotConsumed`]: unlike a
/// sequential byte-stream parser, a FlexBuffers document's root is a single
/// addressed tree node reached directly via its trailing offset, not a
/// cursor that can be left short of the end of some larger buffer. `T::deserialize`
/// is handed that one root node and either reads it or returns an error;
/// there is no remaining input to fail to consume. `RootNotConsumed` stays
/// part of the shared [`SerdeError`] taxonomy for back-ends built over an
/// actual linear cursor, where stopping early is observable.
pub fn from_slice<T>(buffer: &[u8]) -> Result<T, SerdeError>
where
    T: for<'de> Deserialize<FlexDeserializer<'de>>,
{
    let de = FlexDeserializer::from_slice(buffer)?;
    T::deserialize(&de)
}

impl<'de> Deserializer for FlexDeserializer<'de> {
    type SeqAccess = FlexSeqCursor<'de>;
    type TupleAccess = FlexSeqCursor<'de>;
    type MapAccess = FlexMapCursor<'de>;
    type StructAccess = FlexMapCursor<'de>;

    fn deserialize_none(&self) -> Result<bool, SerdeError> {
        Ok(self.0.flexbuffer_type() == Ty::Null)
    }

    fn deserialize_bool(&self) -> Result<bool, SerdeError> {
        self.require(Ty::Bool)?;
        Ok(self.0.as_bool())
    }

    fn deserialize_int(&self) -> Result<i64, SerdeError> {
        self.require(Ty::Int)?;
        Ok(self.0.as_i64())
    }

    fn deserialize_uint(&self) -> Result<u64, SerdeError> {
        self.require(Ty::UInt)?;
        Ok(self.0.as_u64())
    }

    fn deserialize_float(&self) -> Result<f64, SerdeError> {
        self.require(Ty::Float)?;
        Ok(self.0.as_f64())
    }

    fn deserialize_char(&self) -> Result<char, SerdeError> {
        self.require(Ty::String)?;
        let s = self.0.as_str();
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(SerdeError::InvalidChar),
        }
    }

    fn deserialize_str(&self) -> Result<String, SerdeError> {
        self.require(Ty::String)?;
        Ok(self.0.as_str().to_string())
    }

    fn deserialize_bytes(&self) -> Result<Vec<u8>, SerdeError> {
        self.require(Ty::Blob)?;
        Ok(self.0.as_blob().as_ref().to_vec())
    }

    fn deserialize_seq(&self) -> Result<FlexSeqCursor<'de>, SerdeError> {
        self.require(Ty::Vector)?;
        Ok(FlexSeqCursor {
            vector: self.0.as_vector(),
            idx: 0,
        })
    }

    fn deserialize_tuple(&self, _len: usize) -> Result<FlexSeqCursor<'de>, SerdeError> {
        self.deserialize_seq()
    }

    fn deserialize_map(&self) -> Result<FlexMapCursor<'de>, SerdeError> {
        self.require(Ty::Map)?;
        let map = self.0.as_map();
        Ok(FlexMapCursor {
            keys: map.keys_vector(),
            map,
            idx: 0,
        })
    }

    fn deserialize_struct(
        &self,
        _name: &'static str,
        _len: usize,
    ) -> Result<FlexMapCursor<'de>, SerdeError> {
        self.deserialize_map()
    }
}

impl<'de> Introspect for FlexDeserializer<'de> {
    fn value_kind(&self) -> Result<ValueKind, SerdeError> {
        Ok(match self.0.flexbuffer_type() {
            Ty::Null => ValueKind::None,
            Ty::Bool => ValueKind::Bool,
            Ty::Int => ValueKind::Int,
            Ty::UInt => ValueKind::Uint,
            Ty::Float => ValueKind::Float,
            Ty::String => ValueKind::Str,
            Ty::Blob => ValueKind::Bytes,
            Ty::Vector => ValueKind::Seq,
            Ty::Map => ValueKind::Map,
            _ => return Err(SerdeError::InvalidType),
        })
    }
}

/// Cursor over an in-progress sequence/tuple read from a FlexBuffers vector.
pub struct FlexSeqCursor<'de> {
    vector: flexbuffers::VectorReader<'de>,
    idx: usize,
}

impl<'de> SeqAccess for FlexSeqCursor<'de> {
    type Node = FlexDeserializer<'de>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        Ok(self.idx < self.vector.len())
    }

    fn deserialize_element<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        if self.idx >= self.vector.len() {
            return Err(SerdeError::InvalidState);
        }
        let node = FlexDeserializer(self.vector.idx(self.idx));
        self.idx += 1;
        T::deserialize(&node)
    }

    fn skip_element(&mut self) -> Result<(), SerdeError> {
        if self.idx < self.vector.len() {
            self.idx += 1;
            Ok(())
        } else {
            Err(SerdeError::InvalidState)
        }
    }
}

impl<'de> TupleAccess for FlexSeqCursor<'de> {
    type Node = FlexDeserializer<'de>;

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

/// Cursor over an in-progress map/struct read from a FlexBuffers map.
///
/// Keys and values are stored as parallel arrays, both sorted by key; this
/// cursor walks them in that wire order, which is what lets an unknown key
/// be surfaced through `next_key` and skipped without special-casing.
pub struct FlexMapCursor<'de> {
    keys: flexbuffers::VectorReader<'de>,
    map: flexbuffers::MapReader<'de>,
    idx: usize,
}

impl<'de> MapAccess for FlexMapCursor<'de> {
    type Node = FlexDeserializer<'de>;

    fn has_next(&mut self) -> Result<bool, SerdeError> {
        Ok(self.idx < self.map.len())
    }

    fn next_key(&mut self) -> Result<Option<String>, SerdeError> {
        if self.idx >= self.keys.len() {
            return Ok(None);
        }
        Ok(Some(self.keys.idx(self.idx).as_str().to_string()))
    }

    fn deserialize_value<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError> {
        if self.idx >= self.map.len() {
            return Err(SerdeError::InvalidState);
        }
        let node = FlexDeserializer(self.map.idx(self.idx));
        self.idx += 1;
        T::deserialize(&node)
    }

    fn skip_value(&mut self) -> Result<(), SerdeError> {
        if self.idx < self.map.len() {
            self.idx += 1;
            Ok(())
        } else {
            Err(SerdeError::InvalidState)
        }
    }
}

impl<'de> StructAccess for FlexMapCursor<'de> {
    type Node = FlexDeserializer<'de>;

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
