use eventide_serde::{
    SerdeError, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeTuple, Serializer,
};

use crate::session::{matches_array, matches_map, FrameKind, Session};

fn key_as_string<K: Serialize + ?Sized>(key: &K) -> Result<String, SerdeError> {
    match key.serialize(eventide_serde::ValueSerializer)? {
        eventide_serde::Value::Str(key) => Ok(key),
        _ => Err(SerdeError::InvalidKey),
    }
}

/// A handle onto the next slot a value may be written into: either the
/// session's one root slot, or one keyed entry of the innermost open map
/// frame. Every [`eventide_serde::Serializer`] method on this type consumes
/// it, since the slot is spent the moment something is written there.
pub struct FlexSerializer<'s> {
    session: &'s Session,
    pending_key: Option<String>,
}

impl<'s> FlexSerializer<'s> {
    pub(crate) fn root(session: &'s Session) -> Self {
        Self {
            session,
            pending_key: None,
        }
    }

    pub(crate) fn keyed(session: &'s Session, key: String) -> Self {
        Self {
            session,
            pending_key: Some(key),
        }
    }

    fn write_leaf(self, f: impl FnOnce(&mut flexbuffers::Builder)) -> Result<(), SerdeError> {
        self.session.before_value()?;
        if let Some(key) = &self.pending_key {
            self.session.note_map_key(key)?;
            self.session.with_builder(|b| {
                b.push_key(key);
                f(b);
            });
        } else {
            self.session.with_builder(f);
        }
        Ok(())
    }

    fn begin(
        self,
        kind: FrameKind,
        start: impl FnOnce(&mut flexbuffers::Builder) -> usize,
    ) -> Result<&'s Session, SerdeError> {
        self.session.before_value()?;
        let offset = if let Some(key) = &self.pending_key {
            self.session.note_map_key(key)?;
            self.session.with_builder(|b| {
                b.push_key(key);
                start(b)
            })
        } else {
            self.session.with_builder(start)
        };
        self.session.push_frame(kind, offset);
        Ok(self.session)
    }
}

impl<'s> Serializer for FlexSerializer<'s> {
    type Ok = ();
    type SerializeSeq = FlexSeq<'s>;
    type SerializeTuple = FlexSeq<'s>;
    type SerializeMap = FlexMap<'s>;
    type SerializeStruct = FlexMap<'s>;

    fn serialize_none(self) -> Result<(), SerdeError> {
        self.write_leaf(flexbuffers::Builder::push_null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), SerdeError> {
        value.serialize(self)
    }

    fn serialize_bool(self, v: bool) -> Result<(), SerdeError> {
        self.write_leaf(move |b| b.push_bool(v))
    }

    fn serialize_int(self, v: i64) -> Result<(), SerdeError> {
        self.write_leaf(move |b| b.push_int(v))
    }

    fn serialize_uint(self, v: u64) -> Result<(), SerdeError> {
        self.write_leaf(move |b| b.push_uint(v))
    }

    fn serialize_float(self, v: f64) -> Result<(), SerdeError> {
        if v.is_finite() {
            self.write_leaf(move |b| b.push_float(v))
        } else {
            self.write_leaf(flexbuffers::Builder::push_null)
        }
    }

    fn serialize_char(self, v: char) -> Result<(), SerdeError> {
        let mut buf = [0u8; 4];
        let s = v.encode_utf8(&mut buf);
        self.write_leaf(move |b| b.push_str(s))
    }

    fn serialize_str(self, v: &str) -> Result<(), SerdeError> {
        self.write_leaf(move |b| b.push_str(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), SerdeError> {
        self.write_leaf(move |b| b.push_blob(v))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<FlexSeq<'s>, SerdeError> {
        let session = self.begin(FrameKind::Array, flexbuffers::Builder::start_vector)?;
        Ok(FlexSeq { session })
    }

    fn serialize_tuple(self, _len: usize) -> Result<FlexSeq<'s>, SerdeError> {
        let session = self.begin(FrameKind::Array, flexbuffers::Builder::start_vector)?;
        Ok(FlexSeq { session })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<FlexMap<'s>, SerdeError> {
        let session = self.begin(FrameKind::Map, flexbuffers::Builder::start_map)?;
        Ok(FlexMap { session })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<FlexMap<'s>, SerdeError> {
        let session = self.begin(FrameKind::Map, flexbuffers::Builder::start_map)?;
        Ok(FlexMap { session })
    }

    fn serialize_variant<T: Serialize + ?Sized>(
        self,
        tag: &str,
        value: &T,
    ) -> Result<(), SerdeError> {
        let mut map = self.serialize_map(Some(1))?;
        map.serialize_entry(tag, value)?;
        map.end()
    }
}

/// In-progress sequence/tuple frame over the session's [`flexbuffers::Builder`].
pub struct FlexSeq<'s> {
    session: &'s Session,
}

impl<'s> SerializeSeq for FlexSeq<'s> {
    type Ok = ();

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError> {
        value.serialize(FlexSerializer::root(self.session))
    }

    fn end(self) -> Result<(), SerdeError> {
        let start = self.session.pop_frame(matches_array)?;
        self.session.with_builder(|b| b.end_vector(start));
        Ok(())
    }
}

impl<'s> SerializeTuple for FlexSeq<'s> {
    type Ok = ();

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), SerdeError> {
        SerializeSeq::end(self)
    }
}

/// In-progress map/struct frame over the session's [`flexbuffers::Builder`].
pub struct FlexMap<'s> {
    session: &'s Session,
}

impl<'s> SerializeMap for FlexMap<'s> {
    type Ok = ();

    fn serialize_entry<K: Serialize + ?Sized, V: Serialize + ?Sized>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), SerdeError> {
        let key = key_as_string(key)?;
        value.serialize(FlexSerializer::keyed(self.session, key))
    }

    fn end(self) -> Result<(), SerdeError> {
        let start = self.session.pop_frame(matches_map)?;
        self.session.with_builder(|b| b.end_map(start));
        Ok(())
    }
}

impl<'s> SerializeStruct for FlexMap<'s> {
    type Ok = ();

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        value.serialize(FlexSerializer::keyed(self.session, name.to_string()))
    }

    fn end(self) -> Result<(), SerdeError> {
        SerializeMap::end(self)
    }
}
