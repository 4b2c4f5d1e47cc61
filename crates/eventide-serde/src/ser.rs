use crate::SerdeError;

/// A back-end that receives a structured value one call at a time.
///
/// This mirrors the shape of a well-known visitor-driven serialization
/// trait: every leaf and every container open/close is its own method, and a
/// type's [`Serialize`] impl is the only customization point — there is no
/// reflection and no derive macro in scope.
///
/// Implementors consume `self` per call because a session is a single,
/// one-shot write: once a leaf or a top-level container has been started,
/// the builder has moved on and there is nothing to rewind to.
pub trait Serializer: Sized {
    /// The value produced by a successful leaf write or `end()` call.
    type Ok;
    /// Frame returned by [`Serializer::serialize_seq`].
    type SerializeSeq: SerializeSeq<Ok = Self::Ok>;
    /// Frame returned by [`Serializer::serialize_tuple`].
    type SerializeTuple: SerializeTuple<Ok = Self::Ok>;
    /// Frame returned by [`Serializer::serialize_map`].
    type SerializeMap: SerializeMap<Ok = Self::Ok>;
    /// Frame returned by [`Serializer::serialize_struct`].
    type SerializeStruct: SerializeStruct<Ok = Self::Ok>;

    /// Emit the none marker.
    fn serialize_none(self) -> Result<Self::Ok, SerdeError>;
    /// Emit `value` as a present option.
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok, SerdeError>;
    /// Emit a boolean leaf.
    fn serialize_bool(self, v: bool) -> Result<Self::Ok, SerdeError>;
    /// Emit a signed-integer leaf, widened to `i64`.
    fn serialize_int(self, v: i64) -> Result<Self::Ok, SerdeError>;
    /// Emit an unsigned-integer leaf, widened to `u64`.
    fn serialize_uint(self, v: u64) -> Result<Self::Ok, SerdeError>;
    /// Emit a double-precision float leaf.
    ///
    /// Back-ends that cannot represent non-finite floats are expected to
    /// fall back to the none marker rather than propagate an error.
    fn serialize_float(self, v: f64) -> Result<Self::Ok, SerdeError>;
    /// Emit a single-character leaf.
    fn serialize_char(self, v: char) -> Result<Self::Ok, SerdeError>;
    /// Emit a UTF-8 string leaf.
    fn serialize_str(self, v: &str) -> Result<Self::Ok, SerdeError>;
    /// Emit an opaque byte-span leaf.
    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, SerdeError>;
    /// Begin a sequence, whose length may or may not be known up front.
    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, SerdeError>;
    /// Begin a fixed-length tuple. `len` must match the number of elements
    /// actually written.
    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, SerdeError>;
    /// Begin a key/value map, whose length may or may not be known up front.
    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, SerdeError>;
    /// Begin a named record with a declared field count.
    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, SerdeError>;
    /// Emit a tagged union: a discriminant string plus its inner value.
    fn serialize_variant<T: Serialize + ?Sized>(
        self,
        tag: &str,
        value: &T,
    ) -> Result<Self::Ok, SerdeError>;
}

/// Frame for an in-progress sequence.
///
/// Every `serialize_seq` must be balanced by exactly one `end()`; calling
/// any method on a frame after `end()` has been called is a logic error the
/// back-end is free to report as [`SerdeError::InvalidState`].
pub trait SerializeSeq {
    /// The value produced once the sequence is closed.
    type Ok;
    /// Write the next element.
    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError>;
    /// Close the sequence.
    fn end(self) -> Result<Self::Ok, SerdeError>;
}

/// Frame for an in-progress fixed-length tuple.
pub trait SerializeTuple {
    /// The value produced once the tuple is closed.
    type Ok;
    /// Write the next element.
    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerdeError>;
    /// Close the tuple.
    fn end(self) -> Result<Self::Ok, SerdeError>;
}

/// Frame for an in-progress key/value map.
pub trait SerializeMap {
    /// The value produced once the map is closed.
    type Ok;
    /// Write one key/value entry.
    fn serialize_entry<K: Serialize + ?Sized, V: Serialize + ?Sized>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), SerdeError>;
    /// Close the map. Back-ends that track duplicate keys report
    /// [`SerdeError::DuplicateKeys`] here if two entries shared a key.
    fn end(self) -> Result<Self::Ok, SerdeError>;
}

/// Frame for an in-progress struct.
///
/// Callers apply field annotations (rename/skip/skip-if-empty, see
/// [`eventide_value::FieldAnnotation`]) before deciding whether and under
/// what name to call [`SerializeStruct::serialize_field`] — annotation
/// handling is not a separate pass over the data.
pub trait SerializeStruct {
    /// The value produced once the struct is closed.
    type Ok;
    /// Write one field under the given wire name.
    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), SerdeError>;
    /// Close the struct.
    fn end(self) -> Result<Self::Ok, SerdeError>;
}

/// A type that knows how to describe itself to any [`Serializer`].
pub trait Serialize {
    /// Visit `serializer` with this value's structure.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError>;
}

macro_rules! impl_serialize_via_int {
    ($($ty:ty),+) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
                    serializer.serialize_int(i64::from(*self))
                }
            }
        )+
    };
}

macro_rules! impl_serialize_via_uint {
    ($($ty:ty),+) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
                    serializer.serialize_uint(u64::from(*self))
                }
            }
        )+
    };
}

impl_serialize_via_int!(i8, i16, i32, i64);
impl_serialize_via_uint!(u8, u16, u32, u64);

impl Serialize for bool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_bool(*self)
    }
}

impl Serialize for f32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_float(f64::from(*self))
    }
}

impl Serialize for f64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_float(*self)
    }
}

impl Serialize for char {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_char(*self)
    }
}

impl Serialize for str {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_str(self)
    }
}

impl Serialize for String {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_str(self)
    }
}

impl<T: Serialize> Serialize for Option<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        match self {
            Some(value) => serializer.serialize_some(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<T: Serialize> Serialize for Vec<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<T: Serialize> Serialize for [T] {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<T: Serialize> Serialize for std::collections::BTreeMap<String, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<T: Serialize> Serialize for std::collections::HashMap<String, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<T: Serialize> Serialize for Box<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        (**self).serialize(serializer)
    }
}

macro_rules! impl_serialize_tuple {
    ($len:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: Serialize),+> Serialize for ($($name,)+) {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
                let mut tuple = serializer.serialize_tuple($len)?;
                $(tuple.serialize_element(&self.$idx)?;)+
                tuple.end()
            }
        }
    };
}

impl_serialize_tuple!(2; A:0, B:1);
impl_serialize_tuple!(3; A:0, B:1, C:2);
impl_serialize_tuple!(4; A:0, B:1, C:2, D:3);
