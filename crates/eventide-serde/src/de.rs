use crate::SerdeError;
use eventide_value::ValueKind;

/// A read-only view over one node of a parsed value, driving a parse one
/// call at a time.
///
/// Unlike [`crate::Serializer`], a deserializer is never consumed by its
/// methods: the underlying node (a `flexbuffers::Reader`, a
/// `serde_json::Value` reference, ...) is an immutable, cheaply-cloned view,
/// so `deserialize_none` can inspect the tag without advancing anything, and
/// a caller can try one shape, fail, and try another without losing the
/// node. Frames returned by the container methods each hold their own
/// position into the node's children.
pub trait Deserializer: Clone {
    /// Frame returned by [`Deserializer::deserialize_seq`].
    type SeqAccess: SeqAccess<Node = Self>;
    /// Frame returned by [`Deserializer::deserialize_tuple`].
    type TupleAccess: TupleAccess<Node = Self>;
    /// Frame returned by [`Deserializer::deserialize_map`].
    type MapAccess: MapAccess<Node = Self>;
    /// Frame returned by [`Deserializer::deserialize_struct`].
    type StructAccess: StructAccess<Node = Self>;

    /// Returns `true` without consuming anything if the node is the none
    /// marker; `false` (also without consuming) otherwise.
    fn deserialize_none(&self) -> Result<bool, SerdeError>;
    /// Read a boolean leaf.
    fn deserialize_bool(&self) -> Result<bool, SerdeError>;
    /// Read a signed-integer leaf, widened from whatever the back-end
    /// stored.
    fn deserialize_int(&self) -> Result<i64, SerdeError>;
    /// Read an unsigned-integer leaf.
    fn deserialize_uint(&self) -> Result<u64, SerdeError>;
    /// Read a double-precision float leaf.
    fn deserialize_float(&self) -> Result<f64, SerdeError>;
    /// Read a single-character leaf.
    fn deserialize_char(&self) -> Result<char, SerdeError>;
    /// Read a UTF-8 string leaf.
    fn deserialize_str(&self) -> Result<String, SerdeError>;
    /// Read an opaque byte-span leaf.
    fn deserialize_bytes(&self) -> Result<Vec<u8>, SerdeError>;
    /// Enter a sequence frame.
    fn deserialize_seq(&self) -> Result<Self::SeqAccess, SerdeError>;
    /// Enter a fixed-length tuple frame. `len` is the length the caller's
    /// type declares; back-ends may use it to validate against the wire
    /// length.
    fn deserialize_tuple(&self, len: usize) -> Result<Self::TupleAccess, SerdeError>;
    /// Enter a key/value map frame.
    fn deserialize_map(&self) -> Result<Self::MapAccess, SerdeError>;
    /// Enter a struct frame. `name` and `len` describe the caller's type;
    /// back-ends are not required to validate the wire record against
    /// either, since unknown fields must remain silently skippable.
    fn deserialize_struct(
        &self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::StructAccess, SerdeError>;
}

/// Frame for an in-progress sequence read.
pub trait SeqAccess {
    /// The deserializer type handed to each element.
    type Node: Deserializer;
    /// `true` if at least one more element remains.
    fn has_next(&mut self) -> Result<bool, SerdeError>;
    /// Read the next element. Callers must check [`SeqAccess::has_next`]
    /// first; calling this with nothing left is [`SerdeError::InvalidState`].
    fn deserialize_element<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError>;
    /// Advance past the next element without decoding it.
    fn skip_element(&mut self) -> Result<(), SerdeError>;
}

/// Frame for an in-progress fixed-length tuple read.
pub trait TupleAccess {
    /// The deserializer type handed to each element.
    type Node: Deserializer;
    /// `true` if at least one more element remains.
    fn has_next(&mut self) -> Result<bool, SerdeError>;
    /// Read the next element.
    fn deserialize_element<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError>;
    /// Advance past the next element without decoding it.
    fn skip_element(&mut self) -> Result<(), SerdeError>;
}

/// Frame for an in-progress key/value map read.
pub trait MapAccess {
    /// The deserializer type handed to each value.
    type Node: Deserializer;
    /// `true` if at least one more entry remains.
    fn has_next(&mut self) -> Result<bool, SerdeError>;
    /// Read the next key, or `None` if the frame is exhausted.
    fn next_key(&mut self) -> Result<Option<String>, SerdeError>;
    /// Read the value paired with the key just returned by
    /// [`MapAccess::next_key`].
    fn deserialize_value<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError>;
    /// Advance past the pending value without decoding it. Used by struct
    /// readers to silently skip keys the target type does not declare.
    fn skip_value(&mut self) -> Result<(), SerdeError>;
}

/// Frame for an in-progress struct read.
///
/// Unknown keys are not filtered out by the back-end: they are surfaced
/// through [`StructAccess::next_key`] like any other key, and it is the
/// caller's [`Deserialize`] impl that calls [`StructAccess::skip_value`] for
/// names it does not recognize. This is what lets a record with extra wire
/// fields decode into a narrower type.
pub trait StructAccess {
    /// The deserializer type handed to each field value.
    type Node: Deserializer;
    /// `true` if at least one more field remains.
    fn has_next(&mut self) -> Result<bool, SerdeError>;
    /// Read the next field's wire name, or `None` if the frame is
    /// exhausted.
    fn next_key(&mut self) -> Result<Option<String>, SerdeError>;
    /// Read the value paired with the key just returned by
    /// [`StructAccess::next_key`].
    fn deserialize_value<T: Deserialize<Self::Node>>(&mut self) -> Result<T, SerdeError>;
    /// Advance past the pending value without decoding it.
    fn skip_value(&mut self) -> Result<(), SerdeError>;
}

/// A deserializer whose current node can be asked what kind of value it
/// holds before committing to a `deserialize_*` call.
///
/// The core [`Deserializer`] contract deliberately has no such method: a
/// typed [`Deserialize`] impl always knows the shape it wants and just asks
/// for it. This trait is the exception for callers with no static shape to
/// hand — the dynamic [`crate::Value`] tree used in round-trip tests, and
/// any future generic "forward whatever this was" handler. Concrete
/// back-ends implement it using whatever tag introspection their
/// underlying reader already exposes.
pub trait Introspect: Deserializer {
    /// The [`ValueKind`] of the node without consuming it.
    fn value_kind(&self) -> Result<ValueKind, SerdeError>;
}

/// A type that knows how to reconstruct itself from any [`Deserializer`].
pub trait Deserialize<D: Deserializer>: Sized {
    /// Parse `Self` out of `deserializer`.
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError>;
}

macro_rules! impl_deserialize_via_int {
    ($($ty:ty),+) => {
        $(
            impl<D: Deserializer> Deserialize<D> for $ty {
                fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
                    let wide = deserializer.deserialize_int()?;
                    Self::try_from(wide).map_err(|_| SerdeError::NumberOutOfRange)
                }
            }
        )+
    };
}

macro_rules! impl_deserialize_via_uint {
    ($($ty:ty),+) => {
        $(
            impl<D: Deserializer> Deserialize<D> for $ty {
                fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
                    let wide = deserializer.deserialize_uint()?;
                    Self::try_from(wide).map_err(|_| SerdeError::NumberOutOfRange)
                }
            }
        )+
    };
}

impl_deserialize_via_int!(i8, i16, i32);
impl_deserialize_via_uint!(u8, u16, u32, u64);

impl<D: Deserializer> Deserialize<D> for i64 {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        deserializer.deserialize_int()
    }
}

impl<D: Deserializer> Deserialize<D> for bool {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        deserializer.deserialize_bool()
    }
}

impl<D: Deserializer> Deserialize<D> for f32 {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        let wide = deserializer.deserialize_float()?;
        Ok(wide as f32)
    }
}

impl<D: Deserializer> Deserialize<D> for f64 {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        deserializer.deserialize_float()
    }
}

impl<D: Deserializer> Deserialize<D> for char {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        deserializer.deserialize_char()
    }
}

impl<D: Deserializer> Deserialize<D> for String {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        deserializer.deserialize_str()
    }
}

impl<D: Deserializer, T: Deserialize<D>> Deserialize<D> for Option<T> {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        if deserializer.deserialize_none()? {
            Ok(None)
        } else {
            Ok(Some(T::deserialize(deserializer)?))
        }
    }
}

impl<D: Deserializer, T: Deserialize<D>> Deserialize<D> for Vec<T> {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        let mut seq = deserializer.deserialize_seq()?;
        let mut out = Vec::new();
        while seq.has_next()? {
            out.push(seq.deserialize_element()?);
        }
        Ok(out)
    }
}

impl<D: Deserializer, T: Deserialize<D>> Deserialize<D> for std::collections::BTreeMap<String, T> {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        let mut map = deserializer.deserialize_map()?;
        let mut out = std::collections::BTreeMap::new();
        while let Some(key) = map.next_key()? {
            let value = map.deserialize_value()?;
            out.insert(key, value);
        }
        Ok(out)
    }
}

impl<D: Deserializer, T: Deserialize<D>> Deserialize<D> for std::collections::HashMap<String, T> {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        let mut map = deserializer.deserialize_map()?;
        let mut out = std::collections::HashMap::new();
        while let Some(key) = map.next_key()? {
            let value = map.deserialize_value()?;
            out.insert(key, value);
        }
        Ok(out)
    }
}

impl<D: Deserializer, T: Deserialize<D>> Deserialize<D> for Box<T> {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        Ok(Box::new(T::deserialize(deserializer)?))
    }
}

macro_rules! impl_deserialize_tuple {
    ($len:expr; $($name:ident),+) => {
        impl<__Deser: Deserializer, $($name: Deserialize<__Deser>),+> Deserialize<__Deser> for ($($name,)+) {
            fn deserialize(deserializer: &__Deser) -> Result<Self, SerdeError> {
                let mut tuple = deserializer.deserialize_tuple($len)?;
                $(
                    if !tuple.has_next()? {
                        return Err(SerdeError::InvalidState);
                    }
                    #[allow(non_snake_case)]
                    let $name = tuple.deserialize_element()?;
                )+
                Ok(($($name,)+))
            }
        }
    };
}

impl_deserialize_tuple!(2; A, B);
impl_deserialize_tuple!(3; A, B, C);
impl_deserialize_tuple!(4; A, B, C, D);
