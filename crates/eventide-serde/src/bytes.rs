//! Byte-span wrapper types.
//!
//! `Vec<u8>` implements [`Serialize`]/[`Deserialize`] as a `seq` of `u8`
//! leaves, same as any other `Vec<T>` — that's correct by default but
//! expensive for large spans and loses the `bytes` value kind entirely.
//! Wrap a byte span in [`Bytes`] (borrowed, for writing) or [`ByteBuf`]
//! (owned, for round-tripping) to route it through
//! `serialize_bytes`/`deserialize_bytes` instead, the same opt-in convention
//! the wider ecosystem uses for this exact tradeoff.

use crate::{Deserialize, Deserializer, SerdeError, Serialize, Serializer};

/// A borrowed byte span serialized via [`Serializer::serialize_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bytes<'a>(pub &'a [u8]);

impl<'a> Bytes<'a> {
    /// Wrap `slice` for serialization as a `bytes` leaf.
    #[must_use]
    pub fn new(slice: &'a [u8]) -> Self {
        Self(slice)
    }
}

impl Serialize for Bytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_bytes(self.0)
    }
}

/// An owned byte buffer deserialized via [`Deserializer::deserialize_bytes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuf(pub Vec<u8>);

impl ByteBuf {
    /// Take ownership of `bytes` for deserialization as a `bytes` leaf.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Unwrap into the underlying buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Serialize for ByteBuf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, SerdeError> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<D: Deserializer> Deserialize<D> for ByteBuf {
    fn deserialize(deserializer: &D) -> Result<Self, SerdeError> {
        Ok(Self(deserializer.deserialize_bytes()?))
    }
}

impl From<Vec<u8>> for ByteBuf {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ByteBuf {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_buf_round_trips_through_vec() {
        let buf = ByteBuf::new(vec![1, 2, 3]);
        assert_eq!(buf.clone().into_vec(), vec![1, 2, 3]);
        assert_eq!(buf.as_ref(), &[1, 2, 3][..]);
    }
}
